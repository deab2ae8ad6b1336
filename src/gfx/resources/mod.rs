// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Texture slot assignments, area-light lookup tables, material and light
//! parameters, textures and the global camera bindings.

pub mod global_bindings;
pub mod ltc;
pub mod material;
pub mod slots;
pub mod texture_resource;

pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO};
pub use ltc::{LtcSet, LtcTable, LtcTableKind, LtcTexture, TableUploader};
pub use material::{
    AreaLight, FabricParameters, MaterialTexture, MaterialTextures, OverrideMaterial,
    ShadingParameters, SheenModel, SheenParameters,
};
pub use slots::TextureSlot;
pub use texture_resource::{GpuUploader, TextureResource};
