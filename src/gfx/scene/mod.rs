//! # Scene Module
//!
//! Imported geometry, transformable objects and the per-frame composition
//! of the two viewer scenes.
//!
//! - [`Object`] - meshes, a fixed bounding box and a rebuilt-per-frame transform
//! - [`Scene`] / [`SceneSet`] - resident objects plus an ordered drawable list
//! - [`SceneComposer`] - normalization, animation and the bind/draw sequence
//! - [`presets`] - the cloth/sphere and fabric/table/sewing machine scenes

pub mod bounding_box;
pub mod composer;
pub mod loader;
pub mod object;
pub mod presets;
pub mod scene;
pub mod vertex;

pub use bounding_box::{BoundingBox, Normalization};
pub use composer::{FrameReport, SceneComposer};
pub use object::{DrawObject, Mesh, Object};
pub use scene::{Drawable, MaterialSpec, Scene, SceneId, SceneSet};
pub use vertex::Vertex3D;
