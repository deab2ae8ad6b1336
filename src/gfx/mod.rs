//! # Graphics Module
//!
//! Everything between the imported models and the presented frame.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Keyboard-stepped fly camera
//! - **Scene Management** ([`scene`]) - Objects, the two scenes and per-frame composition
//! - **Resource Management** ([`resources`]) - Slot table, lookup tables, materials and textures
//! - **Binding** ([`binding`]) - Named uniform surface of the shading program
//! - **Rendering Pipeline** ([`rendering`]) - Device ownership and the area-light pipeline
//!
//! ## Frame Flow
//!
//! The [`scene::SceneComposer`] rebuilds object transforms, then binds each
//! drawable's light and material through a [`binding::DrawTarget`]. The
//! [`RenderEngine`] replays the recorded draws into one render pass.

pub mod binding;
pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::fly_camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;
