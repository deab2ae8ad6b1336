//! # Material and lighting binding
//!
//! Shading inputs reach the program through [`UniformTarget`]: named scalar
//! and vector writes plus textures attached to numbered slots. A
//! [`DrawTarget`] additionally accepts draws, which capture everything
//! written so far. Values written for one draw stay in place for the next
//! until overwritten, so [`MaterialBinder`] resends every field the shader
//! reads on each draw.
//!
//! [`GpuProgram`] is the wgpu implementation; tests use a recording double.

pub mod program;
pub mod protocol;
pub mod uniform_block;

#[cfg(test)]
pub(crate) mod recording;

use cgmath::Vector3;

use crate::error::BindingError;
use crate::gfx::scene::{Object, SceneId};

pub use program::{GpuProgram, PendingDraw};
pub use protocol::{BindReport, DrawDescription, MaterialBinder, MaterialMode, TexturedMaterial};
pub use uniform_block::{ShadingUniforms, UniformBlock};

/// Receives uniform values and texture bindings by name.
pub trait UniformTarget {
    type Texture;

    fn set_float(&mut self, name: &str, value: f32) -> Result<(), BindingError>;
    fn set_int(&mut self, name: &str, value: i32) -> Result<(), BindingError>;
    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), BindingError>;
    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) -> Result<(), BindingError>;

    /// Attaches `texture` to `slot`, which must be the slot `name` lives in.
    fn bind_texture(
        &mut self,
        name: &str,
        slot: u32,
        texture: &Self::Texture,
    ) -> Result<(), BindingError>;

    /// Detaches whatever texture occupies `slot`.
    fn unbind_texture(&mut self, slot: u32) -> Result<(), BindingError>;
}

/// A program that can also issue draws with the current bindings.
pub trait DrawTarget: UniformTarget {
    fn draw(&mut self, scene: SceneId, object_index: usize, object: &Object);
}
