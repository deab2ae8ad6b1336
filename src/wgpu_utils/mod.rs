// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Builders for bind groups, binding type shorthands and typed uniform buffers.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::UniformBuffer;
