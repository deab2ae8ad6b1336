// src/lib.rs
//! Sheen viewer
//!
//! Real-time rendering of fabric under a quad area light, using linearly
//! transformed cosines for the light integral and a selectable sheen lobe.
//! Built on wgpu and winit with an imgui parameters panel.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod performance;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use config::AppConfig;
pub use error::AppError;
