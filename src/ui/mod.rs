//! # User Interface Module
//!
//! Dear ImGui overlay for the viewer.
//!
//! - [`UiManager`] - ImGui context, winit input glue and the wgpu renderer
//! - [`panel`] - the shading parameters panel and the edits it produces
//!
//! When the UI has keyboard focus, camera keys are not processed.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{apply_edit, parameters_panel, PanelEdit, PanelStatus};
