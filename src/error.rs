//! Error types for the viewer
//!
//! Each failure domain gets its own enum so construction-time problems can be
//! reported precisely; [`AppError`] gathers them for the application shell.

use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::resources::ltc::LtcTableKind;

/// Invalid camera construction parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CameraError {
    #[error("invalid clip planes: near = {near}, far = {far} (need 0 < near < far)")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("field of view must be inside (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f32),
    #[error("viewport must not be empty, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },
    #[error("camera forward direction must not be zero")]
    ZeroForward,
    #[error("camera forward direction must not point straight up or down")]
    VerticalForward,
}

/// Failures creating or loading the area-light lookup tables.
#[derive(Debug, Error)]
pub enum LtcError {
    #[error("texture slot {0} is reserved; lookup tables need a slot >= 1")]
    ReservedSlot(u32),
    #[error("{kind:?} table needs {expected} floats, got {actual}")]
    SizeMismatch {
        kind: LtcTableKind,
        expected: usize,
        actual: usize,
    },
    #[error("failed to read lookup table {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("array `{0}` not found in header")]
    ArrayNotFound(String),
    #[error("could not parse `{token}` in array `{array}` as a float")]
    InvalidNumber { array: String, token: String },
}

/// Invalid area light description.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LightError {
    #[error("light intensity must be >= 0, got {0}")]
    NegativeIntensity(f32),
    #[error("light quad is degenerate (corners are collinear or coincident)")]
    DegenerateQuad,
    #[error("light quad corners are not coplanar (distance {0} from the plane)")]
    NotCoplanar(f32),
}

/// Invalid sheen shaping parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SheenError {
    #[error("sheen alpha must be inside [0, 1], got {0}")]
    AlphaOutOfRange(f32),
    #[error("sheen colour multiplier must be >= 0, got {0}")]
    NegativeMultiplier(f32),
}

/// A uniform or texture binding the active program cannot accept.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BindingError {
    #[error("uniform `{0}` does not exist in the linked program")]
    UnknownUniform(String),
    #[error("uniform `{name}` is a {expected}, not a {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("texture slot {0} is outside the slot table")]
    SlotOutOfRange(u32),
    #[error("sampler `{name}` lives in slot {expected}, not slot {found}")]
    SlotMismatch {
        name: String,
        expected: u32,
        found: u32,
    },
}

/// Geometry or texture import failures.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load model {path}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("model {0} contains no geometry")]
    EmptyModel(PathBuf),
    #[error("failed to decode texture {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Configuration file failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Graphics environment failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create the window surface")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open the graphics device")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create render pipelines: {}", .0.join("; "))]
    Pipeline(Vec<String>),
    #[error("surface offers no texture format")]
    NoSurfaceFormat,
    #[error("failed to acquire a frame")]
    Frame(#[source] wgpu::SurfaceError),
}

/// Top-level error for the application shell.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Ltc(#[from] LtcError),
    #[error(transparent)]
    Light(#[from] LightError),
    #[error(transparent)]
    Sheen(#[from] SheenError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("event loop failure")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create the window")]
    Window(#[from] winit::error::OsError),
}
