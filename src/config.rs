//! Application configuration
//!
//! Every field has a default, so a config file only needs to list what it
//! changes. The binary reads the file named by [`CONFIG_ENV_VAR`] if set.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gfx::resources::material::SheenModel;

/// Environment variable holding an optional JSON config path.
pub const CONFIG_ENV_VAR: &str = "SHEEN_VIEWER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub background: [f32; 4],
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
    pub shading: ShadingConfig,
    pub assets: AssetConfig,
    /// Abort a draw's binding sequence on the first unknown uniform instead
    /// of logging and skipping it.
    pub strict_bindings: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            background: [82.0 / 255.0, 103.0 / 255.0, 125.0 / 255.0, 1.0],
            camera: CameraConfig::default(),
            animation: AnimationConfig::default(),
            shading: ShadingConfig::default(),
            assets: AssetConfig::default(),
            strict_bindings: false,
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                log::info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 800,
            title: "Real-time animation".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub forward: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance covered by one movement command.
    pub move_step: f32,
    /// Angle in degrees covered by one rotation command.
    pub rotate_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.5, 1.4],
            forward: [0.0, -0.25, -1.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 300.0,
            move_step: 0.05,
            rotate_step: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Largest extent a normalized scene occupies.
    pub norm_size: f32,
    /// Continuous rotation around the up axis, degrees per second.
    pub rotation_speed: f32,
    /// Frames averaged per frame-rate report.
    pub fps_sample_frames: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            norm_size: 1.0,
            rotation_speed: 5.0,
            fps_sample_frames: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    pub light_intensity: f32,
    pub light_color: [f32; 3],
    pub light_points: [[f32; 3]; 4],
    pub fabric_color: [f32; 3],
    pub fabric_roughness: f32,
    pub fabric_specular: f32,
    pub sheen_alpha: f32,
    pub sheen_beta: f32,
    pub sheen_multiplier: f32,
    pub sheen_model: SheenModel,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            light_intensity: 10.0,
            light_color: [1.0, 1.0, 1.0],
            light_points: [
                [3.125, 3.4, 2.425],
                [3.575, 2.6, 2.825],
                [2.875, 2.6, 3.575],
                [2.425, 3.4, 3.175],
            ],
            fabric_color: [0.30, 0.65, 0.46],
            fabric_roughness: 1.0,
            fabric_specular: 0.0,
            sheen_alpha: 0.5,
            sheen_beta: 0.5,
            sheen_multiplier: 0.5,
            sheen_model: SheenModel::CosineBased,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub model_dir: PathBuf,
    pub texture_dir: PathBuf,
    pub ltc_dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("assets/models"),
            texture_dir: PathBuf::from("assets/textures"),
            ltc_dir: PathBuf::from("assets/ltc"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{ "animation": { "rotation_speed": 12.0 }, "strict_bindings": true }"#,
        )
        .unwrap();

        assert_eq!(config.animation.rotation_speed, 12.0);
        assert_eq!(config.animation.fps_sample_frames, 1000);
        assert!(config.strict_bindings);
        assert_eq!(config.window.width, 1400);
        assert_eq!(config.shading.sheen_model, SheenModel::CosineBased);
    }

    #[test]
    fn test_sheen_model_by_name() {
        let config =
            AppConfig::from_json(r#"{ "shading": { "sheen_model": "Zeltner" } }"#).unwrap();
        assert_eq!(config.shading.sheen_model, SheenModel::Zeltner);
        assert_eq!(config.shading.light_intensity, 10.0);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
