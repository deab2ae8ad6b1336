pub mod camera_controller;
pub mod camera_utils;
pub mod fly_camera;

pub use camera_controller::{CameraController, KeyAction};
pub use camera_utils::{Camera, CameraUniform};
pub use fly_camera::{CameraCommand, FlyCamera};
