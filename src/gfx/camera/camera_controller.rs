use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::fly_camera::{CameraCommand, FlyCamera};

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Camera(CameraCommand),
    Exit,
}

/// Maps keyboard presses to camera commands. Held keys repeat through the
/// platform's key repeat, one step per press event.
#[derive(Debug, Default)]
pub struct CameraController;

impl CameraController {
    pub fn new() -> Self {
        Self
    }

    pub fn action_for(key: KeyCode) -> Option<KeyAction> {
        use CameraCommand::*;

        let command = match key {
            KeyCode::Escape => return Some(KeyAction::Exit),
            KeyCode::KeyW => MoveFront,
            KeyCode::KeyS => MoveBack,
            KeyCode::KeyA => MoveLeft,
            KeyCode::KeyD => MoveRight,
            KeyCode::KeyR => MoveUp,
            KeyCode::KeyF => MoveDown,
            KeyCode::KeyE => RotateLeft,
            KeyCode::KeyQ => RotateRight,
            KeyCode::KeyT => RotateUp,
            KeyCode::KeyG => RotateDown,
            _ => return None,
        };
        Some(KeyAction::Camera(command))
    }

    /// Applies camera commands directly and returns the action taken, if any.
    pub fn process_keyed_events(&mut self, event: &KeyEvent, camera: &mut FlyCamera) -> Option<KeyAction> {
        let KeyEvent {
            physical_key: PhysicalKey::Code(key),
            state: ElementState::Pressed,
            ..
        } = event
        else {
            return None;
        };

        let action = Self::action_for(*key)?;
        if let KeyAction::Camera(command) = action {
            camera.apply(command);
        }
        Some(action)
    }
}
