//! First-person camera driven by discrete movement and rotation steps.

use cgmath::{perspective, Deg, InnerSpace, Matrix3, Matrix4, Point3, Vector3};

use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};
use crate::config::CameraConfig;
use crate::error::CameraError;

pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Pitch rotations stop before the view direction gets this close to
/// world up (cosine of the angle between them).
const MAX_UP_ALIGNMENT: f32 = 0.99;

/// One discrete camera command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    MoveFront,
    MoveBack,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    RotateLeft,
    RotateRight,
    RotateUp,
    RotateDown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    position: Vector3<f32>,
    forward: Vector3<f32>,
    fov_degrees: f32,
    near: f32,
    far: f32,
    width: u32,
    height: u32,
    move_step: f32,
    rotate_step: f32,
}

impl Camera for FlyCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl FlyCamera {
    /// Validates clip planes, field of view, viewport and direction.
    pub fn new(
        position: Vector3<f32>,
        forward: Vector3<f32>,
        fov_degrees: f32,
        near: f32,
        far: f32,
        width: u32,
        height: u32,
    ) -> Result<Self, CameraError> {
        if !(near > 0.0 && far > near) {
            return Err(CameraError::InvalidClipPlanes { near, far });
        }
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            return Err(CameraError::InvalidFieldOfView(fov_degrees));
        }
        if width == 0 || height == 0 {
            return Err(CameraError::EmptyViewport { width, height });
        }
        if forward.magnitude2() <= f32::EPSILON {
            return Err(CameraError::ZeroForward);
        }
        if forward.normalize().dot(WORLD_UP).abs() > MAX_UP_ALIGNMENT {
            return Err(CameraError::VerticalForward);
        }

        let defaults = CameraConfig::default();
        Ok(Self {
            position,
            forward: forward.normalize(),
            fov_degrees,
            near,
            far,
            width,
            height,
            move_step: defaults.move_step,
            rotate_step: defaults.rotate_step,
        })
    }

    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Result<Self, CameraError> {
        let camera = Self::new(
            config.position.into(),
            config.forward.into(),
            config.fov_degrees,
            config.near,
            config.far,
            width,
            height,
        )?;
        Ok(camera.with_steps(config.move_step, config.rotate_step))
    }

    /// Overrides the distance and angle (degrees) of one command.
    pub fn with_steps(mut self, move_step: f32, rotate_step: f32) -> Self {
        self.move_step = move_step;
        self.rotate_step = rotate_step;
        self
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    /// Unit vector to the right of the view direction, parallel to the ground.
    pub fn right(&self) -> Vector3<f32> {
        self.forward.cross(WORLD_UP).normalize()
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn move_front(&mut self) {
        self.position += self.forward * self.move_step;
    }

    pub fn move_back(&mut self) {
        self.position -= self.forward * self.move_step;
    }

    pub fn move_left(&mut self) {
        self.position -= self.right() * self.move_step;
    }

    pub fn move_right(&mut self) {
        self.position += self.right() * self.move_step;
    }

    pub fn move_up(&mut self) {
        self.position += WORLD_UP * self.move_step;
    }

    pub fn move_down(&mut self) {
        self.position -= WORLD_UP * self.move_step;
    }

    pub fn rotate_left(&mut self) {
        self.yaw(self.rotate_step);
    }

    pub fn rotate_right(&mut self) {
        self.yaw(-self.rotate_step);
    }

    pub fn rotate_up(&mut self) {
        self.pitch(self.rotate_step);
    }

    pub fn rotate_down(&mut self) {
        self.pitch(-self.rotate_step);
    }

    fn yaw(&mut self, degrees: f32) {
        self.forward = (Matrix3::from_axis_angle(WORLD_UP, Deg(degrees)) * self.forward).normalize();
    }

    fn pitch(&mut self, degrees: f32) {
        let current = self.forward.dot(WORLD_UP).clamp(-1.0, 1.0).asin();
        let target = current + degrees.to_radians();
        if target.sin().abs() > MAX_UP_ALIGNMENT || target.abs() > std::f32::consts::FRAC_PI_2 {
            log::debug!("Camera pitch limit reached");
            return;
        }
        let horizontal = Vector3::new(self.forward.x, 0.0, self.forward.z).normalize();
        self.forward = (horizontal * target.cos() + WORLD_UP * target.sin()).normalize();
    }

    pub fn apply(&mut self, command: CameraCommand) {
        match command {
            CameraCommand::MoveFront => self.move_front(),
            CameraCommand::MoveBack => self.move_back(),
            CameraCommand::MoveLeft => self.move_left(),
            CameraCommand::MoveRight => self.move_right(),
            CameraCommand::MoveUp => self.move_up(),
            CameraCommand::MoveDown => self.move_down(),
            CameraCommand::RotateLeft => self.rotate_left(),
            CameraCommand::RotateRight => self.rotate_right(),
            CameraCommand::RotateUp => self.rotate_up(),
            CameraCommand::RotateDown => self.rotate_down(),
        }
    }

    /// Zero sizes (minimized windows) are ignored.
    pub fn set_width(&mut self, width: u32) {
        if width == 0 {
            log::warn!("Ignoring zero camera viewport width");
            return;
        }
        self.width = width;
    }

    pub fn set_height(&mut self, height: u32) {
        if height == 0 {
            log::warn!("Ignoring zero camera viewport height");
            return;
        }
        self.height = height;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::new(self.position.x, self.position.y, self.position.z);
        Matrix4::look_to_rh(eye, self.forward, WORLD_UP)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.fov_degrees), self.aspect(), self.near, self.far)
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: [self.position.x, self.position.y, self.position.z, 1.0],
            view_proj: convert_matrix4_to_array(self.build_view_projection_matrix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Vector4;

    fn camera() -> FlyCamera {
        FlyCamera::from_config(&CameraConfig::default(), 1400, 800).unwrap()
    }

    fn assert_vec_eq(a: Vector3<f32>, b: Vector3<f32>) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn test_move_round_trips() {
        let pairs = [
            (CameraCommand::MoveFront, CameraCommand::MoveBack),
            (CameraCommand::MoveLeft, CameraCommand::MoveRight),
            (CameraCommand::MoveUp, CameraCommand::MoveDown),
            (CameraCommand::RotateLeft, CameraCommand::RotateRight),
            (CameraCommand::RotateUp, CameraCommand::RotateDown),
        ];
        for (there, back) in pairs {
            let mut camera = camera();
            let start = camera.clone();
            camera.apply(there);
            assert_ne!(camera, start, "{there:?}");
            camera.apply(back);
            assert_vec_eq(camera.position(), start.position());
            assert_vec_eq(camera.forward(), start.forward());
        }
    }

    #[test]
    fn test_move_front_follows_forward() {
        let mut camera = camera().with_steps(1.0, 2.0);
        let start = camera.position();
        camera.move_front();
        assert_vec_eq(camera.position() - start, camera.forward());
        assert_relative_eq!(camera.forward().magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rotate_left_turns_counter_clockwise() {
        let mut camera = FlyCamera::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            45.0,
            0.1,
            100.0,
            100,
            100,
        )
        .unwrap()
        .with_steps(0.1, 90.0);

        camera.rotate_left();
        assert_vec_eq(camera.forward(), Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_pitch_stops_short_of_vertical() {
        let mut camera = camera().with_steps(0.05, 30.0);
        for _ in 0..10 {
            camera.rotate_up();
        }
        assert!(camera.forward().dot(WORLD_UP) <= MAX_UP_ALIGNMENT);
        assert!(camera.forward().dot(WORLD_UP) > 0.5);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let p = Vector3::new(0.0, 0.0, 0.0);
        let f = Vector3::new(0.0, 0.0, -1.0);
        assert!(matches!(
            FlyCamera::new(p, f, 45.0, 1.0, 1.0, 10, 10),
            Err(CameraError::InvalidClipPlanes { .. })
        ));
        assert!(matches!(
            FlyCamera::new(p, f, 45.0, 2.0, 1.0, 10, 10),
            Err(CameraError::InvalidClipPlanes { .. })
        ));
        assert!(matches!(
            FlyCamera::new(p, f, 45.0, 0.0, 1.0, 10, 10),
            Err(CameraError::InvalidClipPlanes { .. })
        ));
        for fov in [0.0, 180.0, -5.0, 200.0] {
            assert_eq!(
                FlyCamera::new(p, f, fov, 0.1, 10.0, 10, 10),
                Err(CameraError::InvalidFieldOfView(fov))
            );
        }
        assert_eq!(
            FlyCamera::new(p, f, 45.0, 0.1, 10.0, 0, 10),
            Err(CameraError::EmptyViewport { width: 0, height: 10 })
        );
        assert_eq!(
            FlyCamera::new(p, Vector3::new(0.0, 0.0, 0.0), 45.0, 0.1, 10.0, 10, 10),
            Err(CameraError::ZeroForward)
        );
        assert_eq!(
            FlyCamera::new(p, Vector3::new(0.0, -2.0, 0.0), 45.0, 0.1, 10.0, 10, 10),
            Err(CameraError::VerticalForward)
        );
    }

    #[test]
    fn test_projection_uses_viewport_aspect() {
        let mut camera = camera();
        camera.set_width(800);
        camera.set_height(0);
        assert_relative_eq!(camera.aspect(), 1.0);

        let proj = camera.projection_matrix();
        assert_relative_eq!(proj.x.x, proj.y.y);
    }

    #[test]
    fn test_view_matrix_looks_along_forward() {
        let camera = camera();
        let ahead = camera.position() + camera.forward() * 2.0;
        let in_view = camera.view_matrix() * Vector4::new(ahead.x, ahead.y, ahead.z, 1.0);
        assert_relative_eq!(in_view.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(in_view.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(in_view.z, -2.0, epsilon = 1e-5);

        let uniform = camera.uniform();
        assert_eq!(uniform.view_position, [0.0, 0.5, 1.4, 1.0]);
    }
}
