//! Per-frame scene composition
//!
//! Every frame the active scene is normalized from its reference object's
//! bounds, each object's transform is rebuilt from identity, and every
//! drawable is bound and drawn in order.

use std::time::Duration;

use crate::config::AnimationConfig;
use crate::error::BindingError;
use crate::gfx::binding::{
    DrawDescription, DrawTarget, MaterialBinder, MaterialMode, TexturedMaterial,
};
use crate::gfx::resources::ltc::LtcSet;
use crate::gfx::resources::material::{MaterialTextures, OverrideMaterial, ShadingParameters};

use super::bounding_box::Normalization;
use super::scene::{MaterialSpec, Scene};

/// What one call to [`SceneComposer::compose`] submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub draws: usize,
    pub bindings_sent: usize,
    pub bindings_skipped: usize,
    pub drawables_skipped: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SceneComposer {
    norm_size: f32,
    rotation_speed: f32,
    binder: MaterialBinder,
}

impl SceneComposer {
    /// `rotation_speed` is in degrees per second.
    pub fn new(norm_size: f32, rotation_speed: f32, binder: MaterialBinder) -> Self {
        Self {
            norm_size,
            rotation_speed,
            binder,
        }
    }

    pub fn from_config(config: &AnimationConfig, strict_bindings: bool) -> Self {
        Self::new(
            config.norm_size,
            config.rotation_speed,
            MaterialBinder::new(strict_bindings),
        )
    }

    /// Rotation around the up axis after `elapsed` wall-clock time, wrapped
    /// into [0, 360).
    pub fn rotation_angle(&self, elapsed: Duration) -> f32 {
        (elapsed.as_secs_f64() * f64::from(self.rotation_speed)).rem_euclid(360.0) as f32
    }

    pub fn normalization(&self, scene: &Scene) -> Option<Normalization> {
        scene
            .reference_bounds()
            .map(|bounds| Normalization::from_bounds(bounds, self.norm_size, scene.fudge()))
    }

    /// Rebuilds every object transform as `R(angle) * S(scale) * T(-center)`.
    pub fn update_transforms(&self, scene: &mut Scene, elapsed: Duration) -> Option<Normalization> {
        let Some(bounds) = scene.reference_bounds().copied() else {
            log::error!("{} has no reference object", scene.id().label());
            return None;
        };
        if Normalization::is_degenerate(&bounds) && !scene.degenerate_reported {
            log::warn!(
                "{}: reference bounding box {:?} has no extent, flooring normalization",
                scene.id().label(),
                bounds
            );
            scene.degenerate_reported = true;
        }

        let norm = Normalization::from_bounds(&bounds, self.norm_size, scene.fudge());
        let angle = self.rotation_angle(elapsed);
        let s = norm.scale;
        let c = norm.center;

        for object in scene.objects_mut() {
            object.reset_transforms();
            object.rotate(0.0, 1.0, 0.0, angle);
            object.scale(s, s, s);
            object.translate(-c.x, -c.y, -c.z);
        }

        log::debug!("{}: scale {s}, center {c:?}, angle {angle}", scene.id().label());
        Some(norm)
    }

    /// Binds and draws every drawable of `scene` in order.
    ///
    /// In strict mode the first rejected binding aborts the frame. Drawables
    /// pointing at a missing object or texture set are logged and skipped.
    pub fn compose<P>(
        &self,
        program: &mut P,
        scene: &Scene,
        shading: &ShadingParameters,
        ltc: &LtcSet<P::Texture>,
        texture_sets: &[MaterialTextures<P::Texture>],
    ) -> Result<FrameReport, BindingError>
    where
        P: DrawTarget,
    {
        let mut report = FrameReport::default();

        for drawable in scene.drawables() {
            let Some(object) = scene.object(drawable.object) else {
                log::error!(
                    "{}: drawable refers to missing object {}",
                    scene.id().label(),
                    drawable.object
                );
                report.drawables_skipped += 1;
                continue;
            };

            let material = match drawable.material {
                MaterialSpec::Fabric => {
                    MaterialMode::Override(OverrideMaterial::from_fabric(&shading.fabric))
                }
                MaterialSpec::Flat(material) => MaterialMode::Override(material),
                MaterialSpec::Textured {
                    roughness,
                    specular_mult,
                    textures,
                } => {
                    let Some(textures) = texture_sets.get(textures) else {
                        log::error!(
                            "{}: {} uses missing texture set {textures}",
                            scene.id().label(),
                            object.name()
                        );
                        report.drawables_skipped += 1;
                        continue;
                    };
                    MaterialMode::Textured(TexturedMaterial {
                        roughness,
                        specular_mult,
                        textures,
                    })
                }
            };

            let draw = DrawDescription {
                light: &shading.light,
                material,
                sheen: &shading.sheen,
                dust: drawable.dust,
            };
            let bind = self.binder.bind(program, &draw, ltc)?;
            report.bindings_sent += bind.sent;
            report.bindings_skipped += bind.skipped.len();

            program.draw(scene.id(), drawable.object, object);
            report.draws += 1;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShadingConfig;
    use crate::gfx::binding::recording::{
        ltc_set, material_textures, RecordedCall, RecordedValue, RecordingTarget,
    };
    use crate::gfx::scene::bounding_box::BoundingBox;
    use crate::gfx::scene::object::Object;
    use crate::gfx::scene::presets;
    use crate::gfx::scene::scene::{Drawable, SceneId};
    use approx::assert_relative_eq;
    use cgmath::{Deg, Matrix4, Vector3};

    fn object(name: &str, min: [f32; 3], max: [f32; 3]) -> Object {
        Object::new(name, Vec::new(), BoundingBox::new(min.into(), max.into()))
    }

    fn scene_one() -> Scene {
        presets::scene_one(
            object("cloth", [-2.0, 0.0, -1.0], [2.0, 1.0, 1.0]),
            object("sphere", [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]),
        )
    }

    fn scene_two() -> Scene {
        presets::scene_two(
            object("fabric_front", [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            object("table", [-1.0, 0.0, -1.0], [1.0, 2.0, 1.0]),
            object("sewing", [0.0, 2.0, 0.0], [0.5, 2.5, 0.5]),
        )
    }

    fn composer() -> SceneComposer {
        SceneComposer::from_config(&AnimationConfig::default(), true)
    }

    fn shading() -> ShadingParameters {
        ShadingParameters::from_config(&ShadingConfig::default()).unwrap()
    }

    fn assert_matrix_eq(a: Matrix4<f32>, b: Matrix4<f32>) {
        let a: &[f32; 16] = a.as_ref();
        let b: &[f32; 16] = b.as_ref();
        for (x, y) in a.iter().zip(b) {
            assert_relative_eq!(*x, *y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_scene_one_at_time_zero() {
        let mut scene = scene_one();
        let norm = composer()
            .update_transforms(&mut scene, Duration::ZERO)
            .unwrap();

        // 1.0 / 4.0 * 0.75
        assert_relative_eq!(norm.scale, 0.1875);
        assert_eq!(norm.center, Vector3::new(0.0, 0.5, 0.0));

        let expected =
            Matrix4::from_scale(0.1875) * Matrix4::from_translation(Vector3::new(0.0, -0.5, 0.0));
        for object in scene.objects() {
            assert_matrix_eq(object.transform(), expected);
        }
    }

    #[test]
    fn test_rotation_is_time_driven() {
        let composer = composer();
        assert_eq!(composer.rotation_angle(Duration::from_secs(1)), 5.0);
        assert_eq!(composer.rotation_angle(Duration::from_millis(500)), 2.5);
        assert_eq!(composer.rotation_angle(Duration::from_secs(73)), 5.0);

        let mut scene = scene_one();
        composer.update_transforms(&mut scene, Duration::from_secs(1));
        let expected = Matrix4::from_angle_y(Deg(5.0))
            * Matrix4::from_scale(0.1875)
            * Matrix4::from_translation(Vector3::new(0.0, -0.5, 0.0));
        assert_matrix_eq(scene.objects()[0].transform(), expected);
    }

    #[test]
    fn test_repeated_frames_do_not_drift() {
        let composer = composer();
        let mut once = scene_one();
        let mut many = scene_one();
        composer.update_transforms(&mut once, Duration::from_secs(2));
        for _ in 0..50 {
            composer.update_transforms(&mut many, Duration::from_secs(2));
        }
        assert_eq!(once.objects()[0].transform(), many.objects()[0].transform());
    }

    #[test]
    fn test_degenerate_reference_is_floored_once() {
        let p = [1.0, 1.0, 1.0];
        let mut scene = Scene::new(SceneId::Scene1, vec![object("dot", p, p)], 0, 1.0, Vec::new());
        let composer = composer();

        let norm = composer.update_transforms(&mut scene, Duration::ZERO).unwrap();
        assert!(norm.scale.is_finite());
        assert!(scene.degenerate_reported);
        composer.update_transforms(&mut scene, Duration::ZERO);
        assert!(scene.degenerate_reported);
    }

    #[test]
    fn test_scene_one_draw_order_and_materials() {
        let scene = scene_one();
        let shading = shading();
        let ltc = ltc_set();
        let mut program = RecordingTarget::new();

        let report = composer()
            .compose(&mut program, &scene, &shading, &ltc, &[])
            .unwrap();

        assert_eq!(report.draws, 2);
        assert_eq!(report.bindings_skipped, 0);
        assert_eq!(
            program.draws(),
            vec![(SceneId::Scene1, 1, "sphere"), (SceneId::Scene1, 0, "cloth")]
        );

        // Bindings for the cloth come after the sphere draw and before its own.
        let sphere_draw = program
            .calls
            .iter()
            .position(|c| matches!(c, RecordedCall::Draw { .. }))
            .unwrap();
        let cloth_diffuse = program.calls[sphere_draw..]
            .iter()
            .find_map(|c| match c {
                RecordedCall::Uniform { name, value } if name == "materialalt.diffuse" => {
                    Some(value.clone())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(cloth_diffuse, RecordedValue::Vec3([0.30, 0.65, 0.46]));
        assert!(matches!(program.calls.last(), Some(RecordedCall::Draw { .. })));
    }

    #[test]
    fn test_scene_two_binds_texture_sets() {
        let scene = scene_two();
        let shading = shading();
        let ltc = ltc_set();
        let textures = [material_textures(10), material_textures(20)];
        let mut program = RecordingTarget::new();

        let report = composer()
            .compose(&mut program, &scene, &shading, &ltc, &textures)
            .unwrap();

        assert_eq!(report.draws, 3);
        assert_eq!(
            program.draws(),
            vec![
                (SceneId::Scene2, 0, "fabric_front"),
                (SceneId::Scene2, 1, "table"),
                (SceneId::Scene2, 2, "sewing"),
            ]
        );
        assert_eq!(program.value_of("dust"), Some(&RecordedValue::Bool(true)));
        assert_eq!(
            program.value_of("material.specular_mult"),
            Some(&RecordedValue::Float(0.2))
        );
        assert_eq!(program.bound(crate::gfx::resources::slots::TextureSlot::Diffuse), Some(20));
    }

    #[test]
    fn test_missing_texture_set_skips_drawable() {
        let scene = scene_two();
        let shading = shading();
        let ltc = ltc_set();
        let textures = [material_textures(10)];
        let mut program = RecordingTarget::new();

        let report = composer()
            .compose(&mut program, &scene, &shading, &ltc, &textures)
            .unwrap();

        assert_eq!(report.draws, 2);
        assert_eq!(report.drawables_skipped, 1);
    }

    #[test]
    fn test_missing_object_skips_drawable() {
        let scene = Scene::new(
            SceneId::Scene2,
            vec![object("only", [0.0; 3], [1.0; 3])],
            0,
            1.0,
            vec![Drawable {
                object: 4,
                material: MaterialSpec::Fabric,
                dust: false,
            }],
        );
        let mut program = RecordingTarget::new();

        let report = composer()
            .compose(&mut program, &scene, &shading(), &ltc_set(), &[])
            .unwrap();

        assert_eq!(report.draws, 0);
        assert_eq!(report.drawables_skipped, 1);
        assert!(program.calls.is_empty());
    }
}
