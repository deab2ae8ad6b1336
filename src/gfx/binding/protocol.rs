//! Per-draw binding sequence
//!
//! [`MaterialBinder::bind`] sends one [`DrawDescription`] to a program in a
//! fixed order: light, material mode, material fields, sheen terms, dust,
//! lookup tables and, on the textured path, the material maps. Every field
//! the fragment stage reads on the chosen path is sent on every call.

use crate::error::BindingError;
use crate::gfx::resources::ltc::LtcSet;
use crate::gfx::resources::material::{
    AreaLight, MaterialTextures, OverrideMaterial, SheenParameters,
};

use super::UniformTarget;

const LIGHT_POINT_NAMES: [&str; 4] = [
    "mainLight.points[0]",
    "mainLight.points[1]",
    "mainLight.points[2]",
    "mainLight.points[3]",
];

/// Base material path: scalar terms plus diffuse, normal and specular maps.
#[derive(Debug)]
pub struct TexturedMaterial<'a, T> {
    pub roughness: f32,
    pub specular_mult: f32,
    pub textures: &'a MaterialTextures<T>,
}

/// Which set of material fields the fragment stage consults.
#[derive(Debug)]
pub enum MaterialMode<'a, T> {
    /// Flat colours, no texture sampling (`useAlt = true`).
    Override(OverrideMaterial),
    /// Textured base material (`useAlt = false`).
    Textured(TexturedMaterial<'a, T>),
}

impl<T> MaterialMode<'_, T> {
    pub fn use_alt(&self) -> bool {
        matches!(self, MaterialMode::Override(_))
    }
}

/// Everything one draw needs from the scene.
#[derive(Debug)]
pub struct DrawDescription<'a, T> {
    pub light: &'a AreaLight,
    pub material: MaterialMode<'a, T>,
    pub sheen: &'a SheenParameters,
    pub dust: bool,
}

/// Outcome of one binding sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindReport {
    /// Uniform writes and texture bindings the program accepted.
    pub sent: usize,
    /// Bindings the program rejected and that were skipped.
    pub skipped: Vec<BindingError>,
}

impl BindReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Sends draw descriptions to a program.
///
/// A rejected binding means the program and the host disagree about the
/// uniform surface. In strict mode the first one aborts the sequence;
/// otherwise it is logged at error level, skipped and listed in the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialBinder {
    strict: bool,
}

impl MaterialBinder {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn bind<P>(
        &self,
        program: &mut P,
        draw: &DrawDescription<'_, P::Texture>,
        ltc: &LtcSet<P::Texture>,
    ) -> Result<BindReport, BindingError>
    where
        P: UniformTarget + ?Sized,
    {
        let mut session = Session {
            strict: self.strict,
            report: BindReport::default(),
        };

        let light = draw.light;
        session.send(program.set_float("mainLight.intensity", light.intensity()))?;
        session.send(program.set_vec3("mainLight.color", light.color()))?;
        for (name, point) in LIGHT_POINT_NAMES.iter().zip(light.points()) {
            session.send(program.set_vec3(name, *point))?;
        }

        session.send(program.set_bool("useAlt", draw.material.use_alt()))?;
        match &draw.material {
            MaterialMode::Override(material) => {
                session.send(program.set_vec3("materialalt.diffuse", material.diffuse))?;
                session.send(program.set_vec3("materialalt.normalmap", material.normal))?;
                session.send(program.set_vec3("materialalt.specular", material.specular))?;
                session.send(program.set_float("materialalt.roughness", material.roughness))?;
                session.send(program.set_float("material.roughness", material.roughness))?;
            }
            MaterialMode::Textured(material) => {
                session.send(program.set_float("material.roughness", material.roughness))?;
                session.send(program.set_float("material.specular_mult", material.specular_mult))?;
            }
        }

        let sheen = draw.sheen;
        session.send(program.set_float("alpha", sheen.alpha()))?;
        session.send(program.set_float("beta", sheen.beta()))?;
        session.send(program.set_float("Csheen", sheen.csheen()))?;
        session.send(program.set_int("sheenType", sheen.model().shader_value()))?;
        session.send(program.set_bool("dust", draw.dust))?;

        for table in ltc.iter() {
            session.send(table.bind(program))?;
        }

        if let MaterialMode::Textured(material) = &draw.material {
            for map in material.textures.iter() {
                session.send(program.bind_texture(
                    map.slot.sampler_name(),
                    map.slot.index(),
                    &map.texture,
                ))?;
            }
        }

        Ok(session.report)
    }
}

struct Session {
    strict: bool,
    report: BindReport,
}

impl Session {
    fn send(&mut self, result: Result<(), BindingError>) -> Result<(), BindingError> {
        match result {
            Ok(()) => {
                self.report.sent += 1;
                Ok(())
            }
            Err(err) if self.strict => Err(err),
            Err(err) => {
                log::error!("Skipping binding: {err}");
                self.report.skipped.push(err);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;
    use crate::config::ShadingConfig;
    use crate::gfx::binding::recording::{
        ltc_set, material_textures, RecordedValue, RecordingTarget,
    };
    use crate::gfx::resources::material::{ShadingParameters, SheenModel};
    use crate::gfx::resources::slots::TextureSlot;

    fn shading() -> ShadingParameters {
        ShadingParameters::from_config(&ShadingConfig::default()).unwrap()
    }

    /// Accepts nothing but `mainLight.*`, like a program built from an
    /// older shader revision.
    struct PartialProgram(RecordingTarget);

    impl UniformTarget for PartialProgram {
        type Texture = u32;

        fn set_float(&mut self, name: &str, value: f32) -> Result<(), BindingError> {
            if !name.starts_with("mainLight.") {
                return Err(BindingError::UnknownUniform(name.to_string()));
            }
            self.0.set_float(name, value)
        }
        fn set_int(&mut self, name: &str, _value: i32) -> Result<(), BindingError> {
            Err(BindingError::UnknownUniform(name.to_string()))
        }
        fn set_bool(&mut self, name: &str, _value: bool) -> Result<(), BindingError> {
            Err(BindingError::UnknownUniform(name.to_string()))
        }
        fn set_vec3(&mut self, name: &str, value: Vector3<f32>) -> Result<(), BindingError> {
            if !name.starts_with("mainLight.") {
                return Err(BindingError::UnknownUniform(name.to_string()));
            }
            self.0.set_vec3(name, value)
        }
        fn bind_texture(&mut self, name: &str, slot: u32, texture: &u32) -> Result<(), BindingError> {
            self.0.bind_texture(name, slot, texture)
        }
        fn unbind_texture(&mut self, slot: u32) -> Result<(), BindingError> {
            self.0.unbind_texture(slot)
        }
    }

    #[test]
    fn test_override_mode_reads_flat_fields() {
        let shading = shading();
        let ltc = ltc_set();
        let draw = DrawDescription::<u32> {
            light: &shading.light,
            material: MaterialMode::Override(OverrideMaterial::uniform(0.2, 0.3, 0.01)),
            sheen: &shading.sheen,
            dust: false,
        };
        let mut program = RecordingTarget::new();

        let report = MaterialBinder::new(true).bind(&mut program, &draw, &ltc).unwrap();

        assert!(report.is_complete());
        assert_eq!(
            program.uniform_names(),
            vec![
                "mainLight.intensity",
                "mainLight.color",
                "mainLight.points[0]",
                "mainLight.points[1]",
                "mainLight.points[2]",
                "mainLight.points[3]",
                "useAlt",
                "materialalt.diffuse",
                "materialalt.normalmap",
                "materialalt.specular",
                "materialalt.roughness",
                "material.roughness",
                "alpha",
                "beta",
                "Csheen",
                "sheenType",
                "dust",
            ]
        );
        assert_eq!(program.value_of("useAlt"), Some(&RecordedValue::Bool(true)));
        assert_eq!(
            program.value_of("materialalt.diffuse"),
            Some(&RecordedValue::Vec3([0.2, 0.2, 0.2]))
        );
        // Only the lookup tables; material maps are never touched.
        assert_eq!(program.texture_slots(), vec![1, 2, 3]);
        assert_eq!(program.bound(TextureSlot::Diffuse), None);
        assert_eq!(report.sent, 17 + 3);
    }

    #[test]
    fn test_textured_mode_binds_maps() {
        let shading = shading();
        let ltc = ltc_set();
        let textures = material_textures(7);
        let draw = DrawDescription {
            light: &shading.light,
            material: MaterialMode::Textured(TexturedMaterial {
                roughness: 0.4,
                specular_mult: 0.3,
                textures: &textures,
            }),
            sheen: &shading.sheen,
            dust: true,
        };
        let mut program = RecordingTarget::new();

        let report = MaterialBinder::new(true).bind(&mut program, &draw, &ltc).unwrap();

        let names = program.uniform_names();
        assert!(names.iter().all(|n| !n.starts_with("materialalt.")));
        assert!(names.contains(&"material.specular_mult"));
        assert_eq!(program.value_of("useAlt"), Some(&RecordedValue::Bool(false)));
        assert_eq!(program.value_of("dust"), Some(&RecordedValue::Bool(true)));
        assert_eq!(
            program.value_of("material.roughness"),
            Some(&RecordedValue::Float(0.4))
        );
        assert_eq!(program.texture_slots(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(program.bound(TextureSlot::Diffuse), Some(7));
        assert_eq!(program.bound(TextureSlot::Specular), Some(9));
        assert_eq!(program.bound(TextureSlot::SheenCoeffs), Some(103));
        assert_eq!(report.sent, 14 + 6);
    }

    #[test]
    fn test_every_field_is_resent() {
        let mut shading = shading();
        let ltc = ltc_set();
        let mut program = RecordingTarget::new();
        let binder = MaterialBinder::default();

        for intensity in [10.0, 10.0, 3.0] {
            shading.light.set_intensity(intensity).unwrap();
            let draw = DrawDescription::<u32> {
                light: &shading.light,
                material: MaterialMode::Override(OverrideMaterial::from_fabric(&shading.fabric)),
                sheen: &shading.sheen,
                dust: false,
            };
            binder.bind(&mut program, &draw, &ltc).unwrap();
        }

        let intensity_writes = program
            .uniform_names()
            .into_iter()
            .filter(|n| *n == "mainLight.intensity")
            .count();
        assert_eq!(intensity_writes, 3);
        assert_eq!(program.block().contents().light_intensity, 3.0);
    }

    #[test]
    fn test_sheen_values_pass_unclamped() {
        let mut shading = shading();
        shading.sheen.set_beta(-9.0);
        shading.sheen.set_csheen(18.5).unwrap();
        shading.sheen.set_model(SheenModel::Zeltner);
        let ltc = ltc_set();
        let draw = DrawDescription::<u32> {
            light: &shading.light,
            material: MaterialMode::Override(OverrideMaterial::from_fabric(&shading.fabric)),
            sheen: &shading.sheen,
            dust: false,
        };
        let mut program = RecordingTarget::new();

        MaterialBinder::new(true).bind(&mut program, &draw, &ltc).unwrap();

        let c = program.block().contents();
        assert_eq!(c.beta, -9.0);
        assert_eq!(c.csheen, 18.5);
        assert_eq!(c.sheen_type, 1);
    }

    #[test]
    fn test_strict_mode_stops_at_first_unknown_uniform() {
        let shading = shading();
        let ltc = ltc_set();
        let draw = DrawDescription::<u32> {
            light: &shading.light,
            material: MaterialMode::Override(OverrideMaterial::from_fabric(&shading.fabric)),
            sheen: &shading.sheen,
            dust: false,
        };
        let mut program = PartialProgram(RecordingTarget::new());

        let err = MaterialBinder::new(true)
            .bind(&mut program, &draw, &ltc)
            .unwrap_err();

        assert_eq!(err, BindingError::UnknownUniform("useAlt".to_string()));
        assert!(program.0.texture_slots().is_empty());
    }

    #[test]
    fn test_lenient_mode_skips_and_reports() {
        let shading = shading();
        let ltc = ltc_set();
        let draw = DrawDescription::<u32> {
            light: &shading.light,
            material: MaterialMode::Override(OverrideMaterial::from_fabric(&shading.fabric)),
            sheen: &shading.sheen,
            dust: false,
        };
        let mut program = PartialProgram(RecordingTarget::new());

        let report = MaterialBinder::new(false)
            .bind(&mut program, &draw, &ltc)
            .unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.skipped.len(), 11);
        assert_eq!(report.sent, 6 + 3);
        assert_eq!(
            report.skipped[0],
            BindingError::UnknownUniform("useAlt".to_string())
        );
        assert_eq!(program.0.texture_slots(), vec![1, 2, 3]);
    }
}
