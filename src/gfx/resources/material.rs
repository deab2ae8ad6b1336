//! Light and material parameters
//!
//! Plain data describing the area light, the fabric sheen lobe and the two
//! material paths a draw can take. Nothing here touches the device; the
//! binding protocol turns these values into uniform writes.

use cgmath::{InnerSpace, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::ShadingConfig;
use crate::error::{AppError, LightError, SheenError};

use super::slots::TextureSlot;

/// Corner distance from the light plane tolerated per unit of quad size.
pub const COPLANAR_TOLERANCE: f32 = 1.0e-3;

/// A planar quad light. The corner winding selects the lit side.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaLight {
    intensity: f32,
    color: Vector3<f32>,
    points: [Vector3<f32>; 4],
}

impl AreaLight {
    pub fn new(
        intensity: f32,
        color: Vector3<f32>,
        points: [Vector3<f32>; 4],
    ) -> Result<Self, LightError> {
        check_intensity(intensity)?;
        check_quad(&points)?;
        Ok(Self {
            intensity,
            color,
            points,
        })
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) -> Result<(), LightError> {
        check_intensity(intensity)?;
        self.intensity = intensity;
        Ok(())
    }

    pub fn color(&self) -> Vector3<f32> {
        self.color
    }

    pub fn set_color(&mut self, color: Vector3<f32>) {
        self.color = color;
    }

    pub fn points(&self) -> &[Vector3<f32>; 4] {
        &self.points
    }

    pub fn set_points(&mut self, points: [Vector3<f32>; 4]) -> Result<(), LightError> {
        check_quad(&points)?;
        self.points = points;
        Ok(())
    }

    /// Unit normal of the lit side, following the corner winding.
    pub fn normal(&self) -> Vector3<f32> {
        quad_normal(&self.points).normalize()
    }
}

fn check_intensity(intensity: f32) -> Result<(), LightError> {
    if intensity >= 0.0 {
        Ok(())
    } else {
        Err(LightError::NegativeIntensity(intensity))
    }
}

fn quad_normal(points: &[Vector3<f32>; 4]) -> Vector3<f32> {
    (points[2] - points[0]).cross(points[3] - points[1])
}

fn check_quad(points: &[Vector3<f32>; 4]) -> Result<(), LightError> {
    let normal = quad_normal(points);
    let extent = (points[2] - points[0])
        .magnitude()
        .max((points[3] - points[1]).magnitude());
    if extent <= f32::EPSILON || normal.magnitude() <= f32::EPSILON * extent * extent {
        return Err(LightError::DegenerateQuad);
    }

    let normal = normal.normalize();
    let centroid = (points[0] + points[1] + points[2] + points[3]) / 4.0;
    let distance = points
        .iter()
        .map(|p| (*p - centroid).dot(normal).abs())
        .fold(0.0f32, f32::max);
    if distance > COPLANAR_TOLERANCE * extent {
        return Err(LightError::NotCoplanar(distance));
    }
    Ok(())
}

/// Sheen lobe evaluated by the fragment stage. The discriminant is the value
/// the shader switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheenModel {
    None = 0,
    Zeltner = 1,
    CosineBased = 2,
}

impl SheenModel {
    pub const ALL: [SheenModel; 3] = [SheenModel::Zeltner, SheenModel::CosineBased, SheenModel::None];

    pub fn shader_value(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            SheenModel::None => "None",
            SheenModel::Zeltner => "Zeltner",
            SheenModel::CosineBased => "Cosine-based",
        }
    }
}

/// Shaping terms of the sheen lobe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheenParameters {
    alpha: f32,
    beta: f32,
    csheen: f32,
    model: SheenModel,
}

impl SheenParameters {
    pub fn new(alpha: f32, beta: f32, csheen: f32, model: SheenModel) -> Result<Self, SheenError> {
        let mut params = Self {
            alpha: 0.0,
            beta,
            csheen: 0.0,
            model,
        };
        params.set_alpha(alpha)?;
        params.set_csheen(csheen)?;
        Ok(params)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) -> Result<(), SheenError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(SheenError::AlphaOutOfRange(alpha));
        }
        self.alpha = alpha;
        Ok(())
    }

    pub fn beta(&self) -> f32 {
        self.beta
    }

    pub fn set_beta(&mut self, beta: f32) {
        self.beta = beta;
    }

    /// Sheen colour multiplier.
    pub fn csheen(&self) -> f32 {
        self.csheen
    }

    pub fn set_csheen(&mut self, csheen: f32) -> Result<(), SheenError> {
        if csheen < 0.0 {
            return Err(SheenError::NegativeMultiplier(csheen));
        }
        self.csheen = csheen;
        Ok(())
    }

    pub fn model(&self) -> SheenModel {
        self.model
    }

    pub fn set_model(&mut self, model: SheenModel) {
        self.model = model;
    }
}

/// User-tunable fabric appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FabricParameters {
    pub color: Vector3<f32>,
    pub roughness: f32,
    pub specular: f32,
}

/// Flat material used by the override path: constant colours, a constant
/// tangent-space normal and no texture sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideMaterial {
    pub diffuse: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub roughness: f32,
}

impl OverrideMaterial {
    pub const FLAT_NORMAL: Vector3<f32> = Vector3::new(0.0, 0.0, 1.0);

    /// A grey material with equal diffuse and specular channels.
    pub fn uniform(diffuse: f32, specular: f32, roughness: f32) -> Self {
        Self {
            diffuse: Vector3::new(diffuse, diffuse, diffuse),
            normal: Self::FLAT_NORMAL,
            specular: Vector3::new(specular, specular, specular),
            roughness,
        }
    }

    pub fn from_fabric(fabric: &FabricParameters) -> Self {
        Self {
            diffuse: fabric.color,
            normal: Self::FLAT_NORMAL,
            specular: Vector3::new(fabric.specular, fabric.specular, fabric.specular),
            roughness: fabric.roughness,
        }
    }
}

/// A decoded image assigned to one of the material slots.
#[derive(Debug)]
pub struct MaterialTexture<T> {
    pub name: String,
    pub slot: TextureSlot,
    pub texture: T,
}

/// Diffuse, normal and specular maps of one textured object.
#[derive(Debug)]
pub struct MaterialTextures<T> {
    pub diffuse: MaterialTexture<T>,
    pub normal: MaterialTexture<T>,
    pub specular: MaterialTexture<T>,
}

impl<T> MaterialTextures<T> {
    pub fn iter(&self) -> impl Iterator<Item = &MaterialTexture<T>> {
        [&self.diffuse, &self.normal, &self.specular].into_iter()
    }

    pub fn into_textures(self) -> [T; 3] {
        [self.diffuse.texture, self.normal.texture, self.specular.texture]
    }
}

/// Light, fabric and sheen state edited by the parameters panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingParameters {
    pub light: AreaLight,
    pub fabric: FabricParameters,
    pub sheen: SheenParameters,
}

impl ShadingParameters {
    pub fn from_config(config: &ShadingConfig) -> Result<Self, AppError> {
        let light = AreaLight::new(
            config.light_intensity,
            Vector3::from(config.light_color),
            config.light_points.map(Vector3::from),
        )?;
        let sheen = SheenParameters::new(
            config.sheen_alpha,
            config.sheen_beta,
            config.sheen_multiplier,
            config.sheen_model,
        )?;
        Ok(Self {
            light,
            fabric: FabricParameters {
                color: Vector3::from(config.fabric_color),
                roughness: config.fabric_roughness,
                specular: config.fabric_specular,
            },
            sheen,
        })
    }
}
