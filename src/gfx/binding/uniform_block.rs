//! Host mirror of the shading program's uniform block
//!
//! [`ShadingUniforms`] matches `MaterialUniforms` in `ltc.wgsl` byte for byte.
//! [`UniformBlock`] maps the program's uniform names onto its fields and
//! rejects names the program does not declare.

use cgmath::Vector3;

use crate::error::BindingError;

/// MUST match `MaterialUniforms` in `ltc.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadingUniforms {
    pub light_points: [[f32; 4]; 4],
    pub light_color: [f32; 3],
    pub light_intensity: f32,
    pub alt_diffuse: [f32; 3],
    pub alt_roughness: f32,
    pub alt_normalmap: [f32; 3],
    pub roughness: f32,
    pub alt_specular: [f32; 3],
    pub specular_mult: f32,
    pub alpha: f32,
    pub beta: f32,
    pub csheen: f32,
    pub sheen_type: i32,
    pub use_alt: u32,
    pub dust: u32,
    _padding: [u32; 2],
}
// 64 + 16 * 4 + 4 * 4 + 4 * 2 + 8 = 160 bytes

impl Default for ShadingUniforms {
    fn default() -> Self {
        let mut uniforms: Self = bytemuck::Zeroable::zeroed();
        for point in &mut uniforms.light_points {
            point[3] = 1.0;
        }
        uniforms
    }
}

/// A mutable reference to one named field.
pub enum UniformField<'a> {
    Float(&'a mut f32),
    Int(&'a mut i32),
    Bool(&'a mut u32),
    Vec3(&'a mut [f32; 3]),
}

impl UniformField<'_> {
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformField::Float(_) => "float",
            UniformField::Int(_) => "int",
            UniformField::Bool(_) => "bool",
            UniformField::Vec3(_) => "vec3",
        }
    }
}

/// Named access to [`ShadingUniforms`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBlock {
    contents: ShadingUniforms,
}

impl UniformBlock {
    /// Every value uniform the program declares. Samplers are addressed by
    /// slot instead.
    pub const NAMES: [&'static str; 18] = [
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
        "material.specular_mult",
        "alpha",
        "beta",
        "Csheen",
        "sheenType",
        "dust",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &ShadingUniforms {
        &self.contents
    }

    pub fn field_mut(&mut self, name: &str) -> Option<UniformField<'_>> {
        let c = &mut self.contents;
        let field = match name {
            "mainLight.intensity" => UniformField::Float(&mut c.light_intensity),
            "mainLight.color" => UniformField::Vec3(&mut c.light_color),
            "useAlt" => UniformField::Bool(&mut c.use_alt),
            "materialalt.diffuse" => UniformField::Vec3(&mut c.alt_diffuse),
            "materialalt.normalmap" => UniformField::Vec3(&mut c.alt_normalmap),
            "materialalt.specular" => UniformField::Vec3(&mut c.alt_specular),
            "materialalt.roughness" => UniformField::Float(&mut c.alt_roughness),
            "material.roughness" => UniformField::Float(&mut c.roughness),
            "material.specular_mult" => UniformField::Float(&mut c.specular_mult),
            "alpha" => UniformField::Float(&mut c.alpha),
            "beta" => UniformField::Float(&mut c.beta),
            "Csheen" => UniformField::Float(&mut c.csheen),
            "sheenType" => UniformField::Int(&mut c.sheen_type),
            "dust" => UniformField::Bool(&mut c.dust),
            _ => {
                let index = name
                    .strip_prefix("mainLight.points[")?
                    .strip_suffix(']')?
                    .parse::<usize>()
                    .ok()?;
                let point = c.light_points.get_mut(index)?;
                let xyz: &mut [f32; 3] = (&mut point[..3]).try_into().ok()?;
                UniformField::Vec3(xyz)
            }
        };
        Some(field)
    }

    fn field_or_err(&mut self, name: &str) -> Result<UniformField<'_>, BindingError> {
        self.field_mut(name)
            .ok_or_else(|| BindingError::UnknownUniform(name.to_string()))
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), BindingError> {
        match self.field_or_err(name)? {
            UniformField::Float(slot) => {
                *slot = value;
                Ok(())
            }
            other => Err(mismatch(name, &other, "float")),
        }
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), BindingError> {
        match self.field_or_err(name)? {
            UniformField::Int(slot) => {
                *slot = value;
                Ok(())
            }
            other => Err(mismatch(name, &other, "int")),
        }
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), BindingError> {
        match self.field_or_err(name)? {
            UniformField::Bool(slot) => {
                *slot = u32::from(value);
                Ok(())
            }
            other => Err(mismatch(name, &other, "bool")),
        }
    }

    pub fn set_vec3(&mut self, name: &str, value: Vector3<f32>) -> Result<(), BindingError> {
        match self.field_or_err(name)? {
            UniformField::Vec3(slot) => {
                *slot = value.into();
                Ok(())
            }
            other => Err(mismatch(name, &other, "vec3")),
        }
    }
}

fn mismatch(name: &str, field: &UniformField<'_>, found: &'static str) -> BindingError {
    BindingError::TypeMismatch {
        name: name.to_string(),
        expected: field.type_name(),
        found,
    }
}
