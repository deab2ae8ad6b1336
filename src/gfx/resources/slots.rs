//! Texture slot assignment
//!
//! Every sampler the shading program reads lives at a fixed slot. The slot
//! index doubles as the binding index inside the material bind group, so the
//! table below is the only place slot numbers are written down.

use crate::error::BindingError;

/// Slot 0 holds the material uniform block and is never given to a texture.
pub const RESERVED_SLOT: u32 = 0;

/// Binding index of the sampler shared by the material textures.
pub const MATERIAL_SAMPLER_BINDING: u32 = 7;

/// A named texture slot of the shading program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Ltc1,
    Ltc2,
    SheenCoeffs,
    Diffuse,
    NormalMap,
    Specular,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 6] = [
        TextureSlot::Ltc1,
        TextureSlot::Ltc2,
        TextureSlot::SheenCoeffs,
        TextureSlot::Diffuse,
        TextureSlot::NormalMap,
        TextureSlot::Specular,
    ];

    /// Number of slots including the reserved one.
    pub const COUNT: usize = Self::ALL.len() + 1;

    pub const fn index(self) -> u32 {
        match self {
            TextureSlot::Ltc1 => 1,
            TextureSlot::Ltc2 => 2,
            TextureSlot::SheenCoeffs => 3,
            TextureSlot::Diffuse => 4,
            TextureSlot::NormalMap => 5,
            TextureSlot::Specular => 6,
        }
    }

    /// Sampler name the shading program uses for this slot.
    pub const fn sampler_name(self) -> &'static str {
        match self {
            TextureSlot::Ltc1 => "LTC1",
            TextureSlot::Ltc2 => "LTC2",
            TextureSlot::SheenCoeffs => "SHEENCOEFFS",
            TextureSlot::Diffuse => "material.diffuse",
            TextureSlot::NormalMap => "material.normalmap",
            TextureSlot::Specular => "material.specular",
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.index() == index)
    }

    pub fn from_sampler_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.sampler_name() == name)
    }

    /// Checks that sampler `name` lives in `slot`.
    pub fn resolve(name: &str, slot: u32) -> Result<Self, BindingError> {
        let expected = Self::from_sampler_name(name)
            .ok_or_else(|| BindingError::UnknownUniform(name.to_string()))?;
        if Self::from_index(slot).is_none() {
            return Err(BindingError::SlotOutOfRange(slot));
        }
        if expected.index() != slot {
            return Err(BindingError::SlotMismatch {
                name: name.to_string(),
                expected: expected.index(),
                found: slot,
            });
        }
        Ok(expected)
    }

    /// Lookup tables hold raw floats and are sampled without filtering.
    pub const fn is_lookup_table(self) -> bool {
        matches!(
            self,
            TextureSlot::Ltc1 | TextureSlot::Ltc2 | TextureSlot::SheenCoeffs
        )
    }
}
