//! # Area-light lookup tables
//!
//! Linearly transformed cosines turn the integral of a BRDF lobe over a
//! polygonal light into an integral of a clamped cosine, using a fitted
//! 3x3 transform indexed by view angle and roughness. Three fitted tables
//! are used:
//!
//! - `LTC1`: inverse transform matrix coefficients, 64x64 RGBA
//! - `LTC2`: norm, Fresnel terms and sphere form factor, 64x64 RGBA
//! - `SHEENCOEFFS`: sheen lobe coefficients, 32x32 RGB
//!
//! The numbers are a published artifact and are never recomputed here. They
//! ship as little-endian `f32` files produced by the `ltc-pack` tool, are
//! checked against the expected size on load and uploaded once at startup.

use std::path::Path;

use crate::error::{BindingError, LtcError};
use crate::gfx::binding::UniformTarget;

use super::slots::{TextureSlot, RESERVED_SLOT};

/// Which fitted table a texture holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LtcTableKind {
    Matrix,
    Amplitude,
    Sheen,
}

impl LtcTableKind {
    pub const ALL: [LtcTableKind; 3] = [
        LtcTableKind::Matrix,
        LtcTableKind::Amplitude,
        LtcTableKind::Sheen,
    ];

    /// Edge length of the square table.
    pub const fn size(self) -> u32 {
        match self {
            LtcTableKind::Matrix | LtcTableKind::Amplitude => 64,
            LtcTableKind::Sheen => 32,
        }
    }

    /// Floats per texel in the shipped data.
    pub const fn channels(self) -> usize {
        match self {
            LtcTableKind::Matrix | LtcTableKind::Amplitude => 4,
            LtcTableKind::Sheen => 3,
        }
    }

    pub const fn float_count(self) -> usize {
        (self.size() * self.size()) as usize * self.channels()
    }

    /// The slot this table is bound to by default.
    pub const fn slot(self) -> TextureSlot {
        match self {
            LtcTableKind::Matrix => TextureSlot::Ltc1,
            LtcTableKind::Amplitude => TextureSlot::Ltc2,
            LtcTableKind::Sheen => TextureSlot::SheenCoeffs,
        }
    }

    pub const fn sampler_name(self) -> &'static str {
        self.slot().sampler_name()
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            LtcTableKind::Matrix => "ltc_1.bin",
            LtcTableKind::Amplitude => "ltc_2.bin",
            LtcTableKind::Sheen => "ltc_sheen.bin",
        }
    }

    /// Name of the C array the table is published under.
    pub const fn header_array(self) -> &'static str {
        match self {
            LtcTableKind::Matrix => "mat_ltc_1",
            LtcTableKind::Amplitude => "mat_ltc_2",
            LtcTableKind::Sheen => "mat_ltc_sheen",
        }
    }
}

/// One fitted table held in host memory.
#[derive(Debug, Clone, PartialEq)]
pub struct LtcTable {
    kind: LtcTableKind,
    data: Vec<f32>,
}

impl LtcTable {
    pub fn from_f32(kind: LtcTableKind, data: Vec<f32>) -> Result<Self, LtcError> {
        if data.len() != kind.float_count() {
            return Err(LtcError::SizeMismatch {
                kind,
                expected: kind.float_count(),
                actual: data.len(),
            });
        }
        Ok(Self { kind, data })
    }

    /// Decodes little-endian `f32`s without touching their bit patterns.
    pub fn from_le_bytes(kind: LtcTableKind, bytes: &[u8]) -> Result<Self, LtcError> {
        if bytes.len() % 4 != 0 {
            return Err(LtcError::SizeMismatch {
                kind,
                expected: kind.float_count(),
                actual: bytes.len() / 4,
            });
        }
        let data = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Self::from_f32(kind, data)
    }

    /// Loads `dir/<kind file name>`.
    pub fn load(kind: LtcTableKind, dir: &Path) -> Result<Self, LtcError> {
        let path = dir.join(kind.file_name());
        let bytes = std::fs::read(&path).map_err(|source| LtcError::Io {
            path: path.clone(),
            source,
        })?;
        let table = Self::from_le_bytes(kind, &bytes)?;
        log::info!("Loaded {} lookup table from {}", kind.sampler_name(), path.display());
        Ok(table)
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|value| value.to_le_bytes()).collect()
    }

    pub fn kind(&self) -> LtcTableKind {
        self.kind
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Texel data widened to four channels, alpha 1 for three-channel tables.
    pub fn to_rgba(&self) -> Vec<f32> {
        match self.kind.channels() {
            4 => self.data.clone(),
            channels => self
                .data
                .chunks_exact(channels)
                .flat_map(|texel| {
                    let mut rgba = [0.0, 0.0, 0.0, 1.0];
                    rgba[..channels].copy_from_slice(texel);
                    rgba
                })
                .collect(),
        }
    }
}

/// Creates and destroys lookup textures on some device.
pub trait TableUploader {
    type Texture;

    fn upload_table(&mut self, table: &LtcTable, label: &str) -> Self::Texture;
    fn release(&mut self, texture: Self::Texture);
}

/// A lookup table resident on the device at a fixed texture slot.
#[derive(Debug)]
pub struct LtcTexture<T> {
    kind: LtcTableKind,
    slot: u32,
    texture: T,
}

impl<T> LtcTexture<T> {
    /// Uploads `table` and records `slot`.
    ///
    /// Slot 0 is reserved for the material uniform block; asking for it is a
    /// construction error.
    pub fn new<U>(uploader: &mut U, table: &LtcTable, slot: u32) -> Result<Self, LtcError>
    where
        U: TableUploader<Texture = T>,
    {
        if slot <= RESERVED_SLOT {
            return Err(LtcError::ReservedSlot(slot));
        }
        let texture = uploader.upload_table(table, table.kind().sampler_name());
        Ok(Self {
            kind: table.kind(),
            slot,
            texture,
        })
    }

    /// Attaches the texture to its slot under its sampler name.
    pub fn bind<P>(&self, program: &mut P) -> Result<(), BindingError>
    where
        P: UniformTarget<Texture = T> + ?Sized,
    {
        program.bind_texture(self.kind.sampler_name(), self.slot, &self.texture)
    }

    pub fn unbind<P>(&self, program: &mut P) -> Result<(), BindingError>
    where
        P: UniformTarget<Texture = T> + ?Sized,
    {
        program.unbind_texture(self.slot)
    }

    /// Releases the device texture. Consuming `self` makes a later bind
    /// impossible.
    pub fn remove<U>(self, uploader: &mut U)
    where
        U: TableUploader<Texture = T>,
    {
        log::debug!("Releasing {} lookup texture", self.kind.sampler_name());
        uploader.release(self.texture);
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn kind(&self) -> LtcTableKind {
        self.kind
    }

    pub fn texture(&self) -> &T {
        &self.texture
    }
}

/// The three lookup textures used by every draw.
#[derive(Debug)]
pub struct LtcSet<T> {
    pub matrix: LtcTexture<T>,
    pub amplitude: LtcTexture<T>,
    pub sheen: LtcTexture<T>,
}

impl<T> LtcSet<T> {
    /// Loads the three tables from `dir` and uploads them to their default slots.
    pub fn load<U>(uploader: &mut U, dir: &Path) -> Result<Self, LtcError>
    where
        U: TableUploader<Texture = T>,
    {
        let matrix = LtcTable::load(LtcTableKind::Matrix, dir)?;
        let amplitude = LtcTable::load(LtcTableKind::Amplitude, dir)?;
        let sheen = LtcTable::load(LtcTableKind::Sheen, dir)?;
        Self::from_tables(uploader, &matrix, &amplitude, &sheen)
    }

    pub fn from_tables<U>(
        uploader: &mut U,
        matrix: &LtcTable,
        amplitude: &LtcTable,
        sheen: &LtcTable,
    ) -> Result<Self, LtcError>
    where
        U: TableUploader<Texture = T>,
    {
        Ok(Self {
            matrix: LtcTexture::new(uploader, matrix, matrix.kind().slot().index())?,
            amplitude: LtcTexture::new(uploader, amplitude, amplitude.kind().slot().index())?,
            sheen: LtcTexture::new(uploader, sheen, sheen.kind().slot().index())?,
        })
    }

    /// Matrix, amplitude, sheen: the order the program expects them.
    pub fn iter(&self) -> impl Iterator<Item = &LtcTexture<T>> {
        [&self.matrix, &self.amplitude, &self.sheen].into_iter()
    }

    pub fn remove<U>(self, uploader: &mut U)
    where
        U: TableUploader<Texture = T>,
    {
        self.sheen.remove(uploader);
        self.amplitude.remove(uploader);
        self.matrix.remove(uploader);
    }
}

/// Extracts the numbers of the C array `name` from header source text.
///
/// Accepts declarations such as `static const float mat_ltc_1[64*64*4] = {...};`
/// with nested braces, comments and `f` suffixes. Each number is parsed as
/// written so the packed table is bit-identical to the published one.
pub fn parse_c_array(source: &str, name: &str) -> Result<Vec<f32>, LtcError> {
    let body =
        find_array_body(source, name).ok_or_else(|| LtcError::ArrayNotFound(name.to_string()))?;
    let body = strip_comments(body);

    body.split(|c: char| c == ',' || c == '{' || c == '}' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let digits = token.trim_end_matches(['f', 'F']);
            digits.parse::<f32>().map_err(|_| LtcError::InvalidNumber {
                array: name.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn find_array_body<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let mut search_from = 0;
    while let Some(offset) = source[search_from..].find(name) {
        let start = search_from + offset;
        let end = start + name.len();
        search_from = end;

        let starts_word = source[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_identifier_char(c));
        let rest = source[end..].trim_start();
        if !starts_word || !(rest.starts_with('[') || rest.starts_with('=')) {
            continue;
        }

        let open = end + source[end..].find('{')?;
        let declarator = &source[end..open];
        if !declarator.contains('=') || declarator.contains(';') {
            continue;
        }

        let mut depth = 0usize;
        for (i, c) in source[open..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&source[open + 1..open + i]);
                    }
                }
                _ => {}
            }
        }
        return None;
    }
    None
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let line = rest.find("//");
        let block = rest.find("/*");
        match (line, block) {
            (Some(l), b) if b.map_or(true, |b| l < b) => {
                out.push_str(&rest[..l]);
                rest = match rest[l..].find('\n') {
                    Some(nl) => &rest[l + nl..],
                    None => "",
                };
            }
            (_, Some(b)) => {
                out.push_str(&rest[..b]);
                rest = match rest[b + 2..].find("*/") {
                    Some(close) => &rest[b + 2 + close + 2..],
                    None => "",
                };
                out.push(' ');
            }
            _ => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::binding::recording::{RecordedCall, RecordingTarget};

    /// Hands out numbered fake textures and remembers releases.
    #[derive(Default)]
    struct FakeUploader {
        uploaded: Vec<(String, usize)>,
        released: Vec<u32>,
    }

    impl TableUploader for FakeUploader {
        type Texture = u32;

        fn upload_table(&mut self, table: &LtcTable, label: &str) -> u32 {
            self.uploaded.push((label.to_string(), table.to_rgba().len()));
            self.uploaded.len() as u32
        }

        fn release(&mut self, texture: u32) {
            self.released.push(texture);
        }
    }

    fn table(kind: LtcTableKind) -> LtcTable {
        let data = (0..kind.float_count()).map(|i| i as f32 * 0.5).collect();
        LtcTable::from_f32(kind, data).unwrap()
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(LtcTableKind::Matrix.float_count(), 64 * 64 * 4);
        assert_eq!(LtcTableKind::Amplitude.float_count(), 64 * 64 * 4);
        assert_eq!(LtcTableKind::Sheen.float_count(), 32 * 32 * 3);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let err = LtcTable::from_f32(LtcTableKind::Sheen, vec![0.0; 32 * 32 * 4]).unwrap_err();
        match err {
            LtcError::SizeMismatch {
                kind,
                expected,
                actual,
            } => {
                assert_eq!(kind, LtcTableKind::Sheen);
                assert_eq!(expected, 3072);
                assert_eq!(actual, 4096);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(LtcTable::from_le_bytes(LtcTableKind::Matrix, &[0u8; 7]).is_err());
    }

    #[test]
    fn test_le_bytes_preserve_bit_patterns() {
        let mut data = vec![0.0f32; LtcTableKind::Matrix.float_count()];
        data[0] = 1.0e-8;
        data[1] = -0.0;
        data[2] = 0.1;
        let original = LtcTable::from_f32(LtcTableKind::Matrix, data).unwrap();

        let decoded =
            LtcTable::from_le_bytes(LtcTableKind::Matrix, &original.to_le_bytes()).unwrap();
        let bits = |t: &LtcTable| t.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&original), bits(&decoded));
    }

    #[test]
    fn test_sheen_table_widened_to_rgba() {
        let sheen = table(LtcTableKind::Sheen);
        let rgba = sheen.to_rgba();

        assert_eq!(rgba.len(), 32 * 32 * 4);
        assert_eq!(&rgba[..8], &[0.0, 0.5, 1.0, 1.0, 1.5, 2.0, 2.5, 1.0]);

        let matrix = table(LtcTableKind::Matrix);
        assert_eq!(matrix.to_rgba(), matrix.data());
    }

    #[test]
    fn test_slot_zero_is_rejected() {
        let mut uploader = FakeUploader::default();
        let result = LtcTexture::new(&mut uploader, &table(LtcTableKind::Matrix), 0);

        assert!(matches!(result, Err(LtcError::ReservedSlot(0))));
        assert!(uploader.uploaded.is_empty());
    }

    #[test]
    fn test_slot_is_recorded_exactly() {
        let mut uploader = FakeUploader::default();
        for slot in [1, 2, 3, 9] {
            let texture =
                LtcTexture::new(&mut uploader, &table(LtcTableKind::Amplitude), slot).unwrap();
            assert_eq!(texture.slot(), slot);
            assert_eq!(texture.kind(), LtcTableKind::Amplitude);
        }
    }

    #[test]
    fn test_bind_uses_sampler_name_and_slot() {
        let mut uploader = FakeUploader::default();
        let ltc = LtcSet::from_tables(
            &mut uploader,
            &table(LtcTableKind::Matrix),
            &table(LtcTableKind::Amplitude),
            &table(LtcTableKind::Sheen),
        )
        .unwrap();
        let mut target = RecordingTarget::new();

        for texture in ltc.iter() {
            texture.bind(&mut target).unwrap();
        }
        ltc.sheen.unbind(&mut target).unwrap();

        assert_eq!(
            target.calls,
            vec![
                RecordedCall::Texture {
                    name: "LTC1".to_string(),
                    slot: 1,
                    texture: 1
                },
                RecordedCall::Texture {
                    name: "LTC2".to_string(),
                    slot: 2,
                    texture: 2
                },
                RecordedCall::Texture {
                    name: "SHEENCOEFFS".to_string(),
                    slot: 3,
                    texture: 3
                },
                RecordedCall::Unbind { slot: 3 },
            ]
        );
        assert_eq!(uploader.uploaded[2], ("SHEENCOEFFS".to_string(), 32 * 32 * 4));
    }

    #[test]
    fn test_remove_releases_in_reverse_order() {
        let mut uploader = FakeUploader::default();
        let ltc = LtcSet::from_tables(
            &mut uploader,
            &table(LtcTableKind::Matrix),
            &table(LtcTableKind::Amplitude),
            &table(LtcTableKind::Sheen),
        )
        .unwrap();

        ltc.remove(&mut uploader);
        assert_eq!(uploader.released, vec![3, 2, 1]);
    }

    #[test]
    fn test_parse_c_array() {
        let header = r#"
            // fitted data
            static const float other_table[2] = { 9.0f, 9.0f };
            static const float mat_ltc_sheen[2 * 3] = {
                1.0f, -2.5e-3f, /* inline */ 0.125,
                { 3, 4.f }, 5.5F
            };
        "#;

        let values = parse_c_array(header, "mat_ltc_sheen").unwrap();
        assert_eq!(values, vec![1.0, -2.5e-3, 0.125, 3.0, 4.0, 5.5]);
        assert_eq!(parse_c_array(header, "other_table").unwrap(), vec![9.0, 9.0]);
    }

    #[test]
    fn test_parse_c_array_errors() {
        let header = "const float mat_ltc_1[] = { 1.0, abc };";
        assert!(matches!(
            parse_c_array(header, "mat_ltc_2"),
            Err(LtcError::ArrayNotFound(_))
        ));
        match parse_c_array(header, "mat_ltc_1") {
            Err(LtcError::InvalidNumber { token, .. }) => assert_eq!(token, "abc"),
            other => panic!("unexpected result: {other:?}"),
        }
        // A prefix of another identifier is not a match.
        assert!(parse_c_array("float xmat_ltc_1[] = { 1 };", "mat_ltc_1").is_err());
    }
}
