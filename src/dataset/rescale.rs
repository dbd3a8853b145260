//! Conversion of source pixel values to the 8-bit payload format.
//!
//! Sources hand over pixels on the 0..=255 scale in whatever element type
//! they were stored as. Each value is computed as `x / 255 * 255`, rounded and
//! clamped, then cast to `u8`. 8-bit input passes through untouched.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    U8,
    F32,
    F64,
}

impl SourceFormat {
    pub fn bytes_per_element(&self) -> usize {
        match self {
            SourceFormat::U8 => 1,
            SourceFormat::F32 => 4,
            SourceFormat::F64 => 8,
        }
    }

    /// Maps the data type byte of a real IDX magic number.
    pub fn from_idx_code(code: u8) -> Option<SourceFormat> {
        match code {
            0x08 => Some(SourceFormat::U8),
            0x0D => Some(SourceFormat::F32),
            0x0E => Some(SourceFormat::F64),
            _ => None,
        }
    }

    pub fn idx_code(&self) -> u8 {
        match self {
            SourceFormat::U8 => 0x08,
            SourceFormat::F32 => 0x0D,
            SourceFormat::F64 => 0x0E,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

pub fn rescale(pixels: PixelData) -> Vec<u8> {
    match pixels {
        PixelData::U8(data) => data,
        PixelData::F32(data) => data.into_iter().map(|x| rescale_value(x as f64)).collect(),
        PixelData::F64(data) => data.into_iter().map(rescale_value).collect(),
    }
}

// NaN casts to 0
fn rescale_value(x: f64) -> u8 {
    (x / 255.0 * 255.0).round().clamp(0.0, 255.0) as u8
}
