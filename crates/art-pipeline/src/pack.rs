//! Sub-byte pixel packing.
//!
//! Display controllers take 1, 2, 4 or 8 bits per pixel. Packing squeezes a
//! one-byte-per-pixel stream into that density with the first pixel of every
//! group in the most significant bits:
//!
//! ```text
//! pixels_per_byte = 4, bits_per_pixel = 2
//!
//!   [0b11, 0b10, 0b01, 0b00]  ->  0b11_10_01_00
//! ```

use std::fmt;

use crate::error::TransformError;

/// How many pixels share one output byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelsPerByte {
    #[default]
    One,
    Two,
    Four,
    Eight,
}

impl PixelsPerByte {
    pub fn count(self) -> usize {
        match self {
            PixelsPerByte::One => 1,
            PixelsPerByte::Two => 2,
            PixelsPerByte::Four => 4,
            PixelsPerByte::Eight => 8,
        }
    }

    pub fn bits_per_pixel(self) -> u32 {
        8 / self.count() as u32
    }

    /// Largest value a single pixel slot can hold.
    pub fn max_value(self) -> u8 {
        (((1u16) << self.bits_per_pixel()) - 1) as u8
    }
}

impl TryFrom<u32> for PixelsPerByte {
    type Error = TransformError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PixelsPerByte::One),
            2 => Ok(PixelsPerByte::Two),
            4 => Ok(PixelsPerByte::Four),
            8 => Ok(PixelsPerByte::Eight),
            other => Err(TransformError::invalid(format!(
                "pixels_per_byte={other} is not one of 1, 2, 4, 8"
            ))),
        }
    }
}

impl fmt::Display for PixelsPerByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Pack one-byte pixel values into `pixels_per_byte` values per byte.
///
/// Each value is masked to its low `bits_per_pixel` bits, so an oversized
/// value can never spill into a neighbouring slot. A short final group is
/// right-padded with zero pixels.
pub fn pack(pixels: &[u8], pixels_per_byte: PixelsPerByte) -> Vec<u8> {
    if pixels_per_byte == PixelsPerByte::One {
        return pixels.to_vec();
    }

    let count = pixels_per_byte.count();
    let bits = pixels_per_byte.bits_per_pixel();
    let mask = pixels_per_byte.max_value();

    pixels
        .chunks(count)
        .map(|chunk| {
            chunk.iter().enumerate().fold(0u8, |byte, (i, &value)| {
                byte | ((value & mask) << ((count - 1 - i) as u32 * bits))
            })
        })
        .collect()
}
