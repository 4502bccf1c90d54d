//! Ordered palette with nearest-color matching.

use super::color::PaletteColor;
use crate::error::TransformError;

/// Largest palette addressable with a one-byte index.
pub const MAX_PALETTE_SIZE: usize = 256;

/// An ordered list of 1 to 256 colors.
///
/// The position of a color is the index written to the output for pixels
/// mapped to it. Duplicates are allowed; the first occurrence always wins,
/// so later copies are never emitted.
///
/// # Example
///
/// ```
/// use art_pipeline::{Palette, PaletteColor};
///
/// let palette = Palette::new(vec![
///     PaletteColor::new(0, 0, 0),
///     PaletteColor::new(255, 255, 255),
/// ]).unwrap();
///
/// assert_eq!(palette.nearest([200, 200, 200]), 1);
/// assert_eq!(palette.to_flat_channels(), vec![0, 0, 0, 255, 255, 255]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Palette {
    colors: Vec<PaletteColor>,
}

impl Palette {
    /// Create a palette, rejecting an empty list or more than 256 colors.
    pub fn new(colors: Vec<PaletteColor>) -> Result<Self, TransformError> {
        if colors.is_empty() {
            return Err(TransformError::invalid("palette cannot be empty"));
        }
        if colors.len() > MAX_PALETTE_SIZE {
            return Err(TransformError::invalid(format!(
                "palette has {} colors (max {MAX_PALETTE_SIZE})",
                colors.len()
            )));
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[PaletteColor] {
        &self.colors
    }

    pub fn get(&self, index: usize) -> Option<PaletteColor> {
        self.colors.get(index).copied()
    }

    /// Number of bits needed to address every entry.
    pub fn index_bits(&self) -> u32 {
        match self.colors.len() {
            0 | 1 => 1,
            n => usize::BITS - (n - 1).leading_zeros(),
        }
    }

    /// Flatten to `[r0, g0, b0, r1, g1, b1, ...]` in palette order.
    pub fn to_flat_channels(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.to_array()).collect()
    }

    /// Index of the entry closest to `rgb` by squared RGB distance.
    ///
    /// Strict comparison keeps the lowest index on ties.
    #[inline]
    pub fn nearest(&self, rgb: [i32; 3]) -> u8 {
        let mut best_index = 0usize;
        let mut best_distance = i32::MAX;
        for (index, color) in self.colors.iter().enumerate() {
            let distance = color.distance_sq(rgb);
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
                if distance == 0 {
                    break;
                }
            }
        }
        best_index as u8
    }
}
