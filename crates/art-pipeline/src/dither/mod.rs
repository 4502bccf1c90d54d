//! Palette quantization with error diffusion.
//!
//! Each pixel (plus the error pushed onto it by earlier pixels) is clamped to
//! 0-255, mapped to its nearest palette entry, and the remaining difference
//! is handed to unvisited neighbours. All arithmetic is integer, so the same
//! input always yields the same indices.

mod kernel;

pub use kernel::{Kernel, ATKINSON, FLOYD_STEINBERG};

use std::fmt;
use std::str::FromStr;

use image::RgbImage;

use crate::error::TransformError;
use crate::palette::Palette;

/// How quantization error is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dither {
    /// Floyd-Steinberg error diffusion.
    #[default]
    FloydSteinberg,
    /// Atkinson error diffusion; drops a quarter of the error, which keeps
    /// small palettes crisper.
    Atkinson,
    /// Plain nearest-color mapping, error discarded.
    Nearest,
}

impl Dither {
    /// Kernel used for diffusion, `None` when error is discarded.
    pub fn kernel(self) -> Option<&'static Kernel> {
        match self {
            Dither::FloydSteinberg => Some(&FLOYD_STEINBERG),
            Dither::Atkinson => Some(&ATKINSON),
            Dither::Nearest => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dither::FloydSteinberg => "floyd-steinberg",
            Dither::Atkinson => "atkinson",
            Dither::Nearest => "none",
        }
    }
}

impl fmt::Display for Dither {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dither {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "floyd-steinberg" | "floyd_steinberg" | "floydsteinberg" => Ok(Dither::FloydSteinberg),
            "atkinson" => Ok(Dither::Atkinson),
            "none" | "nearest" => Ok(Dither::Nearest),
            other => Err(TransformError::invalid(format!(
                "unknown dither mode '{other}' (expected floyd-steinberg, atkinson or none)"
            ))),
        }
    }
}

/// Sliding window of pending error rows.
///
/// Only the rows the kernel can reach are stored, so memory is
/// `width * (max_dy + 1)` regardless of image height.
#[derive(Debug)]
struct ErrorBuffer {
    /// rows[0] is the current row, rows[1] the next, and so on
    rows: Vec<Vec<[i32; 3]>>,
    width: usize,
}

impl ErrorBuffer {
    fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth).map(|_| vec![[0; 3]; width]).collect(),
            width,
        }
    }

    #[inline]
    fn get_accumulated(&self, x: usize) -> [i32; 3] {
        self.rows[0][x]
    }

    /// Silently ignores out-of-bounds targets.
    #[inline]
    fn add_error(&mut self, x: i64, row_offset: usize, error: [i32; 3]) {
        if x < 0 || x as usize >= self.width || row_offset >= self.rows.len() {
            return;
        }
        let cell = &mut self.rows[row_offset][x as usize];
        for c in 0..3 {
            cell[c] += error[c];
        }
    }

    fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill([0; 3]);
        }
    }
}

/// Map every pixel of `image` to a palette index, row-major.
pub fn quantize(image: &RgbImage, palette: &Palette, dither: Dither) -> Vec<u8> {
    let width = image.width() as usize;
    let mut indices = Vec::with_capacity(width * image.height() as usize);

    let Some(kernel) = dither.kernel() else {
        indices.extend(
            image
                .pixels()
                .map(|p| palette.nearest([p[0] as i32, p[1] as i32, p[2] as i32])),
        );
        return indices;
    };

    let colors = palette.colors();
    let mut errors = ErrorBuffer::new(width, kernel.max_dy + 1);

    for row in image.rows() {
        for (x, pixel) in row.enumerate() {
            let pending = errors.get_accumulated(x);
            let value = [
                (pixel[0] as i32 + pending[0]).clamp(0, 255),
                (pixel[1] as i32 + pending[1]).clamp(0, 255),
                (pixel[2] as i32 + pending[2]).clamp(0, 255),
            ];

            let index = palette.nearest(value);
            indices.push(index);

            let chosen = colors[index as usize].to_array();
            let error = [
                value[0] - chosen[0] as i32,
                value[1] - chosen[1] as i32,
                value[2] - chosen[2] as i32,
            ];
            if error == [0; 3] {
                continue;
            }

            for &(dx, dy, weight) in kernel.entries {
                let share = [
                    error[0] * weight / kernel.divisor,
                    error[1] * weight / kernel.divisor,
                    error[2] * weight / kernel.divisor,
                ];
                errors.add_error(x as i64 + dx as i64, dy, share);
            }
        }
        errors.advance_row();
    }

    indices
}
