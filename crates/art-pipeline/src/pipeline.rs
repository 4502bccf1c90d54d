//! Fixed-order transform: crop, resize, quantize, flatten, pack.

use std::borrow::Cow;

use image::DynamicImage;

use crate::dither::{quantize, Dither};
use crate::error::TransformError;
use crate::geometry::{crop_and_fit, Dimensions};
use crate::pack::{pack, PixelsPerByte};
use crate::palette::Palette;

/// Everything that decides the output bytes for a given source image.
///
/// Two equal option sets applied to the same image always produce equal
/// output, which is what makes this type usable inside a cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TransformOptions {
    pub dimensions: Option<Dimensions>,
    pub palette: Option<Palette>,
    pub pixels_per_byte: PixelsPerByte,
    /// Only consulted when a palette is set.
    pub dither: Dither,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn pixels_per_byte(mut self, pixels_per_byte: PixelsPerByte) -> Self {
        self.pixels_per_byte = pixels_per_byte;
        self
    }

    pub fn dither(mut self, dither: Dither) -> Self {
        self.dither = dither;
        self
    }
}

/// Run the full pipeline on one image.
///
/// Without a palette the flattened stream is the image's native sample
/// layout (e.g. three bytes per pixel for RGB8), which is then packed like
/// any other byte stream.
pub fn render(image: &DynamicImage, options: &TransformOptions) -> Result<Vec<u8>, TransformError> {
    let sized: Cow<'_, DynamicImage> = match options.dimensions {
        Some(target) => crop_and_fit(image, target)?,
        None => Cow::Borrowed(image),
    };

    let flat: Cow<'_, [u8]> = match &options.palette {
        Some(palette) => {
            tracing::debug!(
                colors = palette.len(),
                dither = %options.dither,
                "Dithering to palette"
            );
            let rgb = sized.to_rgb8();
            Cow::Owned(quantize(&rgb, palette, options.dither))
        }
        None => Cow::Borrowed(sized.as_bytes()),
    };

    let packed = pack(&flat, options.pixels_per_byte);
    tracing::debug!(
        width = sized.width(),
        height = sized.height(),
        pixels_per_byte = %options.pixels_per_byte,
        bytes = packed.len(),
        "Transform complete"
    );
    Ok(packed)
}
