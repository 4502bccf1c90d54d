use art_pipeline::{Dimensions, Dither, Palette, PixelsPerByte, TransformError, TransformOptions};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ColorInput;

/// Body of `POST /art`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArtRequest {
    /// Image to serve, by file name (`cat.png`) or stem (`cat`).
    /// Unknown or missing names get a random image.
    #[serde(default)]
    pub image_name: Option<String>,

    /// Colors the display can show, in firmware index order
    #[serde(default)]
    pub palette: Option<Vec<ColorInput>>,

    /// Target `[width, height]`; the image is cropped and shrunk to fit
    #[serde(default)]
    #[schema(value_type = Option<Vec<u32>>, example = json!([800, 480]))]
    pub dimensions: Option<[u32; 2]>,

    /// Pixels packed into each output byte: 1, 2, 4 or 8
    #[serde(default = "default_pixels_per_byte")]
    #[schema(example = 4)]
    pub pixels_per_byte: u32,

    /// Error diffusion: `floyd-steinberg` (default), `atkinson` or `none`
    #[serde(default)]
    pub dither: Option<String>,
}

fn default_pixels_per_byte() -> u32 {
    1
}

impl ArtRequest {
    /// Check every field and build the transform options.
    ///
    /// Fails with `InvalidRequest` before any image is touched. The
    /// returned options only carry fields that change the output, so two
    /// requests that render identically produce equal options.
    pub fn validate(&self) -> Result<TransformOptions, TransformError> {
        let pixels_per_byte = PixelsPerByte::try_from(self.pixels_per_byte)?;

        let dimensions = self
            .dimensions
            .map(|[width, height]| Dimensions::new(width, height))
            .transpose()?;

        let palette = match self.palette.as_deref() {
            None => None,
            Some(colors) => {
                let colors = colors
                    .iter()
                    .map(ColorInput::to_palette_color)
                    .collect::<Result<Vec<_>, _>>()?;
                let palette = Palette::new(colors)?;

                let bits = pixels_per_byte.bits_per_pixel();
                if palette.index_bits() > bits {
                    return Err(TransformError::InvalidRequest(format!(
                        "palette has {} colors but pixels_per_byte={pixels_per_byte} leaves {bits} bit(s) per index",
                        palette.len()
                    )));
                }
                Some(palette)
            }
        };

        let dither = match &self.dither {
            Some(mode) => mode.parse::<Dither>()?,
            None => Dither::default(),
        };

        let mut options = TransformOptions::new().pixels_per_byte(pixels_per_byte);
        if let Some(dimensions) = dimensions {
            options = options.dimensions(dimensions);
        }
        if let Some(palette) = palette {
            options = options.palette(palette).dither(dither);
        }
        Ok(options)
    }
}
