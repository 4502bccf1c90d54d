//! art-pipeline: image transforms for e-paper displays
//!
//! Turns a decoded image into the packed pixel stream that e-paper display
//! firmware pushes straight to its panel. The stages always run in the same
//! order:
//!
//! ```text
//! DynamicImage
//!     |
//!     v
//! [crop to target aspect ratio]     (geometry, only with Dimensions)
//!     |
//!     v
//! [downscale to fit target box]     (geometry, only with Dimensions)
//!     |
//!     v
//! [dither to palette indices]       (palette + dither, only with Palette)
//!     |
//!     v
//! [flatten to one byte per pixel]
//!     |
//!     v
//! [pack N pixels per byte, MSB first]
//!     |
//!     v
//! Vec<u8>
//! ```
//!
//! Quantization must follow resizing: resampling a dithered image would
//! smear the dither pattern. Packing must come last because it operates on
//! finalized per-pixel values.
//!
//! # Example
//!
//! ```
//! use art_pipeline::{render, Dimensions, Palette, PaletteColor, PixelsPerByte, TransformOptions};
//! use image::{DynamicImage, RgbImage};
//!
//! let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, image::Rgb([250, 250, 250])));
//! let palette = Palette::new(vec![PaletteColor::new(0, 0, 0), PaletteColor::new(255, 255, 255)]).unwrap();
//!
//! let options = TransformOptions::new()
//!     .dimensions(Dimensions::new(4, 4).unwrap())
//!     .palette(palette)
//!     .pixels_per_byte(PixelsPerByte::Eight);
//!
//! // 4x4 after crop and resize, 16 one-bit pixels -> 2 bytes of white
//! assert_eq!(render(&image, &options).unwrap(), vec![0xFF, 0xFF]);
//! ```
//!
//! # Wire format
//!
//! The output is a flat byte sequence with no header, no length prefix and
//! no compression. Pixels are row-major in the post-resize layout, and within
//! each byte the first pixel occupies the most significant bits. A final
//! partial byte is right-padded with zero-value pixels.

pub mod dither;
pub mod error;
pub mod geometry;
pub mod pack;
pub mod palette;
pub mod pipeline;

pub use dither::Dither;
pub use error::TransformError;
pub use geometry::{CropBox, Dimensions};
pub use pack::{pack, PixelsPerByte};
pub use palette::{Palette, PaletteColor, ParseColorError, MAX_PALETTE_SIZE};
pub use pipeline::{render, TransformOptions};
