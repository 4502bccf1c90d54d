//! Test fixtures: small generated images written to a temp directory.

use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;

/// 40x20 horizontal ramp, wider than any square target
pub const LANDSCAPE: &str = "landscape.png";

/// 20x40 vertical ramp
pub const PORTRAIT: &str = "portrait.png";

/// Present in the directory but never decodable
pub const NOT_AN_IMAGE: &str = "not-an-image.txt";

pub fn landscape() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(40, 20, |x, y| {
        Rgb([(x * 6) as u8, (y * 12) as u8, 128])
    }))
}

pub fn portrait() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(20, 40, |x, y| {
        Rgb([(y * 6) as u8, 64, (x * 12) as u8])
    }))
}

/// Populate `dir` with the standard fixture set.
pub fn write_images(dir: &Path) {
    landscape()
        .save(dir.join(LANDSCAPE))
        .expect("Failed to write landscape fixture");
    portrait()
        .save(dir.join(PORTRAIT))
        .expect("Failed to write portrait fixture");
    std::fs::write(dir.join(NOT_AN_IMAGE), "plain text").expect("Failed to write text fixture");
}

/// Four-level grayscale palette as JSON
pub const GRAY4: &str = r##"["#000000", "#555555", "#aaaaaa", "#ffffff"]"##;
