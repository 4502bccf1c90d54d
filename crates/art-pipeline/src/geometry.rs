//! Aspect-ratio crop and fit-within-box downscale.
//!
//! All ratio comparisons are exact: the target ratio is never turned into a
//! float. Products are formed in `u128`, so no `u32` input can overflow.

use std::borrow::Cow;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::TransformError;

/// A target display resolution. Both sides are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Create dimensions, rejecting a zero side.
    pub fn new(width: u32, height: u32) -> Result<Self, TransformError> {
        if width == 0 || height == 0 {
            return Err(TransformError::invalid(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Crop rectangle anchored at the top-left corner of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub width: u32,
    pub height: u32,
}

/// Divide and round half to even.
fn div_round_half_even(numerator: u128, denominator: u128) -> u128 {
    let quotient = numerator / denominator;
    let twice_remainder = (numerator % denominator) * 2;
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

fn to_u32(value: u128) -> Result<u32, TransformError> {
    u32::try_from(value).map_err(|_| TransformError::compute(format!("{value} exceeds u32")))
}

/// Compute the crop that gives the source the target's aspect ratio.
///
/// A source that is relatively too wide loses columns on the right, one that
/// is relatively too tall loses rows at the bottom. The kept side is never
/// touched.
pub fn crop_box(
    source_width: u32,
    source_height: u32,
    target: Dimensions,
) -> Result<CropBox, TransformError> {
    if source_width == 0 || source_height == 0 {
        return Err(TransformError::compute(format!(
            "source image is {source_width}x{source_height}"
        )));
    }

    let (sw, sh) = (source_width as u128, source_height as u128);
    let (tw, th) = (target.width as u128, target.height as u128);

    // sh vs sw / (tw / th), cross-multiplied
    let crop = match (sh * tw).cmp(&(sw * th)) {
        std::cmp::Ordering::Less => CropBox {
            width: to_u32(div_round_half_even(sh * tw, th))?,
            height: source_height,
        },
        std::cmp::Ordering::Greater => CropBox {
            width: source_width,
            height: to_u32(div_round_half_even(sw * th, tw))?,
        },
        std::cmp::Ordering::Equal => CropBox {
            width: source_width,
            height: source_height,
        },
    };

    if crop.width == 0 || crop.height == 0 {
        return Err(TransformError::compute(format!(
            "cropping {source_width}x{source_height} to ratio {}:{} leaves {}x{}",
            target.width, target.height, crop.width, crop.height
        )));
    }

    Ok(crop)
}

/// Size that fits `width`x`height` inside `target` with the same aspect ratio.
///
/// Never upscales. The free side is whichever of floor/ceil lands closer to
/// the source ratio, floor on ties, and never less than one pixel.
pub fn fit_within(width: u32, height: u32, target: Dimensions) -> (u32, u32) {
    if target.width >= width && target.height >= height {
        return (width, height);
    }

    let (w, h) = (width as u128, height as u128);
    let (tx, ty) = (target.width as u128, target.height as u128);

    if tx * h >= w * ty {
        // height-bound: width = ty * w / h
        let floor = ty * w / h;
        let ceil = if (ty * w) % h == 0 { floor } else { floor + 1 };
        let distance = |n: u128| (w * ty).abs_diff(n * h);
        let x = if distance(ceil) < distance(floor) { ceil } else { floor };
        (x.max(1) as u32, target.height)
    } else {
        // width-bound: height = tx * h / w
        let floor = tx * h / w;
        let ceil = if (tx * h) % w == 0 { floor } else { floor + 1 };
        // |w/h - tx/n| compared across n by cross-multiplying with n
        let y = if floor == 0 {
            floor
        } else {
            let floor_distance = (w * floor).abs_diff(tx * h);
            let ceil_distance = (w * ceil).abs_diff(tx * h);
            if ceil_distance * floor < floor_distance * ceil {
                ceil
            } else {
                floor
            }
        };
        (target.width, y.max(1) as u32)
    }
}

/// Crop to the target ratio, then downscale to fit the target box.
pub fn crop_and_fit(
    image: &DynamicImage,
    target: Dimensions,
) -> Result<Cow<'_, DynamicImage>, TransformError> {
    let crop = crop_box(image.width(), image.height(), target)?;

    let cropped = if crop.width == image.width() && crop.height == image.height() {
        Cow::Borrowed(image)
    } else {
        tracing::debug!(
            from_width = image.width(),
            from_height = image.height(),
            to_width = crop.width,
            to_height = crop.height,
            "Cropping to target aspect ratio"
        );
        Cow::Owned(image.crop_imm(0, 0, crop.width, crop.height))
    };

    let (width, height) = fit_within(cropped.width(), cropped.height(), target);
    if width == cropped.width() && height == cropped.height() {
        return Ok(cropped);
    }

    tracing::debug!(width, height, "Resizing to fit target");
    Ok(Cow::Owned(cropped.resize_exact(
        width,
        height,
        FilterType::CatmullRom,
    )))
}
