//! Palette types and nearest-color matching
//!
//! A palette is the explicit, ordered set of colors a display can show.
//! Index assignment follows palette order, so the firmware's color table and
//! the request's palette must list colors in the same order.

mod color;
mod palette;

pub use color::{PaletteColor, ParseColorError};
pub use palette::{Palette, MAX_PALETTE_SIZE};
