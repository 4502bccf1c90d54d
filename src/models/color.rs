//! Palette color parsing for request bodies.
//!
//! Text entries accept any CSS color notation (hex, `rgb()`, `hsl()`,
//! keywords, ...) via `csscolorparser`; arrays are plain channel values.
//! Alpha is accepted everywhere and always dropped.

use art_pipeline::{PaletteColor, TransformError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single palette entry as it appears in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ColorInput {
    /// `"#rrggbb"`, `"#rgb"`, `"rgb(0, 0, 0)"`, `"hsl(0, 0%, 0%)"`, `"white"`, ...
    Text(String),
    /// `[r, g, b]` or `[r, g, b, a]`
    Channels(Vec<f64>),
}

impl ColorInput {
    pub fn to_palette_color(&self) -> Result<PaletteColor, TransformError> {
        match self {
            ColorInput::Text(text) => parse_color_text(text),
            ColorInput::Channels(channels) => from_channels(channels),
        }
    }
}

impl From<&str> for ColorInput {
    fn from(text: &str) -> Self {
        ColorInput::Text(text.to_string())
    }
}

fn invalid_color(input: impl std::fmt::Display) -> TransformError {
    TransformError::InvalidRequest(format!("value is not a valid color: {input}"))
}

/// Parse any textual color notation.
pub fn parse_color_text(text: &str) -> Result<PaletteColor, TransformError> {
    let trimmed = text.trim();

    // `0xrrggbb` is common in firmware configs
    let css = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => format!("#{hex}"),
        None => trimmed.to_string(),
    };

    let color = css
        .parse::<csscolorparser::Color>()
        .map_err(|e| invalid_color(format!("{trimmed} ({e})")))?;
    let [r, g, b, a] = color.to_rgba8();
    Ok(PaletteColor::from_rgba(r, g, b, a))
}

fn from_channels(channels: &[f64]) -> Result<PaletteColor, TransformError> {
    let describe = || format!("{channels:?}");

    let (rgb, alpha) = match channels {
        [r, g, b] => ([*r, *g, *b], 1.0),
        [r, g, b, a] => ([*r, *g, *b], *a),
        _ => {
            return Err(TransformError::InvalidRequest(format!(
                "color arrays need 3 or 4 values, got {}",
                channels.len()
            )))
        }
    };

    if !(0.0..=1.0).contains(&alpha) {
        return Err(invalid_color(describe()));
    }

    let mut out = [0u8; 3];
    for (slot, value) in out.iter_mut().zip(rgb) {
        if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
            return Err(invalid_color(describe()));
        }
        *slot = value as u8;
    }
    let [r, g, b] = out;
    Ok(PaletteColor::from_rgba(r, g, b, (alpha * 255.0).round() as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> PaletteColor {
        parse_color_text(text).unwrap()
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(parse("white"), PaletteColor::new(255, 255, 255));
        assert_eq!(parse("Black"), PaletteColor::new(0, 0, 0));
        assert_eq!(parse(" rebeccapurple "), PaletteColor::new(102, 51, 153));
        assert_eq!(parse("darkslategrey"), PaletteColor::new(47, 79, 79));
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse("#f00"), PaletteColor::new(255, 0, 0));
        assert_eq!(parse("#00ff00"), PaletteColor::new(0, 255, 0));
        assert_eq!(parse("0x0000ff"), PaletteColor::new(0, 0, 255));
        // alpha dropped
        assert_eq!(parse("#ffffff00"), PaletteColor::new(255, 255, 255));
        assert_eq!(parse("#0f08"), PaletteColor::new(0, 255, 0));
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(parse("rgb(10, 20, 30)"), PaletteColor::new(10, 20, 30));
        assert_eq!(parse("rgba(10,20,30,0.5)"), PaletteColor::new(10, 20, 30));
        assert_eq!(parse("rgb(100%, 0%, 100%)"), PaletteColor::new(255, 0, 255));
    }

    #[test]
    fn test_hsl_functions() {
        assert_eq!(parse("hsl(0, 100%, 50%)"), PaletteColor::new(255, 0, 0));
        assert_eq!(parse("hsla(240, 100%, 50%, 0.3)"), PaletteColor::new(0, 0, 255));
        assert_eq!(parse("hsl(0, 0%, 100%)"), PaletteColor::new(255, 255, 255));
    }

    #[test]
    fn test_rejects_malformed_text() {
        for bad in ["", "#12", "#gggggg", "rgb(1, 2)", "notacolor"] {
            assert!(
                matches!(parse_color_text(bad), Err(TransformError::InvalidRequest(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_error_names_the_input() {
        let err = parse_color_text("chartreusy").unwrap_err();
        assert!(err.to_string().contains("chartreusy"));
    }

    #[test]
    fn test_channel_arrays() {
        let color = ColorInput::Channels(vec![1.0, 2.0, 3.0]);
        assert_eq!(color.to_palette_color().unwrap(), PaletteColor::new(1, 2, 3));

        let with_alpha = ColorInput::Channels(vec![255.0, 255.0, 255.0, 0.0]);
        assert_eq!(with_alpha.to_palette_color().unwrap(), PaletteColor::new(255, 255, 255));
    }

    #[test]
    fn test_channel_arrays_rejected() {
        for bad in [vec![1.0, 2.0], vec![1.5, 2.0, 3.0], vec![0.0, 0.0, 300.0], vec![0.0, 0.0, 0.0, 1.5]] {
            assert!(ColorInput::Channels(bad).to_palette_color().is_err());
        }
    }

    #[test]
    fn test_deserialize_untagged() {
        let colors: Vec<ColorInput> = serde_json::from_str(r##"["#000", [255, 255, 255]]"##).unwrap();
        assert_eq!(
            colors,
            vec![
                ColorInput::Text("#000".to_string()),
                ColorInput::Channels(vec![255.0, 255.0, 255.0]),
            ]
        );
    }
}
