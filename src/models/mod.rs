pub mod art_request;
pub mod color;
pub mod config;

pub use art_request::ArtRequest;
pub use color::{parse_color_text, ColorInput};
pub use config::{AppConfig, CacheConfig};
