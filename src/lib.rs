//! epaper-art - art server for e-paper displays
//!
//! Serves images from a directory, cropped, dithered to the client's palette
//! and bit-packed for its panel. The transform itself lives in the
//! `art-pipeline` crate; this library holds the HTTP surface, image registry
//! and render cache, and exposes them for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
