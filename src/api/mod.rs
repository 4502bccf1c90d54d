pub mod art;
pub mod headers;
pub mod health;

pub use art::{handle_art, __path_handle_art};
pub use health::{handle_healthz, HealthResponse, __path_handle_healthz};
