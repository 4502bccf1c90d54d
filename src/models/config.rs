use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from an optional YAML file, then
/// overridden by environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory scanned for images at startup
    pub image_location: PathBuf,

    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Render cache settings
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of rendered buffers kept (0 = unbounded)
    pub max_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_location: PathBuf::from("images"),
            bind_addr: "0.0.0.0:3000".to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 256 }
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE` (if set) and apply environment overrides.
    pub fn from_env() -> Self {
        let config_file = std::env::var("CONFIG_FILE").ok().map(PathBuf::from);
        let mut config = Self::load(config_file.as_deref());
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load configuration from a YAML file, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        image_location = %config.image_location.display(),
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Apply `IMAGE_LOCATION`, `BIND_ADDR` and `CACHE_MAX_ENTRIES` overrides.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(location) = lookup("IMAGE_LOCATION") {
            self.image_location = PathBuf::from(location);
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(raw) = lookup("CACHE_MAX_ENTRIES") {
            match raw.trim().parse() {
                Ok(max_entries) => self.cache.max_entries = max_entries,
                Err(e) => tracing::warn!(%e, value = %raw, "Ignoring invalid CACHE_MAX_ENTRIES"),
            }
        }
    }
}
