//! Particle renderer configuration.
//!
//! TOML-based configuration with full validation. Every section uses
//! serde defaults, so a partial file (or none at all) works.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use particles_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{ParticlesConfig, CONFIG_SCHEMA_VERSION};

use std::path::Path;

use particles_common::ConfigError;

/// Load config from `path` if given, otherwise from the platform default
/// location (created with defaults on first run), then validate it.
pub fn load_config(path: Option<&Path>) -> Result<ParticlesConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &ParticlesConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
