//! TOML config file loading and creation.

use crate::schema::ParticlesConfig;
use crate::validation;
use particles_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load config from a specific TOML file path.
///
/// Missing fields fall back to serde defaults. If the parsed config fails
/// validation, a warning is logged and the default config is returned.
pub fn load_from_path(path: &Path) -> Result<ParticlesConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config: ParticlesConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
        warn!("falling back to default config");
        return Ok(ParticlesConfig::default());
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path, creating a
/// commented default file there if none exists.
pub fn load_default() -> Result<ParticlesConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        create_default_config(&path)?;
        return Ok(ParticlesConfig::default());
    }

    load_from_path(&path)
}

/// `<config dir>/particles/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("particles").join("config.toml"))
}

/// Write the default TOML config, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}

const DEFAULT_CONFIG_TOML: &str = r##"# Particle renderer configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[renderer]
# initial_capacity = 256   # 1-max_instances
# max_instances = 65536    # 1-1000000
# blend = "alpha"          # alpha, additive, premultiplied, opaque
# clear_color = "#000000"

[shader]
# modelview_matrix = "modelview_matrix"
# projection_matrix = "projection_matrix"
# color = "color"
# position = "position"
# texcoord = "texcoord"
# instance_index = "instance_index"
# instance_transform = "transform_col0"

[scene]
# particle_count = 512     # 0-max_instances
# spawn_radius = 2.0
# particle_size = 0.15
# spin_speed = 1.0
# field_of_view = 60.0     # 10-120
# camera_distance = 6.0

[window]
# title = "Particles"
# width = 1280
# height = 800

[logging]
# level = "info"
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BlendMode;

    #[test]
    fn load_from_nonexistent_returns_file_not_found() {
        let result = load_from_path(Path::new("/tmp/nonexistent_particles_config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn load_valid_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r##"
[renderer]
max_instances = 1024
blend = "premultiplied"
clear_color = "#101820"

[scene]
particle_count = 100
"##,
        )
        .unwrap();

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.renderer.max_instances, 1024);
        assert_eq!(config.renderer.blend, BlendMode::Premultiplied);
        assert_eq!(config.renderer.clear_color, "#101820");
        assert_eq!(config.scene.particle_count, 100);
        // Defaults preserved
        assert_eq!(config.renderer.initial_capacity, 256);
        assert_eq!(config.window.title, "Particles");
    }

    #[test]
    fn load_invalid_toml_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[renderer\nmax_instances = ").unwrap();

        let result = load_from_path(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn load_out_of_range_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scene]\nfield_of_view = 500.0\n").unwrap();

        let config = load_from_path(&path).unwrap();
        assert!((config.scene.field_of_view - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn create_default_config_writes_parseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        create_default_config(&path).unwrap();
        assert!(path.exists());

        let config = load_from_path(&path).unwrap();
        assert_eq!(config.renderer.max_instances, 65_536);
        assert_eq!(config.shader.instance_transform, "transform_col0");
    }

    #[test]
    fn default_config_path_ends_with_particles_config() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("particles/config.toml"));
        }
    }
}
