//! Full configuration validation.
//!
//! Each section validator pushes human-readable messages; the orchestrator
//! joins them into a single `ConfigError`.

mod helpers;


use crate::schema::ParticlesConfig;
use helpers::{validate_positive_f64, validate_range, validate_range_f64};
use particles_common::{Color, ConfigError};

/// Upper bound for `renderer.max_instances`.
pub const MAX_INSTANCES_LIMIT: u32 = 1_000_000;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ParticlesConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_renderer(&mut errors, config);
    validate_shader(&mut errors, config);
    validate_scene(&mut errors, config);
    validate_window(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_renderer(errors: &mut Vec<String>, config: &ParticlesConfig) {
    let renderer = &config.renderer;
    validate_range(
        errors,
        "renderer.max_instances",
        renderer.max_instances,
        1,
        MAX_INSTANCES_LIMIT,
    );
    validate_range(
        errors,
        "renderer.initial_capacity",
        renderer.initial_capacity,
        1,
        renderer.max_instances.max(1),
    );
    if Color::from_hex(&renderer.clear_color).is_none() {
        errors.push(format!(
            "renderer.clear_color = {:?} is not a hex color",
            renderer.clear_color
        ));
    }
}

fn validate_shader(errors: &mut Vec<String>, config: &ParticlesConfig) {
    let entries = config.shader.entries();
    for (i, (key, name)) in entries.iter().enumerate() {
        if name.trim().is_empty() {
            errors.push(format!("{key} must not be empty"));
            continue;
        }
        if let Some((other, _)) = entries[..i].iter().find(|(_, n)| n == name) {
            errors.push(format!("{key} = {name:?} duplicates {other}"));
        }
    }
}

fn validate_scene(errors: &mut Vec<String>, config: &ParticlesConfig) {
    let scene = &config.scene;
    validate_range(
        errors,
        "scene.particle_count",
        scene.particle_count,
        0,
        config.renderer.max_instances,
    );
    validate_positive_f64(errors, "scene.spawn_radius", scene.spawn_radius);
    validate_positive_f64(errors, "scene.particle_size", scene.particle_size);
    validate_positive_f64(errors, "scene.camera_distance", scene.camera_distance);
    validate_range_f64(errors, "scene.field_of_view", scene.field_of_view, 10.0, 120.0);
    if !scene.spin_speed.is_finite() {
        errors.push(format!("scene.spin_speed = {} is not finite", scene.spin_speed));
    }
}

fn validate_window(errors: &mut Vec<String>, config: &ParticlesConfig) {
    validate_range(errors, "window.width", config.window.width, 1, 16384);
    validate_range(errors, "window.height", config.window.height, 1, 16384);
}
