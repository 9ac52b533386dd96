//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod renderer;
mod scene;
mod shader;
mod system;

pub use renderer::*;
pub use scene::*;
pub use shader::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesConfig {
    pub renderer: RendererConfig,
    pub shader: ShaderSlotsConfig,
    pub scene: SceneConfig,
    pub window: WindowConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_renderer_section() {
        let config = ParticlesConfig::default();
        assert_eq!(config.renderer.initial_capacity, 256);
        assert_eq!(config.renderer.max_instances, 65_536);
        assert_eq!(config.renderer.blend, BlendMode::Alpha);
        assert_eq!(config.renderer.clear_color, "#000000");
    }

    #[test]
    fn default_shader_slot_names() {
        let shader = ParticlesConfig::default().shader;
        assert_eq!(shader.modelview_matrix, "modelview_matrix");
        assert_eq!(shader.projection_matrix, "projection_matrix");
        assert_eq!(shader.color, "color");
        assert_eq!(shader.position, "position");
        assert_eq!(shader.texcoord, "texcoord");
        assert_eq!(shader.instance_index, "instance_index");
        assert_eq!(shader.instance_transform, "transform_col0");
    }

    #[test]
    fn default_scene_and_window() {
        let config = ParticlesConfig::default();
        assert_eq!(config.scene.particle_count, 512);
        assert!((config.scene.field_of_view - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: ParticlesConfig = toml::from_str(
            r#"
[renderer]
blend = "additive"
"#,
        )
        .unwrap();
        assert_eq!(config.renderer.blend, BlendMode::Additive);
        assert_eq!(config.renderer.max_instances, 65_536);
        assert_eq!(config.scene.particle_count, 512);
    }

    #[test]
    fn unknown_blend_mode_is_rejected() {
        let result: Result<ParticlesConfig, _> = toml::from_str("[renderer]\nblend = \"glow\"\n");
        assert!(result.is_err());
    }
}
