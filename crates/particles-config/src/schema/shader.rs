//! Names of the uniforms and attributes the particle program must expose.

use serde::{Deserialize, Serialize};

/// Shader interface slot names, resolved against each linked program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShaderSlotsConfig {
    pub modelview_matrix: String,
    pub projection_matrix: String,
    /// Optional per-instance color attribute.
    pub color: String,
    pub position: String,
    pub texcoord: String,
    pub instance_index: String,
    /// First of four consecutive column attributes.
    pub instance_transform: String,
}

impl Default for ShaderSlotsConfig {
    fn default() -> Self {
        Self {
            modelview_matrix: "modelview_matrix".into(),
            projection_matrix: "projection_matrix".into(),
            color: "color".into(),
            position: "position".into(),
            texcoord: "texcoord".into(),
            instance_index: "instance_index".into(),
            instance_transform: "transform_col0".into(),
        }
    }
}

impl ShaderSlotsConfig {
    /// All slot names paired with their config keys, for validation.
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("shader.modelview_matrix", self.modelview_matrix.as_str()),
            ("shader.projection_matrix", self.projection_matrix.as_str()),
            ("shader.color", self.color.as_str()),
            ("shader.position", self.position.as_str()),
            ("shader.texcoord", self.texcoord.as_str()),
            ("shader.instance_index", self.instance_index.as_str()),
            ("shader.instance_transform", self.instance_transform.as_str()),
        ]
    }
}
