//! Renderer configuration types.

use serde::{Deserialize, Serialize};

/// How particle fragments combine with the frame already drawn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Alpha,
    Additive,
    Premultiplied,
    Opaque,
}

/// Instance buffer sizing and draw state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Records allocated on the first draw (valid range: 1-max_instances).
    pub initial_capacity: u32,
    /// Hard cap on particles per draw (valid range: 1-1000000).
    pub max_instances: u32,
    pub blend: BlendMode,
    /// Frame clear color as `#rrggbb`.
    pub clear_color: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            max_instances: 65_536,
            blend: BlendMode::Alpha,
            clear_color: "#000000".into(),
        }
    }
}
