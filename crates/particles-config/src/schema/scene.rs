//! Demo scene configuration used by the host application.

use serde::{Deserialize, Serialize};

/// Parameters of the animated demo snapshot and its camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub particle_count: u32,
    /// Radius of the ring particles are laid out on (> 0).
    pub spawn_radius: f64,
    /// Edge length of each quad in world units (> 0).
    pub particle_size: f64,
    /// Rotation speed in radians per second.
    pub spin_speed: f64,
    /// Vertical field of view in degrees (valid range: 10-120).
    pub field_of_view: f64,
    pub camera_distance: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: 512,
            spawn_radius: 2.0,
            particle_size: 0.15,
            spin_speed: 1.0,
            field_of_view: 60.0,
            camera_distance: 6.0,
        }
    }
}
