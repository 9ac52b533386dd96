use particles_common::ParticlesError;
use particles_config::schema::{RendererConfig, ShaderSlotsConfig};

use crate::interface::ShaderInterface;
use crate::matrix::{Mat4, IDENTITY};

/// Errors raised by [`super::ParticleManager`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ParticleError {
    #[error("shader link error: {0}")]
    ShaderLink(String),

    #[error("particle manager is not ready (state: {0:?})")]
    InvalidState(ManagerState),

    #[error("instance buffer exhausted: {0}")]
    ResourceExhaustion(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<ParticleError> for ParticlesError {
    fn from(e: ParticleError) -> Self {
        ParticlesError::Renderer(e.to_string())
    }
}

/// Lifecycle state of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Program, texture, or both are still missing.
    Uninitialized,
    /// Both a linked program and a texture are attached.
    Ready,
}

/// View matrices supplied by the host for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub modelview: Mat4,
    pub projection: Mat4,
}

impl ViewState {
    pub fn new(modelview: Mat4, projection: Mat4) -> Self {
        Self {
            modelview,
            projection,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(IDENTITY, IDENTITY)
    }
}

/// What a draw call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub instances: u32,
    pub bytes_uploaded: u64,
}

/// Construction options for a manager.
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub interface: ShaderInterface,
    /// Instance records allocated on the first draw.
    pub initial_capacity: u32,
    /// Largest particle count a single draw accepts.
    pub max_instances: u32,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        let renderer = RendererConfig::default();
        Self {
            interface: ShaderInterface::default(),
            initial_capacity: renderer.initial_capacity,
            max_instances: renderer.max_instances,
        }
    }
}

impl ManagerOptions {
    pub fn from_config(renderer: &RendererConfig, shader: &ShaderSlotsConfig) -> Self {
        Self {
            interface: ShaderInterface::from(shader),
            initial_capacity: renderer.initial_capacity,
            max_instances: renderer.max_instances,
        }
    }
}

/// Next instance buffer capacity able to hold `required` records.
pub(crate) fn grown_capacity(required: u32, initial: u32, max: u32) -> u32 {
    required
        .max(initial)
        .checked_next_power_of_two()
        .unwrap_or(u32::MAX)
        .min(max)
        .max(required)
}
