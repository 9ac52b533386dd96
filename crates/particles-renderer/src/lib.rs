//! GPU-instanced particle rendering.
//!
//! A [`ParticleManager`] owns a linked shader program, one texture and an
//! instance buffer. Each [`ParticleManager::draw_particles`] call packs a
//! snapshot of [`Particle`]s into per-instance records, uploads them once
//! and issues a single instanced draw of a shared base quad.
//!
//! GPU work goes through the [`GpuBackend`] trait: [`WgpuBackend`] renders
//! with wgpu, [`RecordingBackend`] records commands without a GPU.

pub mod backend;
pub mod gpu;
pub mod instance;
pub mod interface;
pub mod manager;
pub mod matrix;
pub mod particle;
pub mod perf;
pub mod quad;
pub mod recording;
pub mod wgpu_backend;

pub use backend::{GpuBackend, Location};
pub use gpu::{GpuContext, PhysicalSize, RendererError};
pub use instance::InstanceRecord;
pub use interface::{ShaderInterface, ShaderLocations, ShaderSlot};
pub use manager::{DrawStats, ManagerOptions, ManagerState, ParticleError, ParticleManager, ViewState};
pub use matrix::Mat4;
pub use particle::{BasicParticle, Particle};
pub use perf::FrameTimer;
pub use recording::{GpuCommand, RecordingBackend};
pub use wgpu_backend::{WgpuBackend, WgpuBuffer, WgpuProgram, WgpuTexture};
