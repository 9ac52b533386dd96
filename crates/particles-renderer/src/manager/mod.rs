//! The particle manager: owns the program, texture and instance buffer,
//! and turns a particle snapshot into one instanced draw.

mod types;


pub use types::*;

use tracing::{debug, info, warn};

use crate::backend::GpuBackend;
use crate::instance::{pack_instances, InstanceRecord, INSTANCE_RECORD_SIZE};
use crate::interface::{ShaderInterface, ShaderLocations};
use crate::particle::Particle;

/// Texture unit the particle texture is bound to.
pub const TEXTURE_UNIT: u32 = 0;

struct InstanceBuffer<T> {
    buffer: T,
    /// Capacity in records.
    capacity: u32,
}

/// Renders particle snapshots as instanced, textured quads.
///
/// The manager exclusively owns its program, texture and instance buffer.
/// Replacing a program or texture releases the previous one immediately,
/// and dropping the manager releases everything it holds.
pub struct ParticleManager<B: GpuBackend> {
    backend: B,
    interface: ShaderInterface,
    program: Option<B::Program>,
    locations: Option<ShaderLocations>,
    texture: Option<B::Texture>,
    instances: Option<InstanceBuffer<B::Buffer>>,
    staging: Vec<InstanceRecord>,
    initial_capacity: u32,
    max_instances: u32,
}

impl<B: GpuBackend> ParticleManager<B> {
    /// Create an `Uninitialized` manager drawing through `backend`.
    pub fn new(backend: B, options: ManagerOptions) -> Self {
        Self {
            backend,
            interface: options.interface,
            program: None,
            locations: None,
            texture: None,
            instances: None,
            staging: Vec::new(),
            initial_capacity: options.initial_capacity.max(1),
            max_instances: options.max_instances,
        }
    }

    pub fn state(&self) -> ManagerState {
        if self.program.is_some() && self.texture.is_some() {
            ManagerState::Ready
        } else {
            ManagerState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ManagerState::Ready
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Locations resolved from the current program.
    pub fn locations(&self) -> Option<&ShaderLocations> {
        self.locations.as_ref()
    }

    pub fn interface(&self) -> &ShaderInterface {
        &self.interface
    }

    /// Current instance buffer capacity in records (0 before the first draw).
    pub fn instance_capacity(&self) -> u32 {
        self.instances.as_ref().map_or(0, |b| b.capacity)
    }

    pub fn max_instances(&self) -> u32 {
        self.max_instances
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Take ownership of a linked program and resolve its interface.
    ///
    /// On failure the new program is released and the previous one, if
    /// any, stays attached with its cached locations.
    pub fn set_program(&mut self, program: B::Program) -> Result<(), ParticleError> {
        if let Err(log) = self.backend.link_status(&program) {
            return Err(self.reject_program(program, format!("program is not linked: {log}")));
        }

        let locations = match self.interface.resolve(&self.backend, &program) {
            Ok(locations) => locations,
            Err(e) => return Err(self.reject_program(program, e)),
        };

        if let Err(e) = self.backend.prepare_program(&program, &locations) {
            return Err(self.reject_program(program, e));
        }

        let was_ready = self.is_ready();
        if let Some(previous) = self.program.replace(program) {
            self.backend.release_program(previous);
            debug!("released previous particle program");
        }
        self.locations = Some(locations);
        info!(
            color_attribute = locations.color.is_some(),
            "particle program attached"
        );
        self.log_transition(was_ready);
        Ok(())
    }

    /// Take ownership of a texture, releasing the previous one.
    pub fn set_texture(&mut self, texture: B::Texture) {
        let was_ready = self.is_ready();
        if let Some(previous) = self.texture.replace(texture) {
            self.backend.release_texture(previous);
            debug!("released previous particle texture");
        }
        info!("particle texture attached");
        self.log_transition(was_ready);
    }

    /// Draw `particles` in order as one instanced draw.
    ///
    /// An empty slice issues no GPU work. Returns once the draw is
    /// enqueued.
    pub fn draw_particles<P: Particle>(
        &mut self,
        particles: &[P],
        view: &ViewState,
    ) -> Result<DrawStats, ParticleError> {
        let (Some(program), Some(texture), Some(locations)) =
            (&self.program, &self.texture, self.locations)
        else {
            return Err(ParticleError::InvalidState(self.state()));
        };

        if particles.is_empty() {
            return Ok(DrawStats::default());
        }

        self.backend.bind_program(program);
        self.backend.bind_texture(TEXTURE_UNIT, texture);
        self.backend
            .set_uniform_matrix(locations.modelview_matrix, &view.modelview);
        self.backend
            .set_uniform_matrix(locations.projection_matrix, &view.projection);

        pack_instances(particles, &mut self.staging);
        let count = self.ensure_capacity(particles.len())?;

        let Some(instances) = &self.instances else {
            return Err(ParticleError::ResourceExhaustion(
                "instance buffer was not allocated".into(),
            ));
        };
        let bytes: &[u8] = bytemuck::cast_slice(&self.staging);
        self.backend
            .upload_instances(&instances.buffer, bytes)
            .map_err(ParticleError::ResourceExhaustion)?;
        self.backend
            .draw_quad_instanced(&instances.buffer, count)
            .map_err(ParticleError::Backend)?;

        debug!(instances = count, bytes = bytes.len(), "particles drawn");
        Ok(DrawStats {
            instances: count,
            bytes_uploaded: bytes.len() as u64,
        })
    }

    /// Make sure the instance buffer holds `required` records, growing it
    /// if needed. Returns `required` as a draw count.
    fn ensure_capacity(&mut self, required: usize) -> Result<u32, ParticleError> {
        let count = u32::try_from(required)
            .ok()
            .filter(|&n| n <= self.max_instances)
            .ok_or_else(|| {
                ParticleError::ResourceExhaustion(format!(
                    "{required} particles exceed the limit of {} instances",
                    self.max_instances
                ))
            })?;

        if count <= self.instance_capacity() {
            return Ok(count);
        }

        let capacity = grown_capacity(count, self.initial_capacity, self.max_instances);
        let size = u64::from(capacity) * INSTANCE_RECORD_SIZE;
        let buffer = self
            .backend
            .create_instance_buffer(size)
            .map_err(ParticleError::ResourceExhaustion)?;

        if let Some(previous) = self.instances.replace(InstanceBuffer { buffer, capacity }) {
            self.backend.release_buffer(previous.buffer);
        }
        debug!(capacity, bytes = size, "instance buffer allocated");
        Ok(count)
    }

    fn reject_program(&mut self, program: B::Program, reason: String) -> ParticleError {
        warn!("rejected particle program: {reason}");
        self.backend.release_program(program);
        ParticleError::ShaderLink(reason)
    }

    fn log_transition(&self, was_ready: bool) {
        if !was_ready && self.is_ready() {
            info!("particle manager ready");
        }
    }
}

impl<B: GpuBackend> Drop for ParticleManager<B> {
    fn drop(&mut self) {
        if let Some(program) = self.program.take() {
            self.backend.release_program(program);
        }
        if let Some(texture) = self.texture.take() {
            self.backend.release_texture(texture);
        }
        if let Some(instances) = self.instances.take() {
            self.backend.release_buffer(instances.buffer);
        }
        self.locations = None;
    }
}
