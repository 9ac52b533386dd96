//! The seam between the particle manager and a concrete GPU API.

use crate::interface::ShaderLocations;
use crate::matrix::Mat4;

/// A resolved uniform or attribute location.
///
/// Backends decide what the number means: the recording backend hands out
/// arbitrary ids, the wgpu backend uses attribute `@location`s and byte
/// offsets into the program's uniform block.
pub type Location = u32;

/// GPU operations the particle manager issues.
///
/// Handle types are moved into the manager and given back to the backend
/// through the `release_*` methods, so a backend never sees a handle
/// released twice. All calls happen on the thread that owns the GPU
/// context.
pub trait GpuBackend {
    type Program;
    type Texture;
    type Buffer;

    /// `Ok` when the program linked; otherwise the link log.
    fn link_status(&self, program: &Self::Program) -> Result<(), String>;

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Location>;

    fn attribute_location(&self, program: &Self::Program, name: &str) -> Option<Location>;

    /// Make a linked program drawable with the resolved interface layout.
    fn prepare_program(
        &mut self,
        program: &Self::Program,
        locations: &ShaderLocations,
    ) -> Result<(), String>;

    fn release_program(&mut self, program: Self::Program);

    fn release_texture(&mut self, texture: Self::Texture);

    /// Allocate an instance buffer of `size` bytes.
    fn create_instance_buffer(&mut self, size: u64) -> Result<Self::Buffer, String>;

    fn release_buffer(&mut self, buffer: Self::Buffer);

    fn bind_program(&mut self, program: &Self::Program);

    fn bind_texture(&mut self, unit: u32, texture: &Self::Texture);

    /// Set a 4×4 column-major matrix uniform on the bound program.
    fn set_uniform_matrix(&mut self, location: Location, matrix: &Mat4);

    /// Replace the buffer contents starting at offset zero.
    fn upload_instances(&mut self, buffer: &Self::Buffer, bytes: &[u8]) -> Result<(), String>;

    /// Draw the base quad `instance_count` times with the bound program and
    /// texture, reading per-instance data from `buffer`. Returns once the
    /// work is enqueued.
    fn draw_quad_instanced(
        &mut self,
        buffer: &Self::Buffer,
        instance_count: u32,
    ) -> Result<(), String>;
}
