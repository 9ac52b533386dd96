//! Per-instance records packed from particles.

use crate::matrix::{self, Mat4, Vec3};
use crate::particle::Particle;

/// One particle's GPU data: transform, color and its index in the draw.
///
/// Layout: 24 × 4 bytes = 96 bytes.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct InstanceRecord {
    /// Column-major model transform.
    pub transform: Mat4,
    /// RGBA color, copied from the particle unmodified.
    pub color: [f32; 4],
    pub index: u32,
    pub _pad: [u32; 3],
}

/// Size of one packed record in bytes.
pub const INSTANCE_RECORD_SIZE: u64 = std::mem::size_of::<InstanceRecord>() as u64;

/// Byte offset of `color` within a record.
pub const COLOR_OFFSET: u64 = 64;

/// Byte offset of `index` within a record.
pub const INDEX_OFFSET: u64 = 80;

impl InstanceRecord {
    /// Pack `particle` as the `index`-th instance of a draw.
    pub fn from_particle<P: Particle + ?Sized>(particle: &P, index: u32) -> Self {
        Self {
            transform: particle_transform(particle.position(), particle.scales(), particle.angles()),
            color: particle.color(),
            index,
            _pad: [0; 3],
        }
    }
}

/// `translate(position) * rotate(angles) * scale(scales)`.
pub fn particle_transform(position: Vec3, scales: Vec3, angles: Vec3) -> Mat4 {
    let translation = matrix::translate(position[0], position[1], position[2]);
    let rotation = matrix::rotate_xyz(angles);
    let scaling = matrix::scale(scales[0], scales[1], scales[2]);
    matrix::mul(&matrix::mul(&translation, &rotation), &scaling)
}

/// Pack `particles` in order into `out`, replacing its contents.
pub fn pack_instances<P: Particle>(particles: &[P], out: &mut Vec<InstanceRecord>) {
    out.clear();
    out.extend(
        particles
            .iter()
            .zip(0u32..)
            .map(|(particle, index)| InstanceRecord::from_particle(particle, index)),
    );
}
