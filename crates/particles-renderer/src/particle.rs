//! The particle capability: what the manager reads from each particle.

use serde::{Deserialize, Serialize};

use crate::matrix::Vec3;

/// Read/write access to the state a particle contributes to a draw.
///
/// Values are passed to the GPU as-is: nothing is clamped, normalized or
/// checked for finiteness.
pub trait Particle {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// Per-axis scale.
    fn scales(&self) -> Vec3;
    fn set_scales(&mut self, scales: Vec3);

    /// Euler angles in radians, composed as `Rx * Ry * Rz`.
    fn angles(&self) -> Vec3;
    fn set_angles(&mut self, angles: Vec3);

    /// Straight (not premultiplied) RGBA.
    fn color(&self) -> [f32; 4];
    fn set_color(&mut self, color: [f32; 4]);
}

impl<P: Particle + ?Sized> Particle for Box<P> {
    fn position(&self) -> Vec3 {
        (**self).position()
    }

    fn set_position(&mut self, position: Vec3) {
        (**self).set_position(position)
    }

    fn scales(&self) -> Vec3 {
        (**self).scales()
    }

    fn set_scales(&mut self, scales: Vec3) {
        (**self).set_scales(scales)
    }

    fn angles(&self) -> Vec3 {
        (**self).angles()
    }

    fn set_angles(&mut self, angles: Vec3) {
        (**self).set_angles(angles)
    }

    fn color(&self) -> [f32; 4] {
        (**self).color()
    }

    fn set_color(&mut self, color: [f32; 4]) {
        (**self).set_color(color)
    }
}

/// Plain particle value for hosts without their own particle type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicParticle {
    pub position: Vec3,
    pub scales: Vec3,
    pub angles: Vec3,
    pub color: [f32; 4],
}

impl Default for BasicParticle {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            scales: [1.0; 3],
            angles: [0.0; 3],
            color: [1.0; 4],
        }
    }
}

impl BasicParticle {
    /// Unit-scale, unrotated, opaque white particle at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scales(mut self, scales: Vec3) -> Self {
        self.scales = scales;
        self
    }

    pub fn with_angles(mut self, angles: Vec3) -> Self {
        self.angles = angles;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

impl Particle for BasicParticle {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn scales(&self) -> Vec3 {
        self.scales
    }

    fn set_scales(&mut self, scales: Vec3) {
        self.scales = scales;
    }

    fn angles(&self) -> Vec3 {
        self.angles
    }

    fn set_angles(&mut self, angles: Vec3) {
        self.angles = angles;
    }

    fn color(&self) -> [f32; 4] {
        self.color
    }

    fn set_color(&mut self, color: [f32; 4]) {
        self.color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unit_white_at_origin() {
        let p = BasicParticle::default();
        assert_eq!(p.position(), [0.0; 3]);
        assert_eq!(p.scales(), [1.0; 3]);
        assert_eq!(p.angles(), [0.0; 3]);
        assert_eq!(p.color(), [1.0; 4]);
    }

    #[test]
    fn setters_store_values_unmodified() {
        let mut p = BasicParticle::default();
        p.set_position([1.0, -2.0, 3.5]);
        p.set_scales([-1.0, 0.0, 1e9]);
        p.set_angles([10.0, 0.0, -7.0]);
        p.set_color([2.0, -1.0, 0.5, f32::INFINITY]);

        assert_eq!(p.position(), [1.0, -2.0, 3.5]);
        assert_eq!(p.scales(), [-1.0, 0.0, 1e9]);
        assert_eq!(p.angles(), [10.0, 0.0, -7.0]);
        assert_eq!(p.color(), [2.0, -1.0, 0.5, f32::INFINITY]);
    }

    #[test]
    fn nan_passes_through() {
        let mut p = BasicParticle::default();
        p.set_position([f32::NAN, 0.0, 0.0]);
        assert!(p.position()[0].is_nan());
    }

    #[test]
    fn builder_helpers() {
        let p = BasicParticle::at([1.0, 2.0, 3.0])
            .with_scales([2.0; 3])
            .with_angles([0.5, 0.0, 0.0])
            .with_color([1.0, 0.0, 0.0, 0.5]);
        assert_eq!(p.position, [1.0, 2.0, 3.0]);
        assert_eq!(p.scales, [2.0; 3]);
        assert_eq!(p.angles, [0.5, 0.0, 0.0]);
        assert_eq!(p.color, [1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn boxed_trait_objects_delegate() {
        let mut boxed: Box<dyn Particle> = Box::new(BasicParticle::default());
        boxed.set_position([4.0, 5.0, 6.0]);
        assert_eq!(boxed.position(), [4.0, 5.0, 6.0]);
        assert_eq!(boxed.color(), [1.0; 4]);
    }
}
