//! Demo snapshot: particles on a slowly spinning sphere.
//!
//! All animation happens here in the host. The renderer only ever sees
//! the current positions, scales, angles and colors.

use std::f32::consts::PI;

use particles_config::schema::SceneConfig;
use particles_renderer::matrix::{self, Vec3};
use particles_renderer::{BasicParticle, Particle, ViewState};

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

pub struct DemoScene {
    /// Rest positions on the sphere, before spinning.
    anchors: Vec<Vec3>,
    particles: Vec<BasicParticle>,
    elapsed: f32,
    size: f32,
    spin_speed: f32,
    field_of_view: f32,
    camera_distance: f32,
}

impl DemoScene {
    pub fn new(config: &SceneConfig) -> Self {
        let count = config.particle_count as usize;
        let radius = config.spawn_radius as f32;
        let size = config.particle_size as f32;

        let anchors: Vec<Vec3> = (0..count)
            .map(|i| fibonacci_point(i, count, radius))
            .collect();
        let particles = anchors
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                BasicParticle::at(p)
                    .with_scales([size; 3])
                    .with_color(hue_color(i as f32 / count.max(1) as f32))
            })
            .collect();

        Self {
            anchors,
            particles,
            elapsed: 0.0,
            size,
            spin_speed: config.spin_speed as f32,
            field_of_view: (config.field_of_view as f32).to_radians(),
            camera_distance: config.camera_distance as f32,
        }
    }

    pub fn particles(&self) -> &[BasicParticle] {
        &self.particles
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance the animation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        let spin = matrix::rotate_y(self.spin_speed * self.elapsed);

        for (i, (particle, anchor)) in self.particles.iter_mut().zip(&self.anchors).enumerate() {
            let phase = i as f32 * 0.37;
            particle.set_position(matrix::transform_point(&spin, *anchor));
            particle.set_angles([0.0, 0.0, self.elapsed * self.spin_speed * 2.0 + phase]);
            let pulse = 1.0 + 0.25 * (self.elapsed * 2.0 + phase).sin();
            particle.set_scales([self.size * pulse; 3]);
        }
    }

    /// Camera looking down -Z at the sphere from `camera_distance`.
    pub fn view_state(&self, aspect_ratio: f32) -> ViewState {
        ViewState::new(
            matrix::translate(0.0, 0.0, -self.camera_distance),
            matrix::perspective(self.field_of_view, aspect_ratio, NEAR_PLANE, FAR_PLANE),
        )
    }
}

/// Point `i` of `n` spread evenly over a sphere of `radius`.
fn fibonacci_point(i: usize, n: usize, radius: f32) -> Vec3 {
    let golden_angle = PI * (3.0 - 5f32.sqrt());
    let y = 1.0 - 2.0 * (i as f32 + 0.5) / n as f32;
    let ring = (1.0 - y * y).max(0.0).sqrt();
    let theta = golden_angle * i as f32;
    [theta.cos() * ring * radius, y * radius, theta.sin() * ring * radius]
}

/// Fully saturated color at `hue` in `0.0..1.0`, opaque.
fn hue_color(hue: f32) -> [f32; 4] {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    [r, g, b, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(p: Vec3) -> f32 {
        (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
    }

    #[test]
    fn creates_configured_count() {
        let config = SceneConfig {
            particle_count: 100,
            ..SceneConfig::default()
        };
        assert_eq!(DemoScene::new(&config).particles().len(), 100);
    }

    #[test]
    fn empty_scene() {
        let config = SceneConfig {
            particle_count: 0,
            ..SceneConfig::default()
        };
        let mut scene = DemoScene::new(&config);
        scene.update(0.5);
        assert!(scene.particles().is_empty());
    }

    #[test]
    fn particles_sit_on_the_sphere() {
        let scene = DemoScene::new(&SceneConfig::default());
        for p in scene.particles() {
            assert!((length(p.position()) - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn spinning_keeps_radius() {
        let mut scene = DemoScene::new(&SceneConfig::default());
        scene.update(1.3);
        scene.update(0.4);
        assert!((scene.elapsed() - 1.7).abs() < 1e-6);
        for p in scene.particles() {
            assert!((length(p.position()) - 2.0).abs() < 1e-3);
        }
    }

    #[test]
    fn update_moves_particles() {
        let mut scene = DemoScene::new(&SceneConfig::default());
        let before = scene.particles()[10].position();
        scene.update(0.5);
        assert_ne!(scene.particles()[10].position(), before);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut scene = DemoScene::new(&SceneConfig::default());
        scene.update(-1.0);
        assert_eq!(scene.elapsed(), 0.0);
    }

    #[test]
    fn scales_pulse_around_particle_size() {
        let mut scene = DemoScene::new(&SceneConfig::default());
        scene.update(0.8);
        for p in scene.particles() {
            let s = p.scales()[0];
            assert!((0.15 * 0.75 - 1e-6..=0.15 * 1.25 + 1e-6).contains(&s));
        }
    }

    #[test]
    fn view_moves_camera_back() {
        let scene = DemoScene::new(&SceneConfig::default());
        let view = scene.view_state(16.0 / 9.0);
        assert_eq!(view.modelview[14], -6.0);
        assert!(view.projection[0] > 0.0);
    }

    #[test]
    fn hues() {
        assert_eq!(hue_color(0.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hue_color(1.0 / 3.0)[1], 1.0);
        assert_eq!(hue_color(2.0 / 3.0)[2], 1.0);
    }
}
