//! ParticlesApp struct definition and constructor.

use std::path::PathBuf;
use std::sync::Arc;

use winit::window::Window;

use particles_common::Color;
use particles_config::schema::ParticlesConfig;
use particles_renderer::{FrameTimer, GpuContext, ParticleManager, WgpuBackend};

use crate::scene::DemoScene;

/// Frames between periodic performance log lines.
pub(super) const REPORT_INTERVAL: u64 = 600;

pub struct ParticlesApp {
    pub(super) config: ParticlesConfig,
    pub(super) texture_path: Option<PathBuf>,

    // Windowing
    pub(super) window: Option<Arc<Window>>,
    pub(super) gpu: Option<GpuContext>,

    // Rendering
    pub(super) manager: Option<ParticleManager<WgpuBackend>>,
    pub(super) clear_color: wgpu::Color,

    pub(super) scene: DemoScene,
    pub(super) timer: FrameTimer,
}

impl ParticlesApp {
    pub fn new(config: ParticlesConfig, texture_path: Option<PathBuf>) -> Self {
        let clear = Color::from_hex(&config.renderer.clear_color).unwrap_or(Color::BLACK);
        let scene = DemoScene::new(&config.scene);

        Self {
            texture_path,
            window: None,
            gpu: None,
            manager: None,
            clear_color: clear_color(clear),
            scene,
            timer: FrameTimer::new(),
            config,
        }
    }
}

/// Convert an sRGB config color to the linear clear value the surface expects.
pub(super) fn clear_color(color: Color) -> wgpu::Color {
    let [r, g, b, a] = color.to_f32_array();
    wgpu::Color {
        r: srgb_to_linear(r as f64),
        g: srgb_to_linear(g as f64),
        b: srgb_to_linear(b as f64),
        a: a as f64,
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_and_white_clear_colors() {
        let black = clear_color(Color::BLACK);
        assert_eq!((black.r, black.g, black.b, black.a), (0.0, 0.0, 0.0, 1.0));
        let white = clear_color(Color::WHITE);
        assert!((white.r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mid_grey_is_darker_in_linear() {
        let grey = clear_color(Color::from_rgba(128, 128, 128, 255));
        assert!(grey.r > 0.2 && grey.r < 0.23);
    }

    #[test]
    fn new_app_has_no_window_yet() {
        let app = ParticlesApp::new(ParticlesConfig::default(), None);
        assert!(app.window.is_none());
        assert!(app.manager.is_none());
        assert_eq!(app.scene.particles().len(), 512);
    }
}
