//! Window creation, GPU bring-up and particle manager setup.

use std::sync::Arc;

use winit::event_loop::ActiveEventLoop;
use winit::window::WindowAttributes;

use particles_common::ParticlesError;
use particles_renderer::{GpuContext, ManagerOptions, ParticleManager, WgpuBackend};

use crate::texture::{self, TextureData};

use super::core::ParticlesApp;

const SHADER_SOURCE: &str = include_str!("../shaders/particle.wgsl");

impl ParticlesApp {
    /// Create the window, GPU context and a ready particle manager.
    pub(super) fn initialize_window(
        &mut self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(), ParticlesError> {
        let attrs = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = event_loop
            .create_window(attrs)
            .map(Arc::new)
            .map_err(|e| ParticlesError::Renderer(format!("failed to create window: {e}")))?;

        let gpu = pollster::block_on(GpuContext::new(Arc::clone(&window)))?;

        let backend = WgpuBackend::new(
            Arc::clone(&gpu.device),
            Arc::clone(&gpu.queue),
            gpu.format(),
            self.config.renderer.blend,
        );
        let options = ManagerOptions::from_config(&self.config.renderer, &self.config.shader);
        let mut manager = ParticleManager::new(backend, options);

        let program = manager.backend_mut().link_program("particle shader", SHADER_SOURCE);
        manager.set_program(program)?;

        let data = self.texture_data();
        let texture = manager
            .backend_mut()
            .create_texture_rgba8("particle texture", data.width, data.height, &data.pixels)?;
        manager.set_texture(texture);

        tracing::info!(
            particles = self.scene.particles().len(),
            "renderer initialized ({}x{})",
            gpu.size.width,
            gpu.size.height
        );

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.manager = Some(manager);
        Ok(())
    }

    /// The `--texture` PNG if it loads, otherwise the generated dot.
    fn texture_data(&self) -> TextureData {
        match &self.texture_path {
            Some(path) => texture::load_png(path).unwrap_or_else(|e| {
                tracing::warn!("{e}; using the built-in dot texture");
                texture::soft_dot(texture::DOT_SIZE)
            }),
            None => texture::soft_dot(texture::DOT_SIZE),
        }
    }
}
