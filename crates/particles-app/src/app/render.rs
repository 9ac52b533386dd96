//! Frame rendering logic.

use super::core::{ParticlesApp, REPORT_INTERVAL};

impl ParticlesApp {
    /// Advance the scene and draw one frame.
    pub(super) fn render_frame(&mut self) {
        let dt = self.timer.begin_frame();
        self.scene.update(dt);

        let (Some(gpu), Some(manager)) = (&mut self.gpu, &mut self.manager) else {
            return;
        };

        let frame = match gpu.current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                gpu.resize(gpu.size.width, gpu.size.height);
                return;
            }
            Err(e) => {
                tracing::error!("Failed to acquire frame: {e}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let backend = manager.backend_mut();
        backend.begin_frame(view);
        backend.clear_frame(self.clear_color);

        let view_state = self.scene.view_state(gpu.size.aspect_ratio());
        match manager.draw_particles(self.scene.particles(), &view_state) {
            Ok(stats) => self.timer.record_draw(stats),
            Err(e) => tracing::error!("Render error: {e}"),
        }
        manager.backend_mut().end_frame();

        if let Some(window) = &self.window {
            window.pre_present_notify();
        }
        frame.present();

        if self.timer.should_report(REPORT_INTERVAL) {
            tracing::info!(
                "{:.1} fps, {:.2} ms/frame, {:.0} instances/frame, {} KiB uploaded",
                self.timer.fps(),
                self.timer.frame_time_ms(),
                self.timer.average_instances(),
                self.timer.bytes_uploaded() / 1024
            );
        }
    }
}
