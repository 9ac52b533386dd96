mod app;
mod cli;
mod scene;
mod texture;

use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

use particles_config::schema::ParticlesConfig;

fn main() {
    let args = cli::parse();

    let config = particles_config::load_config(args.config.as_deref());

    // Logging comes up before config errors are reported so they are visible.
    let configured_level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".into());
    let directive = args.log_level.clone().unwrap_or(configured_level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Particles v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = config.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        ParticlesConfig::default()
    });

    if let Some(count) = args.count {
        config.scene.particle_count = count;
    }
    if config.scene.particle_count > config.renderer.max_instances {
        tracing::warn!(
            "particle count {} exceeds renderer.max_instances {}; clamping",
            config.scene.particle_count,
            config.renderer.max_instances
        );
        config.scene.particle_count = config.renderer.max_instances;
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    let mut app = app::ParticlesApp::new(config, args.texture);

    tracing::info!("Entering event loop");
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("Event loop error: {e}");
    }
    tracing::info!("Shutdown complete");
}
