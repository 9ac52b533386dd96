use std::path::PathBuf;

use clap::Parser;

/// Particles: a GPU-instanced particle renderer demo.
#[derive(Parser, Debug)]
#[command(name = "particles", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter directive (e.g. debug, particles_renderer=trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of particles to draw, overriding `scene.particle_count`.
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// PNG used as the particle texture instead of the built-in soft dot.
    #[arg(short = 't', long)]
    pub texture: Option<PathBuf>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments() {
        let args = Args::try_parse_from(["particles"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.log_level.is_none());
        assert!(args.count.is_none());
        assert!(args.texture.is_none());
    }

    #[test]
    fn all_arguments() {
        let args = Args::try_parse_from([
            "particles",
            "--config",
            "/tmp/p.toml",
            "--log-level",
            "debug",
            "-n",
            "2000",
            "--texture",
            "spark.png",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/p.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.count, Some(2000));
        assert_eq!(args.texture, Some(PathBuf::from("spark.png")));
    }

    #[test]
    fn count_must_be_a_number() {
        assert!(Args::try_parse_from(["particles", "--count", "lots"]).is_err());
    }
}
