pub mod errors;
pub mod types;

pub use errors::{ConfigError, ParticlesError};
pub use types::Color;

pub type Result<T> = std::result::Result<T, ParticlesError>;
