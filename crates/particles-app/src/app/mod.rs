//! Top-level application state.
//!
//! Implements `winit::application::ApplicationHandler` to drive the event
//! loop. Owns the window, GPU context, particle manager and demo scene.

mod core;
mod handler;
mod init;
mod render;

pub use core::ParticlesApp;
