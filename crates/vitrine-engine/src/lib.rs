//! Vitrine engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the gallery core:
//! window/event loop, device and surface management, platform-agnostic input,
//! frame timing, and the renderer-facing context types.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod app;

pub mod logging;
pub mod coords;
pub mod render;
