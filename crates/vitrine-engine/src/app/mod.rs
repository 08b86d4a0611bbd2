//! Engine-facing application contracts.
//!
//! This module defines the stable interface between the runtime (platform
//! loop) and the hosted component. Runtime internals (winit types, surface
//! plumbing) do not leak through it.

mod contract;
mod ctx;

pub use contract::{App, AppControl};
pub use ctx::FrameCtx;
