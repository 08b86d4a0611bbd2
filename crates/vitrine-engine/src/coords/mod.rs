//! Coordinate and color types shared across the engine and the gallery core.
//!
//! Canonical CPU space:
//! - Physical pixels for screen-facing quantities (sizes, pointer positions)
//! - Origin top-left, +X right, +Y down
//!
//! World-space (camera-projected) quantities live in the gallery crate; this
//! module only covers what the runtime itself needs.

mod color;
mod screen;

pub use color::ColorRgba;
pub use screen::ScreenSize;
