//! Vitrine gallery crate.
//!
//! A circular card gallery rendered with hand-built GPU pipelines: cards lie
//! on a configurable arc, scroll with momentum easing and snap-to-lane
//! convergence, wrap around seamlessly from a finite pool, and clip/fit their
//! artwork entirely in fragment shader code. Captions are rasterized on the
//! CPU and billboarded under each card.
//!
//! The crate is a terminal presentation component: it consumes an item list
//! plus style configuration and emits nothing back to the caller.

mod app;
mod camera;
mod caption;
mod card;
mod config;
mod loader;
mod scroll;

mod gallery;
mod render;

pub use app::GalleryApp;
pub use camera::{Camera, WorldViewport};
pub use config::{ClipShape, GalleryConfig, GalleryItem, ImageFit, MIN_POOL};
pub use gallery::Gallery;
