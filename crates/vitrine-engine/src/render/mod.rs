//! Renderer-facing context types.
//!
//! Renderers live with the code that owns their semantics (the gallery crate)
//! and are handed a `RenderCtx` + `RenderTarget` per frame. Each renderer is
//! responsible for its own GPU resources (pipelines, buffers, textures) and
//! lazily (re)creates them when the surface format changes.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
