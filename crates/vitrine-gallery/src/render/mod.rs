//! GPU renderers for the gallery.
//!
//! Two pipelines: one for cards (arc pose + wobble + clip/fit shading) and
//! one for caption billboards. Each renderer owns its GPU resources and
//! lazily (re)creates them against the current surface format, in the
//! engine's `RenderCtx`/`RenderTarget` convention.
//!
//! Geometry is shared: every card draws the same subdivided plane grid, every
//! caption the same unit quad; only per-item uniforms and textures differ,
//! one draw call per item.

mod caption;
mod card;
mod mesh;

pub use caption::{CaptionDraw, CaptionRenderer};
pub use card::{CardRenderer, CardStyle};

/// Premultiplied-alpha over blending, shared by both pipelines.
pub(crate) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}
