use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use vitrine_engine::coords::ColorRgba;
use vitrine_engine::render::{RenderCtx, RenderTarget};

use crate::card::Card;
use crate::config::{ClipShape, ImageFit};
use crate::loader::LoadedImage;

use super::mesh::{self, PlaneVertex};

/// Grid resolution of the shared card plane.
const GRID_COLS: u32 = 64;
const GRID_ROWS: u32 = 32;

/// Style parameters shared by every card.
#[derive(Debug, Copy, Clone)]
pub struct CardStyle {
    pub image_fit: ImageFit,
    pub clip_shape: ClipShape,
    /// Corner radius in normalized plane units (`ClipShape::Rounded`).
    pub corner_radius: f32,
    /// Placeholder fill and contain-mode letterbox color.
    pub fill: ColorRgba,
}

/// Renderer for gallery cards.
///
/// One pipeline and one shared grid mesh; per card a uniform buffer, a bind
/// group, and (once its artwork arrives) a texture. Draws one indexed call
/// per card.
pub struct CardRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,

    grid_vbo: Option<wgpu::Buffer>,
    grid_ibo: Option<wgpu::Buffer>,
    index_count: u32,

    /// 1×1 white texture bound while a card's artwork is still loading.
    placeholder: Option<(wgpu::Texture, wgpu::TextureView)>,

    slots: Vec<CardSlot>,
}

struct CardSlot {
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: Option<(wgpu::Texture, wgpu::TextureView)>,
    image_size: [f32; 2],
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            sampler: None,
            grid_vbo: None,
            grid_ibo: None,
            index_count: 0,
            placeholder: None,
            slots: Vec::new(),
        }
    }
}

impl CardRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates pipeline, shared geometry, and per-card slots for a pool of
    /// `count` cards. Call before installing images or rendering each frame;
    /// everything already in place is a no-op.
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, count: usize) {
        self.ensure_gpu_state(ctx);
        self.ensure_slots(ctx, count);
    }

    /// Installs decoded artwork for one card slot.
    ///
    /// Creates the texture, uploads the pixels, and rebinds the slot. Safe to
    /// call at any frame; until then the slot renders the placeholder fill.
    /// Out-of-range indices (stale completions) are ignored.
    pub fn install_image(&mut self, ctx: &RenderCtx<'_>, image: &LoadedImage) {
        if image.index >= self.slots.len() {
            log::debug!("dropping stale image completion for slot {}", image.index);
            return;
        }
        if image.width == 0 || image.height == 0 {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vitrine card artwork"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let slot = &mut self.slots[image.index];
        slot.image_size = [image.width as f32, image.height as f32];
        slot.texture = Some((texture, view));
        self.rebind_slot(ctx, image.index);
    }

    /// Renders all cards. Uniforms are rewritten every frame; geometry and
    /// pipeline are reused.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        cards: &[Card],
        view_proj: Mat4,
        style: &CardStyle,
    ) {
        self.prepare(ctx, cards.len());

        for (card, slot) in cards.iter().zip(&self.slots) {
            let uniforms = CardUniforms {
                view_proj: view_proj.to_cols_array_2d(),
                model: card.model_matrix().to_cols_array_2d(),
                plane_size: [card.plane_width, card.plane_height],
                image_size: slot.image_size,
                phase_speed: [card.phase, card.speed],
                radius_fit: [
                    style.corner_radius,
                    match style.image_fit {
                        ImageFit::Cover => 0.0,
                        ImageFit::Contain => 1.0,
                    },
                ],
                shape_tex: [
                    match style.clip_shape {
                        ClipShape::Rounded => 0.0,
                        ClipShape::Circular => 1.0,
                    },
                    if slot.texture.is_some() { 1.0 } else { 0.0 },
                ],
                _pad: [0.0; 2],
                fill: [style.fill.r, style.fill.g, style.fill.b, style.fill.a],
            };
            ctx.queue.write_buffer(&slot.ubo, 0, bytemuck::bytes_of(&uniforms));
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(grid_vbo) = self.grid_vbo.as_ref() else { return };
        let Some(grid_ibo) = self.grid_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vitrine card pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, grid_vbo.slice(..));
        rpass.set_index_buffer(grid_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for slot in &self.slots[..cards.len().min(self.slots.len())] {
            rpass.set_bind_group(0, &slot.bind_group, &[]);
            rpass.draw_indexed(0..self.index_count, 0, 0..1);
        }
    }

    // ── private helpers ───────────────────────────────────────────────────

    fn ensure_gpu_state(&mut self, ctx: &RenderCtx<'_>) {
        self.ensure_pipeline(ctx);
        self.ensure_geometry(ctx);
        self.ensure_shared(ctx);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vitrine card shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/card.wgsl").into()),
        });

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("vitrine card bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(card_ubo_min_binding_size()),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout =
            ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("vitrine card pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vitrine card pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PlaneVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(super::premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        // Bind groups reference the old layout; rebuild them lazily.
        self.slots.clear();
    }

    fn ensure_geometry(&mut self, ctx: &RenderCtx<'_>) {
        if self.grid_vbo.is_some() && self.grid_ibo.is_some() {
            return;
        }

        let (vertices, indices) = mesh::build_grid(GRID_COLS, GRID_ROWS);
        self.index_count = indices.len() as u32;

        self.grid_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vitrine card grid vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.grid_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vitrine card grid ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("vitrine card sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            }));
        }

        if self.placeholder.is_none() {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("vitrine card placeholder"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &[255u8; 4],
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4),
                    rows_per_image: Some(1),
                },
                wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
            );
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.placeholder = Some((texture, view));
        }
    }

    fn ensure_slots(&mut self, ctx: &RenderCtx<'_>, count: usize) {
        if self.slots.len() == count {
            return;
        }

        self.slots.clear();
        for _ in 0..count {
            let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("vitrine card ubo"),
                size: std::mem::size_of::<CardUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.build_bind_group(ctx, &ubo, None);
            self.slots.push(CardSlot {
                ubo,
                bind_group,
                texture: None,
                image_size: [0.0; 2],
            });
        }
    }

    fn rebind_slot(&mut self, ctx: &RenderCtx<'_>, index: usize) {
        let slot = &self.slots[index];
        let view = slot.texture.as_ref().map(|(_, view)| view);
        let bind_group = self.build_bind_group(ctx, &slot.ubo, view);
        self.slots[index].bind_group = bind_group;
    }

    fn build_bind_group(
        &self,
        ctx: &RenderCtx<'_>,
        ubo: &wgpu::Buffer,
        texture_view: Option<&wgpu::TextureView>,
    ) -> wgpu::BindGroup {
        let layout = self
            .bind_group_layout
            .as_ref()
            .expect("pipeline created before bind groups");
        let sampler = self.sampler.as_ref().expect("sampler created before bind groups");
        let placeholder = &self
            .placeholder
            .as_ref()
            .expect("placeholder created before bind groups")
            .1;

        let view = texture_view.unwrap_or(placeholder);

        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vitrine card bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Uniform layout (192 bytes), matching `shaders/card.wgsl`:
///
///  offset   0  view_proj    mat4x4f
///  offset  64  model        mat4x4f
///  offset 128  plane_size   vec2f (world units)
///  offset 136  image_size   vec2f (source pixels; 0 until artwork arrives)
///  offset 144  phase_speed  vec2f (.x idle phase, .y scroll speed)
///  offset 152  radius_fit   vec2f (.x corner radius, .y 0=cover 1=contain)
///  offset 160  shape_tex    vec2f (.x 0=rounded 1=circular, .y has_texture)
///  offset 168  _pad         vec2f
///  offset 176  fill         vec4f
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CardUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    plane_size: [f32; 2],
    image_size: [f32; 2],
    phase_speed: [f32; 2],
    radius_fit: [f32; 2],
    shape_tex: [f32; 2],
    _pad: [f32; 2],
    fill: [f32; 4],
}

fn card_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<CardUniforms>() as u64)
        .expect("CardUniforms has non-zero size by construction")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<CardUniforms>(), 192);
        assert_eq!(std::mem::size_of::<CardUniforms>() % 16, 0);
    }

    // CPU mirrors of the shader's fit formulas, kept in lockstep with
    // shaders/card.wgsl.

    fn cover_scale(plane: [f32; 2], image: [f32; 2]) -> [f32; 2] {
        let pa = plane[0] / plane[1];
        let ia = image[0] / image[1];
        [(pa / ia).min(1.0), (ia / pa).min(1.0)]
    }

    fn contain_scale(plane: [f32; 2], image: [f32; 2]) -> [f32; 2] {
        let pa = plane[0] / plane[1];
        let ia = image[0] / image[1];
        [(pa / ia).max(1.0), (ia / pa).max(1.0)]
    }

    #[test]
    fn cover_crops_the_wider_axis() {
        // Image wider than plane: horizontal UV range shrinks (cropped),
        // vertical spans the full texture.
        let scale = cover_scale([1.0, 1.0], [2.0, 1.0]);
        assert!(scale[0] < 1.0);
        assert_eq!(scale[1], 1.0);
    }

    #[test]
    fn contain_letterboxes_exactly_one_axis() {
        // Image narrower than plane: horizontal UV exceeds [0, 1] (painted
        // fill), vertical stays inside.
        let scale = contain_scale([2.0, 1.0], [1.0, 1.0]);
        assert!(scale[0] > 1.0);
        assert_eq!(scale[1], 1.0);
    }

    #[test]
    fn matching_aspects_need_no_remap() {
        assert_eq!(cover_scale([2.0, 1.0], [4.0, 2.0]), [1.0, 1.0]);
        assert_eq!(contain_scale([2.0, 1.0], [4.0, 2.0]), [1.0, 1.0]);
    }
}
