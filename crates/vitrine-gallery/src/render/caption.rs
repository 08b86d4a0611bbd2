use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use vitrine_engine::render::{RenderCtx, RenderTarget};

use crate::caption::CaptionBitmap;

use super::mesh::{self, PlaneVertex};

/// One caption billboard to draw this frame.
#[derive(Debug, Copy, Clone)]
pub struct CaptionDraw {
    /// Card pool index (selects the caption texture slot).
    pub index: usize,
    /// World transform of the billboard center (parent card pose + offset).
    pub model: Mat4,
    /// Billboard size in world units.
    pub size: [f32; 2],
}

/// Renderer for caption billboards.
///
/// Captions are rasterized once on the CPU and uploaded as mipmapped
/// textures; per frame only the tiny uniform buffers are rewritten. Cards
/// whose caption degraded to an empty bitmap simply have no slot texture and
/// are skipped.
pub struct CaptionRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    slots: Vec<CaptionSlot>,
}

struct CaptionSlot {
    ubo: wgpu::Buffer,
    /// Present only when a non-empty caption texture was installed.
    bind_group: Option<wgpu::BindGroup>,
    _texture: Option<wgpu::Texture>,
}

impl Default for CaptionRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            sampler: None,
            quad_vbo: None,
            quad_ibo: None,
            slots: Vec::new(),
        }
    }
}

impl CaptionRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates pipeline, quad geometry, and `count` empty slots.
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, count: usize) {
        self.ensure_pipeline(ctx);
        self.ensure_geometry(ctx);
        self.ensure_sampler(ctx);
        self.ensure_slots(ctx, count);
    }

    /// Uploads a caption bitmap (with its full mip chain) into a slot.
    ///
    /// Empty bitmaps install nothing: the slot stays skippable, which is the
    /// degraded text-rasterization path.
    pub fn install_caption(&mut self, ctx: &RenderCtx<'_>, index: usize, bitmap: &CaptionBitmap) {
        if index >= self.slots.len() || bitmap.is_empty() {
            return;
        }

        let levels = crate::caption::mip_chain(bitmap.width, bitmap.height, &bitmap.rgba);

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vitrine caption texture"),
            size: wgpu::Extent3d {
                width: bitmap.width,
                height: bitmap.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, (w, h, data)) in levels.iter().enumerate() {
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(*h),
                },
                wgpu::Extent3d {
                    width: *w,
                    height: *h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let layout = self
            .bind_group_layout
            .as_ref()
            .expect("pipeline created in prepare");
        let sampler = self.sampler.as_ref().expect("sampler created in prepare");

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vitrine caption bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.slots[index].ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let slot = &mut self.slots[index];
        slot.bind_group = Some(bind_group);
        slot._texture = Some(texture);
    }

    /// Renders all captions with installed textures, one draw per billboard.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        view_proj: Mat4,
        draws: &[CaptionDraw],
    ) {
        if self.pipeline.is_none() || draws.is_empty() {
            return;
        }

        for draw in draws {
            let Some(slot) = self.slots.get(draw.index) else { continue };
            if slot.bind_group.is_none() {
                continue;
            }
            let uniforms = CaptionUniforms {
                view_proj: view_proj.to_cols_array_2d(),
                model: draw.model.to_cols_array_2d(),
                size: draw.size,
                _pad: [0.0; 2],
            };
            ctx.queue.write_buffer(&slot.ubo, 0, bytemuck::bytes_of(&uniforms));
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vitrine caption pass"),
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
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for draw in draws {
            let Some(slot) = self.slots.get(draw.index) else { continue };
            let Some(bind_group) = slot.bind_group.as_ref() else { continue };
            rpass.set_bind_group(0, bind_group, &[]);
            rpass.draw_indexed(0..6, 0, 0..1);
        }
    }

    // ── private helpers ───────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vitrine caption shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/caption.wgsl").into()),
        });

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("vitrine caption bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(caption_ubo_min_binding_size()),
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
                label: Some("vitrine caption pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vitrine caption pipeline"),
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

        // Old-layout bind groups are stale; captions re-install on demand.
        self.slots.clear();
    }

    fn ensure_geometry(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        let (vertices, indices) = mesh::build_grid(1, 1);

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vitrine caption quad vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vitrine caption quad ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("vitrine caption sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            // Trilinear: the supersampled bitmap shrinks a long way on screen.
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        }));
    }

    fn ensure_slots(&mut self, ctx: &RenderCtx<'_>, count: usize) {
        if self.slots.len() == count {
            return;
        }

        self.slots.clear();
        for _ in 0..count {
            let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("vitrine caption ubo"),
                size: std::mem::size_of::<CaptionUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.slots.push(CaptionSlot {
                ubo,
                bind_group: None,
                _texture: None,
            });
        }
    }

}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Uniform layout (144 bytes), matching `shaders/caption.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CaptionUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    size: [f32; 2],
    _pad: [f32; 2],
}

fn caption_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<CaptionUniforms>() as u64)
        .expect("CaptionUniforms has non-zero size by construction")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<CaptionUniforms>(), 144);
        assert_eq!(std::mem::size_of::<CaptionUniforms>() % 16, 0);
    }
}
