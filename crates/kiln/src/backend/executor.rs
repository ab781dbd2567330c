use std::ops::Range;

use crate::coords::PixelRect;
use crate::device::{BindingId, BufferId};
use crate::error::{Error, Result};
use crate::paint::Color;
use crate::render::{Command, CommandList, DrawCall, DrawKind, TextRun};

use super::gpu::WgpuContext;
use super::pipeline::{
    DepthMode, DrawUniform, PipelineKey, PipelineKind, DEPTH_FORMAT, FLAG_COLORMAP,
    FLAG_SRGB_TARGET,
};
use super::text::GlyphInstance;

/// The texture a frame is drawn into.
pub(crate) struct FrameTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub size: (u32, u32),
}

/// Per-surface GPU scratch reused across frames: the dynamic-offset uniform
/// arena, the glyph instance buffer and the depth attachment.
#[derive(Default)]
pub(crate) struct FrameArena {
    uniforms: Option<(wgpu::Buffer, wgpu::BindGroup)>,
    uniform_capacity: u64,
    glyphs: Option<wgpu::Buffer>,
    glyph_capacity: u64,
    depth: Option<(wgpu::TextureView, (u32, u32))>,
}

impl FrameArena {
    /// Depth attachment matching the framebuffer, recreated when it resizes.
    fn ensure_depth(&mut self, ctx: &WgpuContext, size: (u32, u32)) {
        if matches!(&self.depth, Some((_, current)) if *current == size) {
            return;
        }
        let texture = ctx.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("kiln depth"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("depth attachment {}x{}", size.0, size.1);
        self.depth = Some((view, size));
    }

    fn ensure_uniforms(&mut self, ctx: &WgpuContext, bytes: u64) {
        if bytes <= self.uniform_capacity && self.uniforms.is_some() {
            return;
        }
        let capacity = bytes.next_power_of_two().max(ctx.uniform_stride() * 16);
        let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln draw uniforms"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let group = ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kiln draw uniforms"),
            layout: &ctx.layouts().uniform,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<DrawUniform>() as u64),
                }),
            }],
        });
        self.uniforms = Some((buffer, group));
        self.uniform_capacity = capacity;
    }

    fn ensure_glyphs(&mut self, ctx: &WgpuContext, bytes: u64) {
        if bytes <= self.glyph_capacity && self.glyphs.is_some() {
            return;
        }
        let capacity = bytes
            .next_power_of_two()
            .max(64 * size_of::<GlyphInstance>() as u64);
        self.glyphs = Some(ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln glyph instances"),
            size: capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.glyph_capacity = capacity;
    }
}

/// A pass-level operation resolved from the command list.
#[derive(Debug)]
enum Op {
    Viewport([f32; 4]),
    Scissor([u32; 4]),
    Draw {
        key: PipelineKey,
        binding: Option<BindingId>,
        colormap: Option<BufferId>,
        uniform: u32,
        vertices: Range<u32>,
        instances: Range<u32>,
    },
    Glyphs(Range<u32>),
}

/// Tracks viewport and scissor while walking the command list.
struct PassState {
    fb: (u32, u32),
    /// Bottom-left origin; text is positioned relative to it.
    viewport: PixelRect,
    viewport_visible: bool,
    scissor_visible: bool,
    scissored: bool,
}

impl PassState {
    fn new(fb: (u32, u32)) -> Self {
        Self {
            fb,
            viewport: PixelRect::from_size(fb.0, fb.1),
            viewport_visible: fb.0 > 0 && fb.1 > 0,
            scissor_visible: true,
            scissored: false,
        }
    }

    fn full_viewport(&self) -> [f32; 4] {
        [0.0, 0.0, self.fb.0 as f32, self.fb.1 as f32]
    }

    fn viewport_op(&self) -> Option<[f32; 4]> {
        self.viewport
            .to_top_left(self.fb.0, self.fb.1)
            .map(|(x, y, w, h)| [x as f32, y as f32, w as f32, h as f32])
    }
}

/// Encodes `commands` into one render pass over `target`.
///
/// Commands are resolved first (pipelines built, uniforms and glyphs staged),
/// then recorded while the context's resource tables are borrowed.
pub(crate) fn encode(
    ctx: &WgpuContext,
    arena: &mut FrameArena,
    target: FrameTarget<'_>,
    commands: &CommandList,
) -> Result<wgpu::CommandBuffer> {
    let srgb = target.format.is_srgb();
    let stride = ctx.uniform_stride();

    let mut state = PassState::new(target.size);
    let mut ops: Vec<Op> = Vec::with_capacity(commands.commands().len());
    let mut uniforms: Vec<u8> = Vec::new();
    let mut glyphs: Vec<GlyphInstance> = Vec::new();
    // Leading full clear: colour and whether it covers depth.
    let mut clear: Option<(Color, bool)> = None;
    let mut drawn = false;

    let mut push_uniform = |u: DrawUniform| -> u32 {
        let offset = uniforms.len();
        uniforms.resize(offset + stride as usize, 0);
        uniforms[offset..offset + size_of::<DrawUniform>()].copy_from_slice(bytemuck::bytes_of(&u));
        offset as u32
    };

    for command in commands.commands() {
        match command {
            Command::Viewport(rect) => {
                state.viewport = *rect;
                match state.viewport_op() {
                    Some(vp) => {
                        state.viewport_visible = true;
                        ops.push(Op::Viewport(vp));
                    }
                    None => state.viewport_visible = false,
                }
            }
            Command::Scissor(rect) => {
                let rect = rect.unwrap_or_else(|| PixelRect::from_size(state.fb.0, state.fb.1));
                state.scissored = rect != PixelRect::from_size(state.fb.0, state.fb.1);
                match rect.to_top_left(state.fb.0, state.fb.1) {
                    Some((x, y, w, h)) if w > 0 && h > 0 => {
                        state.scissor_visible = true;
                        ops.push(Op::Scissor([x, y, w, h]));
                    }
                    _ => state.scissor_visible = false,
                }
            }
            Command::Clear { color, depth } => {
                if !state.scissor_visible {
                    continue;
                }
                if !drawn && !state.scissored {
                    let depth = *depth || clear.is_some_and(|(_, d)| d);
                    clear = Some((*color, depth));
                    continue;
                }
                let key = PipelineKey::fill(target.format, *depth);
                ctx.pipelines().borrow_mut().ensure(ctx.device(), ctx.layouts(), key);
                let uniform = push_uniform(DrawUniform {
                    transform: glam::Mat4::IDENTITY.to_cols_array_2d(),
                    color: color.to_array(),
                    range: [0.0, 1.0],
                    colormap_len: 0,
                    flags: if srgb { FLAG_SRGB_TARGET } else { 0 },
                    columns: 0,
                    components: 0,
                    _pad: [0; 2],
                });
                ops.push(Op::Viewport(state.full_viewport()));
                ops.push(Op::Draw {
                    key,
                    binding: None,
                    colormap: None,
                    uniform,
                    vertices: 0..3,
                    instances: 0..1,
                });
                if let Some(vp) = state.viewport_op() {
                    ops.push(Op::Viewport(vp));
                }
                drawn = true;
            }
            Command::Draw(call) => {
                if !state.viewport_visible || !state.scissor_visible {
                    continue;
                }
                if call.vertices == 0 || call.instances == 0 {
                    continue;
                }
                let op = resolve_draw(ctx, call, target.format, srgb, &mut push_uniform)?;
                ops.push(op);
                drawn = true;
            }
            Command::Text(run) => {
                if !state.scissor_visible || run.text.is_empty() {
                    continue;
                }
                let first = glyphs.len() as u32;
                layout_text(ctx, run, &state, srgb, &mut glyphs);
                let last = glyphs.len() as u32;
                if first == last {
                    continue;
                }
                ctx.pipelines()
                    .borrow_mut()
                    .ensure(ctx.device(), ctx.layouts(), PipelineKey::text(target.format));
                ops.push(Op::Viewport(state.full_viewport()));
                ops.push(Op::Glyphs(first..last));
                if let Some(vp) = state.viewport_op() {
                    ops.push(Op::Viewport(vp));
                }
                drawn = true;
            }
        }
    }

    if !uniforms.is_empty() {
        arena.ensure_uniforms(ctx, uniforms.len() as u64);
        if let Some((buffer, _)) = &arena.uniforms {
            ctx.queue().write_buffer(buffer, 0, &uniforms);
        }
    }
    if !glyphs.is_empty() {
        let bytes: &[u8] = bytemuck::cast_slice(&glyphs);
        arena.ensure_glyphs(ctx, bytes.len() as u64);
        if let Some(buffer) = &arena.glyphs {
            ctx.queue().write_buffer(buffer, 0, bytes);
        }
    }

    let (load, depth_load) = load_ops(clear, srgb);
    arena.ensure_depth(ctx, target.size);

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kiln frame encoder"),
        });

    {
        let pipelines = ctx.pipelines().borrow();
        let atlas = ctx.atlas().borrow();
        let depth_view = arena
            .depth
            .as_ref()
            .map(|(view, _)| view)
            .ok_or(Error::UnknownResource("depth attachment"))?;

        ctx.with_resources(|resources| -> Result<()> {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kiln frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for op in &ops {
                match op {
                    Op::Viewport([x, y, w, h]) => rpass.set_viewport(*x, *y, *w, *h, 0.0, 1.0),
                    Op::Scissor([x, y, w, h]) => rpass.set_scissor_rect(*x, *y, *w, *h),
                    Op::Draw {
                        key,
                        binding,
                        colormap,
                        uniform,
                        vertices,
                        instances,
                    } => {
                        let (Some(pipeline), Some((_, uniform_group))) =
                            (pipelines.get(key), &arena.uniforms)
                        else {
                            continue;
                        };
                        let data = match binding {
                            Some(id) => resources
                                .binding(*id)
                                .ok_or(Error::UnknownResource("binding"))?,
                            None => ctx.empty_storage(),
                        };
                        let ramp = colormap
                            .and_then(|id| resources.colormap(id))
                            .unwrap_or(ctx.empty_storage());

                        rpass.set_pipeline(pipeline);
                        rpass.set_bind_group(0, uniform_group, &[*uniform]);
                        rpass.set_bind_group(1, data, &[]);
                        rpass.set_bind_group(2, ramp, &[]);
                        rpass.draw(vertices.clone(), instances.clone());
                    }
                    Op::Glyphs(range) => {
                        let (Some(pipeline), Some(buffer)) =
                            (pipelines.get(&PipelineKey::text(target.format)), &arena.glyphs)
                        else {
                            continue;
                        };
                        rpass.set_pipeline(pipeline);
                        rpass.set_bind_group(0, atlas.bind_group(), &[]);
                        rpass.set_vertex_buffer(0, buffer.slice(..));
                        rpass.draw(0..6, range.clone());
                    }
                }
            }
            Ok(())
        })?;
    }

    log::trace!("frame encoded: {} ops, {} glyphs", ops.len(), glyphs.len());
    Ok(encoder.finish())
}

fn resolve_draw(
    ctx: &WgpuContext,
    call: &DrawCall,
    format: wgpu::TextureFormat,
    srgb: bool,
    push_uniform: &mut impl FnMut(DrawUniform) -> u32,
) -> Result<Op> {
    let layout = ctx
        .with_binding(call.binding, |_, layout| layout)
        .ok_or(Error::UnknownResource("binding"))?;

    let (kind, depth) = match call.kind {
        DrawKind::Vertices if layout.components == 3 => (PipelineKind::Vertices, DepthMode::Test),
        DrawKind::Vertices => (PipelineKind::Vertices, DepthMode::Ignore),
        DrawKind::Bars => (PipelineKind::Bars, DepthMode::Ignore),
        DrawKind::Surface => (PipelineKind::Surface, DepthMode::Test),
    };
    let key = PipelineKey {
        kind,
        element: layout.element,
        topology: call.topology,
        depth,
        format,
    };
    ctx.pipelines().borrow_mut().ensure(ctx.device(), ctx.layouts(), key);

    let mut flags = if srgb { FLAG_SRGB_TARGET } else { 0 };
    let mut colormap_len = 0;
    if let Some(map) = call.colormap {
        flags |= FLAG_COLORMAP;
        colormap_len = map.len;
    }
    let uniform = push_uniform(DrawUniform {
        transform: call.transform.to_cols_array_2d(),
        color: call.color.to_array(),
        range: call.value_range,
        colormap_len,
        flags,
        columns: call.columns,
        components: layout.components,
        _pad: [0; 2],
    });

    let (vertices, instances) = match call.kind {
        DrawKind::Vertices => (call.first..call.first + call.vertices, 0..call.instances),
        DrawKind::Bars => (0..call.vertices, call.first..call.first + call.instances),
        DrawKind::Surface => (0..call.vertices, 0..1),
    };
    Ok(Op::Draw {
        key,
        binding: Some(call.binding),
        colormap: call.colormap.map(|m| m.buffer),
        uniform,
        vertices,
        instances,
    })
}

fn layout_text(
    ctx: &WgpuContext,
    run: &TextRun,
    state: &PassState,
    srgb: bool,
    out: &mut Vec<GlyphInstance>,
) {
    let (fb_w, fb_h) = state.fb;
    let left = state.viewport.x as f32 + run.origin[0];
    let bottom = state.viewport.y as f32 + run.origin[1];
    let baseline = fb_h as f32 - bottom;

    let mut color = run.color.to_array();
    if srgb {
        for c in &mut color[..3] {
            *c = srgb_to_linear(*c);
        }
    }
    ctx.atlas()
        .borrow_mut()
        .layout_run(ctx.queue(), run, (left, baseline), (fb_w, fb_h), color, out);
}

/// Attachment load ops for a frame whose leading full clear is `clear`.
///
/// Without a leading clear both attachments keep their contents; a clear
/// without depth keeps the previous depth.
fn load_ops(
    clear: Option<(Color, bool)>,
    srgb: bool,
) -> (wgpu::LoadOp<wgpu::Color>, wgpu::LoadOp<f32>) {
    match clear {
        Some((color, depth)) => (
            wgpu::LoadOp::Clear(clear_color(color, srgb)),
            if depth { wgpu::LoadOp::Clear(1.0) } else { wgpu::LoadOp::Load },
        ),
        None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
    }
}

fn clear_color(color: Color, srgb: bool) -> wgpu::Color {
    let [r, g, b, a] = color.to_array();
    let channel = |c: f32| (if srgb { srgb_to_linear(c) } else { c }) as f64;
    wgpu::Color {
        r: channel(r),
        g: channel(g),
        b: channel(b),
        a: a as f64,
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
