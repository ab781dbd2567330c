use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::render::TextRun;

const ATLAS_SIZE: u32 = 2048;
const GLYPH_PADDING: u32 = 1; // pixels between glyphs in the atlas

#[derive(Debug, Copy, Clone)]
struct CachedGlyph {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
}

/// One glyph quad (48 bytes), drawn as an instance of six vertices.
///
///  offset  0  dst_min  [f32; 2]   loc 0
///  offset  8  dst_max  [f32; 2]   loc 1
///  offset 16  uv_min   [f32; 2]   loc 2
///  offset 24  uv_max   [f32; 2]   loc 3
///  offset 32  color    [f32; 4]   loc 4
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2, // dst_min
        1 => Float32x2, // dst_max
        2 => Float32x2, // uv_min
        3 => Float32x2, // uv_max
        4 => Float32x4  // color
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// R8 glyph atlas shared by every window of a context.
///
/// Glyphs are rasterized with fontdue on first use and shelf-packed; the key
/// (`GlyphRasterConfig`) covers font identity, glyph index and pixel size.
pub(crate) struct TextAtlas {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    full: bool,
    glyphs: HashMap<GlyphRasterConfig, CachedGlyph>,
    layout: Layout<()>,
}

impl TextAtlas {
    pub(crate) fn new(device: &wgpu::Device, bind_layout: &wgpu::BindGroupLayout) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kiln text atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kiln text sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kiln text atlas bind group"),
            layout: bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            bind_group,
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
            full: false,
            glyphs: HashMap::new(),
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        }
    }

    #[inline]
    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Lays out `run` with its baseline-left corner at `(x, baseline)` in
    /// top-left framebuffer pixels and appends one instance per visible glyph.
    ///
    /// `color` must already be in the target's colour space.
    pub(crate) fn layout_run(
        &mut self,
        queue: &wgpu::Queue,
        run: &TextRun,
        (x, baseline): (f32, f32),
        (fb_w, fb_h): (u32, u32),
        color: [f32; 4],
        out: &mut Vec<GlyphInstance>,
    ) {
        let font = run.font.raw();
        self.layout.reset(&LayoutSettings {
            x,
            y: baseline - run.font.ascent(run.size),
            ..LayoutSettings::default()
        });
        self.layout.append(&[font], &TextStyle::new(&run.text, run.size, 0));

        // Snapshot so the borrow on `self.layout` ends before placing glyphs.
        let placed: Vec<(GlyphRasterConfig, f32, f32, usize, usize)> = self
            .layout
            .glyphs()
            .iter()
            .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
            .map(|g| (g.key, g.x, g.y, g.width, g.height))
            .collect();

        let (sx, sy) = (2.0 / fb_w.max(1) as f32, 2.0 / fb_h.max(1) as f32);
        for (key, gx, gy, w, h) in placed {
            if !self.glyphs.contains_key(&key) {
                let (metrics, bitmap) = font.rasterize_config(key);
                if metrics.width == 0 || metrics.height == 0 {
                    continue;
                }
                if let Some(entry) =
                    self.place(queue, &bitmap, metrics.width as u32, metrics.height as u32)
                {
                    self.glyphs.insert(key, entry);
                }
            }
            let Some(cached) = self.glyphs.get(&key) else {
                continue;
            };

            out.push(GlyphInstance {
                dst_min: [gx * sx - 1.0, 1.0 - gy * sy],
                dst_max: [(gx + w as f32) * sx - 1.0, 1.0 - (gy + h as f32) * sy],
                uv_min: cached.uv_min,
                uv_max: cached.uv_max,
                color,
            });
        }
    }

    fn place(&mut self, queue: &wgpu::Queue, bitmap: &[u8], w: u32, h: u32) -> Option<CachedGlyph> {
        if self.full {
            return None;
        }

        let (gx, gy) = match shelf_slot(self.cursor_x, self.cursor_y, self.row_height, w, h) {
            Some(slot) => slot,
            None => {
                log::warn!(
                    "glyph atlas is full ({ATLAS_SIZE}x{ATLAS_SIZE}); some glyphs will not be rendered"
                );
                self.full = true;
                return None;
            }
        };
        if gy != self.cursor_y {
            self.row_height = 0;
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: gx, y: gy, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        self.cursor_x = gx + w + GLYPH_PADDING;
        self.cursor_y = gy;
        self.row_height = self.row_height.max(h);

        let atlas = ATLAS_SIZE as f32;
        Some(CachedGlyph {
            uv_min: [gx as f32 / atlas, gy as f32 / atlas],
            uv_max: [(gx + w) as f32 / atlas, (gy + h) as f32 / atlas],
        })
    }
}

/// Top-left corner for a `w × h` glyph given the shelf cursor, starting a new
/// shelf when the current one is too narrow. `None` once the atlas is full.
fn shelf_slot(cursor_x: u32, cursor_y: u32, row_height: u32, w: u32, h: u32) -> Option<(u32, u32)> {
    let (mut x, mut y) = (cursor_x, cursor_y);
    if x + w + GLYPH_PADDING > ATLAS_SIZE {
        y += row_height + GLYPH_PADDING;
        x = GLYPH_PADDING;
    }
    if y + h + GLYPH_PADDING > ATLAS_SIZE || x + w + GLYPH_PADDING > ATLAS_SIZE {
        return None;
    }
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_instance_is_48_bytes() {
        assert_eq!(size_of::<GlyphInstance>(), 48);
    }

    #[test]
    fn shelf_wraps_to_next_row() {
        assert_eq!(shelf_slot(1, 1, 0, 10, 10), Some((1, 1)));
        assert_eq!(shelf_slot(ATLAS_SIZE - 5, 1, 12, 10, 10), Some((1, 14)));
    }

    #[test]
    fn shelf_reports_full_atlas() {
        assert_eq!(shelf_slot(ATLAS_SIZE - 5, ATLAS_SIZE - 20, 12, 10, 10), None);
        assert_eq!(shelf_slot(1, 1, 0, ATLAS_SIZE, 10), None);
    }
}
