use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::device::DataType;
use crate::render::Topology;

use super::text::GlyphInstance;

const CHART_SHADER: &str = include_str!("shaders/chart.wgsl");
const TEXT_SHADER: &str = include_str!("shaders/text.wgsl");

pub(crate) const FLAG_COLORMAP: u32 = 1;
pub(crate) const FLAG_SRGB_TARGET: u32 = 2;

/// Format of every surface's depth attachment.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-draw uniform, bound with a dynamic offset into the frame's arena.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct DrawUniform {
    pub transform: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub range: [f32; 2],
    pub colormap_len: u32,
    pub flags: u32,
    /// Points per row of a surface grid.
    pub columns: u32,
    /// Scalars per vertex of the bound data (2 or 3).
    pub components: u32,
    pub _pad: [u32; 2],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum PipelineKind {
    Vertices,
    Bars,
    Surface,
    Fill,
    Text,
}

/// How a pipeline uses the depth attachment.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum DepthMode {
    /// 2D content: always passes, never writes.
    Ignore,
    /// 3D content: nearer fragments win.
    Test,
    /// Clears: always passes and writes the far plane.
    Reset,
}

impl DepthMode {
    fn state(self) -> wgpu::DepthStencilState {
        let (depth_write_enabled, depth_compare) = match self {
            DepthMode::Ignore => (false, wgpu::CompareFunction::Always),
            DepthMode::Test => (true, wgpu::CompareFunction::Less),
            DepthMode::Reset => (true, wgpu::CompareFunction::Always),
        };
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct PipelineKey {
    pub kind: PipelineKind,
    pub element: DataType,
    pub topology: Topology,
    pub depth: DepthMode,
    pub format: wgpu::TextureFormat,
}

impl PipelineKey {
    /// Fill used for clears after the first; `depth` also resets the depth
    /// attachment under the scissor.
    pub(crate) fn fill(format: wgpu::TextureFormat, depth: bool) -> Self {
        Self {
            kind: PipelineKind::Fill,
            element: DataType::F32,
            topology: Topology::TriangleList,
            depth: if depth { DepthMode::Reset } else { DepthMode::Ignore },
            format,
        }
    }

    pub(crate) fn text(format: wgpu::TextureFormat) -> Self {
        Self {
            kind: PipelineKind::Text,
            element: DataType::F32,
            topology: Topology::TriangleList,
            depth: DepthMode::Ignore,
            format,
        }
    }
}

/// Bind group layouts shared by every pipeline of a context.
pub(crate) struct BindLayouts {
    /// group 0 of chart pipelines: `DrawUniform` with dynamic offset
    pub uniform: wgpu::BindGroupLayout,
    /// groups 1 and 2 of chart pipelines: read-only storage
    pub storage: wgpu::BindGroupLayout,
    /// group 0 of the text pipeline: atlas texture + sampler
    pub atlas: wgpu::BindGroupLayout,
}

impl BindLayouts {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let uniform = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln draw uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(size_of::<DrawUniform>() as u64),
                },
                count: None,
            }],
        });

        let storage = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln storage bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let atlas = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln text atlas bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self { uniform, storage, atlas }
    }
}

/// Lazily built render pipelines, keyed by what they draw and where.
#[derive(Default)]
pub(crate) struct PipelineCache {
    modules: HashMap<DataType, wgpu::ShaderModule>,
    text_module: Option<wgpu::ShaderModule>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    #[inline]
    pub(crate) fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    pub(crate) fn ensure(&mut self, device: &wgpu::Device, layouts: &BindLayouts, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        let pipeline = match key.kind {
            PipelineKind::Text => {
                let module = self.text_module.get_or_insert_with(|| {
                    device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some("kiln text shader"),
                        source: wgpu::ShaderSource::Wgsl(TEXT_SHADER.into()),
                    })
                });
                build_text_pipeline(device, layouts, module, key.format)
            }
            _ => {
                let module = self.modules.entry(key.element).or_insert_with(|| {
                    device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some("kiln chart shader"),
                        source: wgpu::ShaderSource::Wgsl(chart_shader_source(key.element).into()),
                    })
                });
                build_chart_pipeline(device, layouts, module, key)
            }
        };

        log::debug!("pipeline built: {key:?}");
        self.pipelines.insert(key, pipeline);
    }
}

/// Chart shader with `fetch` specialised for `element`.
///
/// Values are little-endian and tightly packed; narrow types are unpacked from
/// their 32-bit word and sign-extended where signed.
pub(crate) fn chart_shader_source(element: DataType) -> String {
    let fetch = match element {
        DataType::F32 => "return bitcast<f32>(data[i]);",
        DataType::I32 => "return f32(bitcast<i32>(data[i]));",
        DataType::U32 => "return f32(data[i]);",
        DataType::U16 => "return f32((data[i / 2u] >> ((i % 2u) * 16u)) & 0xFFFFu);",
        DataType::I16 => {
            "let v = (data[i / 2u] >> ((i % 2u) * 16u)) & 0xFFFFu;\n    \
             return f32(bitcast<i32>(v << 16u) >> 16u);"
        }
        DataType::U8 => "return f32((data[i / 4u] >> ((i % 4u) * 8u)) & 0xFFu);",
        DataType::I8 => {
            "let v = (data[i / 4u] >> ((i % 4u) * 8u)) & 0xFFu;\n    \
             return f32(bitcast<i32>(v << 24u) >> 24u);"
        }
        // Rejected before a binding can exist.
        DataType::F64 | DataType::I64 | DataType::U64 => "return 0.0;",
    };
    CHART_SHADER.replace("{{FETCH}}", fetch)
}

fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::PointList => wgpu::PrimitiveTopology::PointList,
        Topology::LineList => wgpu::PrimitiveTopology::LineList,
        Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
    }
}

fn primitive_state(topology: Topology) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: primitive_topology(topology),
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

fn build_chart_pipeline(
    device: &wgpu::Device,
    layouts: &BindLayouts,
    module: &wgpu::ShaderModule,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("kiln chart pipeline layout"),
        bind_group_layouts: &[&layouts.uniform, &layouts.storage, &layouts.storage],
        immediate_size: 0,
    });

    let entry_point = match key.kind {
        PipelineKind::Vertices => "vs_vertices",
        PipelineKind::Bars => "vs_bars",
        PipelineKind::Surface => "vs_surface",
        _ => "vs_fill",
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("kiln chart pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: key.format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: primitive_state(key.topology),
        depth_stencil: Some(key.depth.state()),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn build_text_pipeline(
    device: &wgpu::Device,
    layouts: &BindLayouts,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("kiln text pipeline layout"),
        bind_group_layouts: &[&layouts.atlas],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("kiln text pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[GlyphInstance::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: primitive_state(Topology::TriangleList),
        depth_stencil: Some(DepthMode::Ignore.state()),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_uniform_matches_wgsl_layout() {
        assert_eq!(size_of::<DrawUniform>(), 112);
    }

    #[test]
    fn only_clears_and_3d_content_write_depth() {
        assert!(!DepthMode::Ignore.state().depth_write_enabled);
        assert!(DepthMode::Test.state().depth_write_enabled);
        assert_eq!(DepthMode::Test.state().depth_compare, wgpu::CompareFunction::Less);
        assert_eq!(
            PipelineKey::fill(wgpu::TextureFormat::Bgra8Unorm, true).depth,
            DepthMode::Reset
        );
        assert_eq!(
            PipelineKey::fill(wgpu::TextureFormat::Bgra8Unorm, false).depth,
            DepthMode::Ignore
        );
    }

    #[test]
    fn every_storable_type_gets_a_fetch() {
        for ty in [
            DataType::F32,
            DataType::I32,
            DataType::U32,
            DataType::I16,
            DataType::U16,
            DataType::I8,
            DataType::U8,
        ] {
            let src = chart_shader_source(ty);
            assert!(!src.contains("{{FETCH}}"));
            assert!(src.contains("fn vs_bars"));
            assert!(src.contains("fn vs_surface"));
        }
    }
}
