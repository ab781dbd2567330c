use crate::colormap::ColorMapRef;
use crate::coords::PixelRect;
use crate::device::{BindingId, ContextId, DataType, VertexLayout};
use crate::error::{Error, Result};
use crate::paint::Color;
use crate::render::RenderCtx;
use crate::window::{Window, WindowId};

use super::axes::AxisLimits;
use super::{BindingCache, ChartFrame, GeometryBuffer};

/// State every 2D chart carries: its buffer, per-window bindings, frame
/// decoration and colour.
#[derive(Debug)]
pub(crate) struct ChartBase {
    context: ContextId,
    // Bindings reference the geometry buffer and are released first.
    bindings: BindingCache,
    geometry: GeometryBuffer,
    frame: ChartFrame,
    color: Color,
    /// Set by the window right before `render`, consumed by it.
    colormap: Option<ColorMapRef>,
}

impl ChartBase {
    /// `elements` scalars of `element`, bound per window with `layout`.
    pub(crate) fn new(
        window: &Window,
        element: DataType,
        elements: u64,
        layout: VertexLayout,
        label: &str,
    ) -> Result<Self> {
        let gpu = window.gpu();
        let geometry = GeometryBuffer::new(gpu, element, elements, label)?;
        let bindings = BindingCache::new(gpu, geometry.id(), layout);
        let frame = ChartFrame::new(gpu)?;
        log::debug!(
            "{label}: {} bytes of {element:?} in context {}",
            geometry.size(),
            gpu.id().raw()
        );
        Ok(Self {
            context: gpu.id(),
            bindings,
            geometry,
            frame,
            color: Color::WHITE,
            colormap: None,
        })
    }

    /// Checks the target context and resolves this window's binding.
    pub(crate) fn begin(&mut self, ctx: &RenderCtx<'_>, window: WindowId) -> Result<BindingId> {
        if ctx.gpu.id() != self.context {
            return Err(Error::ForeignContext);
        }
        self.bindings.resolve(window)
    }

    #[inline]
    pub(crate) fn take_colormap(&mut self) -> Option<ColorMapRef> {
        self.colormap.take()
    }

    pub(crate) fn set_colormap(&mut self, colormap: ColorMapRef) {
        self.colormap = Some(colormap);
    }

    pub(crate) fn render_frame(
        &mut self,
        ctx: &mut RenderCtx<'_>,
        window: WindowId,
        viewport: PixelRect,
    ) -> Result<()> {
        self.frame.render(ctx, window, viewport)
    }

    #[inline]
    pub(crate) fn geometry(&self) -> &GeometryBuffer {
        &self.geometry
    }

    #[inline]
    pub(crate) fn bindings(&self) -> &BindingCache {
        &self.bindings
    }

    #[inline]
    pub(crate) fn frame(&self) -> &ChartFrame {
        &self.frame
    }

    #[inline]
    pub(crate) fn frame_mut(&mut self) -> &mut ChartFrame {
        &mut self.frame
    }

    #[inline]
    pub(crate) fn limits(&self) -> AxisLimits {
        self.frame.limits()
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// Accessors and mutators shared by every chart type.
///
/// None of the setters touch the GPU.
macro_rules! impl_chart_common {
    ($chart:ty) => {
        impl $chart {
            pub fn set_axes_limits(&mut self, xmin: f32, xmax: f32, ymin: f32, ymax: f32) {
                self.base
                    .frame_mut()
                    .set_limits($crate::chart::AxisLimits::new(xmin, xmax, ymin, ymax));
            }

            #[inline]
            pub fn axes_limits(&self) -> $crate::chart::AxisLimits {
                self.base.limits()
            }

            pub fn set_axes_titles(&mut self, x: &str, y: &str) {
                self.base.frame_mut().set_titles(x, y);
            }

            pub fn axes_titles(&self) -> (&str, &str) {
                self.base.frame().titles()
            }

            #[inline]
            pub fn color(&self) -> $crate::paint::Color {
                self.base.color()
            }

            /// Components are clamped to `[0, 1]`; alpha is 1.
            pub fn set_color_rgb(&mut self, r: f32, g: f32, b: f32) {
                self.set_color($crate::paint::Color::rgb(r, g, b));
            }

            /// `0xRRGGBBAA`.
            pub fn set_color_hex(&mut self, rgba: u32) {
                self.set_color($crate::paint::Color::from_hex(rgba));
            }

            #[inline]
            pub fn data_type(&self) -> $crate::device::DataType {
                self.base.geometry().element()
            }

            /// Size of the geometry buffer in bytes.
            #[inline]
            pub fn size(&self) -> u64 {
                self.base.geometry().size()
            }

            #[inline]
            pub fn buffer(&self) -> $crate::device::BufferId {
                self.base.geometry().id()
            }

            /// Number of windows this chart holds a binding for.
            #[inline]
            pub fn binding_count(&self) -> usize {
                self.base.bindings().len()
            }

            /// Replaces the start of the geometry buffer with `data`.
            pub fn upload<T: $crate::device::Element>(&self, data: &[T]) -> $crate::Result<()> {
                self.base.geometry().upload(data)
            }

            /// Like [`upload`](Self::upload) for raw little-endian bytes.
            pub fn upload_bytes(&self, bytes: &[u8]) -> $crate::Result<()> {
                self.base.geometry().upload_bytes(bytes)
            }
        }
    };
}

pub(crate) use impl_chart_common;
