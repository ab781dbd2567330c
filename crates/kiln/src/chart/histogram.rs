use crate::colormap::ColorMapRef;
use crate::coords::PixelRect;
use crate::device::{DataType, StepMode, VertexLayout};
use crate::error::Result;
use crate::paint::Color;
use crate::render::{DrawCall, RenderCtx};
use crate::window::{Window, WindowId};

use super::axes::{chart_transform, plot_area, AxisLimits};
use super::base::{impl_chart_common, ChartBase};
use super::Renderable;

/// Bar chart of `num_bins` bin heights.
///
/// Bars fill the plot width in equal slots; the x limits only label the axis.
/// Bars take their colour from the window's colormap by height until a solid
/// colour is set.
#[derive(Debug)]
pub struct Histogram {
    base: ChartBase,
    num_bins: u32,
    solid: bool,
}

impl Histogram {
    pub fn new(window: &Window, num_bins: u32, data_type: DataType) -> Result<Self> {
        let layout = VertexLayout::new(data_type, 1, StepMode::Instance);
        let base = ChartBase::new(
            window,
            data_type,
            u64::from(num_bins),
            layout,
            "kiln histogram",
        )?;
        Ok(Self { base, num_bins, solid: false })
    }

    #[inline]
    pub fn num_bins(&self) -> u32 {
        self.num_bins
    }

    /// Draws every bar in `color` instead of shading from the colormap.
    pub fn set_color(&mut self, color: Color) {
        self.base.set_color(color);
        self.solid = true;
    }

    /// Returns to colormap shading.
    pub fn use_color_map(&mut self) {
        self.solid = false;
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.solid
    }
}

impl_chart_common!(Histogram);

impl Renderable for Histogram {
    fn set_color_map_params(&mut self, colormap: ColorMapRef) {
        self.base.set_colormap(colormap);
    }

    fn render(&mut self, ctx: &mut RenderCtx<'_>, window: WindowId, viewport: PixelRect) -> Result<()> {
        let binding = self.base.begin(ctx, window)?;
        let colormap = self.base.take_colormap().filter(|_| !self.solid);

        let limits = self.base.limits();
        let slots = AxisLimits::new(0.0, self.num_bins as f32, limits.ymin, limits.ymax);
        let transform = chart_transform(slots, viewport);

        ctx.commands.push_clip(plot_area(viewport));
        ctx.commands.draw(DrawCall::bars(
            binding,
            self.num_bins,
            transform,
            self.base.color(),
            colormap,
            [limits.ymin, limits.ymax],
        ));
        ctx.commands.pop_clip();

        self.base.render_frame(ctx, window, viewport)
    }
}
