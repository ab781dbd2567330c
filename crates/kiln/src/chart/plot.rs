use crate::colormap::ColorMapRef;
use crate::coords::PixelRect;
use crate::device::{DataType, StepMode, VertexLayout};
use crate::error::Result;
use crate::paint::Color;
use crate::render::{DrawCall, RenderCtx, Topology};
use crate::window::{Window, WindowId};

use super::axes::{chart_transform, plot_area};
use super::base::{impl_chart_common, ChartBase};
use super::Renderable;

/// How a [`Plot`] connects its points.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PlotType {
    /// Polyline through the points in order.
    #[default]
    Line,
    /// Unconnected points.
    Scatter,
}

impl PlotType {
    fn topology(self) -> Topology {
        match self {
            PlotType::Line => Topology::LineStrip,
            PlotType::Scatter => Topology::PointList,
        }
    }
}

/// 2D line or scatter plot of `(x, y)` points.
#[derive(Debug)]
pub struct Plot {
    base: ChartBase,
    num_points: u32,
    plot_type: PlotType,
}

impl Plot {
    pub fn new(
        window: &Window,
        num_points: u32,
        data_type: DataType,
        plot_type: PlotType,
    ) -> Result<Self> {
        let layout = VertexLayout::new(data_type, 2, StepMode::Vertex);
        let base = ChartBase::new(
            window,
            data_type,
            2 * u64::from(num_points),
            layout,
            "kiln plot",
        )?;
        Ok(Self { base, num_points, plot_type })
    }

    #[inline]
    pub fn num_points(&self) -> u32 {
        self.num_points
    }

    #[inline]
    pub fn plot_type(&self) -> PlotType {
        self.plot_type
    }

    pub fn set_plot_type(&mut self, plot_type: PlotType) {
        self.plot_type = plot_type;
    }

    pub fn set_color(&mut self, color: Color) {
        self.base.set_color(color);
    }
}

impl_chart_common!(Plot);

impl Renderable for Plot {
    fn set_color_map_params(&mut self, colormap: ColorMapRef) {
        self.base.set_colormap(colormap);
    }

    fn render(&mut self, ctx: &mut RenderCtx<'_>, window: WindowId, viewport: PixelRect) -> Result<()> {
        let binding = self.base.begin(ctx, window)?;
        self.base.take_colormap();
        let transform = chart_transform(self.base.limits(), viewport);

        ctx.commands.push_clip(plot_area(viewport));
        ctx.commands.draw(DrawCall::vertices(
            binding,
            self.plot_type.topology(),
            0,
            self.num_points,
            transform,
            self.base.color(),
        ));
        ctx.commands.pop_clip();

        self.base.render_frame(ctx, window, viewport)
    }
}
