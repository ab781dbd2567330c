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

/// Field of 2D vectors, one line segment per point.
///
/// Each point is 4 components `(x0, y0, x1, y1)`: the segment from the
/// point to the tip of its vector.
#[derive(Debug)]
pub struct VectorField {
    base: ChartBase,
    num_points: u32,
}

impl VectorField {
    pub fn new(window: &Window, num_points: u32, data_type: DataType) -> Result<Self> {
        let layout = VertexLayout::new(data_type, 2, StepMode::Vertex);
        let base = ChartBase::new(
            window,
            data_type,
            4 * u64::from(num_points),
            layout,
            "kiln vector field",
        )?;
        Ok(Self { base, num_points })
    }

    #[inline]
    pub fn num_points(&self) -> u32 {
        self.num_points
    }

    pub fn set_color(&mut self, color: Color) {
        self.base.set_color(color);
    }
}

impl_chart_common!(VectorField);

impl Renderable for VectorField {
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
            Topology::LineList,
            0,
            2 * self.num_points,
            transform,
            self.base.color(),
        ));
        ctx.commands.pop_clip();

        self.base.render_frame(ctx, window, viewport)
    }
}
