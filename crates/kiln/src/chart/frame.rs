use std::fmt;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::coords::PixelRect;
use crate::device::{DataType, GpuContext, StepMode, VertexLayout};
use crate::error::Result;
use crate::paint::Color;
use crate::render::{CommandList, DrawCall, RenderCtx, TextRun, Topology};
use crate::text::Font;
use crate::window::WindowId;

use super::axes::{data_area, AxisLimits, CHART_MARGINS};
use super::{BindingCache, GeometryBuffer};

/// Tick intervals per axis; each axis gets `TICK_INTERVALS + 1` ticks.
const TICK_INTERVALS: u32 = 4;

const LABEL_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 14.0;
const FRAME_COLOR: Color = Color::BLACK;

const BORDER_VERTICES: u32 = 8;
const TICK_VERTICES: u32 = 2 * (TICK_INTERVALS + 1);

/// Border, ticks, tick labels and axis titles around a chart's plot area.
///
/// Geometry lives in a unit square (`[0, 1]²`, ticks pointing to −1) uploaded
/// once; per-frame transforms stretch it over the data area of the viewport.
pub struct ChartFrame {
    bindings: BindingCache,
    geometry: GeometryBuffer,
    limits: AxisLimits,
    x_title: String,
    y_title: String,
}

impl ChartFrame {
    pub fn new(gpu: &Rc<dyn GpuContext>) -> Result<Self> {
        let vertices = frame_vertices();
        let geometry = GeometryBuffer::new(
            gpu,
            DataType::F32,
            vertices.len() as u64,
            "kiln chart frame",
        )?;
        geometry.upload(&vertices)?;

        let layout = VertexLayout::new(DataType::F32, 2, StepMode::Vertex);
        let bindings = BindingCache::new(gpu, geometry.id(), layout);
        Ok(Self {
            bindings,
            geometry,
            limits: AxisLimits::default(),
            x_title: String::new(),
            y_title: String::new(),
        })
    }

    #[inline]
    pub fn limits(&self) -> AxisLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: AxisLimits) {
        self.limits = limits;
    }

    pub fn titles(&self) -> (&str, &str) {
        (&self.x_title, &self.y_title)
    }

    pub fn set_titles(&mut self, x: &str, y: &str) {
        self.x_title = x.to_string();
        self.y_title = y.to_string();
    }

    #[inline]
    pub fn bindings(&self) -> &BindingCache {
        &self.bindings
    }

    /// Records the decoration for `viewport` into the current frame.
    pub fn render(
        &mut self,
        ctx: &mut RenderCtx<'_>,
        window: WindowId,
        viewport: PixelRect,
    ) -> Result<()> {
        let binding = self.bindings.resolve(window)?;

        let (vpw, vph) = (viewport.width.max(1) as f32, viewport.height.max(1) as f32);
        let (x, y, w, h) = data_area(viewport.width, viewport.height);
        let tick = CHART_MARGINS.tick as f32;

        let origin = Vec3::new(2.0 * x / vpw - 1.0, 2.0 * y / vph - 1.0, 0.0);
        let border = Mat4::from_translation(origin)
            * Mat4::from_scale(Vec3::new(2.0 * w / vpw, 2.0 * h / vph, 1.0));
        let x_ticks = Mat4::from_translation(origin)
            * Mat4::from_scale(Vec3::new(2.0 * w / vpw, 2.0 * tick / vph, 1.0));
        let y_ticks = Mat4::from_translation(origin)
            * Mat4::from_scale(Vec3::new(2.0 * tick / vpw, 2.0 * h / vph, 1.0));

        let draws = [
            (0, BORDER_VERTICES, border),
            (BORDER_VERTICES, TICK_VERTICES, x_ticks),
            (BORDER_VERTICES + TICK_VERTICES, TICK_VERTICES, y_ticks),
        ];
        for (first, count, transform) in draws {
            ctx.commands.draw(DrawCall::vertices(
                binding,
                Topology::LineList,
                first,
                count,
                transform,
                FRAME_COLOR,
            ));
        }

        match ctx.font {
            Some(font) => self.record_labels(ctx.commands, font, (x, y, w, h)),
            None => log::trace!("no font set, chart labels skipped"),
        }
        Ok(())
    }

    fn record_labels(
        &self,
        commands: &mut CommandList,
        font: &Rc<Font>,
        (x, y, w, h): (f32, f32, f32, f32),
    ) {
        let tick = CHART_MARGINS.tick as f32;
        let l = self.limits;
        let mut text = |text: String, origin: [f32; 2], size: f32| {
            commands.text(TextRun {
                font: Rc::clone(font),
                text,
                origin,
                size,
                color: FRAME_COLOR,
            });
        };

        for i in 0..=TICK_INTERVALS {
            let t = i as f32 / TICK_INTERVALS as f32;

            let label = format_tick(l.xmin + t * (l.xmax - l.xmin));
            let (lw, _) = font.measure(&label, LABEL_SIZE);
            text(label, [x + t * w - lw / 2.0, y - tick - LABEL_SIZE - 2.0], LABEL_SIZE);

            let label = format_tick(l.ymin + t * (l.ymax - l.ymin));
            let (lw, _) = font.measure(&label, LABEL_SIZE);
            text(
                label,
                [x - tick - 3.0 - lw, y + t * h - LABEL_SIZE * 0.35],
                LABEL_SIZE,
            );
        }

        if !self.x_title.is_empty() {
            let (tw, _) = font.measure(&self.x_title, TITLE_SIZE);
            text(self.x_title.clone(), [x + (w - tw) / 2.0, 2.0], TITLE_SIZE);
        }

        // No rotated text: the y title is stacked one glyph per line.
        let chars: Vec<char> = self.y_title.chars().collect();
        let top = y + h / 2.0 + chars.len() as f32 * TITLE_SIZE / 2.0;
        for (i, c) in chars.iter().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            text(c.to_string(), [4.0, top - (i + 1) as f32 * TITLE_SIZE], TITLE_SIZE);
        }
    }
}

impl fmt::Debug for ChartFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartFrame")
            .field("limits", &self.limits)
            .field("x_title", &self.x_title)
            .field("y_title", &self.y_title)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

/// Unit-square line list: border, then x ticks, then y ticks.
fn frame_vertices() -> Vec<f32> {
    let mut v = vec![
        0.0, 0.0, 1.0, 0.0, //
        1.0, 0.0, 1.0, 1.0, //
        1.0, 1.0, 0.0, 1.0, //
        0.0, 1.0, 0.0, 0.0,
    ];
    for i in 0..=TICK_INTERVALS {
        let t = i as f32 / TICK_INTERVALS as f32;
        v.extend_from_slice(&[t, 0.0, t, -1.0]);
    }
    for i in 0..=TICK_INTERVALS {
        let t = i as f32 / TICK_INTERVALS as f32;
        v.extend_from_slice(&[0.0, t, -1.0, t]);
    }
    v
}

fn format_tick(value: f32) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(0.01..1000.0).contains(&magnitude) {
        format!("{value:.1e}")
    } else {
        format!("{value:.2}")
    }
}
