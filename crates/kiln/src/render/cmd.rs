use std::fmt;
use std::rc::Rc;

use glam::Mat4;

use crate::colormap::ColorMapRef;
use crate::coords::PixelRect;
use crate::device::BindingId;
use crate::paint::Color;
use crate::text::Font;

/// Primitive assembly for a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
}

/// How the bound buffer is interpreted by the backend's shaders.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawKind {
    /// Each vertex reads an `(x, y)` pair, or `(x, y, z)` for three-component
    /// bindings.
    Vertices,
    /// Each instance reads one scalar from the binding and expands it into a bar
    /// (6 vertices) spanning `[i, i + 1) × [0, value)` in data space.
    Bars,
    /// Triangulated height grid: the binding holds `(x, y, z)` points row by
    /// row, `columns` per row, and each grid quad expands into 6 vertices.
    /// Depth tested.
    Surface,
}

/// A single recorded draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub binding: BindingId,
    pub kind: DrawKind,
    pub topology: Topology,
    /// First vertex read from the binding.
    pub first: u32,
    pub vertices: u32,
    pub instances: u32,
    /// Data space → normalized device coordinates of the current viewport.
    pub transform: Mat4,
    pub color: Color,
    /// Colormap used to shade bars; `None` draws with `color`.
    pub colormap: Option<ColorMapRef>,
    /// Value range mapped onto the colormap (`[min, max]`).
    pub value_range: [f32; 2],
    /// Points per grid row of a `Surface` draw; 0 for other kinds.
    pub columns: u32,
}

impl DrawCall {
    /// Plain vertex draw in a solid colour.
    pub fn vertices(
        binding: BindingId,
        topology: Topology,
        first: u32,
        vertices: u32,
        transform: Mat4,
        color: Color,
    ) -> Self {
        Self {
            binding,
            kind: DrawKind::Vertices,
            topology,
            first,
            vertices,
            instances: 1,
            transform,
            color,
            colormap: None,
            value_range: [0.0, 1.0],
            columns: 0,
        }
    }

    /// One bar per instance; `colormap` shades bars by height over `value_range`.
    pub fn bars(
        binding: BindingId,
        bars: u32,
        transform: Mat4,
        color: Color,
        colormap: Option<ColorMapRef>,
        value_range: [f32; 2],
    ) -> Self {
        Self {
            binding,
            kind: DrawKind::Bars,
            topology: Topology::TriangleList,
            first: 0,
            vertices: 6,
            instances: bars,
            transform,
            color,
            colormap,
            value_range,
            columns: 0,
        }
    }

    /// Height grid of `columns × rows` points, shaded over `value_range` (the z
    /// extent) when `colormap` is set.
    pub fn surface(
        binding: BindingId,
        columns: u32,
        rows: u32,
        transform: Mat4,
        color: Color,
        colormap: Option<ColorMapRef>,
        value_range: [f32; 2],
    ) -> Self {
        let quads = columns.saturating_sub(1) * rows.saturating_sub(1);
        Self {
            binding,
            kind: DrawKind::Surface,
            topology: Topology::TriangleList,
            first: 0,
            vertices: 6 * quads,
            instances: 1,
            transform,
            color,
            colormap,
            value_range,
            columns,
        }
    }
}

/// A run of text positioned in pixels relative to the current viewport's
/// bottom-left corner. `origin` is the left end of the baseline.
#[derive(Clone)]
pub struct TextRun {
    pub font: Rc<Font>,
    pub text: String,
    pub origin: [f32; 2],
    pub size: f32,
    pub color: Color,
}

impl fmt::Debug for TextRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextRun")
            .field("text", &self.text)
            .field("origin", &self.origin)
            .field("size", &self.size)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TextRun {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.font, &other.font)
            && self.text == other.text
            && self.origin == other.origin
            && self.size == other.size
            && self.color == other.color
    }
}

/// Backend-agnostic command stream recorded by a window during a frame.
///
/// Commands execute in order; `Viewport` and `Scissor` are state changes that
/// apply to every following command until replaced.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Maps NDC onto this framebuffer rectangle.
    Viewport(PixelRect),
    /// Restricts all writes to the rectangle; `None` disables clipping.
    Scissor(Option<PixelRect>),
    /// Fills the current scissor region (or the whole framebuffer) with `color`.
    Clear { color: Color, depth: bool },
    Draw(DrawCall),
    Text(TextRun),
}
