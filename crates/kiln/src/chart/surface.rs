use std::fmt;

use glam::{Mat4, Vec3};

use crate::colormap::ColorMapRef;
use crate::coords::PixelRect;
use crate::device::{BufferId, ContextId, DataType, Element, StepMode, VertexLayout};
use crate::error::{Error, Result};
use crate::paint::Color;
use crate::render::{DrawCall, RenderCtx, Topology};
use crate::window::{Window, WindowId};

use super::axes::{surface_transform, AxisLimits3, Camera};
use super::{BindingCache, GeometryBuffer, Renderable};

const OUTLINE_COLOR: Color = Color::BLACK;
const OUTLINE_VERTICES: u32 = 24;

/// 3D height surface over an `x_points × y_points` grid.
///
/// The buffer holds `(x, y, z)` triples row by row (`x_points` per row). Each
/// grid quad is drawn as two depth-tested triangles shaded from the window's
/// colormap by z until a solid colour is set, inside a wireframe box marking the
/// axis limits.
pub struct SurfaceChart {
    context: ContextId,
    // Bindings reference the buffers and are released first.
    bindings: BindingCache,
    outline_bindings: BindingCache,
    geometry: GeometryBuffer,
    outline: GeometryBuffer,

    x_points: u32,
    y_points: u32,
    limits: AxisLimits3,
    camera: Camera,
    color: Color,
    solid: bool,
    colormap: Option<ColorMapRef>,
}

impl SurfaceChart {
    pub fn new(window: &Window, x_points: u32, y_points: u32, data_type: DataType) -> Result<Self> {
        let gpu = window.gpu();
        let points = u64::from(x_points) * u64::from(y_points);
        let geometry = GeometryBuffer::new(gpu, data_type, 3 * points, "kiln surface")?;
        let bindings = BindingCache::new(
            gpu,
            geometry.id(),
            VertexLayout::new(data_type, 3, StepMode::Vertex),
        );

        let edges = box_edges();
        let outline = GeometryBuffer::new(gpu, DataType::F32, edges.len() as u64, "kiln surface box")?;
        outline.upload(&edges)?;
        let outline_bindings = BindingCache::new(
            gpu,
            outline.id(),
            VertexLayout::new(DataType::F32, 3, StepMode::Vertex),
        );

        log::debug!(
            "kiln surface: {x_points}x{y_points} {data_type:?} points in context {}",
            gpu.id().raw()
        );
        Ok(Self {
            context: gpu.id(),
            bindings,
            outline_bindings,
            geometry,
            outline,
            x_points,
            y_points,
            limits: AxisLimits3::default(),
            camera: Camera::default(),
            color: Color::WHITE,
            solid: false,
            colormap: None,
        })
    }

    #[inline]
    pub fn x_points(&self) -> u32 {
        self.x_points
    }

    #[inline]
    pub fn y_points(&self) -> u32 {
        self.y_points
    }

    pub fn set_axes_limits(
        &mut self,
        xmin: f32,
        xmax: f32,
        ymin: f32,
        ymax: f32,
        zmin: f32,
        zmax: f32,
    ) {
        self.limits = AxisLimits3::new(xmin, xmax, ymin, ymax, zmin, zmax);
    }

    #[inline]
    pub fn axes_limits(&self) -> AxisLimits3 {
        self.limits
    }

    #[inline]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Orbits the view; angles in degrees, elevation clamped short of the poles.
    pub fn set_camera(&mut self, azimuth: f32, elevation: f32) {
        self.camera = Camera::new(azimuth, elevation);
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Draws the whole surface in `color` instead of shading from the colormap.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.solid = true;
    }

    pub fn set_color_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.set_color(Color::rgb(r, g, b));
    }

    /// Returns to colormap shading.
    pub fn use_color_map(&mut self) {
        self.solid = false;
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.solid
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.geometry.element()
    }

    /// Size of the geometry buffer in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.geometry.size()
    }

    #[inline]
    pub fn buffer(&self) -> BufferId {
        self.geometry.id()
    }

    /// Number of windows this chart holds a binding for.
    #[inline]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Replaces the start of the point buffer with `data` (`x, y, z` triples).
    pub fn upload<T: Element>(&self, data: &[T]) -> Result<()> {
        self.geometry.upload(data)
    }

    pub fn upload_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.geometry.upload_bytes(bytes)
    }

    /// Unit cube stretched over the axis limits.
    fn box_transform(&self) -> Mat4 {
        let l = self.limits;
        Mat4::from_translation(Vec3::new(l.xmin, l.ymin, l.zmin))
            * Mat4::from_scale(Vec3::new(l.xmax - l.xmin, l.ymax - l.ymin, l.zmax - l.zmin))
    }
}

impl Renderable for SurfaceChart {
    fn set_color_map_params(&mut self, colormap: ColorMapRef) {
        self.colormap = Some(colormap);
    }

    fn render(&mut self, ctx: &mut RenderCtx<'_>, window: WindowId, viewport: PixelRect) -> Result<()> {
        if ctx.gpu.id() != self.context {
            return Err(Error::ForeignContext);
        }
        let binding = self.bindings.resolve(window)?;
        let outline = self.outline_bindings.resolve(window)?;
        let colormap = self.colormap.take().filter(|_| !self.solid);

        let transform = surface_transform(self.limits, self.camera, viewport);
        ctx.commands.draw(DrawCall::surface(
            binding,
            self.x_points,
            self.y_points,
            transform,
            self.color,
            colormap,
            [self.limits.zmin, self.limits.zmax],
        ));
        ctx.commands.draw(DrawCall::vertices(
            outline,
            Topology::LineList,
            0,
            OUTLINE_VERTICES,
            transform * self.box_transform(),
            OUTLINE_COLOR,
        ));
        Ok(())
    }
}

impl fmt::Debug for SurfaceChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceChart")
            .field("x_points", &self.x_points)
            .field("y_points", &self.y_points)
            .field("limits", &self.limits)
            .field("camera", &self.camera)
            .field("geometry", &self.geometry)
            .field("outline", &self.outline)
            .finish_non_exhaustive()
    }
}

/// The 12 edges of the unit cube as a line list.
fn box_edges() -> Vec<f32> {
    let mut v = Vec::with_capacity(3 * OUTLINE_VERTICES as usize);
    for a in [0.0f32, 1.0] {
        for b in [0.0f32, 1.0] {
            v.extend_from_slice(&[0.0, a, b, 1.0, a, b]);
            v.extend_from_slice(&[a, 0.0, b, a, 1.0, b]);
            v.extend_from_slice(&[a, b, 0.0, a, b, 1.0]);
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Command, DrawKind};
    use crate::testing::{mock_session, mock_window};

    #[test]
    fn box_has_twelve_unit_edges() {
        let v = box_edges();
        assert_eq!(v.len() as u32, 3 * OUTLINE_VERTICES);
        for edge in v.chunks(6) {
            let d: f32 = (0..3).map(|i| (edge[i + 3] - edge[i]).abs()).sum();
            assert_eq!(d, 1.0);
        }
    }

    #[test]
    fn surface_records_grid_triangles_then_box() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 400, 400, None);
        let mut surface = SurfaceChart::new(&window, 5, 4, DataType::F32).unwrap();
        assert_eq!(surface.size(), 5 * 4 * 3 * 4);
        surface.set_axes_limits(0.0, 4.0, 0.0, 3.0, -2.0, 2.0);

        window.draw(&mut surface).unwrap();

        let draws: Vec<_> = log
            .last_frame()
            .unwrap()
            .into_iter()
            .filter_map(|c| match c {
                Command::Draw(call) => Some(call),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].kind, DrawKind::Surface);
        assert_eq!(draws[0].columns, 5);
        assert_eq!(draws[0].vertices, 6 * 4 * 3);
        assert_eq!(draws[0].value_range, [-2.0, 2.0]);
        assert!(draws[0].colormap.is_some());
        assert_eq!(draws[1].topology, Topology::LineList);
        assert_eq!(draws[1].vertices, OUTLINE_VERTICES);

        // chart points and box, one binding each
        assert_eq!(log.live_bindings(), 2);
        assert_eq!(surface.binding_count(), 1);
    }

    #[test]
    fn solid_surface_skips_colormap() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 200, 200, None);
        let mut surface = SurfaceChart::new(&window, 2, 2, DataType::I16).unwrap();
        surface.set_color_rgb(0.0, 1.0, 0.0);
        window.draw(&mut surface).unwrap();

        let frame = log.last_frame().unwrap();
        let call = frame
            .iter()
            .find_map(|c| match c {
                Command::Draw(call) if call.kind == DrawKind::Surface => Some(call.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(call.colormap, None);
        assert_eq!(call.color, Color::GREEN);
        assert_eq!(call.vertices, 6);
    }

    #[test]
    fn degenerate_grid_draws_no_triangles() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 200, 200, None);
        let mut surface = SurfaceChart::new(&window, 1, 10, DataType::F32).unwrap();
        window.draw(&mut surface).unwrap();

        let frame = log.last_frame().unwrap();
        assert!(frame.iter().any(|c| matches!(
            c,
            Command::Draw(call) if call.kind == DrawKind::Surface && call.vertices == 0
        )));
    }

    #[test]
    fn wide_types_are_rejected() {
        let (session, _log) = mock_session();
        let window = mock_window(&session, 200, 200, None);
        let err = SurfaceChart::new(&window, 4, 4, DataType::F64).unwrap_err();
        assert_eq!(err, Error::UnsupportedElementType(DataType::F64));
    }
}
