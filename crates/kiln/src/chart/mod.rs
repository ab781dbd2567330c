//! Chart primitives and the contract every renderable satisfies.
//!
//! This module is responsible for:
//! - the `Renderable` trait windows draw through
//! - per-window binding caches over fixed-size geometry buffers
//! - axis transforms and the border/tick/label decoration
//! - the 3D camera used by surface charts
//!
//! Charts are created from a window and may be drawn into any window that shares
//! its GPU context.

mod axes;
mod base;
mod bindings;
mod frame;
mod geometry;
mod histogram;
mod plot;
mod surface;
mod vector_field;

pub use axes::{
    axis_scale, chart_transform, data_area, plot_area, surface_transform, AxisLimits,
    AxisLimits3, Camera, Margins, CHART_MARGINS,
};
pub use bindings::BindingCache;
pub use frame::ChartFrame;
pub use geometry::GeometryBuffer;
pub use histogram::Histogram;
pub use plot::{Plot, PlotType};
pub use surface::SurfaceChart;
pub use vector_field::VectorField;

pub use crate::device::{DataType, Element};

use crate::colormap::ColorMapRef;
use crate::coords::PixelRect;
use crate::error::Result;
use crate::render::RenderCtx;
use crate::window::WindowId;

/// Anything a [`crate::Window`] can draw.
///
/// The window calls `set_color_map_params` immediately before every `render`;
/// the pair applies to that call only.
pub trait Renderable {
    fn set_color_map_params(&mut self, colormap: ColorMapRef);

    /// Records this object's draw calls for `window` into `ctx`.
    ///
    /// `viewport` is the target rectangle in framebuffer pixels (the whole
    /// window, or one grid cell).
    fn render(&mut self, ctx: &mut RenderCtx<'_>, window: WindowId, viewport: PixelRect) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::paint::Color;
    use crate::render::{Command, DrawKind, Topology};
    use crate::testing::{mock_session, mock_window};

    #[test]
    fn vector_field_buffer_size_is_fixed() {
        let (session, log) = mock_session();
        let window = mock_window(&session, 200, 200, None);
        let mut field = VectorField::new(&window, 10, DataType::F32).unwrap();
        assert_eq!(field.size(), 4 * 10 * 4);
        assert_eq!(log.buffer_bytes(field.buffer()).unwrap().len(), 160);

        field.set_color_rgb(0.2, 0.4, 0.6);
        field.set_axes_limits(-5.0, 5.0, 0.0, 1.0);
        field.set_axes_titles("x", "y");
        assert_eq!(field.size(), 160);
        assert_eq!(log.buffer_bytes(field.buffer()).unwrap().len(), 160);
        assert_eq!(field.binding_count(), 0);
    }

    #[test]
    fn set_color_rgb_clamps() {
        let (session, _log) = mock_session();
        let window = mock_window(&session, 200, 200, None);
        let mut plot = Plot::new(&window, 4, DataType::I16, PlotType::Line).unwrap();
        plot.set_color_rgb(1.5, -0.25, 0.5);
        assert_eq!(plot.color(), Color::new(1.0, 0.0, 0.5, 1.0));

        plot.set_color_hex(0xFF000080);
        assert_eq!(plot.color(), Color::from_u8(255, 0, 0, 128));
    }

    #[test]
    fn wide_types_are_rejected() {
        let (session, log) = mock_session();
        let window = mock_window(&session, 200, 200, None);
        let before = log.live_buffers();
        let err = VectorField::new(&window, 4, DataType::F64).unwrap_err();
        assert_eq!(err, Error::UnsupportedElementType(DataType::F64));
        assert!(Histogram::new(&window, 4, DataType::U64).is_err());
        assert_eq!(log.live_buffers(), before);
    }

    #[test]
    fn one_binding_per_window() {
        let (session, log) = mock_session();
        let mut a = mock_window(&session, 300, 300, None);
        let mut b = mock_window(&session, 300, 300, Some(&a));
        let mut field = VectorField::new(&a, 8, DataType::I32).unwrap();

        a.draw(&mut field).unwrap();
        a.draw(&mut field).unwrap();
        assert_eq!(field.binding_count(), 1);
        b.draw(&mut field).unwrap();
        assert_eq!(field.binding_count(), 2);

        // chart data and frame decoration, in two windows
        assert_eq!(log.live_bindings(), 4);
        drop(field);
        assert_eq!(log.live_bindings(), 0);
    }

    #[test]
    fn foreign_context_is_refused() {
        let (session, _log) = mock_session();
        let a = mock_window(&session, 300, 300, None);
        let mut b = mock_window(&session, 300, 300, None);
        let mut plot = Plot::new(&a, 8, DataType::F32, PlotType::Scatter).unwrap();
        assert_eq!(b.draw(&mut plot), Err(Error::ForeignContext));
        assert_eq!(plot.binding_count(), 0);
    }

    #[test]
    fn upload_checks_type_and_size() {
        let (session, log) = mock_session();
        let window = mock_window(&session, 300, 300, None);
        let plot = Plot::new(&window, 2, DataType::U16, PlotType::Line).unwrap();

        assert_eq!(
            plot.upload(&[1.0f32; 4]),
            Err(Error::DataTypeMismatch { expected: DataType::U16, actual: DataType::F32 })
        );
        assert_eq!(plot.upload(&[0u16; 5]), Err(Error::DataSize { expected: 8, actual: 10 }));

        plot.upload(&[1u16, 2, 3, 4]).unwrap();
        assert_eq!(log.buffer_bytes(plot.buffer()).unwrap(), vec![1, 0, 2, 0, 3, 0, 4, 0]);
    }

    #[test]
    fn plot_type_selects_topology() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 300, 300, None);
        let mut plot = Plot::new(&window, 32, DataType::F32, PlotType::Scatter).unwrap();
        window.draw(&mut plot).unwrap();

        let frame = log.last_frame().unwrap();
        let Command::Draw(call) = &frame[3] else { panic!("expected draw, got {:?}", frame[3]) };
        assert_eq!(call.topology, Topology::PointList);
        assert_eq!(call.vertices, 32);
    }

    #[test]
    fn histogram_shades_until_solid() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 300, 300, None);
        let mut hist = Histogram::new(&window, 12, DataType::F32).unwrap();
        hist.set_axes_limits(0.0, 1.0, 0.0, 50.0);

        let bars = |log: &crate::testing::MockLog| {
            log.last_frame()
                .unwrap()
                .into_iter()
                .find_map(|c| match c {
                    Command::Draw(call) if call.kind == DrawKind::Bars => Some(call),
                    _ => None,
                })
                .unwrap()
        };

        window.draw(&mut hist).unwrap();
        let call = bars(&log);
        assert!(call.colormap.is_some());
        assert_eq!((call.vertices, call.instances), (6, 12));
        assert_eq!(call.value_range, [0.0, 50.0]);

        hist.set_color(Color::GREEN);
        window.draw(&mut hist).unwrap();
        assert_eq!(bars(&log).colormap, None);
        assert_eq!(bars(&log).color, Color::GREEN);
    }

    #[test]
    fn vector_field_draws_two_vertices_per_point() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 300, 300, None);
        let mut field = VectorField::new(&window, 5, DataType::U8).unwrap();
        window.draw(&mut field).unwrap();

        let frame = log.last_frame().unwrap();
        let Command::Draw(call) = &frame[3] else { panic!("expected draw, got {:?}", frame[3]) };
        assert_eq!(call.topology, Topology::LineList);
        assert_eq!(call.vertices, 10);
        assert_eq!(call.color, Color::WHITE);
    }
}
