use std::f32::consts::TAU;
use std::rc::Rc;

use anyhow::{Context, Result};
use kiln::backend::{wgpu_session, GpuInit};
use kiln::logging::{init_logging, LoggingConfig};
use kiln::{
    ColorMap, DataType, Font, Histogram, Plot, PlotType, SurfaceChart, VectorField, Window,
    WindowConfig,
};

const POINTS: u32 = 256;
const BINS: u32 = 32;
const FIELD: u32 = 16;
const MESH: u32 = 48;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let session = wgpu_session(GpuInit::default()).context("no usable GPU")?;

    // Grid window with four charts, plus two windows sharing its context: the
    // vector field full-size and a 3D ripple surface.
    let mut grid = Window::new(&session, WindowConfig::new(1024, 768, "kiln grid"))?;
    let mut field_window = Window::new(
        &session,
        WindowConfig::new(640, 640, "kiln field").shared_with(&grid),
    )?;
    let mut surface_window = Window::new(
        &session,
        WindowConfig::new(640, 640, "kiln surface").shared_with(&grid),
    )?;
    surface_window.set_color_map(ColorMap::Spectrum);

    match Font::load_system_font("DejaVuSans") {
        Ok(font) => {
            let font = Rc::new(font);
            grid.set_font(Rc::clone(&font));
            field_window.set_font(font);
        }
        Err(err) => log::warn!("running without labels: {err}"),
    }
    grid.set_color_map(ColorMap::Heat);

    let mut sine = Plot::new(&grid, POINTS, DataType::F32, PlotType::Line)?;
    sine.set_axes_limits(0.0, TAU, -1.1, 1.1);
    sine.set_axes_titles("t", "sin");
    sine.set_color_hex(0x2060C0FF);

    let mut scatter = Plot::new(&grid, POINTS, DataType::F32, PlotType::Scatter)?;
    scatter.set_axes_limits(-1.0, 1.0, -1.0, 1.0);
    scatter.set_color_rgb(0.8, 0.2, 0.2);

    let mut histogram = Histogram::new(&grid, BINS, DataType::U16)?;
    histogram.set_axes_limits(0.0, BINS as f32, 0.0, 1000.0);

    let mut field = VectorField::new(&grid, FIELD * FIELD, DataType::F32)?;
    field.set_axes_limits(-1.2, 1.2, -1.2, 1.2);
    field.set_color_rgb(0.1, 0.5, 0.1);

    let mut ripple = SurfaceChart::new(&grid, MESH, MESH, DataType::F32)?;
    ripple.set_axes_limits(-1.0, 1.0, -1.0, 1.0, -0.5, 0.5);

    grid.grid(2, 2)?;
    let mut t = 0.0f32;
    while !grid.close() && !field_window.close() && !surface_window.close() {
        sine.upload(&sine_points(t))?;
        scatter.upload(&spiral_points(t))?;
        histogram.upload(&bins(t))?;
        field.upload(&field_segments(t))?;
        ripple.upload(&ripple_points(t))?;
        ripple.set_camera(-45.0 + 10.0 * t, 30.0);

        grid.draw_cell(0, 0, &mut sine, Some("sine"))?;
        grid.draw_cell(1, 0, &mut scatter, Some("spiral"))?;
        grid.draw_cell(0, 1, &mut histogram, Some("bins"))?;
        grid.draw_cell(1, 1, &mut field, Some("field"))?;
        grid.swap_buffers()?;

        field_window.draw(&mut field)?;
        surface_window.draw(&mut ripple)?;

        if let Some(frame) = grid.frame_time() {
            t += frame.dt;
        }
    }
    Ok(())
}

fn sine_points(t: f32) -> Vec<f32> {
    (0..POINTS)
        .flat_map(|i| {
            let x = i as f32 / (POINTS - 1) as f32 * TAU;
            [x, (x + t).sin()]
        })
        .collect()
}

fn spiral_points(t: f32) -> Vec<f32> {
    (0..POINTS)
        .flat_map(|i| {
            let s = i as f32 / POINTS as f32;
            let a = s * 4.0 * TAU + t;
            [s * a.cos(), s * a.sin()]
        })
        .collect()
}

fn bins(t: f32) -> Vec<u16> {
    (0..BINS)
        .map(|i| {
            let x = (i as f32 / BINS as f32 - 0.5) * 4.0;
            let v = (-x * x).exp() * (0.75 + 0.25 * (t * 2.0 + i as f32).sin());
            (v * 1000.0) as u16
        })
        .collect()
}

fn field_segments(t: f32) -> Vec<f32> {
    let step = 2.0 / (FIELD - 1) as f32;
    (0..FIELD * FIELD)
        .flat_map(|i| {
            let x = -1.0 + (i % FIELD) as f32 * step;
            let y = -1.0 + (i / FIELD) as f32 * step;
            let (dx, dy) = (-y + 0.3 * t.sin(), x);
            [x, y, x + 0.08 * dx, y + 0.08 * dy]
        })
        .collect()
}

fn ripple_points(t: f32) -> Vec<f32> {
    let step = 2.0 / (MESH - 1) as f32;
    (0..MESH * MESH)
        .flat_map(|i| {
            let x = -1.0 + (i % MESH) as f32 * step;
            let y = -1.0 + (i / MESH) as f32 * step;
            let r = (x * x + y * y).sqrt();
            [x, y, 0.4 * (6.0 * r - 2.0 * t).cos() * (-r).exp()]
        })
        .collect()
}
