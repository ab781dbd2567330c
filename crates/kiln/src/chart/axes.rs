use glam::{Mat4, Vec3};

use crate::coords::PixelRect;

/// Data-space extent shown by a chart.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AxisLimits {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self { xmin: -1.0, xmax: 1.0, ymin: -1.0, ymax: 1.0 }
    }
}

impl AxisLimits {
    pub const fn new(xmin: f32, xmax: f32, ymin: f32, ymax: f32) -> Self {
        Self { xmin, xmax, ymin, ymax }
    }
}

/// Data-space extent shown by a 3D chart.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AxisLimits3 {
    pub xmin: f32,
    pub xmax: f32,
    pub ymin: f32,
    pub ymax: f32,
    pub zmin: f32,
    pub zmax: f32,
}

impl Default for AxisLimits3 {
    fn default() -> Self {
        Self::new(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0)
    }
}

impl AxisLimits3 {
    pub const fn new(xmin: f32, xmax: f32, ymin: f32, ymax: f32, zmin: f32, zmax: f32) -> Self {
        Self { xmin, xmax, ymin, ymax, zmin, zmax }
    }

    fn center(&self) -> Vec3 {
        Vec3::new(
            (self.xmin + self.xmax) * 0.5,
            (self.ymin + self.ymax) * 0.5,
            (self.zmin + self.zmax) * 0.5,
        )
    }
}

/// Orbit camera looking at the centre of a 3D chart, z up. Angles in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    /// Rotation about the z axis, measured from +x.
    pub azimuth: f32,
    /// Height above the xy plane; kept inside (-89, 89).
    pub elevation: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self { azimuth: -45.0, elevation: 30.0 }
    }
}

impl Camera {
    pub fn new(azimuth: f32, elevation: f32) -> Self {
        Self {
            azimuth,
            elevation: elevation.clamp(-MAX_ELEVATION, MAX_ELEVATION),
        }
    }

    /// Unit vector from the target towards the eye.
    pub fn direction(&self) -> Vec3 {
        let (az, el) = (self.azimuth.to_radians(), self.elevation.to_radians());
        Vec3::new(el.cos() * az.cos(), el.cos() * az.sin(), el.sin())
    }
}

/// Pixel margins reserved around the plot area for border, ticks and labels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Margins {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub tick: i32,
}

pub const CHART_MARGINS: Margins = Margins {
    left: 68,
    right: 8,
    top: 8,
    bottom: 32,
    tick: 10,
};

const MAX_ELEVATION: f32 = 89.0;

/// Eye distance from the centre of the normalized `[-1, 1]³` cube.
const CAMERA_DISTANCE: f32 = 5.0;
const CAMERA_FOV: f32 = 45.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 20.0;

/// Ranges narrower than this are drawn flat.
const DEGENERATE_RANGE: f32 = 1.0e-3;

/// Scale taking `[min, max]` onto a span of 2 (NDC width).
///
/// Degenerate ranges give 0, so constant data collapses onto one line instead of
/// blowing up.
#[inline]
pub fn axis_scale(min: f32, max: f32) -> f32 {
    let range = max - min;
    if range.abs() < DEGENERATE_RANGE {
        0.0
    } else {
        2.0 / range
    }
}

/// Data area inside a viewport of `width × height`, relative to the viewport's
/// bottom-left corner: `(x, y, w, h)` in pixels.
pub fn data_area(width: i32, height: i32) -> (f32, f32, f32, f32) {
    let m = CHART_MARGINS;
    let (vpw, vph) = (width.max(1) as f32, height.max(1) as f32);
    let x = (m.left + m.tick / 2) as f32;
    let y = (m.bottom + m.tick) as f32;
    let w = vpw - (m.left + m.right + m.tick / 2) as f32;
    let h = vph - (m.bottom + m.top + m.tick) as f32;
    (x, y, w, h)
}

/// Transform from data space to the NDC of `viewport`, leaving the margins free.
pub fn chart_transform(limits: AxisLimits, viewport: PixelRect) -> Mat4 {
    let (vpw, vph) = (viewport.width.max(1) as f32, viewport.height.max(1) as f32);
    let (x, y, w, h) = data_area(viewport.width, viewport.height);

    let sx = axis_scale(limits.xmin, limits.xmax) * (w / vpw);
    let sy = axis_scale(limits.ymin, limits.ymax) * (h / vph);

    let offset_x = 2.0 * x / vpw;
    let offset_y = 2.0 * y / vph;

    Mat4::from_translation(Vec3::new(
        -1.0 + offset_x - limits.xmin * sx,
        -1.0 + offset_y - limits.ymin * sy,
        0.0,
    )) * Mat4::from_scale(Vec3::new(sx, sy, 1.0))
}

/// Transform from 3D data space to the clip space of `viewport`.
///
/// The data box is normalized into `[-1, 1]³` and viewed through a perspective
/// camera orbiting its centre; depth lands in `[0, 1]`.
pub fn surface_transform(limits: AxisLimits3, camera: Camera, viewport: PixelRect) -> Mat4 {
    let aspect = viewport.width.max(1) as f32 / viewport.height.max(1) as f32;

    let normalize = Mat4::from_scale(Vec3::new(
        axis_scale(limits.xmin, limits.xmax),
        axis_scale(limits.ymin, limits.ymax),
        axis_scale(limits.zmin, limits.zmax),
    )) * Mat4::from_translation(-limits.center());
    let view = Mat4::look_at_rh(camera.direction() * CAMERA_DISTANCE, Vec3::ZERO, Vec3::Z);
    let projection =
        Mat4::perspective_rh(CAMERA_FOV.to_radians(), aspect, CAMERA_NEAR, CAMERA_FAR);

    projection * view * normalize
}

/// Scissor rectangle of the plot area, in absolute framebuffer pixels.
pub fn plot_area(viewport: PixelRect) -> PixelRect {
    let m = CHART_MARGINS;
    PixelRect::new(
        viewport.x + m.left + m.tick / 2,
        viewport.y + m.bottom + m.tick / 2,
        viewport.width - m.left - m.right - m.tick / 2,
        viewport.height - m.bottom - m.top - m.tick / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn ndc(m: Mat4, x: f32, y: f32) -> (f32, f32) {
        let p = m * Vec4::new(x, y, 0.0, 1.0);
        (p.x, p.y)
    }

    #[test]
    fn degenerate_range_scales_to_zero() {
        assert_eq!(axis_scale(3.0, 3.0005), 0.0);
        assert_eq!(axis_scale(0.0, 4.0), 0.5);

        let limits = AxisLimits::new(5.0, 5.0, -1.0, 1.0);
        let m = chart_transform(limits, PixelRect::new(0, 0, 400, 300));
        assert!(m.is_finite());
        assert_eq!(m.x_axis.x, 0.0);
        let (a, _) = ndc(m, -100.0, 0.0);
        let (b, _) = ndc(m, 100.0, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn limits_map_to_data_area_edges() {
        let vp = PixelRect::new(0, 0, 800, 600);
        let m = chart_transform(AxisLimits::new(0.0, 10.0, -2.0, 2.0), vp);
        let (x, y, w, h) = data_area(800, 600);

        let (x0, y0) = ndc(m, 0.0, -2.0);
        let (x1, y1) = ndc(m, 10.0, 2.0);
        let to_px = |n: f32, size: f32| (n + 1.0) * 0.5 * size;
        assert!((to_px(x0, 800.0) - x).abs() < 1e-3);
        assert!((to_px(y0, 600.0) - y).abs() < 1e-3);
        assert!((to_px(x1, 800.0) - (x + w)).abs() < 1e-3);
        assert!((to_px(y1, 600.0) - (y + h)).abs() < 1e-3);
    }

    #[test]
    fn zero_sized_viewport_stays_finite() {
        let m = chart_transform(AxisLimits::default(), PixelRect::new(0, 0, 0, 0));
        assert!(m.is_finite());
    }

    fn project(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * p.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn surface_box_fits_the_viewport() {
        let limits = AxisLimits3::new(0.0, 10.0, -5.0, 5.0, 0.0, 2.0);
        let m = surface_transform(limits, Camera::default(), PixelRect::new(0, 0, 600, 600));

        let center = project(m, Vec3::new(5.0, 0.0, 1.0));
        assert!(center.x.abs() < 1e-4 && center.y.abs() < 1e-4);

        for &x in &[0.0, 10.0] {
            for &y in &[-5.0, 5.0] {
                for &z in &[0.0, 2.0] {
                    let p = project(m, Vec3::new(x, y, z));
                    assert!(p.x.abs() <= 1.0 && p.y.abs() <= 1.0, "{p:?} clipped");
                    assert!(p.z > 0.0 && p.z < 1.0, "{p:?} outside depth range");
                }
            }
        }
    }

    #[test]
    fn corner_facing_the_camera_is_nearest() {
        let m = surface_transform(
            AxisLimits3::default(),
            Camera::default(),
            PixelRect::new(0, 0, 400, 300),
        );
        // default camera sits over +x, -y, +z
        let near = project(m, Vec3::new(1.0, -1.0, 1.0));
        let far = project(m, Vec3::new(-1.0, 1.0, -1.0));
        assert!(near.z < far.z);
    }

    #[test]
    fn camera_elevation_is_clamped() {
        assert_eq!(Camera::new(0.0, 120.0).elevation, 89.0);
        assert_eq!(Camera::new(0.0, -95.0).elevation, -89.0);
        let m = surface_transform(
            AxisLimits3::default(),
            Camera::new(10.0, 90.0),
            PixelRect::new(0, 0, 100, 100),
        );
        assert!(m.is_finite());
    }

    #[test]
    fn plot_area_is_offset_by_viewport() {
        let area = plot_area(PixelRect::new(400, 300, 400, 300));
        assert_eq!(area, PixelRect::new(473, 337, 319, 255));
    }
}
