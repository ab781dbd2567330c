/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
///
/// Every constructor clamps its inputs, so a stored `Color` is always in range.
/// Out-of-range channels are clamped rather than rejected.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::from_const(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::from_const(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::from_const(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::from_const(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::from_const(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::from_const(1.0, 1.0, 0.0, 1.0);
    pub const CYAN: Color = Color::from_const(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::from_const(1.0, 0.0, 1.0, 1.0);

    /// Window background behind charts.
    pub const GRAY: Color = Color::from_const(0.85, 0.85, 0.85, 1.0);

    const fn from_const(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGBA components; each channel is clamped to `[0, 1]`.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: clamp01(r),
            g: clamp01(g),
            b: clamp01(b),
            a: clamp01(a),
        }
    }

    /// Opaque color from RGB components; each channel is clamped to `[0, 1]`.
    #[inline]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Creates a color from bytes (`0`–`255`).
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_const(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Creates a color from a packed `0xRRGGBBAA` value.
    #[inline]
    pub fn from_hex(rgba: u32) -> Self {
        let [r, g, b, a] = rgba.to_be_bytes();
        Self::from_u8(r, g, b, a)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Linear interpolation between `self` and `other` at `t ∈ [0, 1]`.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = clamp01(t);
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Clamps to `[0, 1]`; NaN maps to 0.
#[inline]
fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_clamps_out_of_range() {
        let c = Color::rgb(1.5, -0.2, 0.5);
        assert_eq!(c.to_array(), [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn nan_channel_maps_to_zero() {
        assert_eq!(Color::rgb(f32::NAN, 0.0, 0.0).r, 0.0);
    }

    #[test]
    fn hex_unpacks_rgba_order() {
        let c = Color::from_hex(0xFF00_00FF);
        assert_eq!(c, Color::RED);
        let c = Color::from_hex(0x0000_FF80);
        assert_eq!(c.b, 1.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn default_is_white() {
        assert_eq!(Color::default(), Color::WHITE);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.0), Color::BLACK);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 1.0), Color::WHITE);
    }
}
