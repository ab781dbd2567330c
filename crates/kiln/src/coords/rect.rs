/// Axis-aligned rectangle in framebuffer pixels.
///
/// The origin is the bottom-left corner of the framebuffer (+Y up), matching the
/// viewport convention used by grid addressing. Backends convert to their native
/// origin when executing commands.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin covering a `width × height` framebuffer.
    #[inline]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, clamp_i32(width), clamp_i32(height))
    }

    #[inline]
    pub fn right(self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.right() && py < self.top()
    }

    #[inline]
    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.top().min(other.top());

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(PixelRect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }

    /// Shrinks the rectangle by the given edge insets. Width/height never go negative.
    #[inline]
    pub fn inset(self, left: i32, bottom: i32, right: i32, top: i32) -> PixelRect {
        PixelRect::new(
            self.x + left,
            self.y + bottom,
            (self.width - left - right).max(0),
            (self.height - bottom - top).max(0),
        )
    }

    /// Converts to a top-left-origin rect inside a framebuffer of height `fb_height`.
    ///
    /// Returns `(x, y, w, h)` clamped to `[0, fb_width] × [0, fb_height]`, or `None`
    /// if nothing remains visible.
    pub fn to_top_left(self, fb_width: u32, fb_height: u32) -> Option<(u32, u32, u32, u32)> {
        let bounds = PixelRect::from_size(fb_width, fb_height);
        let r = self.intersect(bounds)?;
        let y_top = bounds.height - r.top();
        Some((r.x as u32, y_top as u32, r.width as u32, r.height as u32))
    }
}

#[inline]
fn clamp_i32(v: u32) -> i32 {
    v.min(i32::MAX as u32) as i32
}
