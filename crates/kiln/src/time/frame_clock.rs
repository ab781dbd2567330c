use std::time::{Duration, Instant};

/// Timing of one presented frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous present, clamped.
    pub dt: f32,

    /// Monotonic timestamp taken at present.
    pub now: Instant,

    /// Number of frames presented before this one.
    pub frame_index: u64,

    /// Exponentially smoothed frames per second.
    pub fps: f32,
}

/// Present-to-present clock.
///
/// Delta time is clamped so a window that sat behind a debugger or was
/// minimized does not report a multi-second frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    fps: f32,
    dt_min: Duration,
    dt_max: Duration,
}

/// Weight of the newest sample in the fps average.
const FPS_SMOOTHING: f32 = 0.1;

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            fps: 0.0,
            dt_min,
            dt_max,
        }
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    /// Records a present and returns its timing.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f32();

        let sample = 1.0 / dt;
        self.fps = if self.frame_index == 0 {
            sample
        } else {
            self.fps + (sample - self.fps) * FPS_SMOOTHING
        };

        let ft = FrameTime {
            dt,
            now,
            frame_index: self.frame_index,
            fps: self.fps,
        };

        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counts_and_clamps() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(2));
        let first = clock.tick();
        let second = clock.tick();
        assert_eq!(first.frame_index, 0);
        assert_eq!(second.frame_index, 1);
        assert_eq!(clock.frames(), 2);
        assert!(second.dt >= 0.001 && second.dt <= 0.002);
        assert!(second.fps.is_finite() && second.fps > 0.0);
    }
}
