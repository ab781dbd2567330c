//! Per-window frame timing.
//!
//! Each window owns one `FrameClock` and ticks it on `swap_buffers`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
