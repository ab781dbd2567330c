use crate::error::Result;
use crate::render::CommandList;

/// Native handles of a surface, as plain integers.
///
/// `window` identifies the native window; `display` the display connection
/// (X11/Wayland) or 0 where the platform has none.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct NativeHandles {
    pub window: u64,
    pub display: u64,
}

/// One native window bound to a GPU context (the windowing-toolkit adapter).
///
/// The surface is torn down when dropped.
pub trait Surface {
    /// Makes this surface the target of subsequent GPU commands.
    fn make_current(&mut self) -> Result<()>;

    /// Executes the recorded frame and presents it (swap buffers).
    fn present(&mut self, commands: &CommandList) -> Result<()>;

    /// Processes pending native input events without blocking.
    fn poll_events(&mut self);

    /// True once the user asked to close the window.
    fn close_requested(&self) -> bool;

    fn reset_close_flag(&mut self);

    /// Current drawable size in physical pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    fn set_title(&mut self, title: &str);

    fn set_position(&mut self, x: i32, y: i32);

    fn set_size(&mut self, width: u32, height: u32);

    fn show(&mut self);

    fn hide(&mut self);

    fn native_handles(&self) -> NativeHandles;
}
