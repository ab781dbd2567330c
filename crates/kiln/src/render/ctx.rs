use std::rc::Rc;

use crate::device::GpuContext;
use crate::text::Font;

use super::CommandList;

/// Renderer-facing context for one `render` call.
///
/// The owning window has already been made current; everything a renderable
/// records goes into that window's frame.
pub struct RenderCtx<'a> {
    pub gpu: &'a dyn GpuContext,
    pub commands: &'a mut CommandList,
    /// Window font for labels and titles, if one was set.
    pub font: Option<&'a Rc<Font>>,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        gpu: &'a dyn GpuContext,
        commands: &'a mut CommandList,
        font: Option<&'a Rc<Font>>,
    ) -> Self {
        Self { gpu, commands, font }
    }
}
