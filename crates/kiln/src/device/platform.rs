use std::rc::Rc;

use crate::error::Result;
use crate::window::WindowConfig;

use super::{GpuContext, NativeHandles, Surface};

/// Factory for GPU contexts and native surfaces (the toolkit entry point).
///
/// Both operations fail with [`crate::Error::ContextCreation`]; failures are
/// not retried by the caller.
pub trait Platform {
    /// Creates an independent GPU context.
    fn create_context(&self) -> Result<Rc<dyn GpuContext>>;

    /// Creates a native window bound to `context`.
    ///
    /// `share` carries the handles of the window whose context is being shared,
    /// or `None` for a window that owns its context.
    fn create_surface(
        &self,
        config: &WindowConfig,
        context: &Rc<dyn GpuContext>,
        share: Option<NativeHandles>,
    ) -> Result<Box<dyn Surface>>;
}
