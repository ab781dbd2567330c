use std::cell::RefCell;
use std::rc::Rc;

use crate::device::{GpuContext, NativeHandles, Platform, Surface};
use crate::error::{Error, Result};
use crate::window::WindowConfig;

use super::events::EventPump;
use super::gpu::WgpuContext;
use super::surface::WgpuSurface;
use super::GpuInit;

/// `winit` windows presenting through `wgpu`.
///
/// Each independent context is its own wgpu device; windows sharing a context
/// render through the same device and queue. All windows are driven by one
/// event loop, so the platform must live on the thread that created it.
pub struct WgpuPlatform {
    init: GpuInit,
    pump: Rc<RefCell<EventPump>>,
}

impl WgpuPlatform {
    pub fn new(init: GpuInit) -> Result<Self> {
        let pump = EventPump::new().map_err(|err| Error::context_creation(format!("{err:#}")))?;
        Ok(Self {
            init,
            pump: Rc::new(RefCell::new(pump)),
        })
    }

    #[inline]
    pub fn init(&self) -> &GpuInit {
        &self.init
    }
}

impl Platform for WgpuPlatform {
    fn create_context(&self) -> Result<Rc<dyn GpuContext>> {
        Ok(Rc::new(WgpuContext::new(&self.init)?))
    }

    fn create_surface(
        &self,
        config: &WindowConfig,
        context: &Rc<dyn GpuContext>,
        share: Option<NativeHandles>,
    ) -> Result<Box<dyn Surface>> {
        if let Some(parent) = share {
            log::debug!(
                "surface joins context {} of native window {:#x}",
                context.id().raw(),
                parent.window
            );
        }
        let surface = WgpuSurface::new(context, &self.pump, config).map_err(|err| {
            log::error!("surface creation failed: {err:#}");
            Error::context_creation(format!("{err:#}"))
        })?;
        Ok(Box::new(surface))
    }
}
