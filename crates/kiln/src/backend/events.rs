use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

/// Input state of one native window, written by the pump and read by its surface.
#[derive(Debug, Default)]
pub(crate) struct WindowFlags {
    close: Cell<bool>,
    resized: Cell<Option<PhysicalSize<u32>>>,
}

impl WindowFlags {
    #[inline]
    pub(crate) fn close_requested(&self) -> bool {
        self.close.get()
    }

    pub(crate) fn reset_close(&self) {
        self.close.set(false);
    }

    /// Most recent size reported since the last call.
    pub(crate) fn take_resize(&self) -> Option<PhysicalSize<u32>> {
        self.resized.take()
    }
}

/// The process's winit event loop, driven without blocking from
/// `Surface::poll_events`.
///
/// winit allows one event loop per process, so every window of a platform is
/// created through (and dispatched by) the same pump.
pub(crate) struct EventPump {
    event_loop: EventLoop<()>,
    windows: HashMap<WindowId, Rc<WindowFlags>>,
}

impl EventPump {
    pub(crate) fn new() -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        Ok(Self { event_loop, windows: HashMap::new() })
    }

    pub(crate) fn create_window(
        &mut self,
        attrs: WindowAttributes,
    ) -> Result<(Arc<Window>, Rc<WindowFlags>)> {
        // Windows are created outside `run_app`, which only the deprecated
        // `EventLoop::create_window` allows.
        #[allow(deprecated)]
        let window = self
            .event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let flags = Rc::new(WindowFlags::default());
        self.windows.insert(window.id(), Rc::clone(&flags));
        Ok((Arc::new(window), flags))
    }

    pub(crate) fn forget(&mut self, id: WindowId) {
        self.windows.remove(&id);
    }

    /// Dispatches every pending event and returns immediately.
    pub(crate) fn pump(&mut self) {
        let mut dispatcher = Dispatcher { windows: &self.windows };
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut dispatcher)
        {
            log::debug!("event loop exited with code {code}");
        }
    }
}

struct Dispatcher<'a> {
    windows: &'a HashMap<WindowId, Rc<WindowFlags>>,
}

impl ApplicationHandler for Dispatcher<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(flags) = self.windows.get(&id) else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested for {id:?}");
                flags.close.set(true);
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                flags.close.set(true);
            }
            WindowEvent::Resized(size) => flags.resized.set(Some(size)),
            _ => {}
        }
    }
}
