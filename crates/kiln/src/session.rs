use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::device::{Platform, Surface};
use crate::error::Result;
use crate::window::WindowId;

/// Per-thread render session.
///
/// Owns the [`Platform`] and the single "current window" slot. Every window
/// keeps a clone of its session; clones share the same slot.
///
/// Sessions are `!Send`: windows, contexts and charts stay on the thread that
/// created them.
#[derive(Clone)]
pub struct Session {
    state: Rc<SessionState>,
}

struct SessionState {
    platform: Box<dyn Platform>,
    current: Cell<Option<WindowId>>,
}

impl Session {
    pub fn new(platform: impl Platform + 'static) -> Self {
        Self {
            state: Rc::new(SessionState {
                platform: Box::new(platform),
                current: Cell::new(None),
            }),
        }
    }

    #[inline]
    pub(crate) fn platform(&self) -> &dyn Platform {
        self.state.platform.as_ref()
    }

    /// Window whose surface is currently the render target, if any.
    #[inline]
    pub fn current(&self) -> Option<WindowId> {
        self.state.current.get()
    }

    /// Makes `id` current through `surface`.
    ///
    /// Returns `false` without touching the surface when `id` already is current.
    pub(crate) fn make_current(&self, id: WindowId, surface: &mut dyn Surface) -> Result<bool> {
        if self.state.current.get() == Some(id) {
            return Ok(false);
        }
        surface.make_current()?;
        self.state.current.set(Some(id));
        log::trace!("window {} is current", id.raw());
        Ok(true)
    }

    /// Clears the slot if `id` holds it.
    pub(crate) fn release(&self, id: WindowId) {
        if self.state.current.get() == Some(id) {
            self.state.current.set(None);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("current", &self.state.current.get())
            .finish_non_exhaustive()
    }
}
