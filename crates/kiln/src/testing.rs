//! In-memory collaborators for unit tests.
//!
//! `MockPlatform`, `MockContext` and `MockSurface` share one [`MockLog`] that
//! records every object created and released, make-current calls and presented
//! frames, so tests can assert on lifecycle without a GPU.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::device::{
    BindingId, BufferId, BufferKind, ContextId, GpuContext, NativeHandles, Platform, Surface,
    VertexLayout,
};
use crate::error::{Error, Result};
use crate::render::{Command, CommandList};
use crate::session::Session;
use crate::window::{Window, WindowConfig};

#[derive(Default)]
pub(crate) struct MockLog {
    next_id: Cell<u64>,

    pub contexts_created: Cell<u32>,
    pub contexts_dropped: Cell<u32>,
    pub surfaces_created: Cell<u32>,
    pub surfaces_dropped: Cell<u32>,

    pub buffers: RefCell<HashMap<BufferId, (BufferKind, Vec<u8>)>>,
    pub bindings: RefCell<HashMap<BindingId, (BufferId, VertexLayout)>>,

    /// Surface ids in the order `make_current` reached them.
    pub make_current_calls: RefCell<Vec<u64>>,
    /// `(surface id, commands)` per present.
    pub frames: RefCell<Vec<(u64, Vec<Command>)>>,
    /// `share` argument of every `create_surface`.
    pub share_requests: RefCell<Vec<Option<NativeHandles>>>,

    /// Returned (once) by the next `check_error`.
    pub pending_error: RefCell<Option<Error>>,
    pub fail_context_creation: Cell<bool>,
    /// Makes the next `poll_events` of every surface raise the close flag.
    pub close_pending: Cell<bool>,
}

impl MockLog {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    pub fn live_contexts(&self) -> u32 {
        self.contexts_created.get() - self.contexts_dropped.get()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.borrow().len()
    }

    pub fn live_bindings(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn buffer_bytes(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.buffers.borrow().get(&buffer).map(|(_, bytes)| bytes.clone())
    }

    pub fn last_frame(&self) -> Option<Vec<Command>> {
        self.frames.borrow().last().map(|(_, cmds)| cmds.clone())
    }
}

pub(crate) struct MockPlatform {
    pub log: Rc<MockLog>,
}

impl Platform for MockPlatform {
    fn create_context(&self) -> Result<Rc<dyn GpuContext>> {
        if self.log.fail_context_creation.get() {
            return Err(Error::ContextCreation("mock context refused".into()));
        }
        self.log.contexts_created.set(self.log.contexts_created.get() + 1);
        Ok(Rc::new(MockContext {
            id: ContextId::next(),
            log: Rc::clone(&self.log),
        }))
    }

    fn create_surface(
        &self,
        config: &WindowConfig,
        _context: &Rc<dyn GpuContext>,
        share: Option<NativeHandles>,
    ) -> Result<Box<dyn Surface>> {
        self.log.surfaces_created.set(self.log.surfaces_created.get() + 1);
        self.log.share_requests.borrow_mut().push(share);
        let id = self.log.next_id();
        Ok(Box::new(MockSurface {
            id,
            log: Rc::clone(&self.log),
            size: (config.width, config.height),
            title: config.title.clone(),
            visible: !config.invisible,
            close: false,
        }))
    }
}

pub(crate) struct MockContext {
    id: ContextId,
    log: Rc<MockLog>,
}

impl GpuContext for MockContext {
    fn id(&self) -> ContextId {
        self.id
    }

    fn native_handle(&self) -> u64 {
        self.id.raw()
    }

    fn create_buffer(&self, kind: BufferKind, size: u64, _label: &str) -> Result<BufferId> {
        let id = BufferId::new(self.log.next_id());
        self.log
            .buffers
            .borrow_mut()
            .insert(id, (kind, vec![0; size as usize]));
        Ok(id)
    }

    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<()> {
        let mut buffers = self.log.buffers.borrow_mut();
        let (_, bytes) = buffers
            .get_mut(&buffer)
            .ok_or(Error::UnknownResource("buffer"))?;
        let start = offset as usize;
        bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn release_buffer(&self, buffer: BufferId) {
        self.log.buffers.borrow_mut().remove(&buffer);
    }

    fn buffer_size(&self, buffer: BufferId) -> Option<u64> {
        self.log
            .buffers
            .borrow()
            .get(&buffer)
            .map(|(_, bytes)| bytes.len() as u64)
    }

    fn create_binding(&self, buffer: BufferId, layout: VertexLayout) -> Result<BindingId> {
        if !self.log.buffers.borrow().contains_key(&buffer) {
            return Err(Error::UnknownResource("buffer"));
        }
        let id = BindingId::new(self.log.next_id());
        self.log.bindings.borrow_mut().insert(id, (buffer, layout));
        Ok(id)
    }

    fn release_binding(&self, binding: BindingId) {
        self.log.bindings.borrow_mut().remove(&binding);
    }

    fn check_error(&self, _site: &str) -> Result<()> {
        match self.log.pending_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for MockContext {
    fn drop(&mut self) {
        self.log.contexts_dropped.set(self.log.contexts_dropped.get() + 1);
    }
}

pub(crate) struct MockSurface {
    id: u64,
    log: Rc<MockLog>,
    size: (u32, u32),
    pub title: String,
    pub visible: bool,
    close: bool,
}

impl Surface for MockSurface {
    fn make_current(&mut self) -> Result<()> {
        self.log.make_current_calls.borrow_mut().push(self.id);
        Ok(())
    }

    fn present(&mut self, commands: &CommandList) -> Result<()> {
        self.log
            .frames
            .borrow_mut()
            .push((self.id, commands.commands().to_vec()));
        Ok(())
    }

    fn poll_events(&mut self) {
        if self.log.close_pending.get() {
            self.close = true;
        }
    }

    fn close_requested(&self) -> bool {
        self.close
    }

    fn reset_close_flag(&mut self) {
        self.close = false;
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_position(&mut self, _x: i32, _y: i32) {}

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn native_handles(&self) -> NativeHandles {
        NativeHandles { window: self.id, display: 1 }
    }
}

impl Drop for MockSurface {
    fn drop(&mut self) {
        self.log.surfaces_dropped.set(self.log.surfaces_dropped.get() + 1);
    }
}

/// Session over a fresh mock platform, plus the log to inspect it.
pub(crate) fn mock_session() -> (Session, Rc<MockLog>) {
    let log = Rc::new(MockLog::default());
    let session = Session::new(MockPlatform { log: Rc::clone(&log) });
    (session, log)
}

/// Invisible `width × height` mock window, optionally sharing `parent`'s context.
pub(crate) fn mock_window(
    session: &Session,
    width: u32,
    height: u32,
    parent: Option<&Window>,
) -> Window {
    let mut config = WindowConfig::new(width, height, "test").invisible(true);
    if let Some(parent) = parent {
        config = config.shared_with(parent);
    }
    Window::new(session, config).expect("mock window")
}
