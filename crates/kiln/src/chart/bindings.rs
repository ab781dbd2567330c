use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::device::{BindingId, BufferId, GpuContext, VertexLayout};
use crate::error::Result;
use crate::window::WindowId;

/// Per-window binding objects of one chart buffer.
///
/// Each window a chart is rendered into gets its own binding, created on first
/// use with the chart's fixed layout. Entries are never evicted; all of them are
/// released when the cache is dropped.
pub struct BindingCache {
    gpu: Rc<dyn GpuContext>,
    buffer: BufferId,
    layout: VertexLayout,
    bindings: HashMap<WindowId, BindingId>,
}

impl BindingCache {
    pub fn new(gpu: &Rc<dyn GpuContext>, buffer: BufferId, layout: VertexLayout) -> Self {
        Self {
            gpu: Rc::clone(gpu),
            buffer,
            layout,
            bindings: HashMap::new(),
        }
    }

    /// Binding for `window`, created if this is the first request for it.
    pub fn resolve(&mut self, window: WindowId) -> Result<BindingId> {
        if let Some(&binding) = self.bindings.get(&window) {
            return Ok(binding);
        }

        let binding = self.gpu.create_binding(self.buffer, self.layout)?;
        self.bindings.insert(window, binding);
        log::debug!(
            "binding {} created for window {} (buffer {}, {:?} x{})",
            binding.raw(),
            window.raw(),
            self.buffer.raw(),
            self.layout.element,
            self.layout.components,
        );
        Ok(binding)
    }

    #[inline]
    pub fn get(&self, window: WindowId) -> Option<BindingId> {
        self.bindings.get(&window).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }
}

impl Drop for BindingCache {
    fn drop(&mut self) {
        for (_, binding) in self.bindings.drain() {
            self.gpu.release_binding(binding);
        }
    }
}

impl fmt::Debug for BindingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingCache")
            .field("buffer", &self.buffer)
            .field("layout", &self.layout)
            .field("bindings", &self.bindings)
            .finish()
    }
}
