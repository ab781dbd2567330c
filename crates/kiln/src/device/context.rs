use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

use super::DataType;

/// Process-unique identity of a GPU context.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocates a fresh id. Intended for `Platform` implementations.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a buffer living inside a [`GpuContext`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BufferId(u64);

impl BufferId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a binding object (buffer + fixed layout) living inside a [`GpuContext`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BindingId(u64);

impl BindingId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// What a buffer is used for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferKind {
    /// Chart geometry read by draw calls through a binding.
    Geometry,
    /// Colormap ramp (array of RGBA f32 entries).
    ColorMap,
}

/// Whether a binding advances per vertex or per instance.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StepMode {
    Vertex,
    Instance,
}

/// Fixed layout a binding imposes on its buffer.
///
/// Elements are tightly packed: one record is `components × element.byte_width()`
/// bytes and record `i` starts at `i × stride()`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    pub element: DataType,
    pub components: u32,
    pub step: StepMode,
}

impl VertexLayout {
    #[inline]
    pub const fn new(element: DataType, components: u32, step: StepMode) -> Self {
        Self { element, components, step }
    }

    /// Bytes per record.
    #[inline]
    pub const fn stride(self) -> u64 {
        self.components as u64 * self.element.byte_width()
    }
}

/// A GPU context: the namespace that owns buffers and binding objects.
///
/// Contexts are shared between windows through `Rc<dyn GpuContext>`; the context
/// lives as long as its longest holder. Methods take `&self` so a context can be
/// used through any of its shared handles.
///
/// Binding objects are context-scoped but callers key them by window, so two
/// windows sharing a context still get distinct bindings.
pub trait GpuContext {
    /// Identity used to detect cross-context use.
    fn id(&self) -> ContextId;

    /// Backend-specific native handle (GL context, device pointer, ...), or an id.
    fn native_handle(&self) -> u64;

    /// Allocates a zero-initialized buffer of exactly `size` bytes.
    fn create_buffer(&self, kind: BufferKind, size: u64, label: &str) -> Result<BufferId>;

    /// Replaces `data.len()` bytes at `offset`. Never resizes the buffer.
    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<()>;

    /// Releases a buffer. Unknown ids are ignored.
    fn release_buffer(&self, buffer: BufferId);

    /// Size in bytes as requested at creation, or `None` for unknown ids.
    fn buffer_size(&self, buffer: BufferId) -> Option<u64>;

    /// Creates a binding object that reads `buffer` with `layout`.
    fn create_binding(&self, buffer: BufferId, layout: VertexLayout) -> Result<BindingId>;

    /// Releases a binding object. Unknown ids are ignored.
    fn release_binding(&self, binding: BindingId);

    /// Reports (and clears) any backend error raised since the last check.
    ///
    /// `site` names the boundary being checked and is carried in the error.
    fn check_error(&self, site: &str) -> Result<()>;

    /// Downcast hook for platforms that need their concrete context type back.
    fn as_any(&self) -> &dyn Any;
}
