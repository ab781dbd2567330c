use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;

use crate::device::{
    BindingId, BufferId, BufferKind, ContextId, GpuContext, VertexLayout,
};
use crate::error::{Error, Result};

use super::error::CapturedError;
use super::pipeline::{BindLayouts, DrawUniform, PipelineCache};
use super::text::TextAtlas;
use super::GpuInit;

struct GpuBuffer {
    buffer: wgpu::Buffer,
    /// Size as requested by the caller; the allocation is rounded up to 4.
    size: u64,
    /// CPU copy of the contents, padded like the allocation.
    shadow: RefCell<Vec<u8>>,
    /// Whole-buffer storage group, kept for colormap ramps.
    colormap_group: Option<wgpu::BindGroup>,
}

struct GpuBinding {
    group: wgpu::BindGroup,
    layout: VertexLayout,
}

#[derive(Default)]
struct Resources {
    buffers: HashMap<BufferId, GpuBuffer>,
    bindings: HashMap<BindingId, GpuBinding>,
}

/// A wgpu device and queue plus every buffer and binding object created in it.
///
/// Windows sharing this context draw from the same buffers; each window still
/// gets its own [`BindingId`]s through the charts' binding caches.
pub struct WgpuContext {
    id: ContextId,
    init: GpuInit,
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    layouts: BindLayouts,
    /// Bound at groups 1/2 when a draw has no data or colormap of its own.
    empty_storage: wgpu::BindGroup,

    resources: RefCell<Resources>,
    pipelines: RefCell<PipelineCache>,
    atlas: RefCell<TextAtlas>,
    next_handle: Cell<u64>,

    errors: Arc<Mutex<VecDeque<CapturedError>>>,
}

impl WgpuContext {
    /// Creates an instance, adapter and device. Blocks on the async wgpu calls.
    pub fn new(init: &GpuInit) -> Result<Self> {
        pollster::block_on(Self::new_async(init)).map_err(|err| {
            log::error!("wgpu context creation failed: {err:#}");
            Error::context_creation(format!("{err:#}"))
        })
    }

    async fn new_async(init: &GpuInit) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        // Surfaces are created per window afterwards; any adapter able to
        // present on this platform will do.
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kiln device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let errors: Arc<Mutex<VecDeque<CapturedError>>> = Arc::default();
        let sink = Arc::clone(&errors);
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            log::error!("wgpu: {err}");
            if let Ok(mut queue) = sink.lock() {
                queue.push_back(CapturedError::from_wgpu(&err));
            }
        }));

        let layouts = BindLayouts::new(&device);
        let empty = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln empty storage"),
            size: 16,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });
        let empty_storage = storage_group(&device, &layouts.storage, &empty, "kiln empty storage");
        let atlas = TextAtlas::new(&device, &layouts.atlas);

        let info = adapter.get_info();
        let id = ContextId::next();
        log::info!(
            "context {} created on {} ({:?}, {:?})",
            id.raw(),
            info.name,
            info.backend,
            info.device_type
        );

        Ok(Self {
            id,
            init: init.clone(),
            instance,
            adapter,
            device,
            queue,
            layouts,
            empty_storage,
            resources: RefCell::default(),
            pipelines: RefCell::default(),
            atlas: RefCell::new(atlas),
            next_handle: Cell::new(0),
            errors,
        })
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[inline]
    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    #[inline]
    pub(crate) fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    #[inline]
    pub(crate) fn init(&self) -> &GpuInit {
        &self.init
    }

    #[inline]
    pub(crate) fn layouts(&self) -> &BindLayouts {
        &self.layouts
    }

    #[inline]
    pub(crate) fn empty_storage(&self) -> &wgpu::BindGroup {
        &self.empty_storage
    }

    #[inline]
    pub(crate) fn pipelines(&self) -> &RefCell<PipelineCache> {
        &self.pipelines
    }

    #[inline]
    pub(crate) fn atlas(&self) -> &RefCell<TextAtlas> {
        &self.atlas
    }

    /// Distance between two draws' uniforms inside a frame's uniform arena.
    pub(crate) fn uniform_stride(&self) -> u64 {
        let align = self.device.limits().min_uniform_buffer_offset_alignment as u64;
        align.max(size_of::<DrawUniform>() as u64)
    }

    /// Calls `f` with the bind group of `binding` and its layout, if known.
    pub(crate) fn with_binding<R>(
        &self,
        binding: BindingId,
        f: impl FnOnce(&wgpu::BindGroup, VertexLayout) -> R,
    ) -> Option<R> {
        let resources = self.resources.borrow();
        resources.bindings.get(&binding).map(|b| f(&b.group, b.layout))
    }

    /// Runs `f` with every binding and colormap group resolvable by id.
    ///
    /// Keeps the resource table borrowed for the duration, which is what a
    /// render pass needs while it references the groups.
    pub(crate) fn with_resources<R>(&self, f: impl FnOnce(&ResourceView<'_>) -> R) -> R {
        let resources = self.resources.borrow();
        f(&ResourceView { resources: &resources })
    }

    fn next_handle(&self) -> u64 {
        let id = self.next_handle.get() + 1;
        self.next_handle.set(id);
        id
    }
}

/// Borrowed lookup into a context's resource table.
pub(crate) struct ResourceView<'a> {
    resources: &'a Resources,
}

impl ResourceView<'_> {
    pub(crate) fn binding(&self, binding: BindingId) -> Option<&wgpu::BindGroup> {
        self.resources.bindings.get(&binding).map(|b| &b.group)
    }

    pub(crate) fn colormap(&self, buffer: BufferId) -> Option<&wgpu::BindGroup> {
        self.resources
            .buffers
            .get(&buffer)
            .and_then(|b| b.colormap_group.as_ref())
    }
}

fn storage_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// Allocation size for a buffer of `size` requested bytes.
///
/// Storage bindings read whole 32-bit words, so sizes are padded to 4 and an
/// empty buffer still gets one word.
pub(crate) fn padded_size(size: u64) -> u64 {
    size.div_ceil(4).max(1) * 4
}

impl GpuContext for WgpuContext {
    fn id(&self) -> ContextId {
        self.id
    }

    fn native_handle(&self) -> u64 {
        self.id.raw()
    }

    fn create_buffer(&self, kind: BufferKind, size: u64, label: &str) -> Result<BufferId> {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: padded_size(size),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let colormap_group = match kind {
            BufferKind::ColorMap => Some(storage_group(
                &self.device,
                &self.layouts.storage,
                &buffer,
                label,
            )),
            BufferKind::Geometry => None,
        };

        let id = BufferId::new(self.next_handle());
        self.resources.borrow_mut().buffers.insert(
            id,
            GpuBuffer {
                buffer,
                size,
                shadow: RefCell::new(vec![0; padded_size(size) as usize]),
                colormap_group,
            },
        );
        log::trace!("buffer {} created: {label} ({size} bytes, {kind:?})", id.raw());
        Ok(id)
    }

    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<()> {
        let resources = self.resources.borrow();
        let target = resources
            .buffers
            .get(&buffer)
            .ok_or(Error::UnknownResource("buffer"))?;

        let end = offset + data.len() as u64;
        if end > target.size {
            return Err(Error::DataSize { expected: target.size, actual: end });
        }
        if data.is_empty() {
            return Ok(());
        }

        // Queue writes need 4-byte aligned offsets and sizes: widen the write to
        // whole words, taking the bytes around `data` from the shadow copy.
        let mut shadow = target.shadow.borrow_mut();
        shadow[offset as usize..end as usize].copy_from_slice(data);
        let start = offset / 4 * 4;
        let stop = end.div_ceil(4) * 4;
        self.queue
            .write_buffer(&target.buffer, start, &shadow[start as usize..stop as usize]);
        Ok(())
    }

    fn release_buffer(&self, buffer: BufferId) {
        if let Some(entry) = self.resources.borrow_mut().buffers.remove(&buffer) {
            entry.buffer.destroy();
            log::trace!("buffer {} released", buffer.raw());
        }
    }

    fn buffer_size(&self, buffer: BufferId) -> Option<u64> {
        self.resources.borrow().buffers.get(&buffer).map(|b| b.size)
    }

    fn create_binding(&self, buffer: BufferId, layout: VertexLayout) -> Result<BindingId> {
        let mut resources = self.resources.borrow_mut();
        let source = resources
            .buffers
            .get(&buffer)
            .ok_or(Error::UnknownResource("buffer"))?;
        if !layout.element.is_supported() {
            return Err(Error::UnsupportedElementType(layout.element));
        }

        let group = storage_group(
            &self.device,
            &self.layouts.storage,
            &source.buffer,
            "kiln chart binding",
        );
        let id = BindingId::new(self.next_handle());
        resources.bindings.insert(id, GpuBinding { group, layout });
        log::trace!("binding {} created over buffer {}", id.raw(), buffer.raw());
        Ok(id)
    }

    fn release_binding(&self, binding: BindingId) {
        if self.resources.borrow_mut().bindings.remove(&binding).is_some() {
            log::trace!("binding {} released", binding.raw());
        }
    }

    fn check_error(&self, site: &str) -> Result<()> {
        let captured = match self.errors.lock() {
            Ok(mut queue) => {
                let first = queue.pop_front();
                queue.clear();
                first
            }
            Err(_) => Some(CapturedError {
                code: super::codes::INTERNAL,
                message: "error queue poisoned".into(),
            }),
        };
        match captured {
            Some(err) => Err(err.into_error(site)),
            None => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for WgpuContext {
    fn drop(&mut self) {
        let resources = self.resources.get_mut();
        if !resources.buffers.is_empty() || !resources.bindings.is_empty() {
            log::warn!(
                "context {} dropped with {} buffers and {} bindings still live",
                self.id.raw(),
                resources.buffers.len(),
                resources.bindings.len()
            );
        }
        log::debug!("context {} destroyed", self.id.raw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_size_rounds_to_words() {
        assert_eq!(padded_size(0), 4);
        assert_eq!(padded_size(1), 4);
        assert_eq!(padded_size(4), 4);
        assert_eq!(padded_size(10), 12);
    }
}
