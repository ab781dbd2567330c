use std::fmt;
use std::rc::Rc;

use crate::device::{BufferId, BufferKind, DataType, Element, GpuContext};
use crate::error::{Error, Result};

/// Fixed-size GPU buffer holding a chart's raw data.
///
/// The size is decided at creation (`elements × byte_width`) and never changes;
/// uploads replace a prefix of the contents.
pub struct GeometryBuffer {
    gpu: Rc<dyn GpuContext>,
    buffer: BufferId,
    element: DataType,
    size: u64,
}

impl GeometryBuffer {
    /// Allocates room for `elements` scalars of type `element`.
    pub fn new(
        gpu: &Rc<dyn GpuContext>,
        element: DataType,
        elements: u64,
        label: &str,
    ) -> Result<Self> {
        if !element.is_supported() {
            return Err(Error::UnsupportedElementType(element));
        }
        let size = elements * element.byte_width();
        let buffer = gpu.create_buffer(BufferKind::Geometry, size, label)?;
        Ok(Self {
            gpu: Rc::clone(gpu),
            buffer,
            element,
            size,
        })
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.buffer
    }

    /// Size in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn element(&self) -> DataType {
        self.element
    }

    /// Number of scalars the buffer holds.
    #[inline]
    pub fn len(&self) -> u64 {
        self.size / self.element.byte_width()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Copies `data` to the start of the buffer.
    pub fn upload<T: Element>(&self, data: &[T]) -> Result<()> {
        if T::DATA_TYPE != self.element {
            return Err(Error::DataTypeMismatch {
                expected: self.element,
                actual: T::DATA_TYPE,
            });
        }
        self.upload_bytes(bytemuck::cast_slice(data))
    }

    /// Copies raw little-endian bytes to the start of the buffer.
    pub fn upload_bytes(&self, bytes: &[u8]) -> Result<()> {
        let actual = bytes.len() as u64;
        if actual > self.size {
            return Err(Error::DataSize { expected: self.size, actual });
        }
        self.gpu.write_buffer(self.buffer, 0, bytes)
    }
}

impl Drop for GeometryBuffer {
    fn drop(&mut self) {
        self.gpu.release_buffer(self.buffer);
    }
}

impl fmt::Debug for GeometryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryBuffer")
            .field("buffer", &self.buffer)
            .field("element", &self.element)
            .field("size", &self.size)
            .finish()
    }
}
