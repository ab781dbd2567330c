use std::fmt;
use std::rc::Rc;

use crate::device::{BufferId, BufferKind, GpuContext};
use crate::error::Result;

use super::{ramp, ColorMap};

/// A selected colormap as seen by renderables: buffer plus entry count.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ColorMapRef {
    pub buffer: BufferId,
    pub len: u32,
}

/// All colormap ramps uploaded into one GPU context.
///
/// Created once per independent context; released when the last window or
/// chart holding the shared context goes away.
pub struct ColorMapTable {
    gpu: Rc<dyn GpuContext>,
    entries: [ColorMapRef; ColorMap::ALL.len()],
}

impl ColorMapTable {
    pub fn new(gpu: &Rc<dyn GpuContext>) -> Result<Self> {
        let empty = ColorMapRef { buffer: BufferId::new(0), len: 0 };
        let mut entries = [empty; ColorMap::ALL.len()];
        for (i, map) in ColorMap::ALL.into_iter().enumerate() {
            match upload(gpu.as_ref(), map) {
                Ok(entry) => entries[i] = entry,
                Err(err) => {
                    for entry in &entries[..i] {
                        gpu.release_buffer(entry.buffer);
                    }
                    return Err(err);
                }
            }
        }

        log::debug!("colormap table uploaded to context {}", gpu.id().raw());
        Ok(Self { gpu: Rc::clone(gpu), entries })
    }

    #[inline]
    pub fn get(&self, map: ColorMap) -> ColorMapRef {
        self.entries[map.index()]
    }
}

fn upload(gpu: &dyn GpuContext, map: ColorMap) -> Result<ColorMapRef> {
    let data = ramp(map);
    let bytes: &[u8] = bytemuck::cast_slice(&data);
    let label = format!("kiln colormap {}", map.name());
    let buffer = gpu.create_buffer(BufferKind::ColorMap, bytes.len() as u64, &label)?;
    if let Err(err) = gpu.write_buffer(buffer, 0, bytes) {
        gpu.release_buffer(buffer);
        return Err(err);
    }
    Ok(ColorMapRef { buffer, len: data.len() as u32 })
}

impl Drop for ColorMapTable {
    fn drop(&mut self) {
        for entry in &self.entries {
            self.gpu.release_buffer(entry.buffer);
        }
    }
}

impl fmt::Debug for ColorMapTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorMapTable")
            .field("context", &self.gpu.id())
            .field("entries", &self.entries)
            .finish()
    }
}
