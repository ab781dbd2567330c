//! Collaborator contracts between the window core and a graphics backend.
//!
//! This module is responsible for:
//! - the `Platform` factory creating contexts and native surfaces
//! - the `GpuContext` object namespace (buffers, binding objects, error checks)
//! - the `Surface` adapter (present, input polling, close flag, geometry)
//!
//! The `winit`/`wgpu` implementation lives in [`crate::backend`].

mod context;
mod data_type;
mod platform;
mod surface;

pub use context::{
    BindingId, BufferId, BufferKind, ContextId, GpuContext, StepMode, VertexLayout,
};
pub use data_type::{DataType, Element};
pub use platform::Platform;
pub use surface::{NativeHandles, Surface};
