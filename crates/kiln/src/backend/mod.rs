//! `winit` + `wgpu` implementation of the device contracts.
//!
//! This module is responsible for:
//! - creating wgpu devices (one per independent context) and winit windows
//! - storing chart buffers and per-window binding objects on the GPU
//! - executing recorded command lists into a single render pass per frame
//! - pumping native events into per-window close and resize flags
//!
//! Chart data is read from storage buffers in the vertex stage, so the selected
//! adapter must support vertex-stage storage buffers (not available on WebGL2).

mod error;
mod events;
mod executor;
mod gpu;
mod init;
mod pipeline;
mod platform;
mod surface;
mod text;

pub use error::{codes, SurfaceErrorAction};
pub use gpu::WgpuContext;
pub use init::GpuInit;
pub use platform::WgpuPlatform;
pub use surface::WgpuSurface;

use crate::error::Result;
use crate::session::Session;

/// A session over a [`WgpuPlatform`] configured with `init`.
pub fn wgpu_session(init: GpuInit) -> Result<Session> {
    Ok(Session::new(WgpuPlatform::new(init)?))
}
