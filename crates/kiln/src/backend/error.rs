use crate::error::Error;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM).
    Fatal,
}

/// Numeric codes carried in [`Error::GraphicsBackend`].
pub mod codes {
    pub const OUT_OF_MEMORY: u32 = 1;
    pub const VALIDATION: u32 = 2;
    pub const INTERNAL: u32 = 3;
    pub const SURFACE_LOST: u32 = 4;
}

/// An uncaptured wgpu error waiting for the next `check_error`.
#[derive(Debug, Clone)]
pub(crate) struct CapturedError {
    pub code: u32,
    pub message: String,
}

impl CapturedError {
    pub(crate) fn from_wgpu(err: &wgpu::Error) -> Self {
        let code = match err {
            wgpu::Error::OutOfMemory { .. } => codes::OUT_OF_MEMORY,
            wgpu::Error::Validation { .. } => codes::VALIDATION,
            _ => codes::INTERNAL,
        };
        Self { code, message: err.to_string() }
    }

    pub(crate) fn into_error(self, site: &str) -> Error {
        Error::GraphicsBackend {
            code: self.code,
            site: site.to_string(),
            message: self.message,
        }
    }
}
