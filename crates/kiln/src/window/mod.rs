//! Windows: native surface, GPU context sharing and grid layout.
//!
//! This module is responsible for:
//! - creating a window and resolving whether it shares its parent's context
//! - the per-window frame (viewport, clip, clear, render, present)
//! - grid cell addressing
//!
//! It does not rasterize anything itself; recorded commands are executed by the
//! window's [`crate::device::Surface`].

mod config;
mod grid;
mod handle;

pub use config::WindowConfig;
pub use grid::{CellLayout, Grid};
pub use handle::{ContextMode, SharedContext, WeakWindow, Window, WindowId};
