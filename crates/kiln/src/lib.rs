//! kiln: real-time 2D and 3D charts in native windows.
//!
//! A [`Session`] owns the platform and the current-window slot. Windows are
//! created from a session, optionally sharing the GPU context of another window,
//! and draw [`Renderable`] charts over the whole surface or into grid cells.
//!
//! ```ignore
//! let session = kiln::backend::wgpu_session(kiln::backend::GpuInit::default())?;
//! let mut window = Window::new(&session, WindowConfig::new(800, 600, "field"))?;
//! let mut field = VectorField::new(&window, 1024, DataType::F32)?;
//! field.upload(&points)?;
//! while !window.close() {
//!     window.draw(&mut field)?;
//! }
//! ```

pub mod backend;
pub mod chart;
pub mod colormap;
pub mod coords;
pub mod device;
pub mod error;
pub mod logging;
pub mod paint;
pub mod render;
pub mod session;
pub mod text;
pub mod time;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use chart::{DataType, Histogram, Plot, PlotType, Renderable, SurfaceChart, VectorField};
pub use colormap::ColorMap;
pub use coords::PixelRect;
pub use error::{Error, Result};
pub use paint::Color;
pub use session::Session;
pub use text::Font;
pub use window::{ContextMode, WeakWindow, Window, WindowConfig, WindowId};
