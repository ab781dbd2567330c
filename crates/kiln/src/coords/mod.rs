//! Pixel-space geometry shared by windows, grids and backends.

mod rect;

pub use rect::PixelRect;
