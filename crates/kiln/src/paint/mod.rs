//! Color values used by charts, clears and text.

mod color;

pub use color::Color;
