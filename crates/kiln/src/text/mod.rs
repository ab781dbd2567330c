//! Fonts used for grid-cell titles and chart labels.
//!
//! Text is recorded as [`crate::render::Command::Text`] and rasterized by the
//! backend; this module only owns font data and measurement.

mod font;

pub use font::Font;
