//! Colormap selection and the per-context table of uploaded ramps.
//!
//! Every GPU context gets one [`ColorMapTable`]; windows sharing a context share
//! the table. Selecting a map on a window only changes which
//! [`ColorMapRef`] is handed to renderables.

mod ramps;
mod table;

pub use ramps::{ramp, RAMP_LEN};
pub use table::{ColorMapRef, ColorMapTable};

/// Colormap selector.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ColorMap {
    #[default]
    Default,
    Spectrum,
    Colors,
    Red,
    Mood,
    Heat,
    Blue,
}

impl ColorMap {
    pub const ALL: [ColorMap; 7] = [
        ColorMap::Default,
        ColorMap::Spectrum,
        ColorMap::Colors,
        ColorMap::Red,
        ColorMap::Mood,
        ColorMap::Heat,
        ColorMap::Blue,
    ];

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            ColorMap::Default => "default",
            ColorMap::Spectrum => "spectrum",
            ColorMap::Colors => "colors",
            ColorMap::Red => "red",
            ColorMap::Mood => "mood",
            ColorMap::Heat => "heat",
            ColorMap::Blue => "blue",
        }
    }
}
