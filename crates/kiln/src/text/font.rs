use std::fmt;
use std::path::{Path, PathBuf};

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::error::{Error, Result};

/// Directories searched by [`Font::load_system_font`], in order.
const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// A parsed TrueType/OpenType font.
///
/// Fonts are immutable after loading and shared between windows through `Rc`.
pub struct Font {
    inner: fontdue::Font,
    name: String,
}

impl Font {
    /// Parses a font from raw bytes.
    pub fn from_bytes(bytes: &[u8], name: impl Into<String>) -> Result<Self> {
        let inner = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| Error::Font(e.to_string()))?;
        Ok(Self { inner, name: name.into() })
    }

    /// Reads and parses a font file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let font = Self::from_bytes(&bytes, name)?;
        log::debug!("loaded font {:?} from {}", font.name, path.display());
        Ok(font)
    }

    /// Finds a font by file name (without extension, case-insensitive) in the
    /// platform font directories and loads it.
    ///
    /// `load_system_font("DejaVuSans")` matches `.../DejaVuSans.ttf`.
    pub fn load_system_font(name: &str) -> Result<Self> {
        let mut dirs: Vec<PathBuf> = SYSTEM_FONT_DIRS.iter().map(PathBuf::from).collect();
        if let Some(home) = std::env::var_os("HOME") {
            let home = PathBuf::from(home);
            dirs.push(home.join(".fonts"));
            dirs.push(home.join(".local/share/fonts"));
        }

        let wanted = name.to_ascii_lowercase();
        dirs.iter()
            .filter(|dir| dir.is_dir())
            .find_map(|dir| find_font_file(dir, &wanted, 0))
            .ok_or_else(|| Error::Font(format!("system font {name:?} not found")))
            .and_then(Self::load_file)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn raw(&self) -> &fontdue::Font {
        &self.inner
    }

    /// Distance from the baseline to the top of the tallest glyphs, in pixels.
    pub fn ascent(&self, size: f32) -> f32 {
        self.inner
            .horizontal_line_metrics(size)
            .map(|m| m.ascent)
            .unwrap_or(size * 0.8)
    }

    /// Width and height of a single line of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.inner], &TextStyle::new(text, size, 0));

        let glyphs = layout.glyphs();
        if glyphs.is_empty() {
            return (0.0, size * 1.2);
        }

        // Pen position after each glyph, not the bitmap edge, so trailing
        // spaces count.
        let w = glyphs
            .iter()
            .map(|g| {
                let m = self.inner.metrics_indexed(g.key.glyph_index, size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);
        (w, layout.height())
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("name", &self.name)
            .field("glyphs", &self.inner.glyph_count())
            .finish()
    }
}

fn find_font_file(dir: &Path, wanted: &str, depth: u32) -> Option<PathBuf> {
    // Font trees are shallow; a bound keeps symlink loops finite.
    if depth > 6 {
        return None;
    }
    let entries = std::fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
        let stem_matches = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.to_ascii_lowercase() == wanted);
        if is_font && stem_matches {
            return Some(path);
        }
    }
    subdirs
        .iter()
        .find_map(|sub| find_font_file(sub, wanted, depth + 1))
}
