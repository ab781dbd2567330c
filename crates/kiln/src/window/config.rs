use super::{Window, WeakWindow};

/// Window creation parameters.
///
/// ```ignore
/// let config = WindowConfig::new(800, 600, "fields")
///     .invisible(true)
///     .shared_with(&parent);
/// ```
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Create the native window hidden.
    pub invisible: bool,
    /// Window whose GPU context the new window should share. A parent that is
    /// already gone yields an independent context.
    pub parent: Option<WeakWindow>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            width: 1280,
            height: 720,
            invisible: false,
            parent: None,
        }
    }
}

impl WindowConfig {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn invisible(mut self, invisible: bool) -> Self {
        self.invisible = invisible;
        self
    }

    pub fn parent(mut self, parent: WeakWindow) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Shorthand for `parent(window.downgrade())`.
    pub fn shared_with(self, window: &Window) -> Self {
        self.parent(window.downgrade())
    }
}
