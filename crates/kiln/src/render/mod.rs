//! Frame recording shared by windows, charts and backends.
//!
//! Windows record viewport/clip/clear commands, renderables record draw calls
//! and text into the same [`CommandList`], and the window's surface executes the
//! list on present.
//!
//! Convention:
//! - pixel rects use a bottom-left framebuffer origin (+Y up)
//! - draw transforms map data space to NDC of the current viewport

mod cmd;
mod ctx;
mod list;

pub use cmd::{Command, DrawCall, DrawKind, TextRun, Topology};
pub use ctx::RenderCtx;
pub use list::CommandList;
