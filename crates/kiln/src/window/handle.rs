use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Mutex;

use crate::chart::Renderable;
use crate::colormap::{ColorMap, ColorMapTable};
use crate::coords::PixelRect;
use crate::device::{GpuContext, NativeHandles, Surface};
use crate::error::{Error, Result};
use crate::paint::Color;
use crate::render::{CommandList, RenderCtx, TextRun};
use crate::session::Session;
use crate::text::Font;
use crate::time::{FrameClock, FrameTime};

use super::{Grid, WindowConfig};

/// Background of every frame and grid cell.
const CLEAR_COLOR: Color = Color::GRAY;

const CELL_TITLE_SIZE: f32 = 16.0;

/// Process-unique window identity.
///
/// Allocated once per window from a process-wide counter starting at 0; never
/// reused. Charts key their per-window binding state by this id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct WindowId(u64);

impl WindowId {
    fn next() -> Self {
        static NEXT: Mutex<u64> = Mutex::new(0);
        let mut next = NEXT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = *next;
        *next += 1;
        Self(id)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// GPU state shared by every window created against the same context.
pub struct SharedContext {
    pub gpu: Rc<dyn GpuContext>,
    pub colormaps: ColorMapTable,
}

impl fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedContext")
            .field("context", &self.gpu.id())
            .field("colormaps", &self.colormaps)
            .finish()
    }
}

/// What other windows need to know about a window: its id, its shared context
/// and its native handles. Held strongly only by the window itself.
struct WindowLink {
    id: WindowId,
    shared: Rc<SharedContext>,
    native: NativeHandles,
}

/// Non-owning reference to a window, used to request context sharing.
///
/// Never keeps the window alive.
#[derive(Clone, Default)]
pub struct WeakWindow(Weak<WindowLink>);

impl WeakWindow {
    /// True while the referenced window exists.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Id of the referenced window, if it still exists.
    pub fn id(&self) -> Option<WindowId> {
        self.0.upgrade().map(|link| link.id)
    }

    fn upgrade(&self) -> Option<Rc<WindowLink>> {
        self.0.upgrade()
    }
}

impl fmt::Debug for WeakWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakWindow").field(&self.id()).finish()
    }
}

/// How a window obtained its GPU context. Decided once at construction.
#[derive(Debug, Clone)]
pub enum ContextMode {
    /// The window created its own context and colormap table.
    Independent,
    /// The window reuses the context of `parent`.
    Shared { parent: WeakWindow },
}

/// An on-screen rendering surface bound to a GPU context.
///
/// Frames are recorded into a command list and executed by the surface on
/// [`swap_buffers`](Self::swap_buffers). [`draw`](Self::draw) records and
/// presents a full-window frame in one call; [`draw_cell`](Self::draw_cell)
/// records into one grid cell and leaves presenting to the caller.
pub struct Window {
    // Field order is drop order: the native surface goes before the context.
    surface: Box<dyn Surface>,
    link: Rc<WindowLink>,
    mode: ContextMode,
    session: Session,

    commands: CommandList,
    grid: Option<Grid>,
    color_map: ColorMap,
    font: Option<Rc<Font>>,

    width: u32,
    height: u32,

    clock: FrameClock,
    last_frame: Option<FrameTime>,
}

impl Window {
    /// Creates a native window and its GPU context (or joins its parent's).
    pub fn new(session: &Session, config: WindowConfig) -> Result<Self> {
        let platform = session.platform();
        let parent = config.parent.as_ref().and_then(WeakWindow::upgrade);

        let (mut surface, shared, mode) = match parent {
            Some(parent) => {
                let surface = platform.create_surface(
                    &config,
                    &parent.shared.gpu,
                    Some(parent.native),
                )?;
                let mode = ContextMode::Shared {
                    parent: WeakWindow(Rc::downgrade(&parent)),
                };
                (surface, Rc::clone(&parent.shared), mode)
            }
            None => {
                if config.parent.is_some() {
                    log::debug!("parent window is gone; creating an independent context");
                }
                let gpu = platform.create_context()?;
                let surface = platform.create_surface(&config, &gpu, None)?;
                let colormaps = ColorMapTable::new(&gpu)?;
                let shared = Rc::new(SharedContext { gpu, colormaps });
                (surface, shared, ContextMode::Independent)
            }
        };

        let id = WindowId::next();
        session.make_current(id, surface.as_mut())?;
        shared.gpu.check_error("window initialization")?;

        log::info!(
            "window {} created ({}x{}, {} context {})",
            id.raw(),
            config.width,
            config.height,
            mode_name(&mode),
            shared.gpu.id().raw(),
        );

        let native = surface.native_handles();
        Ok(Self {
            surface,
            link: Rc::new(WindowLink { id, shared, native }),
            mode,
            session: session.clone(),
            commands: CommandList::new(),
            grid: None,
            color_map: ColorMap::Default,
            font: None,
            width: config.width,
            height: config.height,
            clock: FrameClock::new(),
            last_frame: None,
        })
    }

    #[inline]
    pub fn id(&self) -> WindowId {
        self.link.id
    }

    #[inline]
    pub fn context_mode(&self) -> &ContextMode {
        &self.mode
    }

    /// True if this window shares its context and the parent window still exists.
    pub fn parent_alive(&self) -> bool {
        match &self.mode {
            ContextMode::Independent => false,
            ContextMode::Shared { parent } => parent.is_alive(),
        }
    }

    /// Non-owning reference for sharing this window's context.
    pub fn downgrade(&self) -> WeakWindow {
        WeakWindow(Rc::downgrade(&self.link))
    }

    #[inline]
    pub fn shared_context(&self) -> &Rc<SharedContext> {
        &self.link.shared
    }

    #[inline]
    pub(crate) fn gpu(&self) -> &Rc<dyn GpuContext> {
        &self.link.shared.gpu
    }

    /// Native handle of the GPU context.
    pub fn context_handle(&self) -> u64 {
        self.link.shared.gpu.native_handle()
    }

    /// Native display connection, 0 where the platform has none.
    pub fn display_handle(&self) -> u64 {
        self.link.native.display
    }

    pub fn window_handle(&self) -> u64 {
        self.link.native.window
    }

    /// Requested width; the framebuffer may differ on high-DPI displays.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.surface.framebuffer_size()
    }

    #[inline]
    pub fn grid_layout(&self) -> Option<Grid> {
        self.grid
    }

    #[inline]
    pub fn color_map(&self) -> ColorMap {
        self.color_map
    }

    pub fn set_color_map(&mut self, map: ColorMap) {
        self.color_map = map;
    }

    /// Font used for grid-cell titles and chart labels.
    pub fn set_font(&mut self, font: Rc<Font>) {
        self.font = Some(font);
    }

    #[inline]
    pub fn font(&self) -> Option<&Rc<Font>> {
        self.font.as_ref()
    }

    pub fn set_title(&mut self, title: &str) {
        self.surface.set_title(title);
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.surface.set_position(x, y);
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.surface.set_size(width, height);
    }

    pub fn show(&mut self) {
        self.surface.show();
    }

    pub fn hide(&mut self) {
        self.surface.hide();
    }

    /// True once the user asked to close the window (close button or Escape).
    pub fn close(&self) -> bool {
        self.surface.close_requested()
    }

    /// Timing of the most recent [`swap_buffers`](Self::swap_buffers).
    #[inline]
    pub fn frame_time(&self) -> Option<FrameTime> {
        self.last_frame
    }

    /// Makes this window the session's render target.
    ///
    /// Returns `false` (and does nothing) if it already is.
    pub fn make_current(&mut self) -> Result<bool> {
        self.session.make_current(self.link.id, self.surface.as_mut())
    }

    /// Splits the window into `rows × cols` cells for [`draw_cell`](Self::draw_cell)
    /// and clears the whole framebuffer.
    pub fn grid(&mut self, rows: u32, cols: u32) -> Result<()> {
        let grid = Grid::new(rows, cols)?;
        self.grid = Some(grid);
        self.make_current()?;

        let full = self.full_rect();
        self.commands.set_viewport(full);
        self.commands.clear(CLEAR_COLOR, true);
        log::debug!("window {} grid {rows}x{cols}", self.link.id.raw());
        Ok(())
    }

    /// Renders `renderable` over the whole window and presents the frame.
    pub fn draw(&mut self, renderable: &mut dyn Renderable) -> Result<()> {
        self.make_current()?;
        self.surface.reset_close_flag();

        let full = self.full_rect();
        self.commands.set_viewport(full);
        self.commands.clear(CLEAR_COLOR, true);
        self.render_into(renderable, full)?;

        self.swap_buffers()
    }

    /// Renders `renderable` into grid cell (`col`, `row`); row 0 is the top row.
    ///
    /// Does not present; call [`swap_buffers`](Self::swap_buffers) once all
    /// cells are drawn. The first cell of a frame starts it with a full-window
    /// clear, so [`grid`](Self::grid) only needs calling when the layout changes.
    pub fn draw_cell(
        &mut self,
        col: u32,
        row: u32,
        renderable: &mut dyn Renderable,
        title: Option<&str>,
    ) -> Result<()> {
        let grid = self.grid.ok_or(Error::GridNotSet)?;
        let layout = grid.cell(col, row, self.surface.framebuffer_size())?;

        self.make_current()?;
        self.surface.reset_close_flag();
        self.begin_frame();

        self.commands.set_viewport(layout.cell);
        self.commands.push_clip(layout.inset);
        self.commands.clear(CLEAR_COLOR, true);
        let rendered = self.render_into(renderable, layout.cell);
        self.commands.pop_clip();
        self.commands.set_viewport(layout.cell);
        rendered?;

        if let Some(title) = title {
            self.record_cell_title(layout.cell, title);
        }
        Ok(())
    }

    /// Presents the recorded frame, then polls input and ticks the frame clock.
    ///
    /// An empty frame is presented as a cleared window. The command list is
    /// cleared even when presenting fails.
    pub fn swap_buffers(&mut self) -> Result<()> {
        self.begin_frame();
        let presented = self.surface.present(&self.commands);
        self.commands.reset();
        self.surface.poll_events();
        self.last_frame = Some(self.clock.tick());
        presented
    }

    /// Opens a frame with a full-window colour and depth clear unless one is
    /// already being recorded.
    fn begin_frame(&mut self) {
        if self.commands.is_empty() {
            let full = self.full_rect();
            self.commands.set_viewport(full);
            self.commands.clear(CLEAR_COLOR, true);
        }
    }

    fn full_rect(&self) -> PixelRect {
        let (w, h) = self.surface.framebuffer_size();
        PixelRect::from_size(w, h)
    }

    fn render_into(&mut self, renderable: &mut dyn Renderable, viewport: PixelRect) -> Result<()> {
        let shared = &self.link.shared;
        let gpu = shared.gpu.as_ref();

        gpu.check_error("before render")?;
        renderable.set_color_map_params(shared.colormaps.get(self.color_map));

        let mut ctx = RenderCtx::new(gpu, &mut self.commands, self.font.as_ref());
        renderable.render(&mut ctx, self.link.id, viewport)?;

        gpu.check_error("after render")
    }

    fn record_cell_title(&mut self, cell: PixelRect, title: &str) {
        let Some(font) = &self.font else {
            log::warn!(
                "window {}: no font set, skipping cell title {title:?}",
                self.link.id.raw()
            );
            return;
        };

        self.commands.text(TextRun {
            font: Rc::clone(font),
            text: title.to_string(),
            origin: [cell.width as f32 / 3.0, cell.height as f32 * 0.92],
            size: CELL_TITLE_SIZE,
            color: Color::RED,
        });
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.session.release(self.link.id);
        log::debug!(
            "window {} dropped ({} other windows share context {})",
            self.link.id.raw(),
            Rc::strong_count(&self.link.shared) - 1,
            self.link.shared.gpu.id().raw(),
        );
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.link.id)
            .field("mode", &mode_name(&self.mode))
            .field("context", &self.link.shared.gpu.id())
            .field("grid", &self.grid)
            .field("color_map", &self.color_map)
            .finish_non_exhaustive()
    }
}

fn mode_name(mode: &ContextMode) -> &'static str {
    match mode {
        ContextMode::Independent => "independent",
        ContextMode::Shared { .. } => "shared",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::chart::{plot_area, DataType, Histogram, Plot, PlotType};
    use crate::render::Command;
    use crate::testing::{mock_session, mock_window};

    fn plot(window: &Window) -> Plot {
        Plot::new(window, 16, DataType::F32, PlotType::Line).unwrap()
    }

    #[test]
    fn window_ids_are_unique_and_increasing_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| (0..100).map(|_| WindowId::next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            let ids = handle.join().unwrap();
            assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
            all.extend(ids);
        }
        assert_eq!(all.len(), 400);
    }

    #[test]
    fn shared_window_keeps_context_when_parent_dropped_first() {
        let (session, log) = mock_session();
        let parent = mock_window(&session, 320, 240, None);
        let mut child = mock_window(&session, 320, 240, Some(&parent));

        assert!(matches!(child.context_mode(), ContextMode::Shared { .. }));
        assert!(Rc::ptr_eq(child.shared_context(), parent.shared_context()));
        assert_eq!(log.contexts_created.get(), 1);
        assert!(log.share_requests.borrow()[1].is_some());

        let mut chart = plot(&parent);
        drop(parent);
        assert!(!child.parent_alive());
        assert_eq!(log.live_contexts(), 1);
        child.draw(&mut chart).unwrap();

        drop(child);
        assert_eq!(log.live_contexts(), 1, "chart still holds the context");
        drop(chart);
        assert_eq!(log.contexts_dropped.get(), 1);
        assert_eq!(log.live_buffers(), 0);
        assert_eq!(log.live_bindings(), 0);
    }

    #[test]
    fn shared_window_dropped_first_leaves_parent_working() {
        let (session, log) = mock_session();
        let mut parent = mock_window(&session, 320, 240, None);
        let child = mock_window(&session, 320, 240, Some(&parent));
        assert!(child.parent_alive());

        drop(child);
        assert_eq!(log.live_contexts(), 1);
        let mut chart = plot(&parent);
        parent.draw(&mut chart).unwrap();

        drop(chart);
        drop(parent);
        assert_eq!(log.contexts_dropped.get(), 1);
        assert_eq!(log.surfaces_dropped.get(), 2);
    }

    #[test]
    fn dead_parent_yields_independent_context() {
        let (session, log) = mock_session();
        let parent = mock_window(&session, 100, 100, None);
        let weak = parent.downgrade();
        drop(parent);
        assert!(!weak.is_alive());

        let window =
            Window::new(&session, WindowConfig::default().invisible(true).parent(weak)).unwrap();
        assert!(matches!(window.context_mode(), ContextMode::Independent));
        assert_eq!(log.contexts_created.get(), 2);
        assert_eq!(log.share_requests.borrow()[1], None);
    }

    #[test]
    fn context_creation_failure_propagates() {
        let (session, log) = mock_session();
        log.fail_context_creation.set(true);
        let err = Window::new(&session, WindowConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ContextCreation(_)));
        assert_eq!(log.surfaces_created.get(), 0);
    }

    #[test]
    fn make_current_is_idempotent() {
        let (session, log) = mock_session();
        let mut first = mock_window(&session, 100, 100, None);
        assert_eq!(session.current(), Some(first.id()));
        assert_eq!(log.make_current_calls.borrow().len(), 1);

        assert!(!first.make_current().unwrap());
        assert_eq!(log.make_current_calls.borrow().len(), 1);

        let second = mock_window(&session, 100, 100, Some(&first));
        assert_eq!(session.current(), Some(second.id()));
        assert!(first.make_current().unwrap());
        assert_eq!(log.make_current_calls.borrow().len(), 3);

        drop(first);
        assert_eq!(session.current(), None);
    }

    #[test]
    fn draw_records_full_frame_and_presents() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 640, 480, None);
        let mut chart = plot(&window);

        window.draw(&mut chart).unwrap();

        let frame = log.last_frame().unwrap();
        let full = PixelRect::new(0, 0, 640, 480);
        assert_eq!(frame[0], Command::Viewport(full));
        assert_eq!(frame[1], Command::Clear { color: Color::GRAY, depth: true });
        assert_eq!(frame[2], Command::Scissor(Some(plot_area(full))));
        assert!(matches!(frame[3], Command::Draw(_)));
        assert_eq!(frame[4], Command::Scissor(None));
        assert!(window.frame_time().is_some());
    }

    #[test]
    fn draw_cell_uses_cell_viewport_and_inset_clip() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 800, 600, None);
        let mut chart = plot(&window);

        window.grid(2, 2).unwrap();
        window.draw_cell(1, 0, &mut chart, None).unwrap();
        window.swap_buffers().unwrap();

        let frame = log.last_frame().unwrap();
        let cell = PixelRect::new(400, 300, 400, 300);
        let inset = PixelRect::new(408, 306, 384, 264);
        assert_eq!(frame[0], Command::Viewport(PixelRect::new(0, 0, 800, 600)));
        assert_eq!(frame[1], Command::Clear { color: Color::GRAY, depth: true });
        assert_eq!(frame[2], Command::Viewport(cell));
        assert_eq!(frame[3], Command::Scissor(Some(inset)));
        assert_eq!(frame[4], Command::Clear { color: Color::GRAY, depth: true });

        let clipped = inset.intersect(plot_area(cell));
        assert_eq!(frame[5], Command::Scissor(clipped));
        assert!(frame.contains(&Command::Scissor(None)));
        assert_eq!(frame.last(), Some(&Command::Viewport(cell)));
    }

    #[test]
    fn cell_draw_errors() {
        let (session, _log) = mock_session();
        let mut window = mock_window(&session, 800, 600, None);
        let mut chart = plot(&window);

        assert_eq!(window.draw_cell(0, 0, &mut chart, None), Err(Error::GridNotSet));
        assert_eq!(window.grid(0, 2), Err(Error::InvalidGrid { rows: 0, cols: 2 }));

        window.grid(2, 3).unwrap();
        assert_eq!(
            window.draw_cell(3, 1, &mut chart, None),
            Err(Error::GridIndexOutOfRange { col: 3, row: 1, cols: 3, rows: 2 })
        );
        assert_eq!(chart.binding_count(), 0);
    }

    #[test]
    fn window_grids_are_independent() {
        let (session, _log) = mock_session();
        let mut a = mock_window(&session, 800, 600, None);
        let mut b = mock_window(&session, 800, 600, Some(&a));
        a.grid(2, 2).unwrap();
        b.grid(1, 3).unwrap();
        assert_eq!(a.grid_layout(), Some(Grid::new(2, 2).unwrap()));
        assert_eq!(b.grid_layout(), Some(Grid::new(1, 3).unwrap()));
    }

    #[test]
    fn grid_in_one_window_leaves_the_other_frame_untouched() {
        let (session, log) = mock_session();
        let mut a = mock_window(&session, 800, 600, None);
        let mut b = mock_window(&session, 640, 480, Some(&a));
        let mut chart = plot(&a);

        a.grid(2, 2).unwrap();
        a.draw_cell(0, 0, &mut chart, None).unwrap();
        b.draw(&mut chart).unwrap();
        a.swap_buffers().unwrap();
        assert_eq!(b.grid_layout(), None);
        assert_eq!(chart.binding_count(), 2);

        let frames = log.frames.borrow();
        let (b_frame, a_frame) = (&frames[frames.len() - 2].1, &frames[frames.len() - 1].1);

        let b_full = PixelRect::new(0, 0, 640, 480);
        for command in b_frame {
            match command {
                Command::Viewport(rect) => assert_eq!(*rect, b_full),
                Command::Scissor(clip) => {
                    assert!(*clip == Some(plot_area(b_full)) || clip.is_none(), "{clip:?}")
                }
                _ => {}
            }
        }

        let a_full = PixelRect::new(0, 0, 800, 600);
        let cell = PixelRect::new(0, 300, 400, 300);
        let inset = PixelRect::new(8, 306, 384, 264);
        for command in a_frame {
            match command {
                Command::Viewport(rect) => assert!(*rect == a_full || *rect == cell, "{rect:?}"),
                Command::Scissor(Some(clip)) => {
                    assert_eq!(inset.intersect(*clip), Some(*clip), "{clip:?} escapes the cell")
                }
                _ => {}
            }
        }
        assert!(a_frame.contains(&Command::Scissor(Some(inset))));
    }

    #[test]
    fn frames_after_the_first_still_start_cleared() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 800, 600, None);
        let mut chart = plot(&window);
        let full = PixelRect::new(0, 0, 800, 600);
        let cell = PixelRect::new(0, 300, 400, 300);

        window.grid(2, 2).unwrap();
        for _ in 0..2 {
            window.draw_cell(0, 0, &mut chart, None).unwrap();
            window.swap_buffers().unwrap();

            let frame = log.last_frame().unwrap();
            assert_eq!(frame[0], Command::Viewport(full));
            assert_eq!(frame[1], Command::Clear { color: Color::GRAY, depth: true });
            assert_eq!(frame[2], Command::Viewport(cell));
        }
        let clears = |frame: &[Command]| {
            frame.iter().filter(|c| matches!(c, Command::Clear { .. })).count()
        };
        assert_eq!(clears(&log.last_frame().unwrap()), 2);

        window.swap_buffers().unwrap();
        assert_eq!(
            log.last_frame().unwrap(),
            vec![
                Command::Viewport(full),
                Command::Clear { color: Color::GRAY, depth: true },
            ]
        );
    }

    #[test]
    fn cell_title_needs_a_font() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 800, 600, None);
        let mut chart = plot(&window);
        window.grid(1, 1).unwrap();
        window.draw_cell(0, 0, &mut chart, Some("title")).unwrap();
        window.swap_buffers().unwrap();

        let frame = log.last_frame().unwrap();
        assert!(!frame.iter().any(|c| matches!(c, Command::Text(_))));
    }

    #[test]
    fn backend_error_surfaces_at_render_boundary() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 100, 100, None);
        let mut chart = plot(&window);

        let err = Error::GraphicsBackend { code: 2, site: "before render".into(), message: "bad".into() };
        *log.pending_error.borrow_mut() = Some(err.clone());
        assert_eq!(window.draw(&mut chart), Err(err));
    }

    #[test]
    fn close_flag_follows_input() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 100, 100, None);
        let mut chart = plot(&window);
        assert!(!window.close());

        log.close_pending.set(true);
        window.swap_buffers().unwrap();
        assert!(window.close());

        log.close_pending.set(false);
        window.draw(&mut chart).unwrap();
        assert!(!window.close());
    }

    #[test]
    fn cell_draw_resets_close_flag() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 400, 400, None);
        let mut chart = plot(&window);
        window.grid(1, 1).unwrap();

        log.close_pending.set(true);
        window.swap_buffers().unwrap();
        assert!(window.close());

        log.close_pending.set(false);
        window.draw_cell(0, 0, &mut chart, None).unwrap();
        assert!(!window.close());
    }

    #[test]
    fn selected_color_map_reaches_renderable() {
        let (session, log) = mock_session();
        let mut window = mock_window(&session, 400, 400, None);
        let mut hist = Histogram::new(&window, 8, DataType::U8).unwrap();
        window.set_color_map(ColorMap::Heat);
        assert_eq!(window.color_map(), ColorMap::Heat);

        window.draw(&mut hist).unwrap();

        let expected = window.shared_context().colormaps.get(ColorMap::Heat);
        let frame = log.last_frame().unwrap();
        let bars = frame
            .iter()
            .find_map(|c| match c {
                Command::Draw(call) if call.instances == 8 => Some(call.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(bars.colormap, Some(expected));
    }

    #[test]
    fn surface_mutators_reach_surface() {
        let (session, _log) = mock_session();
        let mut window = mock_window(&session, 100, 100, None);
        window.set_size(800, 600);
        window.set_title("renamed");
        window.set_position(10, 10);
        window.show();
        window.hide();
        assert_eq!(window.framebuffer_size(), (800, 600));
        assert_eq!((window.width(), window.height()), (800, 600));
        assert_eq!(window.display_handle(), 1);
        assert_eq!(window.context_handle(), window.shared_context().gpu.id().raw());
    }
}
