use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result as AnyResult};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::window::Window;

use crate::device::{GpuContext, NativeHandles, Surface};
use crate::error::{Error, Result};
use crate::render::CommandList;
use crate::window::WindowConfig;

use super::events::{EventPump, WindowFlags};
use super::executor::{self, FrameArena, FrameTarget};
use super::gpu::WgpuContext;
use super::{codes, GpuInit, SurfaceErrorAction};

/// A winit window with its configured wgpu surface.
///
/// The window is held through an `Arc` so the surface can borrow it for
/// `'static`; fields drop in declaration order, surface first.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    arena: FrameArena,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,

    context: Rc<dyn GpuContext>,
    flags: Rc<WindowFlags>,
    pump: Rc<RefCell<EventPump>>,
    window: Arc<Window>,
}

impl WgpuSurface {
    pub(crate) fn new(
        context: &Rc<dyn GpuContext>,
        pump: &Rc<RefCell<EventPump>>,
        config: &WindowConfig,
    ) -> AnyResult<Self> {
        let gpu = context
            .as_any()
            .downcast_ref::<WgpuContext>()
            .context("context was not created by the wgpu platform")?;

        let attrs = Window::default_attributes()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(config.width.max(1), config.height.max(1)))
            .with_visible(!config.invisible);
        let (window, flags) = pump.borrow_mut().create_window(attrs)?;

        let surface = gpu
            .instance()
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")?;

        let caps = surface.get_capabilities(gpu.adapter());
        let init = gpu.init();
        let format = choose_surface_format(&caps, init.prefer_srgb)
            .context("surface is not supported by the context's adapter")?;

        let size = window.inner_size();
        let surface_config = surface_configuration(init, &caps, format, size);
        if size.width > 0 && size.height > 0 {
            surface.configure(gpu.device(), &surface_config);
        }
        log::debug!(
            "surface for {:?} configured: {}x{} {format:?}",
            window.id(),
            size.width,
            size.height
        );

        Ok(Self {
            surface,
            arena: FrameArena::default(),
            config: surface_config,
            size,
            context: Rc::clone(context),
            flags,
            pump: Rc::clone(pump),
            window,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Ok(gpu) = wgpu_context(&self.context) else {
            return;
        };
        apply_resize(&self.surface, gpu.device(), &mut self.config, &mut self.size, new_size);
    }
}

impl Surface for WgpuSurface {
    fn make_current(&mut self) -> Result<()> {
        // wgpu has no thread-bound current context; targets are chosen per pass.
        log::trace!("{:?} is now current", self.window.id());
        Ok(())
    }

    fn present(&mut self, commands: &CommandList) -> Result<()> {
        if self.size.width == 0 || self.size.height == 0 {
            log::trace!("{:?} minimized, frame skipped", self.window.id());
            return Ok(());
        }
        let gpu = wgpu_context(&self.context)?;

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                let message = err.to_string();
                let action =
                    map_surface_error(&self.surface, gpu.device(), &self.config, self.size, err);
                return match action {
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::warn!("frame skipped: {message}");
                        Ok(())
                    }
                    SurfaceErrorAction::Fatal => Err(Error::GraphicsBackend {
                        code: codes::OUT_OF_MEMORY,
                        site: "present".into(),
                        message,
                    }),
                };
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let target = FrameTarget {
            view: &view,
            format: self.config.format,
            size: (self.size.width, self.size.height),
        };
        let buffer = executor::encode(gpu, &mut self.arena, target, commands)?;
        gpu.queue().submit(std::iter::once(buffer));

        self.window.pre_present_notify();
        frame.present();
        Ok(())
    }

    fn poll_events(&mut self) {
        match self.pump.try_borrow_mut() {
            Ok(mut pump) => pump.pump(),
            Err(_) => log::warn!("event pump busy, events left pending"),
        }
        if let Some(size) = self.flags.take_resize() {
            self.resize(size);
        }
    }

    fn close_requested(&self) -> bool {
        self.flags.close_requested()
    }

    fn reset_close_flag(&mut self) {
        self.flags.reset_close();
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }

    fn set_size(&mut self, width: u32, height: u32) {
        // Some platforms apply the size synchronously; others report it later
        // through a resize event.
        if let Some(applied) = self.window.request_inner_size(PhysicalSize::new(width, height)) {
            self.resize(applied);
        }
    }

    fn show(&mut self) {
        self.window.set_visible(true);
    }

    fn hide(&mut self) {
        self.window.set_visible(false);
    }

    fn native_handles(&self) -> NativeHandles {
        let window = self
            .window
            .window_handle()
            .map(|h| raw_window_id(h.as_raw()))
            .unwrap_or(0);
        let display = self
            .window
            .display_handle()
            .map(|h| raw_display_id(h.as_raw()))
            .unwrap_or(0);
        NativeHandles { window, display }
    }
}

impl Drop for WgpuSurface {
    fn drop(&mut self) {
        if let Ok(mut pump) = self.pump.try_borrow_mut() {
            pump.forget(self.window.id());
        }
        log::debug!("surface for {:?} destroyed", self.window.id());
    }
}

fn wgpu_context(context: &Rc<dyn GpuContext>) -> Result<&WgpuContext> {
    context
        .as_any()
        .downcast_ref::<WgpuContext>()
        .ok_or(Error::UnknownResource("wgpu context"))
}

fn raw_window_id(handle: RawWindowHandle) -> u64 {
    match handle {
        RawWindowHandle::Xlib(h) => h.window as u64,
        RawWindowHandle::Xcb(h) => h.window.get() as u64,
        RawWindowHandle::Wayland(h) => h.surface.as_ptr() as u64,
        RawWindowHandle::Win32(h) => h.hwnd.get() as u64,
        RawWindowHandle::AppKit(h) => h.ns_view.as_ptr() as u64,
        _ => 0,
    }
}

fn raw_display_id(handle: RawDisplayHandle) -> u64 {
    match handle {
        RawDisplayHandle::Xlib(h) => h.display.map_or(0, |p| p.as_ptr() as u64),
        RawDisplayHandle::Xcb(h) => h.connection.map_or(0, |p| p.as_ptr() as u64),
        RawDisplayHandle::Wayland(h) => h.display.as_ptr() as u64,
        _ => 0,
    }
}

fn surface_configuration(
    init: &GpuInit,
    caps: &wgpu::SurfaceCapabilities,
    format: wgpu::TextureFormat,
    size: PhysicalSize<u32>,
) -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: init.present_mode,
        alpha_mode: choose_alpha_mode(caps, init.alpha_mode),
        view_formats: vec![],
        desired_maximum_frame_latency: init.desired_maximum_frame_latency,
    }
}

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            present_modes: vec![wgpu::PresentMode::Fifo],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            usages: wgpu::TextureUsages::RENDER_ATTACHMENT,
        }
    }

    #[test]
    fn srgb_format_is_preferred_when_offered() {
        let c = caps(vec![
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ]);
        assert_eq!(
            choose_surface_format(&c, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&c, false),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
        assert_eq!(choose_surface_format(&caps(vec![]), true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let c = caps(vec![wgpu::TextureFormat::Bgra8Unorm]);
        assert_eq!(
            choose_alpha_mode(&c, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(choose_alpha_mode(&c, None), wgpu::CompositeAlphaMode::Opaque);
    }
}
