use std::convert::Infallible;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::time::Instant;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentContext, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle, RawWindowHandle};
use thiserror::Error;
use winit::dpi::{PhysicalSize, Size};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::NativeGl;

use crate::args::Args;
use crate::config::{ConfigError, DemoConfig};
use crate::shaders::ShaderDialect;
use crate::viewport::{fit_viewport, DrawSurface, Viewport};
use crate::{Demo, DemoError};

/// Loads the config, opens the window and hands control to the event loop.
///
/// Only returns on a setup failure.
pub fn launch<D, F>(args: &Args, title: &str, build: F) -> Result<Infallible, AppError>
where
    D: Demo + 'static,
    F: FnOnce(&mut GlRenderer, ShaderDialect, &DemoConfig, Viewport) -> Result<D, DemoError>,
{
    let config = match &args.config {
        Some(path) => DemoConfig::load_from_path(path)?,
        None => DemoConfig::default(),
    };

    let mut app = App::new(title, args.window_size(), config.clear_color)?;
    let demo = build(&mut app.renderer, app.dialect, &config, app.viewport)?;

    app.run(demo)
}

pub struct App {
    event_loop: EventLoop<()>,
    gl_window: GlWindow,
    renderer: GlRenderer,
    dialect: ShaderDialect,
    viewport: Viewport,
    clear_color: [f32; 3],
}

impl App {
    /// Opens a window (maximized unless `size` is given) with a current GL
    /// context, sized viewport and cleared background.
    pub fn new(
        title: &str,
        size: Option<(u32, u32)>,
        clear_color: [f32; 3],
    ) -> Result<Self, AppError> {
        let event_loop = EventLoop::new();
        let window_builder = match size {
            Some((width, height)) => WindowBuilder::new()
                .with_inner_size(Size::Physical(PhysicalSize::new(width, height))),
            None => WindowBuilder::new().with_maximized(true),
        }
        .with_title(title);

        // WGL needs the native window before it can pick a config; the other
        // platforms pick the config first so the window gets a matching visual.
        #[cfg(windows)]
        let (early_window, window_builder) = (
            Some(window_builder.build(&event_loop).map_err(|e| AppError::Window(e.to_string()))?),
            None,
        );
        #[cfg(not(windows))]
        let (early_window, window_builder) = (None, Some(window_builder));

        let gl_display = create_display(&event_loop, early_window.as_ref())?;

        let mut template = ConfigTemplateBuilder::new();
        if let Some(window) = &early_window {
            template = template.compatible_with_native_window(window.raw_window_handle());
        }

        let configs = unsafe { gl_display.find_configs(template.build()) }.map_err(|e| {
            log::error!("No usable GL display configuration: {e}");
            AppError::ContextUnavailable
        })?;
        let gl_config = pick_config(configs).ok_or_else(|| {
            log::error!("GL display reported no configurations");
            AppError::ContextUnavailable
        })?;

        let window = match (early_window, window_builder) {
            (Some(window), _) => window,
            (None, Some(builder)) => glutin_winit::finalize_window(&event_loop, builder, &gl_config)
                .map_err(|e| AppError::Window(e.to_string()))?,
            (None, None) => return Err(AppError::Window("no window was created".into())),
        };

        let (context, dialect) =
            create_context(&gl_display, &gl_config, window.raw_window_handle())?;
        let surface = create_surface(&window, &gl_config)?;

        let context = context.make_current(&surface).map_err(|e| {
            log::error!("Could not make GL context current: {e}");
            AppError::ContextUnavailable
        })?;

        gl::load_with(|s| match CString::new(s) {
            Ok(name) => gl_display.get_proc_address(name.as_c_str()).cast(),
            Err(_) => std::ptr::null(),
        });

        let gl_window = GlWindow {
            context,
            surface,
            window,
        };

        // SAFETY: function pointers were loaded above and the context stays
        // current on this thread for the lifetime of the app.
        let renderer = GlRenderer::new(unsafe { NativeGl::new() }.shared());

        let (width, height): (u32, u32) = gl_window.window.inner_size().into();
        let viewport = fit_viewport(&gl_window, &renderer, width.max(1), height.max(1))
            .ok_or_else(|| AppError::Window("window has no drawable area".into()))?;

        let [r, g, b] = clear_color;
        renderer.clear_color(r, g, b);

        log::info!(
            "Opened {}x{} window ({:?} shaders)",
            viewport.width,
            viewport.height,
            dialect
        );

        Ok(Self {
            event_loop,
            gl_window,
            renderer,
            dialect,
            viewport,
            clear_color,
        })
    }

    pub fn run<D: Demo + 'static>(self, mut demo: D) -> ! {
        let App {
            event_loop,
            gl_window,
            mut renderer,
            clear_color,
            ..
        } = self;
        let [r, g, b] = clear_color;
        let start = Instant::now();

        event_loop.run(move |event, _window_target, control_flow| {
            if demo.animated() {
                control_flow.set_poll();
            } else {
                control_flow.set_wait();
            }

            match event {
                Event::RedrawEventsCleared => {
                    if demo.animated() {
                        gl_window.window.request_redraw();
                    }
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if let Some(viewport) =
                            fit_viewport(&gl_window, &renderer, size.width, size.height)
                        {
                            demo.resize(&mut renderer, viewport);
                            gl_window.window.request_redraw();
                        }
                    }
                    WindowEvent::CloseRequested => control_flow.set_exit(),
                    _ => (),
                },
                Event::RedrawRequested(_) => {
                    renderer.clear_color(r, g, b);
                    demo.frame(&mut renderer, start.elapsed());

                    if let Err(e) = gl_window.surface.swap_buffers(&gl_window.context) {
                        log::error!("Could not present frame: {e}");
                        control_flow.set_exit();
                    }
                }
                _ => (),
            }
        })
    }
}

fn create_display(
    event_loop: &EventLoop<()>,
    window: Option<&Window>,
) -> Result<Display, AppError> {
    #[cfg(windows)]
    let preference = DisplayApiPreference::WglThenEgl(window.map(|w| w.raw_window_handle()));

    #[cfg(target_os = "macos")]
    let preference = {
        let _ = window;
        DisplayApiPreference::Cgl
    };

    #[cfg(target_os = "android")]
    let preference = {
        let _ = window;
        DisplayApiPreference::Egl
    };

    #[cfg(all(unix, not(target_os = "macos"), not(target_os = "ios"), not(target_os = "android")))]
    let preference = {
        let _ = window;
        DisplayApiPreference::GlxThenEgl(Box::new(winit::platform::unix::register_xlib_error_hook))
    };

    unsafe { Display::new(event_loop.raw_display_handle(), preference) }.map_err(|e| {
        log::error!("Could not open a GL display: {e}");
        AppError::ContextUnavailable
    })
}

/// First configuration the display offers, if it offers any.
fn pick_config<C>(mut configs: impl Iterator<Item = C>) -> Option<C> {
    configs.next()
}

/// Desktop OpenGL first, OpenGL ES 2.0 as the fallback.
fn create_context(
    display: &Display,
    config: &Config,
    handle: RawWindowHandle,
) -> Result<(NotCurrentContext, ShaderDialect), AppError> {
    acquire_context(|dialect| {
        let api = match dialect {
            ShaderDialect::Desktop => ContextApi::OpenGl(None),
            ShaderDialect::Es => ContextApi::Gles(Some(Version::new(2, 0))),
        };
        let attrs = ContextAttributesBuilder::new()
            .with_context_api(api)
            .build(Some(handle));

        unsafe { display.create_context(config, &attrs) }
    })
}

/// Runs `create` for the desktop dialect and, if that fails, for GLES.
fn acquire_context<C, E, F>(mut create: F) -> Result<(C, ShaderDialect), AppError>
where
    E: std::fmt::Display,
    F: FnMut(ShaderDialect) -> Result<C, E>,
{
    match create(ShaderDialect::Desktop) {
        Ok(context) => return Ok((context, ShaderDialect::Desktop)),
        Err(e) => log::warn!("Desktop OpenGL unavailable ({e}), trying OpenGL ES 2.0"),
    }

    match create(ShaderDialect::Es) {
        Ok(context) => Ok((context, ShaderDialect::Es)),
        Err(e) => {
            log::error!("OpenGL ES 2.0 unavailable: {e}");
            Err(AppError::ContextUnavailable)
        }
    }
}

fn create_surface(window: &Window, config: &Config) -> Result<Surface<WindowSurface>, AppError> {
    let (width, height): (u32, u32) = window.inner_size().into();
    let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        window.raw_window_handle(),
        NonZeroU32::new(width).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(height).unwrap_or(NonZeroU32::MIN),
    );

    let surface = unsafe { config.display().create_window_surface(config, &attrs)? };

    Ok(surface)
}

pub struct GlWindow {
    context: PossiblyCurrentContext,
    // XXX the surface must be dropped before the window.
    surface: Surface<WindowSurface>,
    pub window: Window,
}

impl DrawSurface for GlWindow {
    fn resize_surface(&self, width: NonZeroU32, height: NonZeroU32) {
        self.surface.resize(&self.context, width, height);
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Your system does not support OpenGL!")]
    ContextUnavailable,
    #[error("could not create window: {0}")]
    Window(String),
    #[error("could not create window surface: {0}")]
    Surface(#[from] glutin::error::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Demo(#[from] DemoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_context_is_preferred() {
        let mut tried = Vec::new();

        let (context, dialect) = acquire_context(|dialect| {
            tried.push(dialect);
            Ok::<_, String>("desktop")
        })
        .unwrap();

        assert_eq!(context, "desktop");
        assert_eq!(dialect, ShaderDialect::Desktop);
        assert_eq!(tried, vec![ShaderDialect::Desktop]);
    }

    #[test]
    fn falls_back_to_es_when_desktop_fails() {
        let mut tried = Vec::new();

        let (context, dialect) = acquire_context(|dialect| {
            tried.push(dialect);
            match dialect {
                ShaderDialect::Desktop => Err("no desktop GL"),
                ShaderDialect::Es => Ok("es"),
            }
        })
        .unwrap();

        assert_eq!(context, "es");
        assert_eq!(dialect, ShaderDialect::Es);
        assert_eq!(tried, vec![ShaderDialect::Desktop, ShaderDialect::Es]);
    }

    #[test]
    fn no_context_at_all_is_unavailable() {
        let res = acquire_context(|_| Err::<(), _>("no GL"));

        assert!(matches!(res, Err(AppError::ContextUnavailable)));
    }

    #[test]
    fn empty_config_list_has_no_pick() {
        assert_eq!(pick_config(std::iter::empty::<u8>()), None);
        assert_eq!(pick_config([3, 1, 2].into_iter()), Some(3));
    }
}
