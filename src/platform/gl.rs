//=========================================================================
// OpenGL Setup
//
// Creates the window together with its OpenGL context and hands the
// context to the game-loop thread.
//
// Flow:
// ```text
//  Window thread                         Loop thread
//  create_window_and_context()
//    ├─ pixel format (RGBA 32, D24 S8,
//    │  double-buffered)
//    ├─ context (not current)
//    └─ window surface
//         │ GlHandoff ───────────────►  GlPresenter::activate()
//                                          └─ make current, swap interval
// ```
//
// Responsibilities:
// - Pick the pixel format the game expects
// - Resolve GL entry points with the system-library fallback
// - Present and resize on the loop thread
//
//=========================================================================

//=== External Crates =====================================================

use std::ffi::{c_void, CStr};
use std::num::NonZeroU32;

use glutin::config::{ColorBufferType, Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextAttributesBuilder, NotCurrentContext, NotCurrentGlContext, PossiblyCurrentContext,
    PossiblyCurrentGlContext,
};
use glutin::display::{Display, GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::DisplayBuilder;
use libloading::Library;
use log::{debug, info, warn};
use raw_window_handle::HasWindowHandle;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

//=== Internal Imports ====================================================

use crate::core::platform_bridge::{HostError, Presenter};
use crate::core::resolve_gl_proc;
use crate::host::HostConfig;

//=== Pixel Format ========================================================

const COLOR_CHANNEL_BITS: u8 = 8;
const ALPHA_BITS: u8 = 8;
const DEPTH_BITS: u8 = 24;
const STENCIL_BITS: u8 = 8;

/// The system library whose exports back up the driver's proc resolver.
#[cfg(target_os = "windows")]
const SYSTEM_GL_LIBRARY: &str = "opengl32.dll";
#[cfg(target_os = "macos")]
const SYSTEM_GL_LIBRARY: &str = "/System/Library/Frameworks/OpenGL.framework/OpenGL";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const SYSTEM_GL_LIBRARY: &str = "libGL.so.1";

fn pixel_format_template() -> ConfigTemplateBuilder {
    ConfigTemplateBuilder::new()
        .with_buffer_type(ColorBufferType::Rgb {
            r_size: COLOR_CHANNEL_BITS,
            g_size: COLOR_CHANNEL_BITS,
            b_size: COLOR_CHANNEL_BITS,
        })
        .with_alpha_size(ALPHA_BITS)
        .with_depth_size(DEPTH_BITS)
        .with_stencil_size(STENCIL_BITS)
        .with_single_buffering(false)
}

/// How far a candidate format is from the one we asked for. Lower is
/// better; multisampled formats are pushed back since the game never
/// asked for them.
fn format_distance(depth: u8, stencil: u8, samples: u8) -> u32 {
    let depth = u32::from(depth.abs_diff(DEPTH_BITS));
    let stencil = u32::from(stencil.abs_diff(STENCIL_BITS));
    depth * 4 + stencil * 4 + u32::from(samples)
}

/// Keeps the first candidate unless a later one is strictly closer.
fn closest<T>(mut candidates: impl Iterator<Item = T>, distance: impl Fn(&T) -> u32) -> Option<T> {
    let first = candidates.next()?;
    Some(candidates.fold(first, |best, candidate| {
        if distance(&candidate) < distance(&best) {
            candidate
        } else {
            best
        }
    }))
}

fn config_distance(config: &Config) -> u32 {
    format_distance(config.depth_size(), config.stencil_size(), config.num_samples())
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    // INVARIANT: every glutin backend returns `ErrorKind::BadConfig` from
    // `find_configs` when nothing matches the template, so the picker is
    // only ever called with at least one candidate.
    closest(configs, config_distance).expect("glutin calls the picker with a non-empty config list")
}

/// Sorts a `DisplayBuilder` failure into window or pixel-format errors.
fn display_setup_error(error: &(dyn std::error::Error + 'static)) -> HostError {
    if error.is::<OsError>() {
        HostError::WindowCreation(error.to_string())
    } else {
        HostError::PixelFormat(error.to_string())
    }
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

//=== GlHandoff ===========================================================

/// A created but not-yet-current context and its surface, on its way to
/// the loop thread.
pub(crate) struct GlHandoff {
    display: Display,
    context: NotCurrentContext,
    surface: Surface<WindowSurface>,
    vsync: bool,
}

// The context is not current anywhere and the surface is only used again
// once the context is current on the receiving thread. The window they
// refer to outlives the loop thread.
unsafe impl Send for GlHandoff {}

/// Creates the main window, selects the pixel format and creates an
/// OpenGL context for it. Every failure here is fatal.
pub(crate) fn create_window_and_context(
    event_loop: &ActiveEventLoop,
    config: &HostConfig,
) -> Result<(Window, GlHandoff), HostError> {
    let (width, height) = config.inner_size;
    let attrs = WindowAttributes::default()
        .with_title(config.title.clone())
        .with_inner_size(LogicalSize::new(width, height));

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_attributes(Some(attrs))
        .build(event_loop, pixel_format_template(), pick_config)
        .map_err(|e| display_setup_error(e.as_ref()))?;

    let window = window
        .ok_or_else(|| HostError::WindowCreation("display builder returned no window".into()))?;

    debug!(
        target: "platform",
        "Pixel format: depth {} stencil {} alpha {} samples {}",
        gl_config.depth_size(),
        gl_config.stencil_size(),
        gl_config.alpha_size(),
        gl_config.num_samples()
    );

    let raw_handle = window
        .window_handle()
        .map_err(|e| HostError::WindowCreation(e.to_string()))?
        .as_raw();

    let display = gl_config.display();
    let context_attrs = ContextAttributesBuilder::new().build(Some(raw_handle));
    let context = unsafe { display.create_context(&gl_config, &context_attrs) }
        .map_err(|e| HostError::ContextCreation(e.to_string()))?;

    let size = window.inner_size();
    let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_handle,
        non_zero(size.width),
        non_zero(size.height),
    );
    let surface = unsafe { display.create_window_surface(&gl_config, &surface_attrs) }
        .map_err(|e| HostError::ContextCreation(e.to_string()))?;

    info!(
        target: "platform",
        "Window created: {}x{} @ {}x DPI",
        size.width,
        size.height,
        window.scale_factor()
    );

    Ok((
        window,
        GlHandoff {
            display,
            context,
            surface,
            vsync: config.vsync,
        },
    ))
}

//=== GlPresenter =========================================================

/// Owns the current GL context on the game-loop thread.
pub(crate) struct GlPresenter {
    context: Option<PossiblyCurrentContext>,
    surface: Surface<WindowSurface>,
    display: Display,
    system_gl: Option<Library>,
}

impl GlPresenter {
    /// Makes the handed-off context current on the calling thread.
    pub(crate) fn activate(handoff: GlHandoff) -> Result<Self, HostError> {
        let GlHandoff {
            display,
            context,
            surface,
            vsync,
        } = handoff;

        let context = context
            .make_current(&surface)
            .map_err(|e| HostError::ContextActivation(e.to_string()))?;

        let interval = if vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            warn!(target: "platform::gl", "Could not set swap interval: {}", e);
        }

        // SAFETY: the system GL library has no initialisers with
        // preconditions beyond being loaded once per process.
        let system_gl = match unsafe { Library::new(SYSTEM_GL_LIBRARY) } {
            Ok(library) => Some(library),
            Err(e) => {
                warn!(target: "platform::gl", "{} unavailable for fallback lookups: {}", SYSTEM_GL_LIBRARY, e);
                None
            }
        };

        info!(target: "platform::gl", "OpenGL context current on game loop thread");

        Ok(Self {
            context: Some(context),
            surface,
            display,
            system_gl,
        })
    }

    fn system_proc_address(&self, name: &CStr) -> *const c_void {
        let Some(library) = &self.system_gl else {
            return std::ptr::null();
        };

        // SAFETY: the symbol is only read as an address, never called here.
        match unsafe { library.get::<unsafe extern "C" fn()>(name.to_bytes_with_nul()) } {
            Ok(symbol) => *symbol as *const c_void,
            Err(_) => std::ptr::null(),
        }
    }
}

impl Presenter for GlPresenter {
    fn proc_address(&self, name: &CStr) -> *const c_void {
        let address = resolve_gl_proc(self.display.get_proc_address(name), || {
            self.system_proc_address(name)
        });
        if address.is_null() {
            debug!(target: "platform::gl", "Unresolved GL symbol {:?}", name);
        }
        address
    }

    fn swap_buffers(&self) {
        let Some(context) = &self.context else {
            return;
        };
        if let Err(e) = self.surface.swap_buffers(context) {
            warn!(target: "platform::gl", "Swap buffers failed: {}", e);
        }
    }

    fn resize(&self, width: u32, height: u32) {
        let (Some(context), Some(width), Some(height)) =
            (&self.context, NonZeroU32::new(width), NonZeroU32::new(height))
        else {
            // Minimised windows report 0x0; keep the old surface.
            return;
        };
        self.surface.resize(context, width, height);
    }
}

impl Drop for GlPresenter {
    fn drop(&mut self) {
        if let Some(context) = self.context.take() {
            match context.make_not_current() {
                Ok(_) => debug!(target: "platform::gl", "OpenGL context released"),
                Err(e) => warn!(target: "platform::gl", "Failed to release context: {}", e),
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
