//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Window-thread to loop-thread interface types (commands, seams, errors).
//
// Defines the contract between the window thread and the game-loop
// thread. The loop only sees these traits, never winit or glutin.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_void, CStr};
use std::path::PathBuf;

//=== HostCommand =========================================================

/// Requests sent from the game-loop thread to the window thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// The loop has finished; leave the native event loop.
    Exit,
}

//=== WindowNotifier ======================================================

/// Delivers [`HostCommand`]s to the window thread.
pub(crate) trait WindowNotifier: Send {
    fn notify(&self, command: HostCommand);
}

//=== Presenter ===========================================================

/// The loop thread's view of the GL context and its window surface.
///
/// Implementations are created on the loop thread and stay there.
pub(crate) trait Presenter {
    /// Resolves a GL entry point, null if unavailable.
    fn proc_address(&self, name: &CStr) -> *const c_void;

    /// Presents the back buffer.
    fn swap_buffers(&self);

    /// Resizes the drawable to the window's new client size.
    fn resize(&self, width: u32, height: u32);
}

//=== HostError ===========================================================

/// Fatal host errors. Every one of these aborts startup or ends the run.
#[derive(Debug)]
pub enum HostError {
    /// Event loop creation failed (OS-level issue).
    EventLoopCreation(String),

    /// Event loop execution error.
    EventLoopExecution(String),

    /// The native window could not be created.
    WindowCreation(String),

    /// No pixel format matched the requested framebuffer layout.
    PixelFormat(String),

    /// The OpenGL context could not be created.
    ContextCreation(String),

    /// The OpenGL context could not be made current on the loop thread.
    ContextActivation(String),

    /// The game library could not be opened.
    ModuleLoad { path: PathBuf, reason: String },

    /// The game library does not export the entry point.
    MissingEntryPoint { symbol: String, reason: String },

    /// The game-loop thread could not be started.
    ThreadSpawn(String),

    /// The game-loop thread panicked.
    LoopThreadPanicked,
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
            Self::WindowCreation(e) => write!(f, "Window creation failed: {}", e),
            Self::PixelFormat(e) => write!(f, "Pixel format selection failed: {}", e),
            Self::ContextCreation(e) => write!(f, "OpenGL context creation failed: {}", e),
            Self::ContextActivation(e) => write!(f, "OpenGL context activation failed: {}", e),
            Self::ModuleLoad { path, reason } => {
                write!(f, "Failed to load game module {}: {}", path.display(), reason)
            }
            Self::MissingEntryPoint { symbol, reason } => {
                write!(f, "Game module has no `{}` entry point: {}", symbol, reason)
            }
            Self::ThreadSpawn(e) => write!(f, "Failed to spawn game loop thread: {}", e),
            Self::LoopThreadPanicked => write!(f, "Game loop thread panicked"),
        }
    }
}

impl std::error::Error for HostError {}

//=========================================================================
// Unit Tests
//=========================================================================
