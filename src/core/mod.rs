//=========================================================================
// Core
//
// Everything that does not touch winit or glutin directly.
//
// Responsibilities:
// - Define the C ABI between host and game (`abi`)
// - Describe the capability sets on both sides (`platform_api`, `game`)
// - Carry events between the window thread and the loop thread
//   (`event`, `platform_bridge`)
// - Run the game on its own paced thread (`game_loop`)
//
// Notes:
// The loop depends only on the `Presenter` and `WindowNotifier` seams in
// `platform_bridge`, so it runs the same against a real window or a
// headless stand-in.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod abi;
pub mod event;
pub mod game;
pub mod platform_api;
pub mod quit;

pub(crate) mod game_loop;
pub(crate) mod host_context;
pub(crate) mod pacing;
pub(crate) mod platform_bridge;

//=== Public API ==========================================================

pub use event::PlatformEvent;
pub use game::{Game, GameLoader, TableGame};
pub use platform_api::{is_gl_proc_sentinel, resolve_gl_proc, PlatformApi};
pub use platform_bridge::{HostCommand, HostError};
pub use quit::QuitSignal;
