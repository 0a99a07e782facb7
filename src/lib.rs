//=========================================================================
// Pac-Man Shell Library Root
//
// This crate defines the public API surface of the Pac-Man platform shell.
//
// Responsibilities:
// - Expose the host facade (`Host`, `HostBuilder`)
// - Expose the host/game contract (`core`) and the guest-side helpers
//   (`guest`) a Rust game module builds against
// - Keep OS integration (`platform`) hidden from end users
//
// Typical usage:
// ```no_run
// use pacman_shell::HostBuilder;
// use pacman_shell::module::ModuleLoader;
//
// fn main() -> Result<(), pacman_shell::core::HostError> {
//     HostBuilder::new()
//         .build(ModuleLoader::new("./libgame.so"))
//         .run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the C ABI, the platform/game traits and the game loop.
// `guest` is what a game module written in Rust links against.
// `module` loads a game from a shared library.
//
pub mod core;
pub mod guest;
pub mod module;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the Winit and glutin integration (window, GL
// context, event pump) and is kept private.
//
// `host` defines the main entry point and its configuration.
//
mod host;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use host::{Host, HostBuilder};
