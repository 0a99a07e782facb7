//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use pacman_shell::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Host facade
pub use crate::{Host, HostBuilder};

// Host/game contract
pub use crate::core::{Game, GameLoader, HostError, PlatformApi, PlatformEvent};

// Loading games
pub use crate::module::ModuleLoader;

// Writing games
pub use crate::guest::{GameModule, GuestPlatform};
