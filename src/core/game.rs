//=========================================================================
// Game Contract
//=========================================================================
//
// The host's view of a game module.
//
// Lifecycle:
// ```text
//   Unloaded ──load()──> Loaded ──update/render──> Running
//                                                    │ quit observed
//   Unloaded <──────────────drop (unload)────────── Quitting
// ```
//
// A `GameLoader` produces a `Game` against a platform table; dropping the
// `Game` is the unload step. `TableGame` adapts the C `GameTable` so that
// dynamically loaded modules and in-process games look the same to the
// loop.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::abi::{GameTable, PlatformTable, RawPlatformEvent};
use crate::core::platform_bridge::HostError;
use crate::core::PlatformEvent;
use crate::guest::GuestPlatform;

//=== Game ================================================================

/// A loaded game, driven by the game-loop thread.
///
/// Calls must not block; the loop paces itself around them. Dropping the
/// value unloads the game.
pub trait Game {
    /// Receives one forwarded platform event.
    fn on_platform_event(&mut self, event: &PlatformEvent);

    /// Advances the simulation by one tick.
    fn update(&mut self);

    /// Issues draw calls against the current GL context. The host presents
    /// afterwards.
    fn render(&mut self);
}

//=== GameLoader ==========================================================

/// Produces [`Game`] instances on the game-loop thread.
pub trait GameLoader: Send {
    /// Loads the game against `platform`.
    ///
    /// The host keeps `platform` alive and in place until the returned game
    /// has been dropped.
    fn load(&mut self, platform: &PlatformTable) -> Result<Box<dyn Game>, HostError>;

    /// Returns true when the loaded game should be replaced by a fresh load.
    fn is_stale(&self) -> bool {
        false
    }
}

/// Closures receive a [`GuestPlatform`] for the table they are loaded against.
impl<F> GameLoader for F
where
    F: FnMut(GuestPlatform) -> Box<dyn Game> + Send,
{
    fn load(&mut self, platform: &PlatformTable) -> Result<Box<dyn Game>, HostError> {
        // SAFETY: the host keeps the table alive and unmoved until the game
        // built here is dropped.
        let guest = unsafe { GuestPlatform::from_raw(platform) };
        Ok(self(guest))
    }
}

//=== TableGame ===========================================================

/// A [`Game`] backed by a C [`GameTable`].
///
/// `unload` is called exactly once, when this value is dropped.
pub struct TableGame {
    table: GameTable,
}

impl TableGame {
    /// Wraps a table returned from `game_load`.
    ///
    /// # Safety
    ///
    /// Every function in `table` must be callable with `table.state` until
    /// `unload` has been called, and the table must not be unloaded by
    /// anyone else.
    pub unsafe fn from_table(table: GameTable) -> Self {
        Self { table }
    }
}

impl Game for TableGame {
    fn on_platform_event(&mut self, event: &PlatformEvent) {
        let raw = RawPlatformEvent::from(event);
        unsafe { (self.table.on_platform_event)(self.table.state, &raw) }
    }

    fn update(&mut self) {
        unsafe { (self.table.update)(self.table.state) }
    }

    fn render(&mut self) {
        unsafe { (self.table.render)(self.table.state) }
    }
}

impl Drop for TableGame {
    fn drop(&mut self) {
        debug!(target: "game_loop", "Unloading game table");
        unsafe { (self.table.unload)(self.table.state) }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
