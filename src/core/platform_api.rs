//=========================================================================
// Platform API
//=========================================================================
//
// The capability set the host offers to a game.
//
// The host implements it once (`HostContext`); the game reaches it either
// directly (statically linked games) or through the C table built by
// `PlatformTable::new` (`GuestPlatform` on the far side).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_void, CStr};

use log::Level;

//=== PlatformApi =========================================================

/// Services the host provides to the game.
///
/// None of these report errors. A failed GL lookup yields a null pointer
/// and the caller is expected to check for it.
///
/// Only [`quit`](Self::quit) and [`log`](Self::log) may be called from
/// threads other than the game-loop thread; everything else touches the
/// GL context, which is current on the loop thread only.
pub trait PlatformApi {
    /// Requests shutdown. Repeated calls have no further effect.
    fn quit(&self);

    /// Resolves an OpenGL entry point by name.
    fn gl_proc_address(&self, name: &CStr) -> *const c_void;

    /// Presents the back buffer.
    fn swap_gl_buffers(&self);

    /// Monotonic high-resolution counter.
    fn performance_counter(&self) -> u64;

    /// Ticks per second of [`performance_counter`](Self::performance_counter).
    fn performance_frequency(&self) -> u64;

    /// Writes a message to the host log.
    fn log(&self, level: Level, message: &str);

    /// Seconds elapsed between the two most recent frames.
    fn delta_time(&self) -> f32;
}

//=== GL Proc Resolution ==================================================

/// Returns true for the values `wglGetProcAddress` uses to signal failure.
///
/// Besides null, some drivers return 1, 2, 3 or -1 instead of a real
/// address. All of them mean "not found".
pub fn is_gl_proc_sentinel(address: *const c_void) -> bool {
    matches!(address as isize, 0 | 1 | 2 | 3 | -1)
}

/// Applies the sentinel rule: keeps `primary` if it is a real address,
/// otherwise asks `fallback`.
///
/// The fallback's answer is returned as-is, except that sentinel values
/// from it are normalised to null.
pub fn resolve_gl_proc<F>(primary: *const c_void, fallback: F) -> *const c_void
where
    F: FnOnce() -> *const c_void,
{
    if !is_gl_proc_sentinel(primary) {
        return primary;
    }

    let address = fallback();
    if is_gl_proc_sentinel(address) {
        std::ptr::null()
    } else {
        address
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
