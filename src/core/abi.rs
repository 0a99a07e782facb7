//=========================================================================
// Game Module ABI
//=========================================================================
//
// C-compatible tables exchanged between the host and a game module.
//
// Layout:
// ```text
//   host ──PlatformTable──>  game_load()  ──GameTable──>  host
//         (context + fns)                  (state + fns)
// ```
//
// Every function takes the table's opaque pointer as its first argument,
// so neither side needs process-wide globals to find its state.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_char, c_int, c_void, CStr};

use log::Level;

//=== Internal Dependencies ===============================================

use crate::core::platform_api::PlatformApi;

//=== Event Encoding ======================================================

/// ABI tag for [`PlatformEvent::Render`](crate::core::PlatformEvent::Render).
pub const PLATFORM_EVENT_RENDER: c_int = 1;

/// ABI tag for [`PlatformEvent::Close`](crate::core::PlatformEvent::Close).
pub const PLATFORM_EVENT_CLOSE: c_int = 2;

/// ABI tag for [`PlatformEvent::Resize`](crate::core::PlatformEvent::Resize).
pub const PLATFORM_EVENT_RESIZE: c_int = 3;

/// Name of the entry point every game module exports.
pub const GAME_LOAD_SYMBOL: &[u8] = b"game_load\0";

/// Payload of a resize event.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawResize {
    pub width: c_int,
    pub height: c_int,
}

/// Kind-specific event payload. Only `resize` is defined.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawEventData {
    pub resize: RawResize,
}

/// An event as it crosses the ABI boundary.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawPlatformEvent {
    pub kind: c_int,
    pub data: RawEventData,
}

impl std::fmt::Debug for RawPlatformEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawPlatformEvent")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

//=== Log Levels ==========================================================

/// Converts a `log::Level` into its ABI value (1 = Error .. 5 = Trace).
pub fn level_to_raw(level: Level) -> c_int {
    level as c_int
}

/// Converts an ABI log level back into a `log::Level`.
///
/// Out-of-range values are logged at `Info` rather than rejected.
pub fn level_from_raw(raw: c_int) -> Level {
    match raw {
        1 => Level::Error,
        2 => Level::Warn,
        3 => Level::Info,
        4 => Level::Debug,
        5 => Level::Trace,
        _ => Level::Info,
    }
}

//=== PlatformTable =======================================================

/// Services the host exposes to the game.
///
/// Built once by the host before `game_load` is called and kept alive,
/// unmoved, until the game has been unloaded. The game may retain the
/// pointer for its whole lifetime.
#[repr(C)]
pub struct PlatformTable {
    pub context: *const c_void,

    pub quit: unsafe extern "C" fn(*const c_void),

    pub get_gl_proc_address: unsafe extern "C" fn(*const c_void, *const c_char) -> *const c_void,
    pub swap_gl_buffers: unsafe extern "C" fn(*const c_void),

    pub get_performance_counter: unsafe extern "C" fn(*const c_void) -> u64,
    pub get_performance_frequency: unsafe extern "C" fn(*const c_void) -> u64,

    pub log: unsafe extern "C" fn(*const c_void, c_int, *const c_char),
    pub get_delta_time: unsafe extern "C" fn(*const c_void) -> f32,
}

impl PlatformTable {
    /// Builds a table whose functions forward to `api`.
    ///
    /// The table stores a raw pointer to `api`; calling through it after
    /// `api` is dropped or moved is undefined behaviour.
    pub fn new<P: PlatformApi>(api: &P) -> Self {
        Self {
            context: api as *const P as *const c_void,
            quit: quit_trampoline::<P>,
            get_gl_proc_address: gl_proc_address_trampoline::<P>,
            swap_gl_buffers: swap_gl_buffers_trampoline::<P>,
            get_performance_counter: performance_counter_trampoline::<P>,
            get_performance_frequency: performance_frequency_trampoline::<P>,
            log: log_trampoline::<P>,
            get_delta_time: delta_time_trampoline::<P>,
        }
    }
}

//--- Trampolines ---------------------------------------------------------

unsafe extern "C" fn quit_trampoline<P: PlatformApi>(context: *const c_void) {
    (*(context as *const P)).quit()
}

unsafe extern "C" fn gl_proc_address_trampoline<P: PlatformApi>(
    context: *const c_void,
    name: *const c_char,
) -> *const c_void {
    if name.is_null() {
        return std::ptr::null();
    }
    (*(context as *const P)).gl_proc_address(CStr::from_ptr(name))
}

unsafe extern "C" fn swap_gl_buffers_trampoline<P: PlatformApi>(context: *const c_void) {
    (*(context as *const P)).swap_gl_buffers()
}

unsafe extern "C" fn performance_counter_trampoline<P: PlatformApi>(context: *const c_void) -> u64 {
    (*(context as *const P)).performance_counter()
}

unsafe extern "C" fn performance_frequency_trampoline<P: PlatformApi>(
    context: *const c_void,
) -> u64 {
    (*(context as *const P)).performance_frequency()
}

unsafe extern "C" fn log_trampoline<P: PlatformApi>(
    context: *const c_void,
    level: c_int,
    message: *const c_char,
) {
    if message.is_null() {
        return;
    }
    let message = CStr::from_ptr(message).to_string_lossy();
    (*(context as *const P)).log(level_from_raw(level), &message)
}

unsafe extern "C" fn delta_time_trampoline<P: PlatformApi>(context: *const c_void) -> f32 {
    (*(context as *const P)).delta_time()
}

//=== GameTable ===========================================================

/// Entry points the game exposes back to the host.
///
/// `state` is owned by the game and passed back on every call. After
/// `unload` returns the host never touches `state` again.
#[repr(C)]
pub struct GameTable {
    pub state: *mut c_void,

    pub on_platform_event: unsafe extern "C" fn(*mut c_void, *const RawPlatformEvent),
    pub update: unsafe extern "C" fn(*mut c_void),
    pub render: unsafe extern "C" fn(*mut c_void),
    pub unload: unsafe extern "C" fn(*mut c_void),
}

/// Signature of the `game_load` entry point.
pub type GameLoadFn = unsafe extern "C" fn(*const PlatformTable) -> GameTable;

//=========================================================================
// Unit Tests
//=========================================================================
