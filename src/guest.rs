//=========================================================================
// Guest Side
//=========================================================================
//
// Helpers for writing a game module in Rust.
//
// A game implements `GameModule` and exports it with `export_game!`,
// which emits the `game_load` entry point. The game talks back to the
// host through `GuestPlatform`, the safe wrapper over the table it was
// loaded with, and can route its `log` records to the host with
// `init_logger`.
//
// ```ignore
// struct Pacman { platform: GuestPlatform }
//
// impl GameModule for Pacman {
//     fn load(platform: GuestPlatform) -> Self { Pacman { platform } }
//     fn on_platform_event(&mut self, event: &PlatformEvent) {
//         if *event == PlatformEvent::Close {
//             self.platform.quit();
//         }
//     }
//     fn update(&mut self) {}
//     fn render(&mut self) {}
// }
//
// pacman_shell::export_game!(Pacman);
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_void, CStr, CString};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

//=== Internal Dependencies ===============================================

use crate::core::abi::{level_to_raw, GameTable, PlatformTable, RawPlatformEvent};
use crate::core::platform_api::PlatformApi;
use crate::core::PlatformEvent;

//=== GuestPlatform =======================================================

/// The game's handle to the host's platform table.
#[derive(Debug, Clone, Copy)]
pub struct GuestPlatform {
    table: *const PlatformTable,
}

// The host accepts `quit` and `log` from any thread; the GL services are
// documented as loop-thread only.
unsafe impl Send for GuestPlatform {}
unsafe impl Sync for GuestPlatform {}

impl GuestPlatform {
    /// Wraps a table pointer received from the host.
    ///
    /// # Safety
    ///
    /// `table` must point to a valid [`PlatformTable`] that stays alive and
    /// unmoved for as long as this handle (or any copy) is used.
    pub unsafe fn from_raw(table: *const PlatformTable) -> Self {
        Self { table }
    }

    fn table(&self) -> &PlatformTable {
        // SAFETY: upheld by the contract of `from_raw`.
        unsafe { &*self.table }
    }
}

impl PlatformApi for GuestPlatform {
    fn quit(&self) {
        let table = self.table();
        unsafe { (table.quit)(table.context) }
    }

    fn gl_proc_address(&self, name: &CStr) -> *const c_void {
        let table = self.table();
        unsafe { (table.get_gl_proc_address)(table.context, name.as_ptr()) }
    }

    fn swap_gl_buffers(&self) {
        let table = self.table();
        unsafe { (table.swap_gl_buffers)(table.context) }
    }

    fn performance_counter(&self) -> u64 {
        let table = self.table();
        unsafe { (table.get_performance_counter)(table.context) }
    }

    fn performance_frequency(&self) -> u64 {
        let table = self.table();
        unsafe { (table.get_performance_frequency)(table.context) }
    }

    fn log(&self, level: Level, message: &str) {
        // Interior NULs would truncate the message on the host side.
        let Ok(message) = CString::new(message.replace('\0', " ")) else {
            return;
        };
        let table = self.table();
        unsafe { (table.log)(table.context, level_to_raw(level), message.as_ptr()) }
    }

    fn delta_time(&self) -> f32 {
        let table = self.table();
        unsafe { (table.get_delta_time)(table.context) }
    }
}

//=== PlatformLogger ======================================================

/// `log` backend that forwards records to the host.
///
/// A game module has its own copy of the `log` crate, so without this its
/// records never reach the host's logger.
struct PlatformLogger {
    platform: GuestPlatform,
}

impl Log for PlatformLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!(
            "[{}] {}",
            record.module_path().unwrap_or_default(),
            record.args()
        );
        self.platform.log(record.level(), &message);
    }

    fn flush(&self) {}
}

/// Installs a logger that sends the game's `log` records to the host.
///
/// Fails if the module already installed a logger.
pub fn init_logger(platform: GuestPlatform, max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(PlatformLogger { platform }))?;
    log::set_max_level(max_level);
    Ok(())
}

//=== GameModule ==========================================================

/// A game written in Rust, exportable with [`export_game!`](crate::export_game).
pub trait GameModule: Sized + 'static {
    /// Builds the game. `platform` stays valid until the game is dropped.
    fn load(platform: GuestPlatform) -> Self;

    fn on_platform_event(&mut self, event: &PlatformEvent);

    fn update(&mut self);

    fn render(&mut self);
}

/// Loads `G` and describes it as a [`GameTable`].
///
/// This is the body of the `game_load` entry point emitted by
/// [`export_game!`](crate::export_game).
///
/// # Safety
///
/// `platform` must satisfy the contract of [`GuestPlatform::from_raw`].
pub unsafe fn load_game_table<G: GameModule>(platform: *const PlatformTable) -> GameTable {
    let game = Box::new(G::load(GuestPlatform::from_raw(platform)));

    GameTable {
        state: Box::into_raw(game) as *mut c_void,
        on_platform_event: on_platform_event_trampoline::<G>,
        update: update_trampoline::<G>,
        render: render_trampoline::<G>,
        unload: unload_trampoline::<G>,
    }
}

//--- Trampolines ---------------------------------------------------------

unsafe extern "C" fn on_platform_event_trampoline<G: GameModule>(
    state: *mut c_void,
    event: *const RawPlatformEvent,
) {
    if event.is_null() {
        return;
    }
    if let Some(event) = PlatformEvent::from_raw(&*event) {
        (*(state as *mut G)).on_platform_event(&event);
    }
}

unsafe extern "C" fn update_trampoline<G: GameModule>(state: *mut c_void) {
    (*(state as *mut G)).update()
}

unsafe extern "C" fn render_trampoline<G: GameModule>(state: *mut c_void) {
    (*(state as *mut G)).render()
}

unsafe extern "C" fn unload_trampoline<G: GameModule>(state: *mut c_void) {
    drop(Box::from_raw(state as *mut G));
}

//=== export_game! ========================================================

/// Emits the `game_load` entry point for a [`GameModule`](crate::guest::GameModule).
#[macro_export]
macro_rules! export_game {
    ($game:ty) => {
        #[no_mangle]
        pub unsafe extern "C" fn game_load(
            platform: *const $crate::core::abi::PlatformTable,
        ) -> $crate::core::abi::GameTable {
            $crate::guest::load_game_table::<$game>(platform)
        }
    };
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game::{Game, TableGame};
    use crate::core::host_context::tests::HeadlessPresenter;
    use crate::core::host_context::HostContext;
    use crate::core::quit::QuitSignal;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::time::Duration;

    static UNLOADS: AtomicU32 = AtomicU32::new(0);
    static CLEAR_PROC: AtomicUsize = AtomicUsize::new(0);

    struct Pellets {
        platform: GuestPlatform,
        eaten: u32,
        last_size: Option<(i32, i32)>,
    }

    impl GameModule for Pellets {
        fn load(platform: GuestPlatform) -> Self {
            Self { platform, eaten: 0, last_size: None }
        }

        fn on_platform_event(&mut self, event: &PlatformEvent) {
            match *event {
                PlatformEvent::Close => self.platform.quit(),
                PlatformEvent::Resize { width, height } => self.last_size = Some((width, height)),
                PlatformEvent::Render => {}
            }
        }

        fn update(&mut self) {
            self.eaten += 1;
        }

        fn render(&mut self) {
            let clear = self.platform.gl_proc_address(c"glClear");
            CLEAR_PROC.store(clear as usize, Ordering::SeqCst);
        }
    }

    impl Drop for Pellets {
        fn drop(&mut self) {
            UNLOADS.fetch_add(1, Ordering::SeqCst);
        }
    }

    crate::export_game!(Pellets);

    fn host() -> (HostContext<HeadlessPresenter>, QuitSignal) {
        let quit = QuitSignal::new();
        let ctx = HostContext::new(HeadlessPresenter::default(), quit.clone(), Duration::from_millis(16));
        (ctx, quit)
    }

    #[test]
    fn exported_game_round_trips_through_the_abi() {
        let (ctx, quit) = host();
        let table = PlatformTable::new(&ctx);
        let unloads_before = UNLOADS.load(Ordering::SeqCst);

        {
            let mut game = unsafe { TableGame::from_table(game_load(&table)) };
            game.on_platform_event(&PlatformEvent::Resize { width: 800, height: 600 });
            game.update();
            game.render();
            game.on_platform_event(&PlatformEvent::Close);
        }

        assert!(quit.is_requested());
        assert_eq!(CLEAR_PROC.load(Ordering::SeqCst), 0x2000);
        assert_eq!(ctx.presenter().swaps.get(), 0, "the host presents, not render()");
        assert_eq!(UNLOADS.load(Ordering::SeqCst), unloads_before + 1);
    }

    #[test]
    fn guest_platform_reaches_host_services() {
        let (ctx, _quit) = host();
        let table = PlatformTable::new(&ctx);
        let guest = unsafe { GuestPlatform::from_raw(&table) };

        assert_eq!(guest.performance_frequency(), 1_000_000_000);
        assert!((guest.delta_time() - 0.016).abs() < 1e-6);
        assert_eq!(guest.gl_proc_address(c"glClear"), 0x2000 as *const c_void);
        assert!(guest.gl_proc_address(c"glNothing").is_null());
    }

    #[derive(Default)]
    struct LogSink {
        lines: RefCell<Vec<(Level, String)>>,
    }

    impl PlatformApi for LogSink {
        fn quit(&self) {}
        fn gl_proc_address(&self, _name: &CStr) -> *const c_void {
            std::ptr::null()
        }
        fn swap_gl_buffers(&self) {}
        fn performance_counter(&self) -> u64 {
            0
        }
        fn performance_frequency(&self) -> u64 {
            1
        }
        fn log(&self, level: Level, message: &str) {
            self.lines.borrow_mut().push((level, message.to_string()));
        }
        fn delta_time(&self) -> f32 {
            0.0
        }
    }

    #[test]
    fn interior_nul_does_not_truncate() {
        let sink = LogSink::default();
        let table = PlatformTable::new(&sink);
        let guest = unsafe { GuestPlatform::from_raw(&table) };

        guest.log(Level::Info, "with\0nul");

        assert_eq!(
            sink.lines.borrow().as_slice(),
            [(Level::Info, "with nul".to_string())]
        );
    }

    #[test]
    fn logger_forwards_records() {
        let sink = LogSink::default();
        let table = PlatformTable::new(&sink);
        let logger = PlatformLogger {
            platform: unsafe { GuestPlatform::from_raw(&table) },
        };

        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .module_path(Some("pellets"))
                .args(format_args!("ghost spawned"))
                .build(),
        );

        assert_eq!(
            sink.lines.borrow().as_slice(),
            [(Level::Warn, "[pellets] ghost spawned".to_string())]
        );
    }
}
