//=========================================================================
// Host Context
//=========================================================================
//
// The host's side of the platform table.
//
// One value lives on the game-loop thread for the whole run. It owns the
// presenter (current GL context) and holds the quit flag and frame timing
// that older shells kept in process globals. The platform table handed to
// the game points at it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_void, CStr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use log::{info, log, Level};

//=== Internal Dependencies ===============================================

use crate::core::platform_api::PlatformApi;
use crate::core::platform_bridge::Presenter;
use crate::core::quit::QuitSignal;

//=== HostContext =========================================================

/// Loop-thread state exposed to the game through [`PlatformApi`].
pub(crate) struct HostContext<P: Presenter> {
    presenter: P,
    quit: QuitSignal,
    epoch: Instant,
    delta_bits: AtomicU32,
}

impl<P: Presenter> HostContext<P> {
    /// Nanosecond counter, so the frequency is fixed.
    const COUNTER_FREQUENCY: u64 = 1_000_000_000;

    pub(crate) fn new(presenter: P, quit: QuitSignal, initial_delta: Duration) -> Self {
        Self {
            presenter,
            quit,
            epoch: Instant::now(),
            delta_bits: AtomicU32::new(initial_delta.as_secs_f32().to_bits()),
        }
    }

    pub(crate) fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Publishes the latest measured frame delta.
    pub(crate) fn set_delta(&self, delta: Duration) {
        self.delta_bits
            .store(delta.as_secs_f32().to_bits(), Ordering::Relaxed);
    }
}

impl<P: Presenter> PlatformApi for HostContext<P> {
    fn quit(&self) {
        if self.quit.request() {
            info!(target: "game_loop", "Quit requested by game");
        }
    }

    fn gl_proc_address(&self, name: &CStr) -> *const c_void {
        self.presenter.proc_address(name)
    }

    fn swap_gl_buffers(&self) {
        self.presenter.swap_buffers();
    }

    fn performance_counter(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    fn performance_frequency(&self) -> u64 {
        Self::COUNTER_FREQUENCY
    }

    fn log(&self, level: Level, message: &str) {
        log!(target: "game", level, "{}", message.trim_end());
    }

    fn delta_time(&self) -> f32 {
        f32::from_bits(self.delta_bits.load(Ordering::Relaxed))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
