//=========================================================================
// Quit Signal
//=========================================================================
//
// Shared quit-requested flag.
//
// Set by the game (through the platform table) from any thread, polled by
// the game-loop thread once per frame. A late read only costs one more
// frame, so relaxed visibility would be enough; acquire/release keeps the
// first-caller detection exact.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

//=== QuitSignal ==========================================================

/// Cloneable handle to the quit flag.
#[derive(Debug, Clone, Default)]
pub struct QuitSignal {
    requested: Arc<AtomicBool>,
}

impl QuitSignal {
    /// Creates a cleared signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Returns `true` only for the call that raised it.
    pub fn request(&self) -> bool {
        !self.requested.swap(true, Ordering::AcqRel)
    }

    /// Returns true once any handle has requested shutdown.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_cleared() {
        assert!(!QuitSignal::new().is_requested());
    }

    #[test]
    fn only_first_request_reports_true() {
        let quit = QuitSignal::new();

        assert!(quit.request());
        assert!(!quit.request());
        assert!(!quit.request());
        assert!(quit.is_requested());
    }

    #[test]
    fn clones_share_the_flag() {
        let quit = QuitSignal::new();
        let other = quit.clone();

        other.request();

        assert!(quit.is_requested());
    }

    #[test]
    fn concurrent_requests_have_one_winner() {
        let quit = QuitSignal::new();

        let winners: usize = (0..8)
            .map(|_| {
                let quit = quit.clone();
                thread::spawn(move || quit.request())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap() as usize)
            .sum();

        assert_eq!(winners, 1);
    }
}
