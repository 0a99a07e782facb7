//=========================================================================
// Event Forwarder
//=========================================================================
//
// Window-thread side of the event channel.
//
// Architecture:
//   WindowEvent → event_mapper → forward() → Sender<PlatformEvent>
//
// Redraw requests collapse to at most one pending `Render`: the latch is
// armed here and released by the collector when the event is drained.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use log::{trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::PlatformEvent;

//=== RedrawLatch =========================================================

/// Tracks whether a `Render` event is already queued.
#[derive(Debug, Clone, Default)]
pub(crate) struct RedrawLatch {
    pending: Arc<AtomicBool>,
}

impl RedrawLatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks a redraw as pending. Returns `false` if one already was.
    pub(crate) fn arm(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    /// Clears the pending mark once the queued redraw has been consumed.
    pub(crate) fn release(&self) {
        self.pending.store(false, Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

//=== EventForwarder ======================================================

/// Sends platform events to the game-loop thread in OS order.
pub(crate) struct EventForwarder {
    sender: Sender<PlatformEvent>,
    redraw: RedrawLatch,
}

impl EventForwarder {
    pub(crate) fn new(sender: Sender<PlatformEvent>, redraw: RedrawLatch) -> Self {
        Self { sender, redraw }
    }

    /// Queues `event` for the game. Returns `true` if it was queued.
    ///
    /// A `Render` while another is pending is coalesced. If the loop
    /// thread is gone the event is logged and dropped.
    ///
    /// The host's channel is unbounded, so the window thread never waits
    /// here on a loop that is busy loading, reloading or rendering.
    pub(crate) fn forward(&self, event: PlatformEvent) -> bool {
        if event == PlatformEvent::Render && !self.redraw.arm() {
            trace!(target: "platform::events", "Redraw already pending, coalesced");
            return false;
        }

        match self.sender.send(event) {
            Ok(()) => {
                trace!(target: "platform::events", "Forwarded {:?}", event);
                true
            }
            Err(_) => {
                warn!(
                    target: "platform::events",
                    "Channel disconnected, dropping {:?}",
                    event
                );
                if event == PlatformEvent::Render {
                    self.redraw.release();
                }
                false
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn latch_arms_once_until_released() {
        let latch = RedrawLatch::new();

        assert!(latch.arm());
        assert!(!latch.arm());
        assert!(latch.is_pending());

        latch.release();

        assert!(!latch.is_pending());
        assert!(latch.arm());
    }

    #[test]
    fn events_arrive_in_order() {
        let (tx, rx) = unbounded();
        let forwarder = EventForwarder::new(tx, RedrawLatch::new());

        forwarder.forward(PlatformEvent::Resize { width: 640, height: 480 });
        forwarder.forward(PlatformEvent::Render);
        forwarder.forward(PlatformEvent::Close);

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                PlatformEvent::Resize { width: 640, height: 480 },
                PlatformEvent::Render,
                PlatformEvent::Close,
            ]
        );
    }

    #[test]
    fn redraws_coalesce_while_pending() {
        let (tx, rx) = unbounded();
        let latch = RedrawLatch::new();
        let forwarder = EventForwarder::new(tx, latch.clone());

        assert!(forwarder.forward(PlatformEvent::Render));
        assert!(!forwarder.forward(PlatformEvent::Render));
        assert!(!forwarder.forward(PlatformEvent::Render));
        assert_eq!(rx.try_iter().count(), 1);

        latch.release();

        assert!(forwarder.forward(PlatformEvent::Render));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn close_and_resize_are_never_coalesced() {
        let (tx, rx) = unbounded();
        let forwarder = EventForwarder::new(tx, RedrawLatch::new());

        forwarder.forward(PlatformEvent::Close);
        forwarder.forward(PlatformEvent::Close);
        forwarder.forward(PlatformEvent::Resize { width: 1, height: 1 });
        forwarder.forward(PlatformEvent::Resize { width: 1, height: 1 });

        assert_eq!(rx.try_iter().count(), 4);
    }

    #[test]
    fn disconnected_channel_drops_without_panicking() {
        let (tx, rx) = unbounded();
        let latch = RedrawLatch::new();
        let forwarder = EventForwarder::new(tx, latch.clone());
        drop(rx);

        assert!(!forwarder.forward(PlatformEvent::Close));
        assert!(!forwarder.forward(PlatformEvent::Render));
        assert!(!latch.is_pending());
    }
}
