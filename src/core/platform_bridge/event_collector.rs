//=========================================================================
// Event Collector
//=========================================================================
//
// Platform event collector with bounded draining and shutdown detection.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() → events → TickControl
//
// Bounded draining keeps a flood of window events from starving
// update/render. The loop paces itself, so no idle sleep happens here.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::RedrawLatch;
use crate::core::PlatformEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

/// Collects the platform events queued since the previous frame.
pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    redraw: RedrawLatch,
    events: Vec<PlatformEvent>,
}

impl EventCollector {
    const MAX_EVENTS_PER_FRAME: usize = 100;

    pub(crate) fn new(receiver: Receiver<PlatformEvent>, redraw: RedrawLatch) -> Self {
        Self {
            receiver,
            redraw,
            events: Vec::with_capacity(8),
        }
    }

    /// Drains pending events (bounded to prevent starvation).
    ///
    /// Returns [`TickControl::Exit`] once the window thread has dropped
    /// its sender. Events drained before the disconnect stay available.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.events.clear();

        while self.events.len() < Self::MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if event == PlatformEvent::Render {
                        self.redraw.release();
                    }
                    self.events.push(event);
                }
                Err(TryRecvError::Empty) => return TickControl::Continue,
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
            }
        }

        warn!(
            target: "game_loop",
            "Event queue backlog: drained {} events this frame",
            self.events.len()
        );

        TickControl::Continue
    }

    /// Returns the events collected for this frame.
    pub(crate) fn events(&self) -> &[PlatformEvent] {
        &self.events
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
