//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the window thread (winit/glutin) with the game-loop thread.
//
// This module defines the contract between the platform implementation
// and the loop, so the loop can be driven by a real window or by a
// headless stand-in without changing loop code.
//
// Components:
// - `interface`: Commands, seams and error definitions (the contract)
// - `event_forwarder`: Window-side event sending and redraw coalescing
// - `event_collector`: Loop-side event draining
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod event_forwarder;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::{EventCollector, TickControl};
pub(crate) use event_forwarder::{EventForwarder, RedrawLatch};
pub(crate) use interface::{Presenter, WindowNotifier};
pub use interface::{HostCommand, HostError};
