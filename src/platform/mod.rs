//=========================================================================
// Platform Subsystem
//
// Owns the OS window and the Winit event loop, and bridges them to the
// game-loop thread.
//
// Architecture:
// ```text
//  Window Thread:                     Game Loop Thread:
//  ┌──────────────────────────┐      ┌──────────────────────┐
//  │  Winit Event Loop        │      │  GlPresenter         │
//  │   ↓                      │      │  (context current)   │
//  │  event_mapper            │      │   ↓                  │
//  │   ├─ CloseRequested      │      │  EventCollector      │
//  │   ├─ Resized             │      │   ↓                  │
//  │   └─ RedrawRequested     │      │  Game                │
//  │   ↓                      │      │   ├─ on_platform_event│
//  │  EventForwarder ─────────┼─────►│   ├─ update          │
//  │  (unbounded channel)     │      │   └─ render          │
//  │                          │      │                      │
//  │  user_event(Exit) ◄──────┼──────┤  ShutdownGuard       │
//  └──────────────────────────┘      └──────────────────────┘
//                       EventLoopProxy<HostCommand>
// ```
//
// Key Design Decisions:
// - **Close is advisory**: a close request only reaches the game; the
//   window goes away when the loop thread reports `HostCommand::Exit`
// - **Window outlives the loop**: the loop thread is joined before the
//   window (and the surface it backs) is dropped
// - **Late start**: the loop thread is spawned from `resumed()`, once
//   the window and the GL context exist
//
// Responsibilities:
// - Create the window and GL context
// - Map and forward window events before each handler returns
// - Exit the native loop on request and join the loop thread
//
//=========================================================================

//=== Submodules ==========================================================

mod event_mapper;
mod gl;

//=== External Crates =====================================================

use std::thread::JoinHandle;

use log::*;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::game_loop::GameLoop;
use crate::core::platform_bridge::{EventForwarder, HostCommand, HostError, WindowNotifier};
use crate::core::PlatformEvent;
use crate::host::HostConfig;
use event_mapper::map_window_event;
use gl::GlPresenter;

//=== ProxyNotifier =======================================================

/// Wakes the Winit loop from the game-loop thread.
struct ProxyNotifier {
    proxy: EventLoopProxy<HostCommand>,
}

impl WindowNotifier for ProxyNotifier {
    fn notify(&self, command: HostCommand) {
        if self.proxy.send_event(command).is_err() {
            debug!(target: "platform", "Event loop already closed, {:?} dropped", command);
        }
    }
}

//=== Platform ============================================================

/// Window manager and event pump.
///
/// Runs on the thread that called [`Host::run`](crate::Host::run) (Winit
/// requires the main thread on macOS). Not `Send`.
///
/// # Lifecycle
///
/// 1. **Construction**: holds the not-yet-started [`GameLoop`]
/// 2. **resumed()**: creates window + context, spawns the loop thread
/// 3. **window_event()**: maps and forwards events
/// 4. **user_event(Exit)**: leaves the Winit loop
/// 5. **finish()**: disconnects the channel, joins the loop thread
pub(crate) struct Platform {
    config: HostConfig,

    /// OS window (None until `resumed()` called).
    window: Option<Window>,

    /// Sending half of the event channel. Dropped in `finish()`.
    forwarder: Option<EventForwarder>,

    /// The loop waiting for a window; taken once on first `resumed()`.
    pending_loop: Option<GameLoop>,

    loop_handle: Option<JoinHandle<Result<(), HostError>>>,

    proxy: EventLoopProxy<HostCommand>,

    /// First fatal setup error seen on the window thread.
    fatal: Option<HostError>,
}

impl Platform {
    //--- Execution --------------------------------------------------------

    /// Runs the Winit event loop until the game quits, then tears down.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error from either thread: event-loop
    /// creation, window or context setup, context activation, or loading
    /// the game module.
    pub(crate) fn run(
        config: HostConfig,
        game_loop: GameLoop,
        forwarder: EventForwarder,
    ) -> Result<(), HostError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::<HostCommand>::with_user_event()
            .build()
            .map_err(|e| HostError::EventLoopCreation(e.to_string()))?;

        let mut platform = Self {
            config,
            window: None,
            forwarder: Some(forwarder),
            pending_loop: Some(game_loop),
            loop_handle: None,
            proxy: event_loop.create_proxy(),
            fatal: None,
        };

        let outcome = event_loop
            .run_app(&mut platform)
            .map_err(|e| HostError::EventLoopExecution(e.to_string()));

        info!(target: "platform", "Winit event loop exited");

        let finished = platform.finish();
        outcome?;
        finished
    }

    //--- Internal Helpers -------------------------------------------------

    fn start(&mut self, event_loop: &ActiveEventLoop, game_loop: GameLoop) -> Result<(), HostError> {
        let (window, handoff) = gl::create_window_and_context(event_loop, &self.config)?;

        let notifier = ProxyNotifier {
            proxy: self.proxy.clone(),
        };
        let handle = game_loop.spawn(move || GlPresenter::activate(handoff), notifier)?;
        info!(target: "platform", "Game loop thread spawned");

        window.request_redraw();
        self.window = Some(window);
        self.loop_handle = Some(handle);
        Ok(())
    }

    /// Tears down in dependency order: channel, loop thread, window.
    fn finish(self) -> Result<(), HostError> {
        let Self {
            window,
            forwarder,
            loop_handle,
            fatal,
            ..
        } = self;

        drop(forwarder);
        let joined = loop_handle.map_or(Ok(()), join_loop);
        drop(window);

        info!(target: "platform", "Platform shut down");

        match fatal {
            Some(e) => Err(e),
            None => joined,
        }
    }
}

/// Forwards one window event to the loop thread. Returns `true` when the
/// window must close by itself because no loop is left to decide.
fn pump(forwarder: Option<&EventForwarder>, event: &WindowEvent) -> bool {
    let Some(mapped) = map_window_event(event) else {
        return false;
    };

    trace!(target: "platform::events", "{:?} -> {:?}", event, mapped);

    let delivered = forwarder.is_some_and(|f| f.forward(mapped));
    mapped == PlatformEvent::Close && !delivered
}

fn join_loop(handle: JoinHandle<Result<(), HostError>>) -> Result<(), HostError> {
    match handle.join() {
        Ok(result) => {
            if result.is_ok() {
                info!(target: "platform", "Game loop thread terminated cleanly");
            }
            result
        }
        Err(_) => {
            error!(target: "platform", "Game loop thread panicked");
            Err(HostError::LoopThreadPanicked)
        }
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler<HostCommand> for Platform {
    /// Called at startup (and on mobile resume). Only the first call
    /// creates the window and starts the loop thread.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (resume)");
            return;
        }
        let Some(game_loop) = self.pending_loop.take() else {
            return;
        };

        if let Err(e) = self.start(event_loop, game_loop) {
            error!(target: "platform", "{}", e);
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            info!(target: "platform", "Window close requested");
        }

        if pump(self.forwarder.as_ref(), &event) {
            warn!(target: "platform", "Game loop not running, closing window directly");
            event_loop.exit();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, command: HostCommand) {
        match command {
            HostCommand::Exit => {
                info!(target: "platform", "Game loop finished, leaving event loop");
                event_loop.exit();
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
