//=========================================================================
// Game Loop
//
// Dedicated thread that drives the game independently of the window
// thread.
//
// Responsibilities:
// - Make the GL context current and load the game against the platform
//   table
// - Deliver forwarded platform events, then update, render and present
// - Pace frames toward a fixed interval (sleep = max(0, target - cost))
// - Unload the game and tell the window thread to exit, exactly once
//
// Notes:
// The window thread owns the OS window; this thread owns the current GL
// context and the game. They talk only through the event channel and
// `HostCommand`s, so neither can stall the other.
//
//=========================================================================

//=== Standard Library Imports ============================================
use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================
use log::{debug, error, info};

//=== Internal Modules ====================================================
use crate::core::abi::PlatformTable;
use crate::core::game::{Game, GameLoader};
use crate::core::host_context::HostContext;
use crate::core::pacing::{FrameClock, FramePacer};
use crate::core::platform_bridge::{
    EventCollector, HostCommand, HostError, Presenter, TickControl, WindowNotifier,
};
use crate::core::quit::QuitSignal;
use crate::core::PlatformEvent;

//=== ShutdownGuard =======================================================
//
// Sends `HostCommand::Exit` when dropped. Created first on the loop
// thread, so it fires last on every exit path: quit, load failure or
// panic.
//
struct ShutdownGuard<N: WindowNotifier> {
    notifier: N,
}

impl<N: WindowNotifier> Drop for ShutdownGuard<N> {
    fn drop(&mut self) {
        debug!(target: "game_loop", "Notifying window thread to exit");
        self.notifier.notify(HostCommand::Exit);
    }
}

//=== GameLoop ============================================================
//
// Everything the loop thread needs, gathered on the window thread and
// moved across when the thread is spawned.
//
pub(crate) struct GameLoop {
    loader: Box<dyn GameLoader>,
    collector: EventCollector,
    quit: QuitSignal,
    pacer: FramePacer,
    hot_reload: bool,
}

impl GameLoop {
    /// How often a hot-reloadable module is checked for a newer build.
    const RELOAD_POLL_INTERVAL: Duration = Duration::from_secs(1);

    pub(crate) fn new(
        loader: Box<dyn GameLoader>,
        collector: EventCollector,
        quit: QuitSignal,
        frame_interval: Duration,
        hot_reload: bool,
    ) -> Self {
        Self {
            loader,
            collector,
            quit,
            pacer: FramePacer::new(frame_interval),
            hot_reload,
        }
    }

    //--- spawn() ---------------------------------------------------------
    //
    // Starts the loop thread. `activate` runs on the new thread and makes
    // the GL context current there; the presenter never leaves it.
    //
    pub(crate) fn spawn<P, F, N>(
        self,
        activate: F,
        notifier: N,
    ) -> Result<thread::JoinHandle<Result<(), HostError>>, HostError>
    where
        P: Presenter,
        F: FnOnce() -> Result<P, HostError> + Send + 'static,
        N: WindowNotifier + 'static,
    {
        thread::Builder::new()
            .name("game-loop".into())
            .spawn(move || {
                let _shutdown = ShutdownGuard { notifier };
                let presenter = activate().map_err(|e| {
                    error!(target: "game_loop", "{}", e);
                    e
                })?;
                self.run(presenter)
            })
            .map_err(|e| HostError::ThreadSpawn(e.to_string()))
    }

    //--- run() -----------------------------------------------------------
    //
    // Loads the game and runs frames until quit is requested or the
    // window thread goes away. The game is dropped (unloaded) before the
    // presenter is released.
    //
    pub(crate) fn run<P: Presenter>(mut self, presenter: P) -> Result<(), HostError> {
        let frame_interval = self.pacer.target();
        let context = HostContext::new(presenter, self.quit.clone(), frame_interval);
        let table = PlatformTable::new(&context);

        let mut game = self.loader.load(&table)?;
        info!(target: "game_loop", "Game loaded, entering loop ({:?} per frame)", frame_interval);

        let mut clock = FrameClock::new(frame_interval);
        let mut last_reload_check = Instant::now();

        loop {
            let frame_start = Instant::now();
            context.set_delta(clock.tick(frame_start));

            if self.quit.is_requested() {
                break;
            }

            //--- Step 1: Deliver platform events --------------------------
            let control = self.collector.collect_frame();
            for event in self.collector.events() {
                Self::dispatch(&context, game.as_mut(), event);
            }
            if control == TickControl::Exit {
                info!(target: "game_loop", "Window thread gone, leaving loop");
                break;
            }
            if self.quit.is_requested() {
                break;
            }

            //--- Step 2: Simulate and draw ---------------------------------
            game.update();
            game.render();
            context.presenter().swap_buffers();

            //--- Step 3: Hot reload ----------------------------------------
            if self.hot_reload && last_reload_check.elapsed() >= Self::RELOAD_POLL_INTERVAL {
                last_reload_check = Instant::now();
                if self.loader.is_stale() {
                    info!(target: "game_loop", "Game module changed, reloading");
                    drop(game);
                    game = self.loader.load(&table)?;
                }
            }

            //--- Step 4: Pace ---------------------------------------------
            self.pacer.pace(frame_start);
        }

        info!(target: "game_loop", "Game loop exiting");
        drop(game);
        Ok(())
    }

    fn dispatch<P: Presenter>(context: &HostContext<P>, game: &mut dyn Game, event: &PlatformEvent) {
        debug!(target: "game_loop", "Dispatching {:?}", event);

        if let PlatformEvent::Resize { width, height } = *event {
            context
                .presenter()
                .resize(width.max(0) as u32, height.max(0) as u32);
        }

        game.on_platform_event(event);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host_context::tests::HeadlessPresenter;
    use crate::core::platform_api::PlatformApi;
    use crate::core::platform_bridge::{EventForwarder, RedrawLatch};
    use crate::guest::GuestPlatform;
    use crossbeam_channel::{unbounded, Sender};
    use std::sync::{Arc, Mutex};

    type Journal = Arc<Mutex<Vec<String>>>;

    //--- Test doubles ---------------------------------------------------

    struct RecordingNotifier {
        journal: Journal,
    }

    impl WindowNotifier for RecordingNotifier {
        fn notify(&self, command: HostCommand) {
            self.journal.lock().unwrap().push(format!("notify:{:?}", command));
        }
    }

    /// Quits on Close (twice, to exercise idempotence) and journals events.
    struct ScriptedGame {
        platform: GuestPlatform,
        journal: Journal,
        frames: u32,
        quit_after_frames: Option<u32>,
    }

    impl Game for ScriptedGame {
        fn on_platform_event(&mut self, event: &PlatformEvent) {
            self.journal.lock().unwrap().push(format!("event:{:?}", event));
            if *event == PlatformEvent::Close {
                self.platform.quit();
                self.platform.quit();
            }
        }

        fn update(&mut self) {
            self.frames += 1;
            if Some(self.frames) == self.quit_after_frames {
                self.platform.quit();
            }
        }

        fn render(&mut self) {}
    }

    impl Drop for ScriptedGame {
        fn drop(&mut self) {
            self.journal.lock().unwrap().push("unload".into());
        }
    }

    fn scripted_loader(journal: Journal, quit_after_frames: Option<u32>) -> Box<dyn GameLoader> {
        Box::new(move |platform: GuestPlatform| -> Box<dyn Game> {
            journal.lock().unwrap().push("load".into());
            Box::new(ScriptedGame {
                platform,
                journal: journal.clone(),
                frames: 0,
                quit_after_frames,
            })
        })
    }

    fn game_loop(loader: Box<dyn GameLoader>) -> (GameLoop, Sender<PlatformEvent>, RedrawLatch) {
        let (tx, rx) = unbounded();
        let latch = RedrawLatch::new();
        let game_loop = GameLoop::new(
            loader,
            EventCollector::new(rx, latch.clone()),
            QuitSignal::new(),
            Duration::from_millis(1),
            false,
        );
        (game_loop, tx, latch)
    }

    fn entries(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    //--- Scenarios -------------------------------------------------------

    #[test]
    fn close_leads_to_exactly_one_exit_notification() {
        let journal = Journal::default();
        let (game_loop, tx, _latch) = game_loop(scripted_loader(journal.clone(), None));
        tx.send(PlatformEvent::Close).unwrap();

        let handle = game_loop
            .spawn(
                || Ok(HeadlessPresenter::default()),
                RecordingNotifier { journal: journal.clone() },
            )
            .unwrap();

        assert!(handle.join().unwrap().is_ok());
        assert_eq!(
            entries(&journal),
            vec!["load", "event:Close", "unload", "notify:Exit"]
        );
    }

    #[test]
    fn resize_reaches_presenter_and_game() {
        let journal = Journal::default();
        let (game_loop, tx, _latch) = game_loop(scripted_loader(journal.clone(), None));
        let forwarder = EventForwarder::new(tx, RedrawLatch::new());
        forwarder.forward(PlatformEvent::Resize { width: 800, height: 600 });
        forwarder.forward(PlatformEvent::Close);

        let presenter = HeadlessPresenter::default();
        let result = game_loop.run(&presenter);

        assert!(result.is_ok());
        assert_eq!(presenter.last_size.get(), Some((800, 600)));
        assert!(presenter.swaps.get() == 0, "loop quit before presenting a frame");
        assert_eq!(
            entries(&journal),
            vec![
                "load",
                "event:Resize { width: 800, height: 600 }",
                "event:Close",
                "unload"
            ]
        );
    }

    #[test]
    fn quit_from_update_stops_the_loop() {
        let journal = Journal::default();
        let (game_loop, _tx, _latch) = game_loop(scripted_loader(journal.clone(), Some(3)));

        assert!(game_loop.run(HeadlessPresenter::default()).is_ok());
        assert_eq!(entries(&journal), vec!["load", "unload"]);
    }

    #[test]
    fn disconnected_window_thread_ends_the_loop() {
        let journal = Journal::default();
        let (game_loop, tx, _latch) = game_loop(scripted_loader(journal.clone(), None));
        tx.send(PlatformEvent::Resize { width: 10, height: 20 }).unwrap();
        drop(tx);

        assert!(game_loop.run(HeadlessPresenter::default()).is_ok());
        assert_eq!(
            entries(&journal),
            vec!["load", "event:Resize { width: 10, height: 20 }", "unload"]
        );
    }

    #[test]
    fn failed_activation_still_notifies_once() {
        let journal = Journal::default();
        let (game_loop, _tx, _latch) = game_loop(scripted_loader(journal.clone(), None));

        let handle = game_loop
            .spawn(
                || -> Result<HeadlessPresenter, HostError> {
                    Err(HostError::ContextActivation("no display".into()))
                },
                RecordingNotifier { journal: journal.clone() },
            )
            .unwrap();

        assert!(matches!(
            handle.join().unwrap(),
            Err(HostError::ContextActivation(_))
        ));
        assert_eq!(entries(&journal), vec!["notify:Exit"]);
    }

    #[test]
    fn failed_load_is_reported() {
        struct Broken;
        impl GameLoader for Broken {
            fn load(&mut self, _platform: &PlatformTable) -> Result<Box<dyn Game>, HostError> {
                Err(HostError::MissingEntryPoint {
                    symbol: "game_load".into(),
                    reason: "stripped".into(),
                })
            }
        }

        let (game_loop, _tx, _latch) = game_loop(Box::new(Broken));

        assert!(matches!(
            game_loop.run(HeadlessPresenter::default()),
            Err(HostError::MissingEntryPoint { .. })
        ));
    }

    #[test]
    fn stale_module_is_reloaded() {
        struct Reloading {
            journal: Journal,
            loads: u32,
        }

        struct Counting {
            platform: GuestPlatform,
            generation: u32,
            journal: Journal,
        }

        impl Game for Counting {
            fn on_platform_event(&mut self, _event: &PlatformEvent) {}
            fn update(&mut self) {
                if self.generation == 2 {
                    self.platform.quit();
                }
            }
            fn render(&mut self) {}
        }

        impl Drop for Counting {
            fn drop(&mut self) {
                self.journal
                    .lock()
                    .unwrap()
                    .push(format!("unload:{}", self.generation));
            }
        }

        impl GameLoader for Reloading {
            fn load(&mut self, platform: &PlatformTable) -> Result<Box<dyn Game>, HostError> {
                self.loads += 1;
                Ok(Box::new(Counting {
                    platform: unsafe { GuestPlatform::from_raw(platform) },
                    generation: self.loads,
                    journal: self.journal.clone(),
                }))
            }

            fn is_stale(&self) -> bool {
                self.loads == 1
            }
        }

        let journal = Journal::default();
        let (_tx, rx) = unbounded();
        let game_loop = GameLoop::new(
            Box::new(Reloading { journal: journal.clone(), loads: 0 }),
            EventCollector::new(rx, RedrawLatch::new()),
            QuitSignal::new(),
            Duration::from_millis(200),
            true,
        );

        assert!(game_loop.run(HeadlessPresenter::default()).is_ok());
        assert_eq!(entries(&journal), vec!["unload:1", "unload:2"]);
    }
}
