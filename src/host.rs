//=========================================================================
// Pac-Man Host
//
// Main entry point: configures and runs the platform shell.
//
// Architecture:
// ```text
//     HostBuilder  ──build(loader)──>  Host  ──run()──>  [Runtime]
//         │                             │
//         ├─ with_title()               ├─ creates event channel
//         ├─ with_target_fps()          ├─ runs platform (window thread)
//         └─ with_hot_reload()          └─ platform spawns game loop
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::unbounded;
use log::info;

//=== Internal Dependencies ===============================================

use crate::core::game_loop::GameLoop;
use crate::core::platform_bridge::{EventCollector, EventForwarder, HostError, RedrawLatch};
use crate::core::{GameLoader, QuitSignal};
use crate::platform::Platform;

//=== HostConfig ==========================================================

/// Settings shared by the window thread and the loop thread.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HostConfig {
    pub(crate) title: String,
    pub(crate) inner_size: (u32, u32),
    pub(crate) frame_interval: Duration,
    pub(crate) vsync: bool,
    pub(crate) hot_reload: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            title: "Pac-Man".into(),
            inner_size: (1200, 740),
            frame_interval: Duration::from_millis(16),
            vsync: false,
            hot_reload: false,
        }
    }
}

//=== HostBuilder =========================================================

/// Builder for configuring and constructing a [`Host`].
///
/// # Default Values
///
/// - **Title**: "Pac-Man"
/// - **Inner size**: 1200×740
/// - **Frame interval**: 16 ms
/// - **VSync**: off
/// - **Hot reload**: off
///
/// # Examples
///
/// ```no_run
/// use pacman_shell::HostBuilder;
/// use pacman_shell::module::ModuleLoader;
///
/// let loader = ModuleLoader::new(ModuleLoader::library_filename("game"));
///
/// HostBuilder::new()
///     .with_target_fps(60.0)
///     .build(loader)
///     .run()
///     .expect("host failed");
/// ```
#[derive(Debug, Default)]
pub struct HostBuilder {
    config: HostConfig,
}

impl HostBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Sets the initial client-area size in logical pixels.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_inner_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be non-zero, got {}x{}", width, height);
        self.config.inner_size = (width, height);
        self
    }

    /// Sets the frame interval from a frame rate.
    ///
    /// # Panics
    ///
    /// Panics if `fps` is not a positive finite number.
    pub fn with_target_fps(self, fps: f64) -> Self {
        assert!(fps.is_finite() && fps > 0.0, "FPS must be positive, got {}", fps);
        self.with_frame_interval(Duration::from_secs_f64(1.0 / fps))
    }

    /// Sets the target time per frame. The loop sleeps for whatever part
    /// of it a frame did not use.
    ///
    /// Default: 16 ms
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "Frame interval must be positive");
        self.config.frame_interval = interval;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    /// Reloads the game module when its file changes on disk.
    pub fn with_hot_reload(mut self, hot_reload: bool) -> Self {
        self.config.hot_reload = hot_reload;
        self
    }

    /// Builds the host around a game loader.
    pub fn build<L: GameLoader + 'static>(self, loader: L) -> Host {
        info!(
            "Building host (frame: {:?}, hot reload: {})",
            self.config.frame_interval, self.config.hot_reload
        );

        Host {
            config: self.config,
            loader: Box::new(loader),
        }
    }
}

//=== Host ================================================================

/// Pac-Man platform shell runtime.
///
/// ```text
/// Host (Window Thread)
///   ├─► Platform (Winit event loop, window, GL context)
///   │
///   └─► GameLoop (Game Loop Thread @ frame interval)
///         └─► Game (load, events, update, render, unload)
///
/// Communication: unbounded channel (PlatformEvent), EventLoopProxy (HostCommand)
/// ```
pub struct Host {
    config: HostConfig,
    loader: Box<dyn GameLoader>,
}

impl Host {
    /// Starts the host and blocks until the game quits.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the window → loop event channel. It is unbounded so the
    ///    window thread never waits on a slow load, reload or frame
    /// 2. Runs the platform event loop (blocks here); the platform creates
    ///    the window and GL context, then spawns the game loop thread
    /// 3. The game calls `quit`; the loop unloads it and wakes the window
    ///    thread, which leaves the event loop
    /// 4. Joins the loop thread and drops the window
    ///
    /// # Errors
    ///
    /// Any fatal setup failure from either thread, see [`HostError`].
    pub fn run(self) -> Result<(), HostError> {
        info!("Starting host runtime (frame: {:?})", self.config.frame_interval);

        //--- 1. Create communication channel -----------------------------
        let (forwarder, collector) = event_channel();

        info!("Event channel created");

        //--- 2. Prepare the game loop -------------------------------------
        let game_loop = GameLoop::new(
            self.loader,
            collector,
            QuitSignal::new(),
            self.config.frame_interval,
            self.config.hot_reload,
        );

        //--- 3. Run the platform ------------------------------------------
        let result = Platform::run(self.config, game_loop, forwarder);

        match &result {
            Ok(()) => info!("Host shutdown complete"),
            Err(e) => log::error!("Host stopped: {}", e),
        }
        result
    }
}

/// Both ends of the window → loop event channel, sharing one redraw latch.
fn event_channel() -> (EventForwarder, EventCollector) {
    let (tx, rx) = unbounded();
    let redraw = RedrawLatch::new();
    (EventForwarder::new(tx, redraw.clone()), EventCollector::new(rx, redraw))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::abi::PlatformTable;
    use crate::core::Game;

    struct NoGame;

    impl GameLoader for NoGame {
        fn load(&mut self, _platform: &PlatformTable) -> Result<Box<dyn Game>, HostError> {
            Err(HostError::ModuleLoad {
                path: "none".into(),
                reason: "test loader".into(),
            })
        }
    }

    //=====================================================================
    // HostBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = HostBuilder::new();
        assert_eq!(builder.config.title, "Pac-Man");
        assert_eq!(builder.config.inner_size, (1200, 740));
        assert_eq!(builder.config.frame_interval, Duration::from_millis(16));
        assert!(!builder.config.vsync);
        assert!(!builder.config.hot_reload);
    }

    #[test]
    fn builder_with_target_fps() {
        let builder = HostBuilder::new().with_target_fps(50.0);
        assert_eq!(builder.config.frame_interval, Duration::from_millis(20));
    }

    #[test]
    #[should_panic(expected = "FPS must be positive")]
    fn builder_with_target_fps_panics_on_zero() {
        HostBuilder::new().with_target_fps(0.0);
    }

    #[test]
    #[should_panic(expected = "FPS must be positive")]
    fn builder_with_target_fps_panics_on_nan() {
        HostBuilder::new().with_target_fps(f64::NAN);
    }

    #[test]
    #[should_panic(expected = "Frame interval must be positive")]
    fn builder_with_frame_interval_panics_on_zero() {
        HostBuilder::new().with_frame_interval(Duration::ZERO);
    }

    #[test]
    #[should_panic(expected = "Window size must be non-zero")]
    fn builder_with_inner_size_panics_on_zero_width() {
        HostBuilder::new().with_inner_size(0, 600);
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let host = HostBuilder::new()
            .with_title("Ms. Pac-Man")
            .with_inner_size(640, 480)
            .with_frame_interval(Duration::from_millis(8))
            .with_vsync(true)
            .with_hot_reload(true)
            .build(NoGame);

        assert_eq!(host.config.title, "Ms. Pac-Man");
        assert_eq!(host.config.inner_size, (640, 480));
        assert_eq!(host.config.frame_interval, Duration::from_millis(8));
        assert!(host.config.vsync);
        assert!(host.config.hot_reload);
    }

    //=====================================================================
    // Event Channel Tests
    //=====================================================================

    #[test]
    fn forwarding_never_waits_for_a_stalled_loop() {
        use crate::core::platform_bridge::TickControl;
        use crate::core::PlatformEvent;
        use std::time::Instant;

        let (forwarder, mut collector) = event_channel();

        let started = Instant::now();
        for i in 0..1_000 {
            assert!(forwarder.forward(PlatformEvent::Resize { width: i, height: i }));
        }
        assert!(
            started.elapsed() < Duration::from_millis(100),
            "window thread waited {:?} on an undrained channel",
            started.elapsed()
        );

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        assert_eq!(collector.events().len(), 100);
        assert_eq!(collector.events()[0], PlatformEvent::Resize { width: 0, height: 0 });
    }
}
