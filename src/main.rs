//=========================================================================
// pacman
//
// Launches the platform shell around a game module.
//
// Usage:
//   pacman [GAME_LIBRARY]
//
// Without an argument the game library is looked up in the working
// directory under the platform's name for `game` (`libgame.so`,
// `game.dll`, `libgame.dylib`). `RUST_LOG` overrides the default `info`
// log filter.
//
//=========================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use env_logger::{Builder, Env};
use log::{error, info};

use pacman_shell::module::ModuleLoader;
use pacman_shell::HostBuilder;

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("winit", log::LevelFilter::Warn)
        .init();

    let library = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(ModuleLoader::library_filename("game")));

    let hot_reload = cfg!(debug_assertions);
    let loader = ModuleLoader::new(library).with_shadow_copy(hot_reload);
    info!("Game library: {} (hot reload: {})", loader.path().display(), hot_reload);

    let host = HostBuilder::new().with_hot_reload(hot_reload).build(loader);

    match host.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
