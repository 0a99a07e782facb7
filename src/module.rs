//=========================================================================
// Game Module Loader
//=========================================================================
//
// Loads a game from a shared library through the `game_load` entry point.
//
// The library handle lives inside the returned game, behind the game
// table, so `unload` always runs before the library is closed. The
// loader remembers the file's modification time to support hot reload.
//
// With shadow copies on, each load opens a uniquely named copy in the
// temp directory. The original file stays free to be overwritten by a
// rebuild, and the reload never hands back a cached image of the old
// library.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use libloading::{Library, Symbol};
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::abi::{GameLoadFn, PlatformTable, GAME_LOAD_SYMBOL};
use crate::core::game::{Game, GameLoader, TableGame};
use crate::core::platform_bridge::HostError;
use crate::core::PlatformEvent;

//=== ModuleLoader ========================================================

/// Loads a game module from a shared library on disk.
#[derive(Debug)]
pub struct ModuleLoader {
    path: PathBuf,
    loaded_at: Option<SystemTime>,
    shadow_copy: bool,
    generation: u64,
}

impl ModuleLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded_at: None,
            shadow_copy: false,
            generation: 0,
        }
    }

    /// Opens a fresh temp-dir copy of the library on every load.
    pub fn with_shadow_copy(mut self, shadow_copy: bool) -> Self {
        self.shadow_copy = shadow_copy;
        self
    }

    /// The platform file name for a library called `name`
    /// (`libgame.so`, `game.dll`, `libgame.dylib`).
    pub fn library_filename(name: &str) -> OsString {
        libloading::library_filename(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GameLoader for ModuleLoader {
    fn load(&mut self, platform: &PlatformTable) -> Result<Box<dyn Game>, HostError> {
        info!(target: "game_loop", "Loading game module {}", self.path.display());

        let source_modified = modified(&self.path);
        let shadow = if self.shadow_copy {
            self.generation += 1;
            Some(ShadowCopy::create(&self.path, self.generation)?)
        } else {
            None
        };
        let open_path = shadow.as_ref().map_or(self.path.as_path(), |s| s.path.as_path());

        // SAFETY: loading runs the library's initialisers; the game module
        // is trusted code by construction of the host.
        let library = unsafe { Library::new(open_path) }.map_err(|e| HostError::ModuleLoad {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let table = {
            // SAFETY: `game_load` is declared with the `GameLoadFn` signature
            // by every module built against this ABI.
            let game_load: Symbol<GameLoadFn> =
                unsafe { library.get(GAME_LOAD_SYMBOL) }.map_err(|e| {
                    HostError::MissingEntryPoint {
                        symbol: "game_load".into(),
                        reason: e.to_string(),
                    }
                })?;
            unsafe { game_load(platform) }
        };

        self.loaded_at = source_modified;

        // SAFETY: the table came straight from `game_load` and is unloaded
        // only by `TableGame`'s drop.
        let game = unsafe { TableGame::from_table(table) };
        Ok(Box::new(ModuleGame {
            game,
            _library: library,
            _shadow: shadow,
        }))
    }

    fn is_stale(&self) -> bool {
        match (self.loaded_at, modified(&self.path)) {
            (Some(loaded), Some(current)) => current > loaded,
            _ => false,
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

//=== ModuleGame ==========================================================

/// A game backed by a loaded library.
///
/// Field order matters: `game` drops (and unloads) before the library
/// closes, and the library closes before its shadow copy is deleted.
struct ModuleGame {
    game: TableGame,
    _library: Library,
    _shadow: Option<ShadowCopy>,
}

impl Game for ModuleGame {
    fn on_platform_event(&mut self, event: &PlatformEvent) {
        self.game.on_platform_event(event)
    }

    fn update(&mut self) {
        self.game.update()
    }

    fn render(&mut self) {
        self.game.render()
    }
}

//=== ShadowCopy ==========================================================

/// A temp-dir copy of a game library, deleted on drop.
#[derive(Debug)]
struct ShadowCopy {
    path: PathBuf,
}

impl ShadowCopy {
    fn create(source: &Path, generation: u64) -> Result<Self, HostError> {
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "game".into());
        let path = std::env::temp_dir().join(format!(
            "pacman_shell_{}_{}_{}",
            std::process::id(),
            generation,
            file_name
        ));

        fs::copy(source, &path).map_err(|e| HostError::ModuleLoad {
            path: source.to_path_buf(),
            reason: format!("shadow copy to {} failed: {}", path.display(), e),
        })?;

        debug!(target: "game_loop", "Shadow copy at {}", path.display());
        Ok(Self { path })
    }
}

impl Drop for ShadowCopy {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(target: "game_loop", "Could not remove {}: {}", self.path.display(), e);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
