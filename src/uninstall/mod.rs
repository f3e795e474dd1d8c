//! Uninstalling games.
//!
//! Each game is removed in up to four steps, always in this order:
//!
//! 1. `steamapps/appmanifest_<appid>.acf`
//! 2. `steamapps/common/<installdir>/`
//! 3. `steamapps/compatdata/<appid>/` (Proton prefix)
//! 4. `steamapps/shadercache/<appid>/`
//!
//! The plan is recomputed from the filesystem right before deletion, because
//! the presence flags recorded in the catalog may be stale. Games are
//! processed strictly one after another. A failure stops the remaining steps
//! of that game only; the batch carries on with the next game.
//!
//! # Example
//!
//! ```no_run
//! use steam_bulk_uninstaller::catalog::build_catalog;
//! use steam_bulk_uninstaller::uninstall::Uninstaller;
//!
//! let catalog = build_catalog();
//! let uninstaller = Uninstaller::builder().dry_run(true).build();
//!
//! let summary = uninstaller.uninstall_games(catalog.games(), |index, total, game| {
//!     println!("[{}/{}] {}", index + 1, total, game.name);
//! });
//! println!("Would free {} bytes", summary.total_bytes_freed);
//! ```

use std::any::Any;
use std::fmt;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use crate::catalog::Game;
use crate::error::{Result, UninstallerError};
use crate::logging::Logger;
use crate::size::directory_size;


/// Number of progress events buffered between the worker and the consumer.
const PROGRESS_CHANNEL_CAPACITY: usize = 16;

/// What a planned path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Manifest,
    GameFiles,
    ProtonData,
    ShaderCache,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::Manifest => write!(f, "manifest"),
            PathKind::GameFiles => write!(f, "game files"),
            PathKind::ProtonData => write!(f, "Proton data"),
            PathKind::ShaderCache => write!(f, "shader cache"),
        }
    }
}

/// A path scheduled for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPath {
    pub path: PathBuf,
    pub kind: PathKind,
}

/// Ordered list of paths to remove for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallPlan {
    pub paths: Vec<PlannedPath>,
}

impl UninstallPlan {
    pub fn kinds(&self) -> Vec<PathKind> {
        self.paths.iter().map(|p| p.kind).collect()
    }
}

/// Plan the removal of `game`.
///
/// The manifest is always included. Game files are included when the
/// directory exists now; Proton data and shader cache are included when the
/// catalog flagged them and they still exist.
pub fn plan(game: &Game) -> UninstallPlan {
    let mut paths = vec![PlannedPath {
        path: game.manifest_path(),
        kind: PathKind::Manifest,
    }];

    let game_path = game.game_path();
    if game_path.exists() {
        paths.push(PlannedPath {
            path: game_path,
            kind: PathKind::GameFiles,
        });
    }

    let compatdata = game.compatdata_path();
    if game.has_compatdata && compatdata.exists() {
        paths.push(PlannedPath {
            path: compatdata,
            kind: PathKind::ProtonData,
        });
    }

    let shadercache = game.shadercache_path();
    if game.has_shadercache && shadercache.exists() {
        paths.push(PlannedPath {
            path: shadercache,
            kind: PathKind::ShaderCache,
        });
    }

    UninstallPlan { paths }
}

/// Coarse classification of a failed uninstall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    Filesystem,
    Unexpected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::PermissionDenied => write!(f, "Permission denied"),
            FailureKind::Filesystem => write!(f, "Filesystem error"),
            FailureKind::Unexpected => write!(f, "Unexpected error"),
        }
    }
}

/// Why a game could not be (fully) uninstalled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl UninstallFailure {
    fn from_io(kind: PathKind, path: &Path, err: &io::Error) -> Self {
        let failure_kind = match err.kind() {
            io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
            _ => FailureKind::Filesystem,
        };
        Self {
            kind: failure_kind,
            message: format!("could not remove {kind} at '{}': {err}", path.display()),
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self {
            kind: FailureKind::Unexpected,
            message,
        }
    }
}

impl fmt::Display for UninstallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of uninstalling one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallResult {
    pub game: Game,
    /// `None` on success
    pub error: Option<UninstallFailure>,
    /// Bytes removed (or that would be removed in a dry run) before any
    /// failure
    pub bytes_freed: u64,
}

impl UninstallResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate outcome of a batch, with results in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallSummary {
    pub total_games: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_bytes_freed: u64,
    pub results: Vec<UninstallResult>,
}

impl UninstallSummary {
    pub fn from_results(results: Vec<UninstallResult>) -> Self {
        let successful = results.iter().filter(|r| r.success()).count();
        Self {
            total_games: results.len(),
            successful,
            failed: results.len() - successful,
            total_bytes_freed: results.iter().map(|r| r.bytes_freed).sum(),
            results,
        }
    }

    pub fn all_successful(&self) -> bool {
        self.failed == 0
    }
}

/// Progress reported by a batch running on a background worker.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// About to process `game`, the `index`-th of `total`
    Started {
        index: usize,
        total: usize,
        game: Game,
    },
    /// Finished processing the `index`-th game
    Finished {
        index: usize,
        result: UninstallResult,
    },
}

/// A batch running on a background worker thread.
pub struct BatchHandle {
    events: Receiver<BatchEvent>,
    worker: JoinHandle<UninstallSummary>,
}

impl BatchHandle {
    /// Progress events; the channel closes when the batch is done.
    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }

    /// Wait for the worker and return its summary.
    pub fn join(self) -> Result<UninstallSummary> {
        drop(self.events);
        self.worker.join().map_err(|payload| {
            UninstallerError::Worker(UninstallFailure::from_panic(payload).message)
        })
    }
}

/// Removes games from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uninstaller {
    dry_run: bool,
    log: Logger,
}

impl Uninstaller {
    /// Creates a new builder for [`Uninstaller`]
    pub fn builder() -> UninstallerBuilder {
        UninstallerBuilder::default()
    }

    /// Check if dry run mode is enabled
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Uninstall a single game.
    ///
    /// Never returns an error: failures are recorded in the result together
    /// with the bytes already freed.
    pub fn uninstall_game(&self, game: &Game) -> UninstallResult {
        let mut bytes_freed = 0;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            for planned in plan(game).paths {
                match self.remove_path(&planned) {
                    Ok(size) => bytes_freed += size,
                    Err(err) => {
                        return Err(UninstallFailure::from_io(planned.kind, &planned.path, &err));
                    }
                }
            }
            Ok(())
        }));

        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(failure)) => Some(failure),
            Err(payload) => Some(UninstallFailure::from_panic(payload)),
        };

        if let Some(failure) = &error {
            self.log
                .warn(format!("Failed to uninstall {}: {failure}", game.name));
        }

        UninstallResult {
            game: game.clone(),
            error,
            bytes_freed,
        }
    }

    /// Measure and remove one planned path, returning its size.
    ///
    /// A path that no longer exists is skipped. Symlinks are removed
    /// themselves, never their targets.
    fn remove_path(&self, planned: &PlannedPath) -> io::Result<u64> {
        let path = &planned.path;
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err),
        };

        let is_dir = metadata.is_dir();
        let size = if is_dir {
            directory_size(path)
        } else {
            metadata.len()
        };

        if self.dry_run {
            self.log.verbose(
                1,
                format!("Would delete {}: {}", planned.kind, path.display()),
            );
        } else {
            if is_dir {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
            self.log
                .verbose(1, format!("Deleted {}: {}", planned.kind, path.display()));
        }

        Ok(size)
    }

    /// Uninstall `games` one after another, in order.
    ///
    /// `observer` is called with `(index, total, game)` before each game.
    pub fn uninstall_games<F>(&self, games: &[Game], observer: F) -> UninstallSummary
    where
        F: FnMut(usize, usize, &Game),
    {
        self.run_batch(games, observer, |_, _| {})
    }

    /// Run the batch on a background worker thread.
    ///
    /// Progress arrives through [`BatchHandle::events`]; the worker blocks
    /// while the channel is full and keeps going if the receiver is dropped.
    pub fn spawn_batch(self, games: Vec<Game>) -> BatchHandle {
        let (tx, events) = mpsc::sync_channel(PROGRESS_CHANNEL_CAPACITY);

        let worker = thread::spawn(move || {
            self.run_batch(
                &games,
                |index, total, game| {
                    let _ = tx.send(BatchEvent::Started {
                        index,
                        total,
                        game: game.clone(),
                    });
                },
                |index, result| {
                    let _ = tx.send(BatchEvent::Finished {
                        index,
                        result: result.clone(),
                    });
                },
            )
        });

        BatchHandle { events, worker }
    }

    fn run_batch(
        &self,
        games: &[Game],
        mut on_start: impl FnMut(usize, usize, &Game),
        mut on_finish: impl FnMut(usize, &UninstallResult),
    ) -> UninstallSummary {
        let total = games.len();
        let mut results = Vec::with_capacity(total);

        for (index, game) in games.iter().enumerate() {
            on_start(index, total, game);
            let result = self.uninstall_game(game);
            on_finish(index, &result);
            results.push(result);
        }

        UninstallSummary::from_results(results)
    }
}

/// Builder for [`Uninstaller`]
#[derive(Debug, Default)]
pub struct UninstallerBuilder {
    dry_run: bool,
    verbose: u8,
    quiet: bool,
}

impl UninstallerBuilder {
    /// Enable dry run mode
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Set the verbosity level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable or disable quiet mode
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the [`Uninstaller`]
    pub fn build(self) -> Uninstaller {
        Uninstaller {
            dry_run: self.dry_run,
            log: Logger::new(self.verbose, self.quiet),
        }
    }
}
