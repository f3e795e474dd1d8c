//! Error types for steam-bulk-uninstaller.
//!
//! This module defines the error types used throughout the crate, using
//! a combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - Program-level failures derive from [`UninstallerError`]
//! - Failures that only affect one unit of work (one manifest, one user's
//!   metadata, one game's deletion) never become an `Err`: they are downgraded
//!   to "absent" results or recorded in an
//!   [`UninstallResult`](crate::uninstall::UninstallResult)
//! - Errors are automatically converted to `miette::Result` for CLI output
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use steam_bulk_uninstaller::error::{Result, UninstallerError};
//!
//! fn check_root(path: &Path) -> Result<()> {
//!     if !path.join("steamapps").is_dir() {
//!         return Err(UninstallerError::SteamNotFound {
//!             checked: vec![path.to_path_buf()],
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in steam-bulk-uninstaller operations
#[derive(Error, Debug, Diagnostic)]
pub enum UninstallerError {
    /// No Steam installation was found in any of the probed locations.
    ///
    /// This is the only failure that makes the whole catalog meaningless, so
    /// it terminates the program. The checked locations are listed so the
    /// user can tell where the tool looked.
    #[error("Could not find Steam installation (checked: {})", display_paths(.checked))]
    #[diagnostic(
        code(steam_bulk_uninstaller::steam::not_found),
        help(
            "Install Steam, or point the tool at an existing installation with --steam-root \
             <PATH> (the directory containing 'steamapps')."
        )
    )]
    SteamNotFound {
        /// Every candidate root that was checked, in probe order
        checked: Vec<PathBuf>,
    },

    /// File system I/O error.
    ///
    /// Raised when a descriptor exists but cannot be read, or when reading
    /// interactive input fails. Deletion failures are not reported through
    /// this variant; they are recorded per game.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(steam_bulk_uninstaller::io_error))]
    Io {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The interactive selection could not be understood.
    #[error("Invalid selection: {0}")]
    #[diagnostic(
        code(steam_bulk_uninstaller::select::invalid),
        help("Use row numbers and ranges, e.g. '3' or '1,4-6'.")
    )]
    InvalidSelection(
        /// Description of the parsing problem
        String,
    ),

    /// The background deletion worker stopped without producing a summary.
    #[error("Uninstall worker failed: {0}")]
    #[diagnostic(
        code(steam_bulk_uninstaller::uninstall::worker),
        help("Some games may be partially removed. Re-run the tool to finish the cleanup.")
    )]
    Worker(
        /// Description of the worker failure
        String,
    ),

    /// Invalid configuration, e.g. a `--steam-root` without `steamapps`.
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(steam_bulk_uninstaller::config::error),
        help("Check the command line options and STEAM_UNINSTALLER_* variables.")
    )]
    Config(
        /// Description of the configuration error
        String,
    ),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, UninstallerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steam_not_found_lists_every_checked_path() {
        let err = UninstallerError::SteamNotFound {
            checked: vec![
                PathBuf::from("/home/u/.local/share/Steam"),
                PathBuf::from("/home/u/.steam/steam"),
            ],
        };

        assert_eq!(
            err.to_string(),
            "Could not find Steam installation (checked: /home/u/.local/share/Steam, \
             /home/u/.steam/steam)"
        );
    }
}
