//! Command-line interface definitions for steam-bulk-uninstaller.
//!
//! The tool has two modes: an interactive mode (the default) that lets the
//! user pick games to uninstall, and a list mode (`--list`) that prints the
//! installed games and exits. Every flag can also be set through a
//! `STEAM_UNINSTALLER_*` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use steam_bulk_uninstaller::cli::Cli;
//!
//! let cli = Cli::parse_args();
//! if cli.list() {
//!     println!("Listing games");
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::size::SizeMode;

#[cfg(test)]
mod tests;

/// Main command-line interface for steam-bulk-uninstaller.
#[derive(Debug, Parser)]
#[command(
    name = "steam-bulk-uninstaller",
    author,
    version,
    about = "Cleanly uninstall Steam games on Linux, including Proton data and shader caches",
    long_about = None,
    after_help = "Examples:\n  steam-bulk-uninstaller            Pick games to uninstall interactively\n  \
                  steam-bulk-uninstaller --dry-run  Preview what would be deleted\n  \
                  steam-bulk-uninstaller --list     List installed games and exit"
)]
pub struct Cli {
    /// Preview mode - show what would be deleted without deleting anything
    #[arg(long, env = "STEAM_UNINSTALLER_DRY_RUN")]
    dry_run: bool,

    /// List all installed games and exit
    #[arg(long = "list", env = "STEAM_UNINSTALLER_LIST")]
    list: bool,

    /// Steam installation to use instead of probing the default locations
    #[arg(long, value_name = "PATH", env = "STEAM_UNINSTALLER_ROOT")]
    steam_root: Option<PathBuf>,

    /// Measure game directories when estimating freed space instead of
    /// trusting the size recorded by Steam
    #[arg(long, env = "STEAM_UNINSTALLER_MEASURE_GAME_FILES")]
    measure_game_files: bool,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, env = "STEAM_UNINSTALLER_VERBOSE")]
    verbose: u8,

    /// Silence all output except for errors
    #[arg(
        short,
        long,
        conflicts_with = "verbose",
        env = "STEAM_UNINSTALLER_QUIET"
    )]
    quiet: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Check if dry run mode is enabled
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Check if list mode is enabled
    pub fn list(&self) -> bool {
        self.list
    }

    /// Get the Steam root override
    pub fn steam_root(&self) -> Option<&Path> {
        self.steam_root.as_deref()
    }

    /// How game files are sized in estimates
    pub fn size_mode(&self) -> SizeMode {
        if self.measure_game_files {
            SizeMode::Measured
        } else {
            SizeMode::Reported
        }
    }

    /// Get the verbose level (always 0 in quiet mode)
    pub fn verbose(&self) -> u8 {
        if self.quiet { 0 } else { self.verbose }
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    dry_run: bool,
    list: bool,
    steam_root: Option<PathBuf>,
    measure_game_files: bool,
    verbose: u8,
    quiet: bool,
}

impl CliBuilder {
    /// Enable dry run mode
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enable list mode
    pub fn list(mut self, enabled: bool) -> Self {
        self.list = enabled;
        self
    }

    /// Set the Steam root override
    pub fn steam_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.steam_root = Some(path.into());
        self
    }

    /// Measure game directories in estimates
    pub fn measure_game_files(mut self, enabled: bool) -> Self {
        self.measure_game_files = enabled;
        self
    }

    /// Set the verbose level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Cli {
        Cli {
            dry_run: self.dry_run,
            list: self.list,
            steam_root: self.steam_root,
            measure_game_files: self.measure_game_files,
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}
