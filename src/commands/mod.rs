//! Implementation of the steam-bulk-uninstaller modes.
//!
//! `mod.rs` resolves the Steam installation, builds the catalog and hands it
//! to the selected mode (`list` or `interactive`).

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::catalog::{self, Catalog};
use crate::cli::Cli;
use crate::error::{Result, UninstallerError};
use crate::library;
use crate::logging::Logger;

pub(crate) mod interactive;
pub(crate) mod list;

pub use interactive::{Session, parse_rows};
pub use list::write_listing;


/// Execute the mode selected on the command line, using the process's
/// stdin/stdout.
pub fn execute(cli: &Cli) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    execute_with_io(cli, &mut input, &mut output)
}

/// Execute with explicit input and output streams.
pub fn execute_with_io(cli: &Cli, input: &mut impl BufRead, output: &mut impl Write) -> Result<()> {
    let log = Logger::new(cli.verbose(), cli.quiet());

    let root = resolve_root(cli.steam_root())?;
    log.verbose(1, format!("Using Steam installation at {}", root.display()));

    let catalog: Catalog = catalog::build_catalog_from(&root, &log);

    if cli.list() {
        return write_listing(&catalog, output).map_err(stdout_error);
    }

    Session::new(&catalog, cli.dry_run(), cli.size_mode())
        .verbose(cli.verbose())
        .quiet(cli.quiet())
        .run(input, output)
}

/// Resolve the Steam root from an explicit override or by probing the home
/// directory.
pub fn resolve_root(override_root: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = override_root {
        if !library::is_steam_root(root) {
            return Err(UninstallerError::Config(format!(
                "'{}' is not a Steam installation (no steamapps directory)",
                root.display()
            )));
        }
        return Ok(root.to_path_buf());
    }

    match home::home_dir() {
        Some(home) => library::locate_root_in(&home).ok_or_else(|| {
            UninstallerError::SteamNotFound {
                checked: library::candidate_roots(&home),
            }
        }),
        None => Err(UninstallerError::SteamNotFound {
            checked: library::candidate_roots(Path::new("~")),
        }),
    }
}

pub(crate) fn stdout_error(source: io::Error) -> UninstallerError {
    UninstallerError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    }
}
