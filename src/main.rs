//! # steam-bulk-uninstaller
//!
//! Uninstall many Steam games at once on Linux, removing game files,
//! manifests, Proton prefixes and shader caches.
//!
//! ## Quick Start
//!
//! ```bash
//! # Pick games interactively
//! steam-bulk-uninstaller
//!
//! # Preview without deleting anything
//! steam-bulk-uninstaller --dry-run
//!
//! # Print installed games and exit
//! steam-bulk-uninstaller --list
//! ```
//!
//! ## Environment Variables
//!
//! - `STEAM_UNINSTALLER_ROOT`: Steam installation to use instead of probing
//! - `STEAM_UNINSTALLER_DRY_RUN`: Preview mode
//! - `STEAM_UNINSTALLER_VERBOSE`: Enable verbose output
//! - `STEAM_UNINSTALLER_QUIET`: Silence all output except errors

use std::io::IsTerminal;

use steam_bulk_uninstaller::cli::Cli;

fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    // Plain reports when stderr is not a terminal (pipes, logs)
    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();

    steam_bulk_uninstaller::commands::execute(&cli).map_err(Into::into)
}
