//! # steam-bulk-uninstaller
//!
//! A Linux tool that uninstalls many Steam games in one pass and cleans up
//! what Steam itself leaves behind: the Proton prefix (`compatdata/<id>`) and
//! the shader cache (`shadercache/<id>`) of every removed game.
//!
//! ## Overview
//!
//! The tool locates the Steam installation under the user's home directory,
//! reads every library folder listed in `libraryfolders.vdf`, and builds a
//! catalog of installed games from their `appmanifest_<id>.acf` files.
//! Proton builds and Steam runtimes are never listed. The user then selects
//! games interactively and confirms; deletion runs on a background worker
//! while the foreground reports progress.
//!
//! ## Architecture
//!
//! - [`vdf`]: permissive parser for Valve's text KeyValues format
//! - [`library`]: Steam root discovery, library folders, running check
//! - [`catalog`]: installed games, per-user playtime, exclusions
//! - [`size`]: disk usage measurement and human-readable formatting
//! - [`uninstall`]: deletion engine with dry-run and progress events
//! - [`cli`]: command-line interface definitions using clap
//! - [`commands`]: list and interactive modes
//! - [`error`]: error types with thiserror + miette
//! - [`logging`]: stderr logger honoring `--verbose` and `--quiet`
//!
//! ## Library Usage
//!
//! ```no_run
//! use steam_bulk_uninstaller::catalog::build_catalog;
//! use steam_bulk_uninstaller::uninstall::Uninstaller;
//!
//! let catalog = build_catalog();
//! let doomed: Vec<_> = catalog
//!     .iter()
//!     .filter(|game| game.playtime_minutes == 0)
//!     .cloned()
//!     .collect();
//!
//! // Preview only: nothing is deleted in dry-run mode
//! let uninstaller = Uninstaller::builder().dry_run(true).build();
//! let summary = uninstaller.uninstall_games(&doomed, |_, _, _| {});
//! println!("{} bytes would be freed", summary.total_bytes_freed);
//! ```
//!
//! ## Error Handling
//!
//! The crate uses a combination of:
//! - `thiserror` for strongly-typed errors
//! - `miette` for rich diagnostic output in CLI
//!
//! Only a missing Steam installation and broken terminal I/O end the program.
//! Unreadable manifests and failed deletions are reported per item.

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod error;
pub mod library;
pub mod logging;
pub mod size;
pub mod uninstall;
pub mod vdf;
