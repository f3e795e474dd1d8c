use std::path::Path;

use clap::Parser;

use crate::cli::Cli;
use crate::size::SizeMode;

#[test]
fn test_cli_defaults() {
    let cli = Cli::parse_from(["steam-bulk-uninstaller"]);
    assert!(!cli.dry_run());
    assert!(!cli.list());
    assert!(cli.steam_root().is_none());
    assert_eq!(cli.size_mode(), SizeMode::Reported);
    assert_eq!(cli.verbose(), 0);
    assert!(!cli.quiet());
}

#[test]
fn test_dry_run_and_list_flags() {
    let cli = Cli::parse_from(["steam-bulk-uninstaller", "--dry-run"]);
    assert!(cli.dry_run());
    assert!(!cli.list());

    let cli = Cli::parse_from(["steam-bulk-uninstaller", "--list"]);
    assert!(cli.list());
}

#[test]
fn test_steam_root_override() {
    let cli = Cli::parse_from([
        "steam-bulk-uninstaller",
        "--steam-root",
        "/mnt/steam",
        "--measure-game-files",
    ]);
    assert_eq!(cli.steam_root(), Some(Path::new("/mnt/steam")));
    assert_eq!(cli.size_mode(), SizeMode::Measured);
}

#[test]
fn test_verbose_flag() {
    let cli = Cli::parse_from(["steam-bulk-uninstaller", "-vv", "--list"]);
    assert_eq!(cli.verbose(), 2);
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    assert!(Cli::try_parse_from(["steam-bulk-uninstaller", "-q", "-v"]).is_err());

    let cli = Cli::parse_from(["steam-bulk-uninstaller", "--quiet"]);
    assert!(cli.quiet());
    assert_eq!(cli.verbose(), 0);
}

#[test]
fn test_unknown_argument_is_rejected() {
    assert!(Cli::try_parse_from(["steam-bulk-uninstaller", "--delete-everything"]).is_err());
}

#[test]
fn test_cli_builder() {
    let cli = Cli::builder()
        .dry_run(true)
        .list(true)
        .steam_root("/tmp/steam")
        .measure_game_files(true)
        .verbose(3)
        .build();

    assert!(cli.dry_run());
    assert!(cli.list());
    assert_eq!(cli.steam_root(), Some(Path::new("/tmp/steam")));
    assert_eq!(cli.size_mode(), SizeMode::Measured);
    assert_eq!(cli.verbose(), 3);

    let cli = Cli::builder().verbose(2).quiet(true).build();
    assert_eq!(cli.verbose(), 0);
}

#[test]
fn test_cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
