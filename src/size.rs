//! Disk usage accounting.
//!
//! Sizes here are best-effort estimates: entries that cannot be read are
//! skipped rather than reported, so a total is never an error.

use std::path::Path;

use walkdir::WalkDir;

use crate::catalog::Game;

/// How the game files of a selection are sized by [`estimate_reclaimable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeMode {
    /// Trust the `SizeOnDisk` figure from the manifest. Avoids walking
    /// potentially huge install trees.
    #[default]
    Reported,
    /// Walk the game files directory.
    Measured,
}

/// Calculate the total size of regular files under `path`.
///
/// Returns 0 for a missing path and the file's own length when `path` is a
/// file. Symlinks are not followed. Entries that cannot be read (permission
/// denied, removed mid-walk) contribute nothing.
pub fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Estimate the space freed by uninstalling `games`.
///
/// Proton data and shader caches are always measured when the catalog flagged
/// them; game files are sized according to `mode`.
pub fn estimate_reclaimable<'a>(games: impl IntoIterator<Item = &'a Game>, mode: SizeMode) -> u64 {
    games
        .into_iter()
        .map(|game| {
            let mut total = match mode {
                SizeMode::Reported => game.size_on_disk,
                SizeMode::Measured => directory_size(&game.game_path()),
            };
            if game.has_compatdata {
                total += directory_size(&game.compatdata_path());
            }
            if game.has_shadercache {
                total += directory_size(&game.shadercache_path());
            }
            total
        })
        .sum()
}

/// Format size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_idx])
}

/// Format playtime minutes as hours, or `-` when never played.
pub fn format_playtime(minutes: u64) -> String {
    if minutes == 0 {
        return "-".to_string();
    }
    format!("{:.1}h", minutes as f64 / 60.0)
}
