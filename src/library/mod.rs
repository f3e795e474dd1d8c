//! Steam installation discovery.
//!
//! Locates the Steam root directory, enumerates the library folders listed in
//! `steamapps/libraryfolders.vdf`, and probes whether the Steam client is
//! currently running.

use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::Logger;
use crate::vdf;

#[cfg(test)]
mod tests;

/// Directory inside every library root that holds manifests and game data.
pub const STEAMAPPS_DIR: &str = "steamapps";

/// Steam roots probed under the home directory, in order.
const ROOT_CANDIDATES: &[&str] = &[
    ".local/share/Steam",
    ".steam/steam",
    ".steam/debian-installation",
];

/// Returns every candidate Steam root under `home`, in probe order.
pub fn candidate_roots(home: &Path) -> Vec<PathBuf> {
    ROOT_CANDIDATES.iter().map(|rel| home.join(rel)).collect()
}

/// Locate the Steam installation under the current user's home directory.
///
/// Returns `None` when the home directory is unknown or no candidate holds a
/// `steamapps` directory.
pub fn locate_root() -> Option<PathBuf> {
    let home = home::home_dir()?;
    locate_root_in(&home)
}

/// Locate the Steam installation under an explicit home directory.
pub fn locate_root_in(home: &Path) -> Option<PathBuf> {
    candidate_roots(home).into_iter().find(|p| is_steam_root(p))
}

/// Check for the layout marker of a Steam root.
pub fn is_steam_root(path: &Path) -> bool {
    path.join(STEAMAPPS_DIR).is_dir()
}

/// List every library root known to the Steam installation at `root`.
///
/// Libraries keep their descriptor order; `root` is inserted at the front
/// when the descriptor omits it. Paths listed in `libraryfolders.vdf` that no
/// longer exist are left out, and duplicates are removed. A missing or unreadable descriptor yields just `[root]`.
pub fn list_library_roots(root: &Path, log: &Logger) -> Vec<PathBuf> {
    let descriptor = root.join(STEAMAPPS_DIR).join("libraryfolders.vdf");
    if !descriptor.exists() {
        log.verbose(1, format!("No library descriptor at {}", descriptor.display()));
        return vec![root.to_path_buf()];
    }

    let data = match vdf::parse_file(&descriptor) {
        Ok(data) => data,
        Err(err) => {
            log.verbose(1, format!("Skipping library descriptor: {err}"));
            return vec![root.to_path_buf()];
        }
    };

    let mut libraries: Vec<PathBuf> = Vec::new();
    if let Some(folders) = data.get_map("libraryfolders") {
        for (_, folder) in folders.iter() {
            let Some(path) = folder.as_map().and_then(|f| f.get_str("path")) else {
                continue;
            };
            let path = PathBuf::from(path);
            if path.exists() && !libraries.contains(&path) {
                libraries.push(path);
            }
        }
    }

    if !libraries.iter().any(|p| p == root) {
        libraries.insert(0, root.to_path_buf());
    }

    log.verbose(1, format!("Found {} Steam libraries", libraries.len()));
    libraries
}

/// Check whether a Steam client process is running.
///
/// Scans `/proc/<pid>/comm` for `steam` or `steam.exe`. Used only to warn
/// before deleting; returns `false` wherever `/proc` is unavailable.
pub fn is_steam_running() -> bool {
    let Ok(entries) = fs::read_dir("/proc") else {
        return false;
    };

    entries.flatten().any(|entry| {
        let is_pid = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.bytes().all(|b| b.is_ascii_digit()));
        is_pid
            && fs::read_to_string(entry.path().join("comm"))
                .is_ok_and(|comm| is_steam_process_name(comm.trim()))
    })
}

fn is_steam_process_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("steam") || name.eq_ignore_ascii_case("steam.exe")
}
