//! Catalog of installed Steam games.
//!
//! A catalog is built once from the filesystem and never mutated afterwards.
//! Building walks every library root, parses each `appmanifest_<appid>.acf`,
//! joins in playtime from the per-user `localconfig.vdf` files and sorts the
//! result by case-insensitive name.
//!
//! Anything that only concerns a single manifest or a single user (unreadable
//! file, missing section, bad number) is skipped; building a catalog never
//! fails.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::library::{self, STEAMAPPS_DIR};
use crate::logging::Logger;
use crate::vdf;


/// Names containing any of these are Steam tools, not games.
const EXCLUDED_NAME_PARTS: &[&str] = &["Proton", "Runtime"];

/// Key path from the root of `localconfig.vdf` to the per-app settings.
const LOCALCONFIG_APPS_PATH: &[&str] = &["UserLocalConfigStore", "Software", "Valve", "Steam"];

/// Per-app playtime in minutes, keyed by app id.
pub type Playtime = HashMap<String, u64>;

/// An installed Steam game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub app_id: String,
    pub name: String,
    /// Directory name under `steamapps/common`
    pub install_dir: String,
    /// Size reported by the manifest, in bytes
    pub size_on_disk: u64,
    /// Library root this game is installed in
    pub library: Arc<Path>,
    /// Proton data existed when the catalog was built
    pub has_compatdata: bool,
    /// A shader cache existed when the catalog was built
    pub has_shadercache: bool,
    pub playtime_minutes: u64,
}

impl Game {
    fn steamapps(&self) -> PathBuf {
        self.library.join(STEAMAPPS_DIR)
    }

    /// `steamapps/appmanifest_<appid>.acf`
    pub fn manifest_path(&self) -> PathBuf {
        self.steamapps()
            .join(format!("appmanifest_{}.acf", self.app_id))
    }

    /// `steamapps/common/<installdir>`
    pub fn game_path(&self) -> PathBuf {
        self.steamapps().join("common").join(&self.install_dir)
    }

    /// `steamapps/compatdata/<appid>`
    pub fn compatdata_path(&self) -> PathBuf {
        self.steamapps().join("compatdata").join(&self.app_id)
    }

    /// `steamapps/shadercache/<appid>`
    pub fn shadercache_path(&self) -> PathBuf {
        self.steamapps().join("shadercache").join(&self.app_id)
    }
}

/// All installed games across every library, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    games: Vec<Game>,
}

impl Catalog {
    /// Build a catalog from games in any order.
    ///
    /// The sort is stable, so games sharing a name keep their relative order.
    pub fn new(mut games: Vec<Game>) -> Self {
        sort_by_name(&mut games);
        Self { games }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Game> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Sum of the sizes reported by the manifests.
    pub fn total_reported_size(&self) -> u64 {
        self.games.iter().map(|g| g.size_on_disk).sum()
    }

    /// Indices of games whose name contains `needle`, ignoring case.
    ///
    /// An empty needle matches everything.
    pub fn filter(&self, needle: &str) -> Vec<usize> {
        let needle = needle.to_lowercase();
        self.games
            .iter()
            .enumerate()
            .filter(|(_, g)| g.name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Game;
    type IntoIter = std::slice::Iter<'a, Game>;

    fn into_iter(self) -> Self::IntoIter {
        self.games.iter()
    }
}

fn sort_by_name(games: &mut [Game]) {
    games.sort_by_cached_key(|g| g.name.to_lowercase());
}

/// Build the catalog for the Steam installation in the user's home directory.
///
/// Returns an empty catalog when Steam cannot be found; use
/// [`library::locate_root`] to tell "not installed" apart from "nothing
/// installed".
pub fn build_catalog() -> Catalog {
    match library::locate_root() {
        Some(root) => build_catalog_from(&root, &Logger::silent()),
        None => Catalog::default(),
    }
}

/// Build the catalog for the Steam installation at `root`.
pub fn build_catalog_from(root: &Path, log: &Logger) -> Catalog {
    let libraries = library::list_library_roots(root, log);
    let playtime = load_playtime(root, log);

    let mut games = Vec::new();
    for library in &libraries {
        let found = list_games(library, &playtime, log);
        log.verbose(
            1,
            format!("Found {} games in {}", found.len(), library.display()),
        );
        games.extend(found);
    }

    Catalog::new(games)
}

/// Collect playtime from every user's `localconfig.vdf` under `root`.
///
/// When several users played the same app, the highest playtime wins.
pub fn load_playtime(root: &Path, log: &Logger) -> Playtime {
    let mut playtime = Playtime::new();

    let Ok(users) = fs::read_dir(root.join("userdata")) else {
        return playtime;
    };

    for user in users.flatten() {
        let user_dir = user.path();
        if !user_dir.is_dir() {
            continue;
        }

        let config = user_dir.join("config").join("localconfig.vdf");
        if !config.exists() {
            continue;
        }

        let data = match vdf::parse_file(&config) {
            Ok(data) => data,
            Err(err) => {
                log.verbose(2, format!("Skipping user config: {err}"));
                continue;
            }
        };

        let Some(apps) = data
            .lookup_path(LOCALCONFIG_APPS_PATH)
            .and_then(|steam| steam.get_map("apps").or_else(|| steam.get_map("Apps")))
        else {
            log.verbose(2, format!("No app settings in {}", config.display()));
            continue;
        };

        for (app_id, settings) in apps.iter() {
            let Some(minutes) = settings
                .as_map()
                .and_then(|s| s.get_str("Playtime"))
                .and_then(|p| p.trim().parse::<u64>().ok())
            else {
                continue;
            };

            playtime
                .entry(app_id.to_string())
                .and_modify(|m| *m = (*m).max(minutes))
                .or_insert(minutes);
        }
    }

    playtime
}

/// List installed games in one library.
///
/// Only games whose install directory exists are returned; manifests left
/// behind without game files, Proton builds and the Steam runtimes are
/// skipped.
pub fn list_games(library: &Path, playtime: &Playtime, log: &Logger) -> Vec<Game> {
    let steamapps = library.join(STEAMAPPS_DIR);
    let Ok(entries) = fs::read_dir(&steamapps) else {
        return Vec::new();
    };

    let library: Arc<Path> = Arc::from(library);
    let mut games = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(file_app_id) = parse_manifest_app_id(&path) else {
            continue;
        };
        if !path.is_file() {
            continue;
        }

        let Some(game) = read_manifest(&path, &file_app_id, &library, playtime, log) else {
            continue;
        };

        if game.game_path().exists() {
            games.push(game);
        } else {
            log.verbose(
                2,
                format!("Skipping {}: game files missing", game.name),
            );
        }
    }

    sort_by_name(&mut games);
    games
}

/// Extract the app id from an `appmanifest_<appid>.acf` file name.
pub(crate) fn parse_manifest_app_id(path: &Path) -> Option<String> {
    static MANIFEST_RE: OnceLock<Regex> = OnceLock::new();

    let filename = path.file_name()?.to_str()?;
    let re = MANIFEST_RE.get_or_init(|| {
        Regex::new(r"^appmanifest_(\d+)\.acf$").expect("manifest regex should compile")
    });
    let captures = re.captures(filename)?;

    Some(captures[1].to_string())
}

/// True for Proton builds and Steam runtimes.
pub(crate) fn is_excluded_name(name: &str) -> bool {
    EXCLUDED_NAME_PARTS.iter().any(|part| name.contains(*part))
}

/// True when `name` is a single, ordinary path component.
///
/// Guards the derived deletion paths: an empty or `..` install directory would
/// otherwise point at `steamapps/common` itself or outside of it.
fn is_plain_dir_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    )
}

fn read_manifest(
    path: &Path,
    file_app_id: &str,
    library: &Arc<Path>,
    playtime: &Playtime,
    log: &Logger,
) -> Option<Game> {
    let data = match vdf::parse_file(path) {
        Ok(data) => data,
        Err(err) => {
            log.verbose(2, format!("Skipping manifest: {err}"));
            return None;
        }
    };

    let Some(app) = data.get_map("AppState").filter(|app| !app.is_empty()) else {
        log.verbose(2, format!("No AppState in {}", path.display()));
        return None;
    };

    let app_id = app.get_str("appid").unwrap_or(file_app_id).trim().to_string();
    if app_id != file_app_id {
        log.verbose(
            2,
            format!("Skipping {}: appid '{app_id}' does not match file name", path.display()),
        );
        return None;
    }

    let name = app.get_str("name").unwrap_or("Unknown").to_string();
    if is_excluded_name(&name) {
        log.verbose(2, format!("Skipping tool: {name}"));
        return None;
    }

    let install_dir = app.get_str("installdir").unwrap_or_default();
    if !is_plain_dir_name(install_dir) {
        log.verbose(
            2,
            format!("Skipping {name}: invalid install directory '{install_dir}'"),
        );
        return None;
    }

    let steamapps = library.join(STEAMAPPS_DIR);
    let size_on_disk = app
        .get_str("SizeOnDisk")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Some(Game {
        has_compatdata: steamapps.join("compatdata").join(&app_id).exists(),
        has_shadercache: steamapps.join("shadercache").join(&app_id).exists(),
        playtime_minutes: playtime.get(&app_id).copied().unwrap_or(0),
        install_dir: install_dir.to_string(),
        library: Arc::clone(library),
        app_id,
        name,
        size_on_disk,
    })
}
