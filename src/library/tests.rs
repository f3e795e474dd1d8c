use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::*;

fn make_root(dir: &Path) -> PathBuf {
    fs::create_dir_all(dir.join(STEAMAPPS_DIR)).unwrap();
    dir.to_path_buf()
}

fn write_library_folders(root: &Path, paths: &[PathBuf]) {
    let mut text = String::from("\"libraryfolders\"\n{\n");
    for (i, path) in paths.iter().enumerate() {
        text.push_str(&format!(
            "\t\"{i}\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t\t\"label\"\t\t\"\"\n\t}}\n",
            path.display()
        ));
    }
    text.push_str("}\n");
    fs::write(root.join(STEAMAPPS_DIR).join("libraryfolders.vdf"), text).unwrap();
}

#[test]
fn test_candidate_roots_order() {
    let home = Path::new("/home/gamer");
    assert_eq!(
        candidate_roots(home),
        vec![
            PathBuf::from("/home/gamer/.local/share/Steam"),
            PathBuf::from("/home/gamer/.steam/steam"),
            PathBuf::from("/home/gamer/.steam/debian-installation"),
        ]
    );
}

#[test]
fn test_locate_root_in_prefers_first_candidate() {
    let home = TempDir::new().unwrap();
    make_root(&home.path().join(".steam/steam"));
    make_root(&home.path().join(".local/share/Steam"));

    assert_eq!(
        locate_root_in(home.path()),
        Some(home.path().join(".local/share/Steam"))
    );
}

#[test]
fn test_locate_root_in_requires_steamapps() {
    let home = TempDir::new().unwrap();
    // Exists, but lacks the steamapps marker
    fs::create_dir_all(home.path().join(".local/share/Steam")).unwrap();
    make_root(&home.path().join(".steam/debian-installation"));

    assert_eq!(
        locate_root_in(home.path()),
        Some(home.path().join(".steam/debian-installation"))
    );
}

#[test]
fn test_locate_root_in_not_found() {
    let home = TempDir::new().unwrap();
    assert_eq!(locate_root_in(home.path()), None);
}

#[test]
fn test_library_roots_without_descriptor() {
    let tmp = TempDir::new().unwrap();
    let root = make_root(&tmp.path().join("Steam"));

    assert_eq!(list_library_roots(&root, &Logger::silent()), vec![root]);
}

#[test]
fn test_library_roots_inserts_root_first_and_skips_missing() {
    let tmp = TempDir::new().unwrap();
    let root = make_root(&tmp.path().join("Steam"));
    let extra = make_root(&tmp.path().join("SteamLibrary"));
    let missing = tmp.path().join("Unplugged");

    write_library_folders(&root, &[extra.clone(), missing, extra.clone()]);

    assert_eq!(
        list_library_roots(&root, &Logger::silent()),
        vec![root, extra]
    );
}

#[test]
fn test_library_roots_keeps_descriptor_order_when_root_listed() {
    let tmp = TempDir::new().unwrap();
    let root = make_root(&tmp.path().join("Steam"));
    let extra = make_root(&tmp.path().join("SteamLibrary"));

    write_library_folders(&root, &[extra.clone(), root.clone()]);

    assert_eq!(
        list_library_roots(&root, &Logger::silent()),
        vec![extra, root]
    );
}

#[test]
fn test_library_roots_with_malformed_descriptor() {
    let tmp = TempDir::new().unwrap();
    let root = make_root(&tmp.path().join("Steam"));
    fs::write(
        root.join(STEAMAPPS_DIR).join("libraryfolders.vdf"),
        "}}} \"libraryfolders\" { \"0\" \"not a section\" ",
    )
    .unwrap();

    assert_eq!(list_library_roots(&root, &Logger::silent()), vec![root]);
}

#[test]
fn test_steam_process_names() {
    assert!(is_steam_process_name("steam"));
    assert!(is_steam_process_name("Steam.exe"));
    assert!(!is_steam_process_name("steamwebhelper"));
    assert!(!is_steam_process_name("bash"));
}

#[test]
fn test_is_steam_running_does_not_panic() {
    let _ = is_steam_running();
}
