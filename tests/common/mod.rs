#![allow(dead_code)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::{env, fs};

use assert_fs::TempDir;

/// Global mutex to ensure only one test manipulates HOME at a time.
static HOME_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// RAII guard that redirects HOME to a temporary directory.
///
/// While the guard is alive, Steam discovery resolves against the sandbox, so
/// tests can never see (or delete from) the developer's real Steam library.
pub struct TempHomeGuard {
    _lock: MutexGuard<'static, ()>,
    temp_home: TempDir,
    prev_home: Option<OsString>,
}

impl TempHomeGuard {
    /// Create a new guard with a fresh temporary home directory.
    pub fn new() -> Self {
        // A failed test holding the lock must not cascade into the others
        let lock = HOME_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let temp_home = TempDir::new().expect("failed to create temporary HOME");
        let prev_home = env::var_os("HOME");

        // SAFETY: we hold HOME_MUTEX, ensuring no other thread mutates the
        // environment while we redirect HOME for the test.
        unsafe {
            env::set_var("HOME", temp_home.path());
        }

        Self {
            _lock: lock,
            temp_home,
            prev_home,
        }
    }

    /// Path to the temporary HOME directory.
    pub fn home(&self) -> &Path {
        self.temp_home.path()
    }

    /// Create a Steam installation at the default `~/.local/share/Steam`.
    pub fn steam(&self) -> SteamFixture {
        SteamFixture::at(self.home().join(".local/share/Steam"))
    }
}

impl Drop for TempHomeGuard {
    fn drop(&mut self) {
        // SAFETY: guarded by HOME_MUTEX; we restore the environment to its
        // previous state before releasing the lock.
        unsafe {
            if let Some(prev) = self.prev_home.as_ref() {
                env::set_var("HOME", prev);
            } else {
                env::remove_var("HOME");
            }
        }
    }
}

/// A Steam root laid out on disk for tests.
pub struct SteamFixture {
    root: PathBuf,
}

impl SteamFixture {
    /// Create the root (with an empty `steamapps`) at `root`.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        fs::create_dir_all(root.join("steamapps")).expect("failed to create steamapps");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn steamapps(&self) -> PathBuf {
        self.root.join("steamapps")
    }

    /// Install a game into this root's own library.
    pub fn install(&self, app_id: &str, name: &str, size_on_disk: u64) -> GameFixture {
        install_into(&self.root, app_id, name, size_on_disk)
    }

    /// Register extra library folders in `libraryfolders.vdf`. The folders
    /// themselves are not created.
    pub fn add_libraries(&self, libraries: &[&Path]) {
        let mut text = String::from("\"libraryfolders\"\n{\n");
        text.push_str(&format!("\t\"0\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t}}\n", self.root.display()));
        for (i, library) in libraries.iter().enumerate() {
            text.push_str(&format!(
                "\t\"{}\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t\t\"label\"\t\t\"\"\n\t}}\n",
                i + 1,
                library.display()
            ));
        }
        text.push_str("}\n");
        fs::write(self.steamapps().join("libraryfolders.vdf"), text)
            .expect("failed to write libraryfolders.vdf");
    }

    /// Record playtime (minutes) for `user` in `localconfig.vdf`.
    pub fn set_playtime(&self, user: &str, apps: &[(&str, u64)]) {
        let config = self.root.join("userdata").join(user).join("config");
        fs::create_dir_all(&config).expect("failed to create userdata");
        let mut text = String::from(
            "\"UserLocalConfigStore\"\n{\n\t\"Software\"\n\t{\n\t\t\"Valve\"\n\t\t{\n\t\t\t\
             \"Steam\"\n\t\t\t{\n\t\t\t\t\"apps\"\n\t\t\t\t{\n",
        );
        for (app_id, minutes) in apps {
            text.push_str(&format!(
                "\t\t\t\t\t\"{app_id}\"\n\t\t\t\t\t{{\n\t\t\t\t\t\t\"Playtime\"\t\t\"{minutes}\"\n\t\t\t\t\t}}\n"
            ));
        }
        text.push_str("\t\t\t\t}\n\t\t\t}\n\t\t}\n\t}\n}\n");
        fs::write(config.join("localconfig.vdf"), text).expect("failed to write localconfig.vdf");
    }
}

/// Install a game into the library at `library`.
pub fn install_into(library: &Path, app_id: &str, name: &str, size_on_disk: u64) -> GameFixture {
    let steamapps = library.join("steamapps");
    fs::create_dir_all(steamapps.join("common").join(name)).expect("failed to create game dir");
    fs::write(
        steamapps.join(format!("appmanifest_{app_id}.acf")),
        format!(
            "\"AppState\"\n{{\n\t\"appid\"\t\t\"{app_id}\"\n\t\"Universe\"\t\t\"1\"\n\t\
             \"name\"\t\t\"{name}\"\n\t\"StateFlags\"\t\t\"4\"\n\t\"installdir\"\t\t\"{name}\"\n\t\
             \"SizeOnDisk\"\t\t\"{size_on_disk}\"\n}}\n"
        ),
    )
    .expect("failed to write manifest");

    GameFixture {
        steamapps,
        app_id: app_id.to_string(),
        name: name.to_string(),
    }
}

/// Paths of one installed game fixture.
pub struct GameFixture {
    steamapps: PathBuf,
    app_id: String,
    name: String,
}

impl GameFixture {
    pub fn manifest(&self) -> PathBuf {
        self.steamapps
            .join(format!("appmanifest_{}.acf", self.app_id))
    }

    pub fn game_dir(&self) -> PathBuf {
        self.steamapps.join("common").join(&self.name)
    }

    pub fn compatdata(&self) -> PathBuf {
        self.steamapps.join("compatdata").join(&self.app_id)
    }

    pub fn shadercache(&self) -> PathBuf {
        self.steamapps.join("shadercache").join(&self.app_id)
    }

    /// Write `bytes` of game data.
    pub fn with_files(self, bytes: usize) -> Self {
        write_blob(&self.game_dir().join("data.pak"), bytes);
        self
    }

    /// Create a Proton prefix holding `bytes` of data.
    pub fn with_proton(self, bytes: usize) -> Self {
        write_blob(&self.compatdata().join("pfx/drive_c/save.dat"), bytes);
        self
    }

    /// Create a shader cache holding `bytes` of data.
    pub fn with_shadercache(self, bytes: usize) -> Self {
        write_blob(&self.shadercache().join("fozpipelinesv6/steam_pipeline_cache.foz"), bytes);
        self
    }
}

fn write_blob(path: &Path, bytes: usize) {
    let parent = path.parent().expect("blob path has a parent");
    fs::create_dir_all(parent).expect("failed to create blob dir");
    fs::write(path, vec![0u8; bytes]).expect("failed to write blob");
}
