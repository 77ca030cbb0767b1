use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::retry::RetryPolicy;

const APP_DIR_NAME: &str = "LauncherSync";
const SETTINGS_FILE: &str = "sync_settings.json";

/// Everything a sync session needs, persisted as pretty JSON.
///
/// Relative directory fields are resolved against `install_root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub install_root: PathBuf,
    pub manifest_url: String,
    /// Files are fetched from `<files_base_url>/<manifest path>`.
    pub files_base_url: String,
    pub client_id: String,
    pub version: String,
    pub download_concurrency: usize,
    /// Paths kept by cleanup even when the manifest drops them.
    pub pinned_paths: Vec<String>,
    pub extra_ignore_prefixes: Vec<String>,
    /// Directories swept by cleanup. Empty sweeps the whole installation.
    pub cleanup_roots: Vec<PathBuf>,
    pub launch_profile_path: Option<PathBuf>,
    pub launch_profile_url: Option<String>,
    pub libraries_dir: PathBuf,
    pub natives_dir: PathBuf,
    pub retry: RetryPolicy,
    pub stall_timeout_secs: Option<u64>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            install_root: default_data_dir().join("game"),
            manifest_url: String::new(),
            files_base_url: String::new(),
            client_id: String::new(),
            version: String::new(),
            download_concurrency: default_concurrency(),
            pinned_paths: Vec::new(),
            extra_ignore_prefixes: Vec::new(),
            cleanup_roots: Vec::new(),
            launch_profile_path: None,
            launch_profile_url: None,
            libraries_dir: PathBuf::from("libraries"),
            natives_dir: PathBuf::from("natives"),
            retry: RetryPolicy::default(),
            stall_timeout_secs: None,
        }
    }
}

impl SyncSettings {
    /// `<data dir>/LauncherSync/sync_settings.json`.
    pub fn default_path() -> PathBuf {
        default_data_dir().join(SETTINGS_FILE)
    }

    pub fn load() -> LauncherResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Missing file: defaults. Unreadable or malformed file: error.
    pub fn load_from(path: &Path) -> LauncherResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(LauncherError::io(path, e)),
        };

        let settings: SyncSettings = serde_json::from_str(&raw)
            .map_err(|e| LauncherError::InvalidSettings(format!("{}: {}", path.display(), e)))?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save(&self) -> LauncherResult<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> LauncherResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| LauncherError::io(path, e))
    }

    /// Check the fields a network-backed session cannot run without.
    pub fn validate(&self) -> LauncherResult<()> {
        let required = [
            ("manifest_url", &self.manifest_url),
            ("files_base_url", &self.files_base_url),
            ("client_id", &self.client_id),
            ("version", &self.version),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(LauncherError::InvalidSettings(format!("{} is not set", name)));
            }
        }
        if self.download_concurrency == 0 {
            return Err(LauncherError::InvalidSettings(
                "download_concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn libraries_path(&self) -> PathBuf {
        self.resolve(&self.libraries_dir)
    }

    pub fn natives_path(&self) -> PathBuf {
        self.resolve(&self.natives_dir)
    }

    pub fn launch_profile_file(&self) -> Option<PathBuf> {
        self.launch_profile_path.as_deref().map(|p| self.resolve(p))
    }

    pub fn cleanup_root_paths(&self) -> Vec<PathBuf> {
        if self.cleanup_roots.is_empty() {
            return vec![self.install_root.clone()];
        }
        self.cleanup_roots.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.install_root.join(path)
        }
    }
}

/// Available parallelism clamped to a sane download pool size.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .clamp(2, 16)
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
