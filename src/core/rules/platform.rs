use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Normalized OS identity used for rule matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Osx,
    Linux,
    Unknown,
}

static CURRENT: OnceLock<Platform> = OnceLock::new();

impl Platform {
    /// The platform this process runs on, derived once from the OS name.
    pub fn current() -> Platform {
        *CURRENT.get_or_init(|| Platform::from_os_name(std::env::consts::OS))
    }

    /// Map an OS-reported or manifest-authored name onto a platform.
    ///
    /// Matching is case-insensitive and by substring, so `"Windows 10"`,
    /// `"Mac OS X"` and `"linux"` all resolve.
    pub fn from_os_name(name: &str) -> Platform {
        let name = name.trim().to_lowercase();
        // "darwin" contains "win", so the macOS check goes first.
        if name.contains("mac") || name.contains("osx") || name.contains("darwin") {
            Platform::Osx
        } else if name.contains("win") {
            Platform::Windows
        } else if name.contains("linux") || name.contains("nux") || name.contains("nix") {
            Platform::Linux
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Osx => "osx",
            Platform::Linux => "linux",
            Platform::Unknown => "unknown",
        }
    }

    /// Java classpath separator for this platform.
    pub fn classpath_separator(&self) -> &'static str {
        match self {
            Platform::Windows => ";",
            _ => ":",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
