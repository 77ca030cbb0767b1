// ─── File Manifest ───
// Wire model for the remote file list and local path resolution.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{LauncherError, LauncherResult};

/// One remote file. Identity is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "filename")]
    pub path: String,
    #[serde(rename = "hash")]
    pub content_hash: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    /// Virtual prefix stripped from `path` to get the local relative path.
    #[serde(rename = "replaceMask", default)]
    pub replace_mask: String,
}

impl ManifestEntry {
    pub fn new(path: &str, content_hash: &str, size_bytes: u64) -> Self {
        Self {
            path: path.to_string(),
            content_hash: content_hash.to_string(),
            size_bytes,
            replace_mask: String::new(),
        }
    }

    /// Local path relative to the installation root, `/`-separated.
    pub fn relative_path(&self) -> String {
        let stripped = if self.replace_mask.is_empty() {
            self.path.clone()
        } else {
            self.path.replace(&self.replace_mask, "")
        };
        normalize_relative(&stripped)
    }

    pub fn local_path(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path())
    }
}

/// Collapse `\` to `/`, drop empty and `.` segments.
pub fn normalize_relative(raw: &str) -> String {
    raw.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative path of `path` under `root` in manifest form, if it is inside it.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// The full remote file list for one client, version and platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileManifest {
    pub entries: Vec<ManifestEntry>,
}

impl FileManifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(raw: &str) -> LauncherResult<Self> {
        let manifest: FileManifest = serde_json::from_str(raw)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saturates instead of overflowing; `validate` rejects such manifests.
    pub fn total_bytes(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.size_bytes))
    }

    /// Reject manifests that would corrupt a sync cycle: duplicate remote or
    /// local paths, local paths that escape the installation root, and sizes
    /// whose sum does not fit in a `u64`.
    pub fn validate(&self) -> LauncherResult<()> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        let mut seen_local = HashSet::with_capacity(self.entries.len());
        let mut total: u64 = 0;

        for entry in &self.entries {
            if !seen.insert(entry.path.as_str()) {
                return Err(LauncherError::InvalidManifest(format!(
                    "duplicate path {}",
                    entry.path
                )));
            }

            total = total.checked_add(entry.size_bytes).ok_or_else(|| {
                LauncherError::InvalidManifest(format!(
                    "total size overflows at {}",
                    entry.path
                ))
            })?;

            let raw = if entry.replace_mask.is_empty() {
                entry.path.clone()
            } else {
                entry.path.replace(&entry.replace_mask, "")
            };
            let raw = raw.replace('\\', "/");

            if raw.starts_with('/') || Path::new(&raw).is_absolute() || has_drive_prefix(&raw) {
                return Err(LauncherError::InvalidManifest(format!(
                    "absolute path {}",
                    entry.path
                )));
            }
            if raw.split('/').any(|segment| segment == "..") {
                return Err(LauncherError::InvalidManifest(format!(
                    "path escapes installation root: {}",
                    entry.path
                )));
            }
            let local = entry.relative_path();
            if local.is_empty() {
                return Err(LauncherError::InvalidManifest(format!(
                    "empty local path for {:?}",
                    entry.path
                )));
            }
            if !seen_local.insert(local) {
                return Err(LauncherError::InvalidManifest(format!(
                    "{} maps to a local path already claimed by another entry",
                    entry.path
                )));
            }
        }

        Ok(())
    }
}

fn has_drive_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_wire_entries() {
        let manifest = FileManifest::from_json_str(
            r#"[
                {"filename": "mods/a.jar", "hash": "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d", "size": 100, "replaceMask": ""},
                {"filename": "files/client/config/b.cfg", "hash": "5d41402abc4b2a76b9719d911017c592", "size": 5, "replaceMask": "files/client/"}
            ]"#,
        )
        .unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.entries[0].relative_path(), "mods/a.jar");
        assert_eq!(manifest.entries[1].relative_path(), "config/b.cfg");
        assert_eq!(manifest.total_bytes(), 105);
    }

    #[test]
    fn replace_mask_is_optional() {
        let manifest =
            FileManifest::from_json_str(r#"[{"filename": "a.txt", "hash": "x", "size": 1}]"#)
                .unwrap();
        assert_eq!(manifest.entries[0].replace_mask, "");
    }

    #[test]
    fn local_path_joins_root() {
        let entry = ManifestEntry::new("mods\\a.jar", "h", 1);
        assert_eq!(
            entry.local_path(Path::new("/games/pack")),
            Path::new("/games/pack").join("mods/a.jar")
        );
    }

    #[test]
    fn rejects_duplicate_paths() {
        let manifest = FileManifest::new(vec![
            ManifestEntry::new("mods/a.jar", "h", 1),
            ManifestEntry::new("mods/a.jar", "h", 1),
        ]);
        assert!(matches!(
            manifest.validate(),
            Err(LauncherError::InvalidManifest(_))
        ));
    }

    #[test]
    fn rejects_entries_sharing_a_local_path() {
        let manifest = FileManifest::new(vec![
            ManifestEntry::new("mods/a.jar", "aaaa", 1),
            ManifestEntry::new("mods\\a.jar", "bbbb", 1),
        ]);
        assert!(matches!(
            manifest.validate(),
            Err(LauncherError::InvalidManifest(_))
        ));

        let mut masked = ManifestEntry::new("files/client/mods/a.jar", "bbbb", 1);
        masked.replace_mask = "files/client/".into();
        let manifest = FileManifest::new(vec![ManifestEntry::new("mods/a.jar", "aaaa", 1), masked]);
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn rejects_sizes_that_overflow_the_total() {
        let err = FileManifest::from_json_str(
            r#"[
                {"filename": "a.bin", "hash": "x", "size": 18446744073709551615},
                {"filename": "b.bin", "hash": "y", "size": 1}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, LauncherError::InvalidManifest(_)));

        let unchecked = FileManifest::new(vec![
            ManifestEntry::new("a.bin", "x", u64::MAX),
            ManifestEntry::new("b.bin", "y", 1),
        ]);
        assert_eq!(unchecked.total_bytes(), u64::MAX);
    }

    #[test]
    fn rejects_escaping_paths() {
        for bad in ["../evil.jar", "mods/../../evil.jar", "/etc/passwd", "C:/x.jar"] {
            let manifest = FileManifest::new(vec![ManifestEntry::new(bad, "h", 1)]);
            assert!(manifest.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn rejects_entry_fully_masked() {
        let mut entry = ManifestEntry::new("prefix/", "h", 1);
        entry.replace_mask = "prefix/".into();
        assert!(FileManifest::new(vec![entry]).validate().is_err());
    }

    #[test]
    fn relative_to_uses_forward_slashes() {
        let root = Path::new("/games/pack");
        let file = root.join("saves").join("world1").join("level.dat");
        assert_eq!(relative_to(root, &file).as_deref(), Some("saves/world1/level.dat"));
        assert_eq!(relative_to(root, Path::new("/elsewhere/a")), None);
    }
}
