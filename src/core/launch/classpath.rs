// ─── Classpath Builder ───
// Joins the selected library artifacts into a classpath string.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::rules::Platform;

use super::resolver::ResolvedLibrary;

/// Classpath for `libraries` in manifest order, followed by `extra_entries`
/// (typically the client jar). Libraries without a main artifact (natives
/// only) contribute nothing.
pub fn build_classpath(
    libraries: &[ResolvedLibrary],
    libraries_dir: &Path,
    extra_entries: &[PathBuf],
    platform: Platform,
) -> String {
    let mut entries: Vec<String> = libraries
        .iter()
        .filter_map(|lib| lib.artifact.as_ref())
        .map(|artifact| path_str(&libraries_dir.join(&artifact.relative_path)))
        .collect();

    entries.extend(extra_entries.iter().map(|p| path_str(p)));
    entries.retain(|entry| !entry.trim().is_empty());
    dedup_preserving_order(&mut entries, platform);

    debug!("Classpath has {} entries", entries.len());
    entries.join(platform.classpath_separator())
}

/// Path as a launch-argument string. Windows extended-length prefixes
/// (`\\?\`) break Java classpath handling and are stripped.
pub fn path_str(path: &Path) -> String {
    let text = path.to_string_lossy().to_string();
    match text.strip_prefix(r"\\?\") {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

fn dedup_preserving_order(entries: &mut Vec<String>, platform: Platform) {
    let mut seen = HashSet::new();
    entries.retain(|entry| {
        let key = if platform == Platform::Windows {
            entry.to_lowercase()
        } else {
            entry.clone()
        };
        seen.insert(key)
    });
}
