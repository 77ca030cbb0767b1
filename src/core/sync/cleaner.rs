// ─── Orphan Cleaner ───
// Deletes files the manifest no longer knows about, except protected ones.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::manifest::model::{normalize_relative, relative_to};

use super::planner::KeepSet;

/// Directories whose content belongs to the player, never to the manifest.
pub const DEFAULT_IGNORE_PREFIXES: &[&str] = &[
    "saves",
    "resourcepacks",
    "shaderpacks",
    "screenshots",
    "logs",
    "crash-reports",
    "config",
];

/// Hand-edited files the manifest doesn't track. Kept narrow on purpose:
/// anything with this extension survives cleanup wherever it lives.
pub const USER_DATA_EXTENSION: &str = "txt";

#[derive(Debug, Clone, Serialize)]
pub struct SweepError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub deleted_count: usize,
    pub kept_count: usize,
    pub errors: Vec<SweepError>,
}

pub struct OrphanCleaner {
    install_root: PathBuf,
    ignore_prefixes: Vec<String>,
}

impl OrphanCleaner {
    /// Cleaner with the default ignore set plus `extra_ignore_prefixes`.
    pub fn new<I, S>(install_root: impl Into<PathBuf>, extra_ignore_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ignore_prefixes: Vec<String> = DEFAULT_IGNORE_PREFIXES
            .iter()
            .map(|p| p.to_string())
            .collect();
        ignore_prefixes.extend(
            extra_ignore_prefixes
                .into_iter()
                .map(|p| normalize_relative(p.as_ref()))
                .filter(|p| !p.is_empty()),
        );

        Self {
            install_root: install_root.into(),
            ignore_prefixes,
        }
    }

    /// Walk every root (absolute, or relative to the installation root) and
    /// delete regular files that are neither kept nor protected.
    /// Directories are never removed. A failed deletion is recorded and the
    /// sweep moves on.
    pub fn sweep(&self, roots: &[PathBuf], keep_set: &KeepSet) -> SweepReport {
        let mut report = SweepReport::default();

        for root in roots {
            let root = if root.is_absolute() {
                root.clone()
            } else {
                self.install_root.join(root)
            };

            if !root.is_dir() {
                debug!("Cleanup root missing, skipping: {:?}", root);
                continue;
            }

            self.sweep_root(&root, keep_set, &mut report);
        }

        info!(
            "Cleanup finished: {} deleted, {} kept, {} errors",
            report.deleted_count,
            report.kept_count,
            report.errors.len()
        );
        report
    }

    fn sweep_root(&self, root: &Path, keep_set: &KeepSet, report: &mut SweepReport) {
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    warn!("Cannot walk {:?}: {}", path, e);
                    report.errors.push(SweepError {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(relative) = relative_to(&self.install_root, path) else {
                // Roots outside the installation can't be matched against
                // the keep-set; leave them alone.
                report.kept_count += 1;
                continue;
            };

            if self.is_protected(&relative, keep_set) {
                report.kept_count += 1;
                continue;
            }

            match std::fs::remove_file(path) {
                Ok(()) => {
                    debug!("Deleted orphan: {}", relative);
                    report.deleted_count += 1;
                }
                Err(e) => {
                    warn!("Cannot delete orphan {:?}: {}", path, e);
                    report.errors.push(SweepError {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    fn is_protected(&self, relative: &str, keep_set: &KeepSet) -> bool {
        keep_set.contains(relative)
            || self
                .ignore_prefixes
                .iter()
                .any(|prefix| has_path_prefix(relative, prefix))
            || is_user_data(relative)
    }
}

/// Plain string prefix on the normalized relative path, so `saves` also
/// covers `saves/...` and `savesbackup/...`.
fn has_path_prefix(relative: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    !prefix.is_empty() && relative.starts_with(prefix)
}

fn is_user_data(relative: &str) -> bool {
    Path::new(relative)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(USER_DATA_EXTENSION))
}
