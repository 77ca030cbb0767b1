// ─── Sync Planner ───
// Diffs the remote manifest against the installation root.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::integrity;
use crate::core::manifest::model::normalize_relative;
use crate::core::manifest::{FileManifest, ManifestEntry};

/// Local relative paths (`/`-separated) that must survive cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeepSet {
    paths: HashSet<String>,
}

impl KeepSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, relative: &str) {
        let normalized = normalize_relative(relative);
        if !normalized.is_empty() {
            self.paths.insert(normalized);
        }
    }

    pub fn contains(&self, relative: &str) -> bool {
        self.paths.contains(&normalize_relative(relative))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeepSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = KeepSet::new();
        for path in iter {
            set.insert(path.as_ref());
        }
        set
    }
}

/// Output of one planning pass. Consumed once per sync cycle.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub to_fetch: Vec<ManifestEntry>,
    pub total_bytes: u64,
    pub keep_set: KeepSet,
    /// Installation root the plan was computed against.
    pub root: PathBuf,
}

impl SyncPlan {
    pub fn is_noop(&self) -> bool {
        self.to_fetch.is_empty()
    }
}

pub struct SyncPlanner {
    root: PathBuf,
    pinned: Vec<String>,
}

impl SyncPlanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pinned: Vec::new(),
        }
    }

    /// Paths that are kept even when the manifest no longer lists them.
    pub fn with_pinned<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pinned.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Compute the fetch set and keep-set for `manifest`.
    ///
    /// With `force_full`, every entry is fetched regardless of local state.
    /// Otherwise only entries whose local file fails size+hash validation
    /// are fetched; an empty fetch set is a normal outcome.
    pub fn plan(&self, manifest: &FileManifest, force_full: bool) -> LauncherResult<SyncPlan> {
        manifest.validate()?;

        let mut keep_set: KeepSet = self.pinned.iter().collect();
        let mut to_fetch = Vec::new();
        let mut total_bytes = 0u64;

        for entry in &manifest.entries {
            keep_set.insert(&entry.relative_path());

            if !force_full {
                let local = entry.local_path(&self.root);
                if integrity::is_valid(&local, &entry.content_hash, entry.size_bytes) {
                    continue;
                }
                debug!("Needs fetch: {}", entry.relative_path());
            }

            total_bytes = total_bytes.checked_add(entry.size_bytes).ok_or_else(|| {
                LauncherError::InvalidManifest(format!(
                    "fetch size overflows at {}",
                    entry.path
                ))
            })?;
            to_fetch.push(entry.clone());
        }

        info!(
            "Sync plan: {} of {} files to fetch ({} bytes), {} paths kept{}",
            to_fetch.len(),
            manifest.len(),
            total_bytes,
            keep_set.len(),
            if force_full { " [full resync]" } else { "" }
        );

        Ok(SyncPlan {
            to_fetch,
            total_bytes,
            keep_set,
            root: self.root.clone(),
        })
    }
}
