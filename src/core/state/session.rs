// ─── Sync Session ───
// Caller-facing API: one installation, one sync cycle at a time.
//
// A cycle is manifest fetch -> plan -> download. Cleanup is a separate
// call that consumes the keep-set of the last finished cycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::core::downloader::{
    CancelHandle, ContentSource, DownloadObserver, DownloadOrchestrator, DownloadReport,
    HttpSource, JobFailure, JobState,
};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;
use crate::core::launch::{cleanup_natives, extract_natives, LaunchResolver, ResolvedLaunch};
use crate::core::manifest::model::relative_to;
use crate::core::manifest::{LaunchProfile, ManifestClient, ManifestEntry, ManifestSource};
use crate::core::retry::retry_with_backoff;
use crate::core::rules::Platform;
use crate::core::sync::{KeepSet, OrphanCleaner, SweepReport, SyncPlan, SyncPlanner};

use super::settings::SyncSettings;

/// Events of one sync cycle, in the order a caller sees them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    Planned {
        cycle_id: String,
        files: usize,
        total_bytes: u64,
        kept_paths: usize,
    },
    Progress {
        transferred: u64,
        total: u64,
    },
    FileDone {
        path: String,
    },
    Complete(CycleSummary),
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub cycle_id: String,
    pub fetched: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub transferred_bytes: u64,
    pub total_bytes: u64,
    pub failures: Vec<JobFailure>,
    pub duration_ms: i64,
}

impl CycleSummary {
    fn from_report(cycle_id: &str, report: &DownloadReport) -> Self {
        Self {
            cycle_id: cycle_id.to_string(),
            fetched: report.count(JobState::Done),
            failed: report.count(JobState::Failed),
            cancelled: report.count(JobState::Cancelled),
            transferred_bytes: report.transferred_bytes,
            total_bytes: report.total_bytes,
            failures: report.failures(),
            duration_ms: (report.finished_at - report.started_at).num_milliseconds(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }
}

/// Live view of a running cycle.
pub struct SyncStream {
    cycle_id: String,
    events: mpsc::UnboundedReceiver<SyncEvent>,
    cancel: CancelHandle,
}

impl SyncStream {
    pub fn cycle_id(&self) -> &str {
        &self.cycle_id
    }

    /// Next event, or `None` once the cycle has finished and every event
    /// was delivered.
    pub async fn next(&mut self) -> Option<SyncEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Drain the stream and return the final summary.
    pub async fn finish(mut self) -> LauncherResult<CycleSummary> {
        while let Some(event) = self.next().await {
            if let SyncEvent::Complete(summary) = event {
                return Ok(summary);
            }
        }
        Err(LauncherError::Other(format!(
            "sync cycle {} ended without completing",
            self.cycle_id
        )))
    }
}

/// Forwards orchestrator callbacks into the event channel.
struct ChannelObserver {
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl DownloadObserver for ChannelObserver {
    fn on_progress(&self, transferred: u64, total: u64) {
        let _ = self.tx.send(SyncEvent::Progress { transferred, total });
    }

    fn on_file_done(&self, entry: &ManifestEntry) {
        let _ = self.tx.send(SyncEvent::FileDone {
            path: entry.relative_path(),
        });
    }
}

/// Holds the session's busy flag; released on drop.
struct CycleGuard {
    active: Arc<AtomicBool>,
}

impl CycleGuard {
    fn acquire(active: &Arc<AtomicBool>) -> LauncherResult<Self> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LauncherError::SyncInProgress)?;
        Ok(Self {
            active: Arc::clone(active),
        })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

pub struct SyncSession {
    settings: SyncSettings,
    platform: Platform,
    manifests: Arc<dyn ManifestSource>,
    content: Arc<dyn ContentSource>,
    profile_client: Option<Arc<ManifestClient>>,
    active: Arc<AtomicBool>,
    last_keep_set: Arc<Mutex<Option<KeepSet>>>,
}

impl SyncSession {
    /// Session backed by the HTTP endpoints named in `settings`.
    pub fn from_settings(settings: SyncSettings) -> LauncherResult<Self> {
        settings.validate()?;

        let http = build_http_client()?;
        let manifests = Arc::new(ManifestClient::new(http.clone(), &settings.manifest_url)?);
        let content = Arc::new(HttpSource::new(http, &settings.files_base_url)?);

        let mut session = Self::with_sources(settings, manifests.clone(), content);
        session.profile_client = Some(manifests);
        Ok(session)
    }

    pub fn with_sources(
        settings: SyncSettings,
        manifests: Arc<dyn ManifestSource>,
        content: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            settings,
            platform: Platform::current(),
            manifests,
            content,
            profile_client: None,
            active: Arc::new(AtomicBool::new(false)),
            last_keep_set: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Fetch the manifest, plan, and start downloading in the background.
    ///
    /// Manifest and planning failures are returned here and abort the
    /// cycle. Per-file failures arrive in the final `Complete` event.
    /// `concurrency` overrides the configured pool size.
    pub async fn plan_and_sync(
        &self,
        force_full: bool,
        concurrency: Option<usize>,
    ) -> LauncherResult<SyncStream> {
        let guard = CycleGuard::acquire(&self.active)?;
        let cycle_id = Uuid::new_v4().to_string();
        let span = info_span!("sync_cycle", cycle_id = %cycle_id);

        let plan = self
            .prepare_plan(force_full)
            .instrument(span.clone())
            .await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(SyncEvent::Planned {
            cycle_id: cycle_id.clone(),
            files: plan.to_fetch.len(),
            total_bytes: plan.total_bytes,
            kept_paths: plan.keep_set.len(),
        });

        let orchestrator = DownloadOrchestrator::new(Arc::clone(&self.content))
            .with_concurrency(concurrency.unwrap_or(self.settings.download_concurrency))
            .with_stall_timeout(self.settings.stall_timeout());
        let observer = Arc::new(ChannelObserver { tx: tx.clone() });
        let cancel = CancelHandle::new();
        let run_cancel = cancel.clone();
        let last_keep_set = Arc::clone(&self.last_keep_set);
        let task_cycle_id = cycle_id.clone();

        tokio::spawn(
            async move {
                let SyncPlan {
                    to_fetch,
                    keep_set,
                    root,
                    ..
                } = plan;

                let report = orchestrator.run(to_fetch, root, observer, run_cancel).await;
                let summary = CycleSummary::from_report(&task_cycle_id, &report);

                *last_keep_set.lock().await = Some(keep_set);
                drop(guard);

                if summary.is_success() {
                    info!("Sync cycle complete: {} files fetched", summary.fetched);
                } else {
                    warn!(
                        "Sync cycle finished with {} failed and {} cancelled files",
                        summary.failed, summary.cancelled
                    );
                }
                let _ = tx.send(SyncEvent::Complete(summary));
            }
            .instrument(span),
        );

        Ok(SyncStream {
            cycle_id,
            events: rx,
            cancel,
        })
    }

    async fn prepare_plan(&self, force_full: bool) -> LauncherResult<SyncPlan> {
        let settings = &self.settings;
        info!(
            "Starting sync cycle for {} {} on {}{}",
            settings.client_id,
            settings.version,
            self.platform,
            if force_full { " (full resync)" } else { "" }
        );

        let manifest = retry_with_backoff(&settings.retry, "manifest fetch", || {
            self.manifests
                .fetch_manifest(&settings.client_id, &settings.version, self.platform)
        })
        .await?;

        let planner = SyncPlanner::new(&settings.install_root)
            .with_pinned(settings.pinned_paths.iter().cloned());

        // Hashing the installation is blocking disk work.
        tokio::task::spawn_blocking(move || planner.plan(&manifest, force_full))
            .await
            .map_err(|e| LauncherError::Other(format!("Planning task join error: {}", e)))?
    }

    /// Delete orphans left behind by the last finished cycle.
    ///
    /// The library and natives directories are always protected when they
    /// live inside the installation, since launch resolution manages them.
    pub async fn cleanup(&self, extra_ignore_prefixes: &[String]) -> LauncherResult<SweepReport> {
        let _guard = CycleGuard::acquire(&self.active)?;

        let install_root = self.settings.install_root.clone();
        if !install_root.is_dir() {
            return Err(LauncherError::io(
                &install_root,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "installation root is not a directory",
                ),
            ));
        }

        let keep_set = self
            .last_keep_set
            .lock()
            .await
            .take()
            .ok_or(LauncherError::NoCompletedCycle)?;

        let mut prefixes: Vec<String> = self.settings.extra_ignore_prefixes.clone();
        prefixes.extend(extra_ignore_prefixes.iter().cloned());
        for managed in [self.settings.libraries_path(), self.settings.natives_path()] {
            if let Some(relative) = relative_to(&install_root, &managed) {
                prefixes.push(relative);
            }
        }

        let cleaner = OrphanCleaner::new(install_root, prefixes);
        let roots = self.settings.cleanup_root_paths();

        tokio::task::spawn_blocking(move || cleaner.sweep(&roots, &keep_set))
            .await
            .map_err(|e| LauncherError::Other(format!("Cleanup task join error: {}", e)))
    }

    /// Load the configured launch profile, from disk when a path is set,
    /// otherwise from `launch_profile_url`.
    pub async fn load_launch_profile(&self) -> LauncherResult<LaunchProfile> {
        if let Some(path) = self.settings.launch_profile_file() {
            return LaunchProfile::load(&path).await;
        }

        match (&self.settings.launch_profile_url, &self.profile_client) {
            (Some(url), Some(client)) => {
                retry_with_backoff(&self.settings.retry, "launch profile fetch", || {
                    client.fetch_launch_profile(url)
                })
                .await
            }
            (Some(_), None) => Err(LauncherError::InvalidSettings(
                "launch_profile_url needs an HTTP-backed session".into(),
            )),
            (None, _) => Err(LauncherError::InvalidSettings(
                "no launch profile configured".into(),
            )),
        }
    }

    /// Selected libraries, classpath and final argument string for this
    /// platform.
    pub async fn resolve_launch(
        &self,
        variables: &HashMap<String, String>,
    ) -> LauncherResult<ResolvedLaunch> {
        let profile = self.load_launch_profile().await?;
        let resolver = LaunchResolver::new(
            self.platform,
            self.settings.libraries_path(),
            self.settings.natives_path(),
        );
        Ok(resolver.resolve_profile(&profile, variables))
    }

    /// Unpack the native jars of a resolved launch into the natives
    /// directory.
    pub async fn prepare_natives(&self, launch: &ResolvedLaunch) -> LauncherResult<usize> {
        let started = Utc::now();
        let count = extract_natives(
            &launch.libraries,
            &self.settings.libraries_path(),
            &self.settings.natives_path(),
        )
        .await?;
        info!(
            "Prepared {} native files in {} ms",
            count,
            (Utc::now() - started).num_milliseconds()
        );
        Ok(count)
    }

    /// Drop the extracted natives once the game has exited.
    pub async fn release_natives(&self) {
        let natives = self.settings.natives_path();
        cleanup_natives(&natives).await;
        debug!("Released natives at {:?}", natives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::ChunkStream;
    use crate::core::integrity::{self, ContentHasher, HashAlgorithm};
    use crate::core::manifest::FileManifest;
    use crate::core::retry::RetryPolicy;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures_util::{stream, StreamExt};
    use std::path::Path;
    use std::sync::atomic::AtomicU32;
    use tempfile::tempdir;
    use tokio::sync::Notify;

    fn sha1_hex(data: &[u8]) -> String {
        let mut hasher = ContentHasher::new(HashAlgorithm::Sha1);
        hasher.update(data);
        hasher.finalize_hex()
    }

    struct StaticManifest {
        manifest: FileManifest,
        calls: AtomicU32,
        fail_first: u32,
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl StaticManifest {
        fn new(manifest: FileManifest) -> Self {
            Self {
                manifest,
                calls: AtomicU32::new(0),
                fail_first: 0,
                gate: None,
            }
        }
    }

    #[async_trait]
    impl ManifestSource for StaticManifest {
        async fn fetch_manifest(
            &self,
            _client_id: &str,
            _version: &str,
            _platform: Platform,
        ) -> LauncherResult<FileManifest> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            if call < self.fail_first {
                return Err(LauncherError::DownloadFailed {
                    url: "memory://manifest".into(),
                    status: 503,
                });
            }
            Ok(self.manifest.clone())
        }
    }

    struct MemorySource {
        files: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl ContentSource for MemorySource {
        async fn open(&self, entry: &ManifestEntry) -> LauncherResult<ChunkStream> {
            let data = self.files.get(&entry.path).cloned().ok_or_else(|| {
                LauncherError::DownloadFailed {
                    url: entry.path.clone(),
                    status: 404,
                }
            })?;
            let chunks: Vec<LauncherResult<Bytes>> = data
                .chunks(8)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();
            Ok(stream::iter(chunks).boxed())
        }
    }

    fn fixture() -> (FileManifest, MemorySource) {
        let a = b"mod a contents".to_vec();
        let b = b"library b, somewhat longer contents".to_vec();
        let manifest = FileManifest::new(vec![
            ManifestEntry::new("mods/a.jar", &sha1_hex(&a), a.len() as u64),
            ManifestEntry::new("bin/b.jar", &sha1_hex(&b), b.len() as u64),
        ]);
        let files = HashMap::from([("mods/a.jar".to_string(), a), ("bin/b.jar".to_string(), b)]);
        (manifest, MemorySource { files })
    }

    fn settings(root: &Path) -> SyncSettings {
        SyncSettings {
            install_root: root.to_path_buf(),
            client_id: "main".into(),
            version: "1.0".into(),
            download_concurrency: 2,
            retry: RetryPolicy {
                max_attempts: 3,
                initial_backoff_ms: 1,
                max_backoff_ms: 2,
            },
            ..SyncSettings::default()
        }
    }

    fn session(root: &Path, manifests: StaticManifest, content: MemorySource) -> SyncSession {
        SyncSession::with_sources(settings(root), Arc::new(manifests), Arc::new(content))
            .with_platform(Platform::Linux)
    }

    #[tokio::test]
    async fn cycle_downloads_then_second_cycle_is_noop() {
        let dir = tempdir().unwrap();
        let (manifest, content) = fixture();
        let hash_a = manifest.entries[0].content_hash.clone();
        let session = session(dir.path(), StaticManifest::new(manifest), content);

        let mut stream = session.plan_and_sync(false, None).await.unwrap();
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event);
        }

        assert!(matches!(events.first(), Some(SyncEvent::Planned { files: 2, .. })));
        let done = events
            .iter()
            .filter(|e| matches!(e, SyncEvent::FileDone { .. }))
            .count();
        assert_eq!(done, 2);
        let completes: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SyncEvent::Complete(summary) => Some(summary),
                _ => None,
            })
            .collect();
        assert_eq!(completes.len(), 1);
        assert!(completes[0].is_success());
        assert_eq!(completes[0].fetched, 2);
        assert!(matches!(events.last(), Some(SyncEvent::Complete(_))));
        assert!(integrity::is_valid(&dir.path().join("mods/a.jar"), &hash_a, 14));

        let mut again = session.plan_and_sync(false, Some(1)).await.unwrap();
        assert!(matches!(again.next().await, Some(SyncEvent::Planned { files: 0, .. })));
        let summary = again.finish().await.unwrap();
        assert_eq!(summary.fetched, 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn manifest_fetch_is_retried_on_transport_errors() {
        let dir = tempdir().unwrap();
        let (manifest, content) = fixture();
        let manifests = Arc::new(StaticManifest {
            fail_first: 2,
            ..StaticManifest::new(manifest)
        });
        let session = SyncSession::with_sources(
            settings(dir.path()),
            manifests.clone(),
            Arc::new(content),
        );

        let summary = session
            .plan_and_sync(false, None)
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();
        assert_eq!(summary.fetched, 2);
        assert_eq!(manifests.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalid_manifest_aborts_cycle_and_releases_session() {
        let dir = tempdir().unwrap();
        let manifest = FileManifest::new(vec![
            ManifestEntry::new("mods/a.jar", &sha1_hex(b"a"), 1),
            ManifestEntry::new("mods/a.jar", &sha1_hex(b"a"), 1),
        ]);
        let session = session(
            dir.path(),
            StaticManifest::new(manifest),
            MemorySource {
                files: HashMap::new(),
            },
        );

        let err = session.plan_and_sync(false, None).await.err().unwrap();
        assert!(matches!(err, LauncherError::InvalidManifest(_)));
        assert!(!session.is_busy());

        let err = session.plan_and_sync(false, None).await.err().unwrap();
        assert!(matches!(err, LauncherError::InvalidManifest(_)));
    }

    #[tokio::test]
    async fn concurrent_cycles_are_refused() {
        let dir = tempdir().unwrap();
        let (manifest, content) = fixture();
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let manifests = StaticManifest {
            gate: Some((entered.clone(), release.clone())),
            ..StaticManifest::new(manifest)
        };
        let session = Arc::new(session(dir.path(), manifests, content));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .plan_and_sync(false, None)
                    .await
                    .unwrap()
                    .finish()
                    .await
                    .unwrap()
            })
        };

        entered.notified().await;
        assert!(session.is_busy());
        let err = session.plan_and_sync(true, None).await.err().unwrap();
        assert!(matches!(err, LauncherError::SyncInProgress));
        assert!(matches!(
            session.cleanup(&[]).await,
            Err(LauncherError::SyncInProgress)
        ));

        release.notify_one();
        let summary = first.await.unwrap();
        assert_eq!(summary.fetched, 2);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn cleanup_consumes_keep_set_of_last_cycle() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let (manifest, content) = fixture();
        let session = session(root, StaticManifest::new(manifest), content);

        assert!(matches!(
            session.cleanup(&[]).await,
            Err(LauncherError::NoCompletedCycle)
        ));

        for (path, body) in [
            ("mods/old.jar", "stale"),
            ("saves/world1/level.dat", "save"),
            ("notes.txt", "mine"),
            ("libraries/org/x.jar", "lib"),
            ("custom/keep.bin", "extra"),
        ] {
            let path = root.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }

        session
            .plan_and_sync(false, None)
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();

        let report = session.cleanup(&["custom".to_string()]).await.unwrap();
        assert_eq!(report.deleted_count, 1);
        assert!(report.errors.is_empty());
        assert!(!root.join("mods/old.jar").exists());
        assert!(root.join("mods/a.jar").exists());
        assert!(root.join("bin/b.jar").exists());
        assert!(root.join("saves/world1/level.dat").exists());
        assert!(root.join("notes.txt").exists());
        assert!(root.join("libraries/org/x.jar").exists());
        assert!(root.join("custom/keep.bin").exists());
        assert!(root.join("mods").is_dir());

        assert!(matches!(
            session.cleanup(&[]).await,
            Err(LauncherError::NoCompletedCycle)
        ));
    }

    #[tokio::test]
    async fn failed_download_keeps_stale_file_through_cleanup() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let (manifest, mut content) = fixture();
        content.files.remove("bin/b.jar");
        let session = session(root, StaticManifest::new(manifest), content);

        for (path, body) in [("bin/b.jar", "stale copy"), ("mods/old.jar", "orphan")] {
            let path = root.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }

        let summary = session
            .plan_and_sync(false, None)
            .await
            .unwrap()
            .finish()
            .await
            .unwrap();
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_success());

        let report = session.cleanup(&[]).await.unwrap();
        assert_eq!(report.deleted_count, 1);
        assert!(!root.join("mods/old.jar").exists());
        assert!(root.join("mods/a.jar").exists());
        assert_eq!(
            std::fs::read_to_string(root.join("bin/b.jar")).unwrap(),
            "stale copy"
        );
    }

    #[tokio::test]
    async fn resolves_launch_from_profile_file() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join("profile.json"),
            r#"{
                "mainClass": "net.example.Client",
                "libraries": [
                    {"name": "core", "artifact": {"sha1": "h", "size": 1, "path": "core.jar", "url": "u"}},
                    {"name": "mac-only", "rules": [{"action": "allow", "os": {"name": "osx"}}, {"action": "disallow", "os": {"name": "linux"}}],
                     "artifact": {"sha1": "h", "size": 1, "path": "mac.jar", "url": "u"}}
                ],
                "arguments": {
                    "jvm": ["-cp", "${classpath}"],
                    "game": ["--user", "${auth_player_name}"]
                }
            }"#,
        )
        .unwrap();

        let (manifest, content) = fixture();
        let mut session = session(root, StaticManifest::new(manifest), content);
        session.settings.launch_profile_path = Some("profile.json".into());

        let vars = HashMap::from([("auth_player_name".to_string(), "Steve".to_string())]);
        let launch = session.resolve_launch(&vars).await.unwrap();

        let names: Vec<_> = launch.libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["core"]);
        assert_eq!(launch.game_args, vec!["--user", "Steve"]);
        assert_eq!(launch.jvm_args[1], launch.classpath);
        assert!(launch.classpath.ends_with("core.jar"));
        assert_eq!(session.prepare_natives(&launch).await.unwrap(), 0);

        std::fs::create_dir_all(root.join("natives")).unwrap();
        std::fs::write(root.join("natives").join("liblwjgl.so"), b"elf").unwrap();
        session.release_natives().await;
        assert!(!root.join("natives").exists());
    }

    #[tokio::test]
    async fn missing_launch_profile_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        let (manifest, content) = fixture();
        let session = session(dir.path(), StaticManifest::new(manifest), content);

        let err = session.resolve_launch(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, LauncherError::InvalidSettings(_)));
    }
}
