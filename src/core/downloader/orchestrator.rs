// ─── Download Orchestrator ───
// Bounded-concurrency, cancellable, progress-tracked execution of a plan.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::core::error::{ErrorKind, LauncherError, LauncherResult};
use crate::core::integrity::{digests_match, ContentHasher};
use crate::core::manifest::ManifestEntry;
use crate::core::sync::SyncPlan;

use super::source::ContentSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    InFlight,
    Done,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed | JobState::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub path: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl JobFailure {
    fn from_error(entry: &ManifestEntry, error: &LauncherError) -> Self {
        Self {
            path: entry.relative_path(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadJob {
    pub entry: ManifestEntry,
    pub bytes_transferred: u64,
    pub state: JobState,
    pub failure: Option<JobFailure>,
}

impl DownloadJob {
    fn new(entry: ManifestEntry) -> Self {
        Self {
            entry,
            bytes_transferred: 0,
            state: JobState::Pending,
            failure: None,
        }
    }

    fn fail(&mut self, error: &LauncherError) {
        self.state = JobState::Failed;
        self.failure = Some(JobFailure::from_error(&self.entry, error));
    }
}

/// Final state of every job of one run, in plan order.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    pub jobs: Vec<DownloadJob>,
    pub total_bytes: u64,
    pub transferred_bytes: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DownloadReport {
    pub fn count(&self, state: JobState) -> usize {
        self.jobs.iter().filter(|job| job.state == state).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &DownloadJob> {
        self.jobs.iter().filter(|job| job.state == JobState::Failed)
    }

    pub fn failures(&self) -> Vec<JobFailure> {
        self.jobs
            .iter()
            .filter_map(|job| job.failure.clone())
            .collect()
    }

    /// Every job finished and verified.
    pub fn is_success(&self) -> bool {
        self.jobs.iter().all(|job| job.state == JobState::Done)
    }
}

/// Receives progress from a run. Called from worker tasks; implementations
/// must be cheap and do their own throttling.
pub trait DownloadObserver: Send + Sync {
    fn on_progress(&self, _transferred: u64, _total: u64) {}
    fn on_file_done(&self, _entry: &ManifestEntry) {}
    fn on_complete(&self, _report: &DownloadReport) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl DownloadObserver for NoopObserver {}

/// Shared cooperative cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A run in progress on the tokio runtime.
pub struct DownloadHandle {
    cancel: CancelHandle,
    task: JoinHandle<DownloadReport>,
}

impl DownloadHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn wait(self) -> LauncherResult<DownloadReport> {
        self.task
            .await
            .map_err(|e| LauncherError::Other(format!("Download task join error: {}", e)))
    }
}

/// Counters shared by every worker of one run.
struct RunState {
    total_bytes: u64,
    transferred: AtomicU64,
    finished_jobs: AtomicUsize,
    cancel: CancelHandle,
    observer: Arc<dyn DownloadObserver>,
    stall_timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct DownloadOrchestrator {
    source: Arc<dyn ContentSource>,
    concurrency: usize,
    stall_timeout: Option<Duration>,
}

impl DownloadOrchestrator {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            concurrency: 4,
            stall_timeout: None,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Fail a job when no bytes arrive for `timeout`.
    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout = timeout;
        self
    }

    /// Start executing `plan` in the background.
    pub fn execute(&self, plan: &SyncPlan, observer: Arc<dyn DownloadObserver>) -> DownloadHandle {
        let cancel = CancelHandle::new();
        let this = self.clone();
        let entries = plan.to_fetch.clone();
        let root = plan.root.clone();
        let run_cancel = cancel.clone();

        let task =
            tokio::spawn(async move { this.run(entries, root, observer, run_cancel).await });

        DownloadHandle { cancel, task }
    }

    /// Download `entries` under `root` and return once every job is
    /// terminal. `on_complete` fires exactly once, after that barrier.
    pub async fn run(
        &self,
        entries: Vec<ManifestEntry>,
        root: PathBuf,
        observer: Arc<dyn DownloadObserver>,
        cancel: CancelHandle,
    ) -> DownloadReport {
        let started_at = Utc::now();
        let job_count = entries.len();
        let state = Arc::new(RunState {
            total_bytes: entries
                .iter()
                .fold(0u64, |acc, e| acc.saturating_add(e.size_bytes)),
            transferred: AtomicU64::new(0),
            finished_jobs: AtomicUsize::new(0),
            cancel,
            observer,
            stall_timeout: self.stall_timeout,
        });

        info!(
            "Starting download run: {} files, {} bytes, concurrency={}",
            job_count, state.total_bytes, self.concurrency
        );

        let mut jobs: Vec<DownloadJob> = entries.into_iter().map(DownloadJob::new).collect();
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let root = Arc::new(root);
        let mut workers = JoinSet::new();

        for (index, job) in jobs.iter().enumerate() {
            let job = job.clone();
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&permits);
            let state = Arc::clone(&state);
            let root = Arc::clone(&root);

            workers.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let job = run_job(job, source.as_ref(), &root, &state).await;
                let finished = state.finished_jobs.fetch_add(1, Ordering::AcqRel) + 1;
                debug!("{}/{} download jobs finished", finished, job_count);
                (index, job)
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, job)) => jobs[index] = job,
                Err(e) => warn!("Download worker aborted: {}", e),
            }
        }

        // A slot still non-terminal here belongs to a worker that panicked.
        for job in jobs.iter_mut().filter(|job| !job.state.is_terminal()) {
            job.fail(&LauncherError::Other("download worker aborted".into()));
        }

        debug_assert!(state.finished_jobs.load(Ordering::Acquire) <= job_count);

        let report = DownloadReport {
            jobs,
            total_bytes: state.total_bytes,
            transferred_bytes: state.transferred.load(Ordering::Acquire),
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Download run finished: {} done, {} failed, {} cancelled",
            report.count(JobState::Done),
            report.count(JobState::Failed),
            report.count(JobState::Cancelled)
        );

        state.observer.on_complete(&report);
        report
    }
}

enum Transfer {
    Finished,
    Cancelled,
}

async fn run_job(
    mut job: DownloadJob,
    source: &dyn ContentSource,
    root: &Path,
    state: &RunState,
) -> DownloadJob {
    if state.cancel.is_cancelled() {
        job.state = JobState::Cancelled;
        return job;
    }

    job.state = JobState::InFlight;
    let dest = job.entry.local_path(root);

    match transfer(&mut job, source, &dest, state).await {
        Ok(Transfer::Finished) => {
            job.state = JobState::Done;
            debug!("Downloaded: {} -> {:?}", job.entry.path, dest);
            state.observer.on_file_done(&job.entry);
        }
        Ok(Transfer::Cancelled) => {
            // Partial file stays on disk; the next plan sees it as invalid.
            job.state = JobState::Cancelled;
            debug!("Cancelled mid-transfer: {:?}", dest);
        }
        Err(e) => {
            warn!("Download failed for {}: {}", job.entry.path, e);
            job.fail(&e);
        }
    }

    job
}

async fn transfer(
    job: &mut DownloadJob,
    source: &dyn ContentSource,
    dest: &Path,
    state: &RunState,
) -> LauncherResult<Transfer> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }

    let mut stream = match state.stall_timeout {
        Some(limit) => tokio::time::timeout(limit, source.open(&job.entry))
            .await
            .map_err(|_| LauncherError::Stalled {
                path: job.entry.relative_path(),
                seconds: limit.as_secs(),
            })??,
        None => source.open(&job.entry).await?,
    };
    let mut hasher = ContentHasher::for_expected(&job.entry.content_hash);

    // Write inside a block so the handle is dropped before verification.
    {
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| LauncherError::io(dest, e))?;

        loop {
            if state.cancel.is_cancelled() {
                file.flush().await.map_err(|e| LauncherError::io(dest, e))?;
                return Ok(Transfer::Cancelled);
            }

            let next = match state.stall_timeout {
                Some(limit) => tokio::time::timeout(limit, stream.next())
                    .await
                    .map_err(|_| LauncherError::Stalled {
                        path: job.entry.relative_path(),
                        seconds: limit.as_secs(),
                    })?,
                None => stream.next().await,
            };

            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;

            let len = chunk.len() as u64;
            let received = job.bytes_transferred.saturating_add(len);
            if received > job.entry.size_bytes {
                return Err(LauncherError::IntegrityMismatch {
                    path: dest.to_path_buf(),
                    expected: format!("{} bytes", job.entry.size_bytes),
                    actual: format!("more than {} bytes", job.entry.size_bytes),
                });
            }

            file.write_all(&chunk)
                .await
                .map_err(|e| LauncherError::io(dest, e))?;
            if let Some(hasher) = hasher.as_mut() {
                hasher.update(&chunk);
            }

            job.bytes_transferred = received;
            let total = state.transferred.fetch_add(len, Ordering::AcqRel) + len;
            state.observer.on_progress(total, state.total_bytes);
        }

        file.flush().await.map_err(|e| LauncherError::io(dest, e))?;
    }

    if job.bytes_transferred != job.entry.size_bytes {
        return Err(LauncherError::IntegrityMismatch {
            path: dest.to_path_buf(),
            expected: format!("{} bytes", job.entry.size_bytes),
            actual: format!("{} bytes", job.bytes_transferred),
        });
    }

    let actual = hasher
        .map(ContentHasher::finalize_hex)
        .unwrap_or_else(|| "<unrecognized digest format>".to_string());
    if !digests_match(&job.entry.content_hash, &actual) {
        return Err(LauncherError::IntegrityMismatch {
            path: dest.to_path_buf(),
            expected: job.entry.content_hash.clone(),
            actual,
        });
    }

    Ok(Transfer::Finished)
}
