pub mod core;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::{SyncEvent, SyncSession, SyncSettings};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,launcher_sync_lib=debug")),
        )
        .try_init();
}

/// One full sync cycle followed by cleanup, driven by the settings file at
/// `settings_path` (or the default location).
pub async fn run(settings_path: Option<PathBuf>) -> LauncherResult<()> {
    let settings = match settings_path {
        Some(path) => SyncSettings::load_from(&path)?,
        None => SyncSettings::load()?,
    };

    tracing::info!(
        "launcher-sync starting for {} {} in {:?}",
        settings.client_id,
        settings.version,
        settings.install_root
    );

    let session = SyncSession::from_settings(settings)?;
    let mut stream = session.plan_and_sync(false, None).await?;

    let mut last_percent = None;
    let mut summary = None;
    while let Some(event) = stream.next().await {
        match event {
            SyncEvent::Planned {
                files, total_bytes, ..
            } => tracing::info!("{} files to fetch ({} bytes)", files, total_bytes),
            SyncEvent::Progress { transferred, total } if total > 0 => {
                let percent = transferred * 100 / total;
                if last_percent != Some(percent) {
                    last_percent = Some(percent);
                    tracing::info!("Progress: {}%", percent);
                }
            }
            SyncEvent::Progress { .. } => {}
            SyncEvent::FileDone { path } => tracing::debug!("Fetched {}", path),
            SyncEvent::Complete(done) => summary = Some(done),
        }
    }

    let summary = summary.ok_or_else(|| {
        LauncherError::Other("sync cycle ended without completing".into())
    })?;

    if !summary.is_success() {
        for failure in &summary.failures {
            tracing::warn!("{} ({:?}): {}", failure.path, failure.kind, failure.message);
        }
        return Err(LauncherError::Other(format!(
            "{} of {} files failed to sync",
            summary.failed + summary.cancelled,
            summary.fetched + summary.failed + summary.cancelled
        )));
    }

    let report = session.cleanup(&[]).await?;
    tracing::info!(
        "Sync finished: {} fetched, {} orphans deleted, {} cleanup errors",
        summary.fetched,
        report.deleted_count,
        report.errors.len()
    );
    Ok(())
}
