use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    launcher_sync_lib::init_tracing();

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    match launcher_sync_lib::run(settings_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("launcher-sync failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
