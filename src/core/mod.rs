// ─── Launcher Sync Core ───
// Content synchronization and launch resolution for a game client.
//
// Architecture:
//   core/
//     manifest/    Remote file manifest, launch profile, manifest client
//     integrity/   Size + digest validation of local files
//     sync/        Fetch planning and orphan cleanup
//     downloader/  Bounded-concurrency cancellable downloads
//     rules/       Platform identity + allow/disallow evaluation
//     launch/      Library selection, classpath, arguments, natives
//     state/       Settings and the caller-facing sync session
//     retry.rs     Caller-driven backoff for network operations

pub mod downloader;
pub mod error;
pub mod http;
pub mod integrity;
pub mod launch;
pub mod manifest;
pub mod retry;
pub mod rules;
pub mod state;
pub mod sync;
