pub mod orchestrator;
pub mod source;

pub use orchestrator::{
    CancelHandle, DownloadHandle, DownloadJob, DownloadObserver, DownloadOrchestrator,
    DownloadReport, JobFailure, JobState, NoopObserver,
};
pub use source::{ChunkStream, ContentSource, HttpSource};
