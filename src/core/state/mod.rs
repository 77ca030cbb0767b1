pub mod session;
pub mod settings;

pub use session::{CycleSummary, SyncEvent, SyncSession, SyncStream};
pub use settings::SyncSettings;
