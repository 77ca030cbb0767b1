pub mod cleaner;
pub mod planner;

pub use cleaner::{
    OrphanCleaner, SweepError, SweepReport, DEFAULT_IGNORE_PREFIXES, USER_DATA_EXTENSION,
};
pub use planner::{KeepSet, SyncPlan, SyncPlanner};
