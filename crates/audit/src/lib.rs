//! # Opsdesk Audit
//!
//! Append-only activity log for every mutating action.

mod activity_log;
mod memory;

pub use activity_log::{ActivityAction, ActivityLog, ActivityLogEntry, ActivityRecord, ActivitySink};
pub use memory::{ActivityStats, InMemoryActivityLog};
