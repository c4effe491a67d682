//! ActivityLog - Audit trail recording for Opsdesk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{AuditFailurePolicy, EntityKind, KernelError, Result, StoreError};
use std::sync::Arc;

/// What happened to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
    Approved,
    Rejected,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Updated => "updated",
            ActivityAction::Deleted => "deleted",
            ActivityAction::Approved => "approved",
            ActivityAction::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A request to append one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub organization_id: String,
    pub user_id: String,
    pub action: ActivityAction,
    pub entity: EntityKind,
    pub entity_id: String,
    pub details: Option<serde_json::Value>,
}

impl ActivityRecord {
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        action: ActivityAction,
        entity: EntityKind,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            action,
            entity,
            entity_id: entity_id.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Audit log entry as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub action: ActivityAction,
    pub entity: EntityKind,
    pub entity_id: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl ActivityLogEntry {
    fn stamp(record: ActivityRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id: record.organization_id,
            user_id: record.user_id,
            action: record.action,
            entity: record.entity,
            entity_id: record.entity_id,
            details: record.details,
            timestamp: Utc::now(),
        }
    }
}

/// Persistence port for the audit trail. Implementations only ever append.
pub trait ActivitySink: Send + Sync {
    fn insert_activity_log(&self, entry: &ActivityLogEntry) -> std::result::Result<(), StoreError>;

    /// Most recent entries of one organization, newest first
    fn recent_activity(
        &self,
        organization_id: &str,
        limit: usize,
    ) -> std::result::Result<Vec<ActivityLogEntry>, StoreError>;
}

/// Recorder in front of an [`ActivitySink`]
#[derive(Clone)]
pub struct ActivityLog {
    sink: Arc<dyn ActivitySink>,
    policy: AuditFailurePolicy,
}

impl ActivityLog {
    pub fn new(sink: Arc<dyn ActivitySink>, policy: AuditFailurePolicy) -> Self {
        Self { sink, policy }
    }

    pub fn policy(&self) -> AuditFailurePolicy {
        self.policy
    }

    /// Append one entry; any sink failure is `LogWriteFailed`
    pub fn record(&self, record: ActivityRecord) -> Result<ActivityLogEntry> {
        let entry = ActivityLogEntry::stamp(record);
        match self.sink.insert_activity_log(&entry) {
            Ok(()) => {
                tracing::debug!(
                    org = %entry.organization_id,
                    user = %entry.user_id,
                    action = %entry.action,
                    entity = %entry.entity,
                    entity_id = %entry.entity_id,
                    "activity recorded"
                );
                Ok(entry)
            }
            Err(err) => Err(KernelError::LogWriteFailed(err.to_string())),
        }
    }

    /// Read back one organization's trail, newest first
    pub fn recent(&self, organization_id: &str, limit: usize) -> Result<Vec<ActivityLogEntry>> {
        Ok(self.sink.recent_activity(organization_id, limit)?)
    }

    /// Append the entry for a mutation that is about to be committed.
    ///
    /// Stores call this from their commit hook. Under `BestEffort` a failed
    /// write is reported and swallowed. Under `Strict` it comes back as
    /// `LogWriteFailed` and the store drops the write.
    pub fn record_for_mutation(&self, record: ActivityRecord) -> Result<()> {
        match self.record(record) {
            Ok(_) => Ok(()),
            Err(err) => match self.policy {
                AuditFailurePolicy::BestEffort => {
                    tracing::warn!(error = %err, "activity log unavailable, committing anyway");
                    Ok(())
                }
                AuditFailurePolicy::Strict => {
                    tracing::error!(error = %err, "activity log unavailable, aborting mutation");
                    Err(err)
                }
            },
        }
    }
}

impl core::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
