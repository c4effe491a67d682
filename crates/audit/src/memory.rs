//! In-memory activity sink

use crate::activity_log::{ActivityAction, ActivityLogEntry, ActivitySink};
use shared::StoreError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Per-organization audit statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityStats {
    pub total_entries: usize,
    pub by_action: BTreeMap<ActivityAction, usize>,
}

/// Append-only audit store.
///
/// Clones share the same underlying log. `set_available(false)` makes every
/// write fail, which is how outages are simulated.
#[derive(Debug, Clone)]
pub struct InMemoryActivityLog {
    entries: Arc<RwLock<Vec<ActivityLogEntry>>>,
    available: Arc<AtomicBool>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::persistence("Failed to acquire read lock"))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Entries of one organization in insertion order
    pub fn entries_for(&self, organization_id: &str) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::persistence("Failed to acquire read lock"))?;
        Ok(entries
            .iter()
            .filter(|e| e.organization_id == organization_id)
            .cloned()
            .collect())
    }

    /// Most recent entries of one organization, newest first
    pub fn recent(&self, organization_id: &str, limit: usize) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let mut entries = self.entries_for(organization_id)?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }

    pub fn stats(&self, organization_id: &str) -> Result<ActivityStats, StoreError> {
        let entries = self.entries_for(organization_id)?;
        let mut stats = ActivityStats {
            total_entries: entries.len(),
            ..Default::default()
        };
        for entry in &entries {
            *stats.by_action.entry(entry.action).or_default() += 1;
        }
        Ok(stats)
    }

    /// Export one organization's trail as a JSON array
    pub fn export_json(&self, organization_id: &str) -> Result<serde_json::Value, StoreError> {
        let entries = self.entries_for(organization_id)?;
        serde_json::to_value(entries).map_err(|e| StoreError::persistence(e.to_string()))
    }
}

impl Default for InMemoryActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivitySink for InMemoryActivityLog {
    fn insert_activity_log(&self, entry: &ActivityLogEntry) -> Result<(), StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::persistence("activity log unavailable"));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StoreError::persistence("Failed to acquire write lock"))?;
        entries.push(entry.clone());
        Ok(())
    }

    fn recent_activity(
        &self,
        organization_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        self.recent(organization_id, limit)
    }
}
