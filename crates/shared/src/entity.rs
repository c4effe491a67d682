//! Tenant-owned entity kinds

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Entity type names as they appear in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Task,
    Approval,
    Announcement,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Task => "Task",
            EntityKind::Approval => "Approval",
            EntityKind::Announcement => "Announcement",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Anything that belongs to exactly one organization
pub trait Scoped {
    const KIND: EntityKind;

    /// Identifier of the owning organization
    fn organization_id(&self) -> &str;

    /// Entity id, used when reporting a scoped miss
    fn entity_id(&self) -> &str;
}

/// Generate a fresh entity id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Hook a store runs once its precondition holds and before the write is
/// visible to anyone. An error aborts the write and is returned as is.
pub type Commit<'a> = &'a mut dyn FnMut() -> Result<()>;
