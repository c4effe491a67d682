//! Announcement entity

use crate::entity::{new_id, EntityKind, Scoped};
use crate::error::{KernelError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    /// Audience hints for downstream filtering
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub target_department_ids: Vec<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

impl NewAnnouncement {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn pinned(mut self) -> Self {
        self.is_pinned = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(KernelError::validation("title", "must not be empty"));
        }
        if self.content.trim().is_empty() {
            return Err(KernelError::validation("content", "must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub content: String,
    pub target_role: Option<String>,
    pub target_department_ids: Vec<String>,
    pub is_pinned: bool,
    pub created_by_id: String,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    pub fn publish(
        input: NewAnnouncement,
        organization_id: impl Into<String>,
        created_by_id: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            organization_id: organization_id.into(),
            title: input.title,
            content: input.content,
            target_role: input.target_role,
            target_department_ids: input.target_department_ids,
            is_pinned: input.is_pinned,
            created_by_id: created_by_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl Scoped for Announcement {
    const KIND: EntityKind = EntityKind::Announcement;

    fn organization_id(&self) -> &str {
        &self.organization_id
    }

    fn entity_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_title_and_content() {
        assert!(NewAnnouncement::new("Offsite", "Friday").validate().is_ok());
        assert!(NewAnnouncement::new("", "Friday").validate().is_err());
        assert!(NewAnnouncement::new("Offsite", "").validate().is_err());
    }

    #[test]
    fn test_publish_keeps_targets() {
        let mut input = NewAnnouncement::new("Payroll", "Moved to the 25th").pinned();
        input.target_department_ids = vec!["finance".to_string()];

        let announcement = Announcement::publish(input, "org1", "u1");
        assert!(announcement.is_pinned);
        assert_eq!(announcement.target_department_ids, vec!["finance".to_string()]);
    }
}
