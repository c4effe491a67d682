//! ApprovalRequest - a request waiting on one designated approver
//!
//! `Pending` is the only non-terminal status. Once a request has been
//! approved or rejected its decision fields never change again.

use crate::entity::{new_id, EntityKind, Scoped};
use crate::error::{KernelError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an approval request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }

    /// Statuses reachable from this one
    pub fn allowed_next(&self) -> &'static [ApprovalStatus] {
        match self {
            ApprovalStatus::Pending => &[ApprovalStatus::Approved, ApprovalStatus::Rejected],
            ApprovalStatus::Approved | ApprovalStatus::Rejected => &[],
        }
    }

    pub fn can_transition_to(&self, next: ApprovalStatus) -> bool {
        self.allowed_next().contains(&next)
    }
}

impl core::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Input for opening a new approval request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApproval {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_request_type")]
    pub request_type: String,
    #[serde(default)]
    pub priority: ApprovalPriority,
    pub current_approver_id: String,
}

fn default_request_type() -> String {
    "general".to_string()
}

impl NewApproval {
    pub fn new(title: impl Into<String>, approver_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            request_type: default_request_type(),
            priority: ApprovalPriority::Normal,
            current_approver_id: approver_id.into(),
        }
    }

    pub fn with_priority(mut self, priority: ApprovalPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(KernelError::validation("title", "must not be empty"));
        }
        if self.current_approver_id.trim().is_empty() {
            return Err(KernelError::validation(
                "currentApproverId",
                "must name the designated approver",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub request_type: String,
    pub priority: ApprovalPriority,
    pub created_by_id: String,
    pub current_approver_id: String,
    pub status: ApprovalStatus,
    pub approval_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub approved_by_id: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApprovalRequest {
    /// Open a pending request owned by `organization_id`
    pub fn open(
        input: NewApproval,
        organization_id: impl Into<String>,
        created_by_id: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            organization_id: organization_id.into(),
            title: input.title,
            description: input.description,
            request_type: input.request_type,
            priority: input.priority,
            created_by_id: created_by_id.into(),
            current_approver_id: input.current_approver_id,
            status: ApprovalStatus::Pending,
            approval_notes: None,
            rejection_reason: None,
            approved_by_id: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }

    /// Builder: fix the id (fixtures and imports)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_designated_approver(&self, user_id: &str) -> bool {
        self.current_approver_id == user_id
    }

    // ========== State Transitions ==========

    /// Record an approval decision
    pub fn approve(
        &mut self,
        decided_by: impl Into<String>,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_can_move_to(ApprovalStatus::Approved)?;
        self.status = ApprovalStatus::Approved;
        self.approval_notes = notes;
        self.rejection_reason = None;
        self.approved_by_id = Some(decided_by.into());
        self.approved_at = Some(at);
        Ok(())
    }

    /// Record a rejection; the reason must carry some text
    pub fn reject(
        &mut self,
        decided_by: impl Into<String>,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_can_move_to(ApprovalStatus::Rejected)?;
        if reason.trim().is_empty() {
            return Err(KernelError::validation(
                "rejectionReason",
                "a rejection needs a reason",
            ));
        }
        self.status = ApprovalStatus::Rejected;
        self.rejection_reason = Some(reason.to_string());
        self.approval_notes = None;
        self.approved_by_id = Some(decided_by.into());
        self.approved_at = Some(at);
        Ok(())
    }

    fn ensure_can_move_to(&self, next: ApprovalStatus) -> Result<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(KernelError::InvalidState {
                entity: EntityKind::Approval,
                id: self.id.clone(),
                status: self.status.to_string(),
            })
        }
    }
}

impl Scoped for ApprovalRequest {
    const KIND: EntityKind = EntityKind::Approval;

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

    fn pending() -> ApprovalRequest {
        ApprovalRequest::open(NewApproval::new("Laptop", "u2"), "org1", "u1").with_id("A1")
    }

    #[test]
    fn test_open_is_pending() {
        let approval = pending();
        assert_eq!(approval.status, ApprovalStatus::Pending);
        assert_eq!(approval.request_type, "general");
        assert_eq!(approval.priority, ApprovalPriority::Normal);
        assert!(approval.approved_by_id.is_none());
    }

    #[test]
    fn test_status_graph() {
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Approved));
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Rejected));
        assert!(!ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Pending));
        for terminal in [ApprovalStatus::Approved, ApprovalStatus::Rejected] {
            assert!(terminal.is_terminal());
            assert!(terminal.allowed_next().is_empty());
        }
    }

    #[test]
    fn test_approve_sets_decision_fields() {
        let mut approval = pending();
        let now = Utc::now();
        approval.approve("u2", Some("ok".to_string()), now).unwrap();

        assert_eq!(approval.status, ApprovalStatus::Approved);
        assert_eq!(approval.approval_notes.as_deref(), Some("ok"));
        assert_eq!(approval.approved_by_id.as_deref(), Some("u2"));
        assert_eq!(approval.approved_at, Some(now));
        assert!(approval.rejection_reason.is_none());
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut approval = pending();
        let before = approval.clone();

        let err = approval.reject("u2", "   ", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "validation_failed");
        assert_eq!(approval, before);
    }

    #[test]
    fn test_reject_sets_reason_only() {
        let mut approval = pending();
        approval.reject("u2", "over budget", Utc::now()).unwrap();

        assert_eq!(approval.status, ApprovalStatus::Rejected);
        assert_eq!(approval.rejection_reason.as_deref(), Some("over budget"));
        assert!(approval.approval_notes.is_none());
    }

    #[test]
    fn test_terminal_states_refuse_transitions() {
        let mut approval = pending();
        approval.approve("u2", None, Utc::now()).unwrap();
        let decided = approval.clone();

        let err = approval.approve("u2", None, Utc::now()).unwrap_err();
        assert!(matches!(err, KernelError::InvalidState { ref status, .. } if status == "approved"));

        // Terminal state wins over a missing reason
        let err = approval.reject("u2", "", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "invalid_state");
        assert_eq!(approval, decided);
    }

    #[test]
    fn test_rejected_is_terminal_too() {
        let mut approval = pending();
        approval.reject("u2", "over budget", Utc::now()).unwrap();
        let decided = approval.clone();

        let err = approval.approve("u2", Some("changed my mind".into()), Utc::now()).unwrap_err();
        assert!(matches!(err, KernelError::InvalidState { ref status, .. } if status == "rejected"));

        let err = approval.reject("u5", "again", Utc::now()).unwrap_err();
        assert_eq!(err.kind(), "invalid_state");
        assert_eq!(approval, decided);
    }

    #[test]
    fn test_new_approval_validation() {
        assert!(NewApproval::new("Trip", "u2").validate().is_ok());
        assert!(NewApproval::new("", "u2").validate().is_err());
        assert!(NewApproval::new("Trip", " ").validate().is_err());
    }

    #[test]
    fn test_new_approval_deserialize_defaults() {
        let json = r#"{"title":"Budget","currentApproverId":"u9"}"#;
        let input: NewApproval = serde_json::from_str(json).unwrap();
        assert_eq!(input.request_type, "general");
        assert_eq!(input.priority, ApprovalPriority::Normal);
    }
}
