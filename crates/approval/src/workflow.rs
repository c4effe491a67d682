//! ApprovalWorkflow - Decision gates and state transitions
//!
//! A transition passes five gates in a fixed order, first failure wins:
//!
//! 1. the request exists in the caller's organization (else `NotFound`)
//! 2. the caller's role holds `approval:approve` (else `Forbidden`)
//! 3. the caller is the designated approver or an admin (else `Forbidden`)
//! 4. the request is still `pending` (else `InvalidState`)
//! 5. the payload is complete; a rejection needs a reason (else `ValidationFailed`)
//!
//! Authorization runs before the status check so an unauthorized caller
//! never learns where a request stands. Nothing is written until all gates
//! pass.

use audit::{ActivityAction, ActivityLog, ActivityRecord};
use chrono::Utc;
use rbac::{ensure_active, scoped, PermissionChecker};
use serde::{Deserialize, Serialize};
use shared::{
    ApprovalRequest, ApprovalStatus, EntityKind, Identity, KernelError, NewApproval, Permission,
    Result,
};
use std::sync::Arc;

use crate::store::ApprovalStore;

/// The decision a caller wants to record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve {
        #[serde(default, rename = "approvalNotes")]
        notes: Option<String>,
    },
    Reject {
        #[serde(default, rename = "rejectionReason")]
        reason: Option<String>,
    },
}

impl ApprovalAction {
    pub fn approve(notes: Option<&str>) -> Self {
        ApprovalAction::Approve {
            notes: notes.map(str::to_string),
        }
    }

    pub fn reject(reason: Option<&str>) -> Self {
        ApprovalAction::Reject {
            reason: reason.map(str::to_string),
        }
    }

    fn audit_action(&self) -> ActivityAction {
        match self {
            ApprovalAction::Approve { .. } => ActivityAction::Approved,
            ApprovalAction::Reject { .. } => ActivityAction::Rejected,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub approval_id: String,
    pub caller: Identity,
    pub action: ApprovalAction,
}

impl TransitionRequest {
    pub fn new(approval_id: impl Into<String>, caller: Identity, action: ApprovalAction) -> Self {
        Self {
            approval_id: approval_id.into(),
            caller,
            action,
        }
    }
}

/// Approval lifecycle service
#[derive(Clone)]
pub struct ApprovalWorkflow {
    store: Arc<dyn ApprovalStore>,
    activity: ActivityLog,
    checker: PermissionChecker,
}

impl core::fmt::Debug for ApprovalWorkflow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApprovalWorkflow")
            .field("activity", &self.activity)
            .finish_non_exhaustive()
    }
}

impl ApprovalWorkflow {
    pub fn new(store: Arc<dyn ApprovalStore>, activity: ActivityLog) -> Self {
        Self {
            store,
            activity,
            checker: PermissionChecker::new(),
        }
    }

    /// Open a new pending request in the caller's organization
    pub fn create(&self, caller: &Identity, input: NewApproval) -> Result<ApprovalRequest> {
        self.checker.require(caller, Permission::ApprovalCreate)?;
        input.validate()?;

        let approval = ApprovalRequest::open(input, &caller.organization_id, &caller.id);
        let record = ActivityRecord::new(
            &caller.organization_id,
            &caller.id,
            ActivityAction::Created,
            EntityKind::Approval,
            &approval.id,
        );
        self.store.insert_approval(&approval, &mut || {
            self.activity.record_for_mutation(record.clone())
        })?;

        tracing::info!(
            approval_id = %approval.id,
            org = %approval.organization_id,
            approver = %approval.current_approver_id,
            "approval request opened"
        );
        Ok(approval)
    }

    /// Tenant-scoped read
    pub fn get(&self, caller: &Identity, approval_id: &str) -> Result<ApprovalRequest> {
        ensure_active(caller)?;
        let found = self.store.find_approval_by_id(approval_id)?;
        scoped(found, approval_id, &caller.organization_id)
    }

    /// Requests of the caller's organization, newest first
    pub fn list(
        &self,
        caller: &Identity,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<ApprovalRequest>> {
        ensure_active(caller)?;
        let mut approvals = self.store.list_approvals(&caller.organization_id, status)?;
        approvals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(approvals)
    }

    /// Approve or reject a pending request
    pub fn transition(&self, request: TransitionRequest) -> Result<ApprovalRequest> {
        let TransitionRequest {
            approval_id,
            caller,
            action,
        } = request;
        ensure_active(&caller)?;

        let current = scoped(
            self.store.find_approval_by_id(&approval_id)?,
            &approval_id,
            &caller.organization_id,
        )?;

        // approve and reject share one permission
        if !self
            .checker
            .allows_role_id(&caller.role, Permission::ApprovalApprove)
        {
            tracing::warn!(%approval_id, caller = %caller.id, role = %caller.role, "approval decision denied");
            return Err(KernelError::forbidden(format!(
                "role '{}' lacks '{}'",
                caller.role,
                Permission::ApprovalApprove
            )));
        }

        if !current.is_designated_approver(&caller.id) && !caller.is_admin() {
            tracing::warn!(%approval_id, caller = %caller.id, "caller is not the designated approver");
            return Err(KernelError::forbidden("you are not the designated approver"));
        }

        let mut decided = current.clone();
        let now = Utc::now();
        match &action {
            ApprovalAction::Approve { notes } => decided.approve(&caller.id, notes.clone(), now)?,
            ApprovalAction::Reject { reason } => {
                decided.reject(&caller.id, reason.as_deref().unwrap_or_default(), now)?
            }
        }
        tracing::debug!(%approval_id, to = %decided.status, "transition validated");

        // The entry is written before the decision becomes visible, so a
        // strict-mode audit failure leaves the request untouched.
        let record = ActivityRecord::new(
            &caller.organization_id,
            &caller.id,
            action.audit_action(),
            EntityKind::Approval,
            &decided.id,
        );
        self.store.decide(ApprovalStatus::Pending, &decided, &mut || {
            self.activity.record_for_mutation(record.clone())
        })?;

        tracing::info!(
            %approval_id,
            org = %decided.organization_id,
            decided_by = %caller.id,
            status = %decided.status,
            "approval decided"
        );
        Ok(decided)
    }
}
