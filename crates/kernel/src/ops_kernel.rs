//! OpsKernel - Decision logic around every tenant-owned mutation
//!
//! Each operation resolves, in order: identity guard, tenant scope,
//! authorization and entity-specific validation. The audit entry is then
//! written from the store's commit hook, so under the strict policy a
//! failed entry means the write never happens. Any failure short-circuits
//! before the write.

use approval::{ApprovalStore, ApprovalWorkflow, TransitionRequest};
use audit::{ActivityAction, ActivityLog, ActivityLogEntry, ActivityRecord, ActivitySink};
use rbac::{ensure_active, scoped, PermissionChecker, TaskAccessPolicy};
use shared::{
    Announcement, ApprovalRequest, ApprovalStatus, EntityKind, Identity, KernelConfig,
    NewAnnouncement, NewApproval, NewTask, Permission, Result, Task, TaskStatus, TaskUpdate,
};
use std::sync::Arc;

use crate::store::{AnnouncementStore, InMemoryStores, TaskStore};

/// Persistence collaborators the kernel delegates to
#[derive(Clone)]
pub struct Stores {
    pub tasks: Arc<dyn TaskStore>,
    pub announcements: Arc<dyn AnnouncementStore>,
    pub approvals: Arc<dyn ApprovalStore>,
    pub activity: Arc<dyn ActivitySink>,
}

/// The kernel facade handed to request handlers
pub struct OpsKernel {
    config: KernelConfig,
    tasks: Arc<dyn TaskStore>,
    announcements: Arc<dyn AnnouncementStore>,
    approvals: ApprovalWorkflow,
    activity: ActivityLog,
    checker: PermissionChecker,
    task_policy: TaskAccessPolicy,
}

impl OpsKernel {
    pub fn new(config: KernelConfig, stores: Stores) -> Self {
        let activity = ActivityLog::new(stores.activity, config.audit_failure_policy);
        let approvals = ApprovalWorkflow::new(stores.approvals, activity.clone());

        tracing::debug!(policy = ?config.audit_failure_policy, "kernel initialized");
        Self {
            config,
            tasks: stores.tasks,
            announcements: stores.announcements,
            approvals,
            activity,
            checker: PermissionChecker::new(),
            task_policy: TaskAccessPolicy::new(),
        }
    }

    /// Kernel over fresh in-memory stores, returned alongside for inspection
    pub fn in_memory(config: KernelConfig) -> (Self, InMemoryStores) {
        let memory = InMemoryStores::new();
        (Self::new(config, memory.stores()), memory)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    // ========== Tasks ==========

    pub fn create_task(&self, caller: &Identity, input: NewTask) -> Result<Task> {
        self.checker.require(caller, Permission::TaskCreate)?;
        input.validate()?;

        let task = Task::create(input, &caller.organization_id, &caller.id);
        let record = self.record_for(caller, ActivityAction::Created, EntityKind::Task, &task.id);
        self.tasks.insert_task(&task, &mut || self.activity.record_for_mutation(record.clone()))?;

        tracing::info!(task_id = %task.id, org = %task.organization_id, "task created");
        Ok(task)
    }

    pub fn get_task(&self, caller: &Identity, task_id: &str) -> Result<Task> {
        ensure_active(caller)?;
        scoped(self.tasks.find_task_by_id(task_id)?, task_id, &caller.organization_id)
    }

    /// Tasks of the caller's organization, newest first
    pub fn list_tasks(&self, caller: &Identity, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        ensure_active(caller)?;
        let mut tasks = self.tasks.list_tasks(&caller.organization_id, status)?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    /// An empty patch changes nothing and is not logged
    pub fn update_task(&self, caller: &Identity, task_id: &str, update: TaskUpdate) -> Result<Task> {
        let current = self.get_task(caller, task_id)?;
        self.task_policy.ensure_can_edit(caller, &current)?;
        update.validate()?;
        if update.is_empty() {
            tracing::debug!(%task_id, "empty task patch ignored");
            return Ok(current);
        }

        let mut updated = current.clone();
        updated.apply(&update);

        let mut record = self.record_for(caller, ActivityAction::Updated, EntityKind::Task, task_id);
        if let Ok(details) = serde_json::to_value(&update) {
            record = record.with_details(details);
        }
        self.tasks.update_task(&current, &updated, &mut || {
            self.activity.record_for_mutation(record.clone())
        })?;

        tracing::info!(%task_id, editor = %caller.id, "task updated");
        Ok(updated)
    }

    /// Permission is checked before the lookup; deletion has no ownership exception
    pub fn delete_task(&self, caller: &Identity, task_id: &str) -> Result<Task> {
        self.task_policy.ensure_can_delete(caller)?;
        let task = self.get_task(caller, task_id)?;

        let record = self.record_for(caller, ActivityAction::Deleted, EntityKind::Task, task_id);
        self.tasks
            .delete_task(&task, &mut || self.activity.record_for_mutation(record.clone()))?;

        tracing::info!(%task_id, by = %caller.id, "task deleted");
        Ok(task)
    }

    // ========== Announcements ==========

    pub fn create_announcement(&self, caller: &Identity, input: NewAnnouncement) -> Result<Announcement> {
        self.checker.require(caller, Permission::AnnouncementCreate)?;
        input.validate()?;

        let announcement = Announcement::publish(input, &caller.organization_id, &caller.id);
        let record = self.record_for(
            caller,
            ActivityAction::Created,
            EntityKind::Announcement,
            &announcement.id,
        );
        self.announcements.insert_announcement(&announcement, &mut || {
            self.activity.record_for_mutation(record.clone())
        })?;

        tracing::info!(announcement_id = %announcement.id, pinned = announcement.is_pinned, "announcement published");
        Ok(announcement)
    }

    /// Announcements of the caller's organization, pinned first, then newest first
    pub fn list_announcements(&self, caller: &Identity) -> Result<Vec<Announcement>> {
        ensure_active(caller)?;
        let mut announcements = self.announcements.list_announcements(&caller.organization_id)?;
        announcements.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(announcements)
    }

    // ========== Approvals ==========

    pub fn create_approval(&self, caller: &Identity, input: NewApproval) -> Result<ApprovalRequest> {
        self.approvals.create(caller, input)
    }

    pub fn get_approval(&self, caller: &Identity, approval_id: &str) -> Result<ApprovalRequest> {
        self.approvals.get(caller, approval_id)
    }

    pub fn list_approvals(
        &self,
        caller: &Identity,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<ApprovalRequest>> {
        self.approvals.list(caller, status)
    }

    pub fn transition_approval(&self, request: TransitionRequest) -> Result<ApprovalRequest> {
        self.approvals.transition(request)
    }

    // ========== Activity ==========

    /// Append an entry directly; sink failures always surface
    pub fn record_activity(&self, record: ActivityRecord) -> Result<ActivityLogEntry> {
        self.activity.record(record)
    }

    /// The caller organization's trail, newest first
    pub fn recent_activity(&self, caller: &Identity, limit: Option<usize>) -> Result<Vec<ActivityLogEntry>> {
        self.checker.require(caller, Permission::ActivityView)?;
        let page = self.config.activity_page_size;
        let limit = limit.unwrap_or(page).min(page);
        self.activity.recent(&caller.organization_id, limit)
    }

    fn record_for(
        &self,
        caller: &Identity,
        action: ActivityAction,
        entity: EntityKind,
        entity_id: &str,
    ) -> ActivityRecord {
        ActivityRecord::new(&caller.organization_id, &caller.id, action, entity, entity_id)
    }
}

impl core::fmt::Debug for OpsKernel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpsKernel")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
