//! TaskAccessPolicy - Ownership-aware task edit rule
//!
//! Admins and managers may edit any task; everyone else only the tasks they
//! created. Holding `task:edit` alone is not enough. Deletion has no
//! ownership exception and is a plain `task:delete` check.

use crate::permission_checker::{ensure_active, PermissionChecker};
use shared::{Identity, KernelError, Permission, Result, Role, Task};

/// Edit rule on raw strings
pub fn can_edit_task(role: &str, task_created_by_id: &str, caller_id: &str) -> bool {
    let privileged = Role::parse(role).map(|r| r.is_privileged()).unwrap_or(false);
    privileged || task_created_by_id == caller_id
}

/// Delete rule on raw strings
pub fn can_delete_task(role: &str) -> bool {
    PermissionChecker::new().allows_role_id(role, Permission::TaskDelete)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskAccessPolicy {
    checker: PermissionChecker,
}

impl TaskAccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_can_edit(&self, caller: &Identity, task: &Task) -> Result<()> {
        ensure_active(caller)?;
        if can_edit_task(&caller.role, &task.created_by_id, &caller.id) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller.id, task = %task.id, "task edit denied");
            Err(KernelError::forbidden("only the creator, a manager or an admin may edit this task"))
        }
    }

    pub fn ensure_can_delete(&self, caller: &Identity) -> Result<()> {
        self.checker.require(caller, Permission::TaskDelete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{NewTask, UserStatus};

    fn t1() -> Task {
        Task::create(NewTask::new("Quarterly report"), "org1", "u1").with_id("T1")
    }

    // ============== Edit Rule Tests ==============

    #[test]
    fn test_creator_member_can_edit() {
        assert!(can_edit_task("member", "u1", "u1"));
    }

    #[test]
    fn test_other_member_cannot_edit() {
        assert!(!can_edit_task("member", "u1", "u4"));
    }

    #[test]
    fn test_manager_can_edit_any() {
        assert!(can_edit_task("manager", "u1", "u4"));
        assert!(can_edit_task("admin", "u1", "u4"));
    }

    #[test]
    fn test_guest_non_creator_cannot_edit() {
        assert!(!can_edit_task("guest", "u1", "u4"));
    }

    #[test]
    fn test_unknown_role_falls_back_to_ownership() {
        assert!(!can_edit_task("owner", "u1", "u4"));
        assert!(can_edit_task("owner", "u1", "u1"));
    }

    // ============== Delete Rule Tests ==============

    #[test]
    fn test_delete_has_no_ownership_exception() {
        assert!(!can_delete_task("member"));
        assert!(can_delete_task("manager"));
        assert!(can_delete_task("admin"));
        assert!(!can_delete_task("guest"));
    }

    // ============== Policy Tests ==============

    #[test]
    fn test_policy_edit() {
        let policy = TaskAccessPolicy::new();
        assert!(policy.ensure_can_edit(&Identity::new("u1", "org1", "member"), &t1()).is_ok());
        assert!(policy.ensure_can_edit(&Identity::new("u4", "org1", "manager"), &t1()).is_ok());

        let err = policy
            .ensure_can_edit(&Identity::new("u4", "org1", "member"), &t1())
            .unwrap_err();
        assert_eq!(err.kind(), "forbidden");
    }

    #[test]
    fn test_policy_suspended_creator_denied() {
        let caller = Identity::new("u1", "org1", "member").with_status(UserStatus::Suspended);
        assert!(TaskAccessPolicy::new().ensure_can_edit(&caller, &t1()).is_err());
    }

    #[test]
    fn test_policy_delete() {
        let policy = TaskAccessPolicy::new();
        assert!(policy.ensure_can_delete(&Identity::new("u1", "org1", "member")).is_err());
        assert!(policy.ensure_can_delete(&Identity::new("u9", "org1", "manager")).is_ok());
    }
}
