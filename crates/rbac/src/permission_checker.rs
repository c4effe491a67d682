//! PermissionChecker - "may role R perform action A"
//!
//! The single authorization primitive. Every action gate in the kernel is
//! composed from [`PermissionChecker::allows`] or its string twin
//! [`has_permission`].

use crate::role_registry::RoleRegistry;
use shared::{Identity, KernelError, Permission, Result, Role};

/// String-keyed check used at the wire boundary.
///
/// Unknown roles and unknown permission tokens both answer `false`.
pub fn has_permission(role: &str, permission: &str) -> bool {
    match Permission::parse(permission) {
        Some(permission) => RoleRegistry::global()
            .permissions_for(role)
            .contains(&permission),
        None => false,
    }
}

/// Reject suspended callers before any other gate runs
pub fn ensure_active(caller: &Identity) -> Result<()> {
    if caller.is_suspended() {
        tracing::warn!(caller = %caller.id, "suspended user denied");
        return Err(KernelError::forbidden("user is suspended"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct PermissionChecker {
    registry: &'static RoleRegistry,
}

impl PermissionChecker {
    pub fn new() -> Self {
        Self {
            registry: RoleRegistry::global(),
        }
    }

    pub fn allows(&self, role: Role, permission: Permission) -> bool {
        self.registry.permissions(role).contains(&permission)
    }

    /// Check against a raw role string; unrecognized roles hold nothing
    pub fn allows_role_id(&self, role_id: &str, permission: Permission) -> bool {
        self.registry.permissions_for(role_id).contains(&permission)
    }

    /// Gate an operation on `permission` for an active caller
    pub fn require(&self, caller: &Identity, permission: Permission) -> Result<()> {
        ensure_active(caller)?;
        if self.allows_role_id(&caller.role, permission) {
            tracing::debug!(caller = %caller.id, %permission, "permission granted");
            Ok(())
        } else {
            tracing::warn!(caller = %caller.id, role = %caller.role, %permission, "permission denied");
            Err(KernelError::forbidden(format!(
                "role '{}' lacks '{}'",
                caller.role, permission
            )))
        }
    }
}

impl Default for PermissionChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::UserStatus;

    /// The role table written out as plain tokens
    fn expected_table() -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            (
                "admin",
                vec![
                    "org:manage", "user:create", "user:delete", "user:invite", "user:manage",
                    "role:manage", "dept:manage", "task:create", "task:edit", "task:delete",
                    "task:assign", "approval:create", "approval:manage", "approval:approve",
                    "approval:reject", "announcement:create", "announcement:edit",
                    "announcement:delete", "activity:view",
                ],
            ),
            (
                "manager",
                vec![
                    "task:create", "task:edit", "task:delete", "task:assign", "approval:create",
                    "approval:approve", "approval:reject", "announcement:create",
                    "announcement:edit", "announcement:delete", "user:invite",
                ],
            ),
            (
                "member",
                vec!["task:create", "task:edit", "approval:create", "announcement:view"],
            ),
            ("guest", vec!["task:view", "announcement:view"]),
        ]
    }

    // ============== Table Tests ==============

    #[test]
    fn test_has_permission_matches_table_exhaustively() {
        for (role, granted) in expected_table() {
            for permission in Permission::all() {
                let token = permission.as_str();
                assert_eq!(
                    has_permission(role, token),
                    granted.contains(&token),
                    "{} / {}",
                    role,
                    token
                );
            }
        }
    }

    #[test]
    fn test_typed_and_string_checks_agree() {
        let checker = PermissionChecker::new();
        for role in Role::all() {
            for permission in Permission::all() {
                assert_eq!(
                    checker.allows(*role, *permission),
                    has_permission(role.as_str(), permission.as_str())
                );
            }
        }
    }

    #[test]
    fn test_has_permission_is_deterministic() {
        for _ in 0..3 {
            assert!(has_permission("manager", "approval:approve"));
            assert!(!has_permission("member", "approval:approve"));
        }
    }

    // ============== Deny-by-default Tests ==============

    #[test]
    fn test_unknown_role_denied() {
        for permission in Permission::all() {
            assert!(!has_permission("superadmin", permission.as_str()));
        }
    }

    #[test]
    fn test_unknown_permission_denied() {
        assert!(!has_permission("admin", "task:destroy"));
        assert!(!has_permission("admin", ""));
        assert!(!has_permission("admin", "*"));
    }

    #[test]
    fn test_role_string_is_exact() {
        assert!(!has_permission("Admin", "org:manage"));
        assert!(!has_permission("admin ", "org:manage"));
    }

    // ============== Require Tests ==============

    #[test]
    fn test_require_grants() {
        let caller = Identity::new("u1", "org1", "manager");
        assert!(PermissionChecker::new()
            .require(&caller, Permission::TaskDelete)
            .is_ok());
    }

    #[test]
    fn test_require_denies_missing_permission() {
        let caller = Identity::new("u1", "org1", "member");
        let err = PermissionChecker::new()
            .require(&caller, Permission::TaskDelete)
            .unwrap_err();
        assert_eq!(err.kind(), "forbidden");
    }

    #[test]
    fn test_require_denies_suspended_admin() {
        let caller = Identity::new("u1", "org1", "admin").with_status(UserStatus::Suspended);
        let err = PermissionChecker::new()
            .require(&caller, Permission::OrgManage)
            .unwrap_err();
        assert_eq!(err, KernelError::forbidden("user is suspended"));
    }
}
