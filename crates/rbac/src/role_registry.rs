//! RoleRegistry - The fixed role table
//!
//! Ranks and permission sets are immutable configuration. The table is built
//! once on first use and shared for the life of the process.

use shared::{Permission, Role};
use std::collections::BTreeSet;
use std::sync::OnceLock;

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::OrgManage,
    Permission::UserCreate,
    Permission::UserDelete,
    Permission::UserInvite,
    Permission::UserManage,
    Permission::RoleManage,
    Permission::DeptManage,
    Permission::TaskCreate,
    Permission::TaskEdit,
    Permission::TaskDelete,
    Permission::TaskAssign,
    Permission::ApprovalCreate,
    Permission::ApprovalManage,
    Permission::ApprovalApprove,
    Permission::ApprovalReject,
    Permission::AnnouncementCreate,
    Permission::AnnouncementEdit,
    Permission::AnnouncementDelete,
    Permission::ActivityView,
];

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::TaskCreate,
    Permission::TaskEdit,
    Permission::TaskDelete,
    Permission::TaskAssign,
    Permission::ApprovalCreate,
    Permission::ApprovalApprove,
    Permission::ApprovalReject,
    Permission::AnnouncementCreate,
    Permission::AnnouncementEdit,
    Permission::AnnouncementDelete,
    Permission::UserInvite,
];

const MEMBER_PERMISSIONS: &[Permission] = &[
    Permission::TaskCreate,
    Permission::TaskEdit,
    Permission::ApprovalCreate,
    Permission::AnnouncementView,
];

const GUEST_PERMISSIONS: &[Permission] = &[Permission::TaskView, Permission::AnnouncementView];

static NO_PERMISSIONS: BTreeSet<Permission> = BTreeSet::new();

/// One row of the role table
#[derive(Debug, Clone)]
pub struct RoleDefinition {
    pub role: Role,
    pub rank: u8,
    pub description: &'static str,
    permissions: BTreeSet<Permission>,
}

impl RoleDefinition {
    fn new(role: Role, rank: u8, description: &'static str, permissions: &[Permission]) -> Self {
        Self {
            role,
            rank,
            description,
            permissions: permissions.iter().copied().collect(),
        }
    }

    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Static mapping of roles to rank and permission set
#[derive(Debug)]
pub struct RoleRegistry {
    /// Indexed by `slot(role)`
    definitions: [RoleDefinition; 4],
}

impl RoleRegistry {
    /// The process-wide registry
    pub fn global() -> &'static RoleRegistry {
        static REGISTRY: OnceLock<RoleRegistry> = OnceLock::new();
        REGISTRY.get_or_init(RoleRegistry::build)
    }

    fn build() -> Self {
        Self {
            definitions: [
                RoleDefinition::new(
                    Role::Admin,
                    3,
                    "Full organization control",
                    ADMIN_PERMISSIONS,
                ),
                RoleDefinition::new(
                    Role::Manager,
                    2,
                    "Runs tasks, approvals and announcements for a team",
                    MANAGER_PERMISSIONS,
                ),
                RoleDefinition::new(
                    Role::Member,
                    1,
                    "Creates and edits own work, files approval requests",
                    MEMBER_PERMISSIONS,
                ),
                RoleDefinition::new(Role::Guest, 0, "Read-only visitor", GUEST_PERMISSIONS),
            ],
        }
    }

    fn slot(role: Role) -> usize {
        match role {
            Role::Admin => 0,
            Role::Manager => 1,
            Role::Member => 2,
            Role::Guest => 3,
        }
    }

    /// Get the definition of a role
    pub fn definition(&self, role: Role) -> &RoleDefinition {
        &self.definitions[Self::slot(role)]
    }

    /// All definitions, highest rank first
    pub fn definitions(&self) -> &[RoleDefinition] {
        &self.definitions
    }

    pub fn rank(&self, role: Role) -> u8 {
        self.definition(role).rank
    }

    pub fn permissions(&self, role: Role) -> &BTreeSet<Permission> {
        self.definition(role).permissions()
    }

    /// Look up a role by its wire string
    pub fn resolve(&self, role_id: &str) -> Option<&RoleDefinition> {
        Role::parse(role_id).map(|role| self.definition(role))
    }

    /// Permission set for a role string; empty for an unrecognized role
    pub fn permissions_for(&self, role_id: &str) -> &BTreeSet<Permission> {
        self.resolve(role_id)
            .map(RoleDefinition::permissions)
            .unwrap_or(&NO_PERMISSIONS)
    }

    /// Rank for a role string, `None` for an unrecognized role
    pub fn rank_of(&self, role_id: &str) -> Option<u8> {
        self.resolve(role_id).map(|d| d.rank)
    }

    /// Whether `role` sits at or above `minimum` in the hierarchy
    pub fn at_least(&self, role: Role, minimum: Role) -> bool {
        self.rank(role) >= self.rank(minimum)
    }
}
