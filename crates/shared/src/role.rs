//! Role and permission value types
//!
//! Both sets are closed: every role and every capability token the kernel
//! understands is a variant here, so gates are checked exhaustively at
//! compile time. String forms match the tokens used on the wire.

use crate::error::{RoleNotFoundError, UnknownPermissionError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four organization roles, lowest privilege first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Member,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Member => "member",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// All roles, highest rank first
    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Manager, Role::Member, Role::Guest]
    }

    /// Resolve a role string, `None` for anything outside the closed set
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "member" => Some(Role::Member),
            "guest" => Some(Role::Guest),
            _ => None,
        }
    }

    /// Admins and managers may edit any task in their organization
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl FromStr for Role {
    type Err = RoleNotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| RoleNotFoundError {
            role_id: s.to_string(),
            available_roles: Role::all().iter().map(|r| r.as_str().to_string()).collect(),
        })
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability tokens, one per gated action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    OrgManage,
    UserCreate,
    UserDelete,
    UserInvite,
    UserManage,
    RoleManage,
    DeptManage,
    TaskView,
    TaskCreate,
    TaskEdit,
    TaskDelete,
    TaskAssign,
    ApprovalCreate,
    ApprovalManage,
    ApprovalApprove,
    ApprovalReject,
    AnnouncementView,
    AnnouncementCreate,
    AnnouncementEdit,
    AnnouncementDelete,
    ActivityView,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::OrgManage => "org:manage",
            Permission::UserCreate => "user:create",
            Permission::UserDelete => "user:delete",
            Permission::UserInvite => "user:invite",
            Permission::UserManage => "user:manage",
            Permission::RoleManage => "role:manage",
            Permission::DeptManage => "dept:manage",
            Permission::TaskView => "task:view",
            Permission::TaskCreate => "task:create",
            Permission::TaskEdit => "task:edit",
            Permission::TaskDelete => "task:delete",
            Permission::TaskAssign => "task:assign",
            Permission::ApprovalCreate => "approval:create",
            Permission::ApprovalManage => "approval:manage",
            Permission::ApprovalApprove => "approval:approve",
            Permission::ApprovalReject => "approval:reject",
            Permission::AnnouncementView => "announcement:view",
            Permission::AnnouncementCreate => "announcement:create",
            Permission::AnnouncementEdit => "announcement:edit",
            Permission::AnnouncementDelete => "announcement:delete",
            Permission::ActivityView => "activity:view",
        }
    }

    pub fn all() -> &'static [Permission] {
        &[
            Permission::OrgManage,
            Permission::UserCreate,
            Permission::UserDelete,
            Permission::UserInvite,
            Permission::UserManage,
            Permission::RoleManage,
            Permission::DeptManage,
            Permission::TaskView,
            Permission::TaskCreate,
            Permission::TaskEdit,
            Permission::TaskDelete,
            Permission::TaskAssign,
            Permission::ApprovalCreate,
            Permission::ApprovalManage,
            Permission::ApprovalApprove,
            Permission::ApprovalReject,
            Permission::AnnouncementView,
            Permission::AnnouncementCreate,
            Permission::AnnouncementEdit,
            Permission::AnnouncementDelete,
            Permission::ActivityView,
        ]
    }

    pub fn parse(value: &str) -> Option<Permission> {
        Permission::all().iter().copied().find(|p| p.as_str() == value)
    }
}

impl FromStr for Permission {
    type Err = UnknownPermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::parse(s).ok_or_else(|| UnknownPermissionError(s.to_string()))
    }
}

impl TryFrom<String> for Permission {
    type Error = UnknownPermissionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.as_str().to_string()
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
