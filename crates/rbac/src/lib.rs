//! # Opsdesk RBAC
//!
//! Role-Based Access Control for Opsdesk.
//!
//! ## Components
//!
//! - `RoleRegistry` - Fixed role table (rank and permission set per role)
//! - `PermissionChecker` - The single authorization primitive
//! - `tenant_scope` - Organization isolation guard for every fetch-by-id
//! - `TaskAccessPolicy` - Ownership-aware task edit rule

pub mod permission_checker;
pub mod role_registry;
pub mod task_access;
pub mod tenant_scope;

pub use permission_checker::{ensure_active, has_permission, PermissionChecker};
pub use role_registry::{RoleDefinition, RoleRegistry};
pub use task_access::{can_delete_task, can_edit_task, TaskAccessPolicy};
pub use tenant_scope::{is_in_scope, retain_in_scope, scoped};
