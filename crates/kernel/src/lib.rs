//! # Opsdesk Kernel
//!
//! Authorization and approval-workflow kernel for the Opsdesk operations
//! backend. Request handlers pass an authenticated [`Identity`] and an
//! intent; the kernel decides and delegates the write to a store.
//!
//! ```text
//! Identity + intent
//!   └─▶ suspended? ─▶ tenant scope ─▶ permission / task policy
//!         ─▶ (approvals) state machine ─▶ store write ─▶ activity log
//! ```

pub mod ops_kernel;
pub mod store;

pub use ops_kernel::{OpsKernel, Stores};
pub use store::{
    AnnouncementStore, InMemoryAnnouncementStore, InMemoryStores, InMemoryTaskStore, TaskStore,
};

// The boundary functions request handlers call directly
pub use rbac::{can_edit_task, has_permission, is_in_scope};

pub use approval::{ApprovalAction, TransitionRequest};
pub use audit::{ActivityAction, ActivityLogEntry, ActivityRecord};
pub use shared::{Identity, KernelConfig, KernelError};
