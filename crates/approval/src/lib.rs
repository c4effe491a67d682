//! # Opsdesk Approval
//!
//! The approval request lifecycle: a request opens `pending` against one
//! designated approver and ends `approved` or `rejected`, with every
//! decision gated by tenant scope, permission and approver eligibility.
//!
//! ```text
//!            approve            
//!   pending ─────────▶ approved  (terminal)
//!      │
//!      └─────────────▶ rejected  (terminal)
//!            reject
//! ```

pub mod store;
pub mod workflow;

pub use store::{ApprovalStore, InMemoryApprovalStore};
pub use workflow::{ApprovalAction, ApprovalWorkflow, TransitionRequest};
