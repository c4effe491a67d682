//! # Opsdesk Shared
//!
//! Common types used across all Opsdesk crates: the closed role and
//! permission sets, caller identities, tenant-owned entity models and the
//! error taxonomy every decision surfaces through.

pub mod announcement;
pub mod approval;
pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod role;
pub mod task;

// Re-exports
pub use announcement::*;
pub use approval::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use identity::*;
pub use role::*;
pub use task::*;
