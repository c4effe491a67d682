//! Error types for Opsdesk

use crate::entity::EntityKind;
use thiserror::Error;

/// Error thrown when a role string does not name a known role
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Role '{role_id}' not found. Available roles: {}", available_roles.join(", "))]
pub struct RoleNotFoundError {
    pub role_id: String,
    pub available_roles: Vec<String>,
}

/// Error thrown when a permission string does not name a known permission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Permission '{0}' is not defined")]
pub struct UnknownPermissionError(pub String);

/// Errors reported by a persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The record changed underneath a compare-and-swap write
    #[error("Concurrent modification of {entity} '{id}'")]
    Conflict { entity: EntityKind, id: String },

    /// The store could not complete the read or write
    #[error("Persistence error: {message}")]
    Persistence { message: String },
}

impl StoreError {
    pub fn conflict(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            id: id.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }
}

/// Outcome of a rejected kernel decision.
///
/// `NotFound` covers both absent and cross-tenant entities; callers cannot
/// tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("{entity} '{id}' is already {status}")]
    InvalidState {
        entity: EntityKind,
        id: String,
        status: String,
    },

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: &'static str, message: String },

    #[error("Activity log write failed: {0}")]
    LogWriteFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl KernelError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            message: message.into(),
        }
    }

    /// Short machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            KernelError::NotFound { .. } => "not_found",
            KernelError::Forbidden { .. } => "forbidden",
            KernelError::InvalidState { .. } => "invalid_state",
            KernelError::ValidationFailed { .. } => "validation_failed",
            KernelError::LogWriteFailed(_) => "log_write_failed",
            KernelError::Storage(_) => "storage",
        }
    }
}

impl From<StoreError> for KernelError {
    fn from(err: StoreError) -> Self {
        match err {
            // Losing a CAS means another write already landed.
            StoreError::Conflict { entity, id } => {
                let status = match entity {
                    EntityKind::Approval => "no longer pending",
                    _ => "changed by another request",
                };
                KernelError::InvalidState {
                    entity,
                    id,
                    status: status.to_string(),
                }
            }
            StoreError::Persistence { message } => KernelError::Storage(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;
