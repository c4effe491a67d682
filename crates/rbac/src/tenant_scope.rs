//! TenantScope - Organization isolation guard
//!
//! A cross-tenant hit is reported exactly like a miss, so a caller never
//! learns that an id exists in another organization.

use shared::{KernelError, Result, Scoped};

/// Equality check between the entity's organization and the caller's
pub fn is_in_scope(entity_org_id: &str, caller_org_id: &str) -> bool {
    entity_org_id == caller_org_id
}

/// Turn a fetch-by-id result into a scoped one
pub fn scoped<T: Scoped>(found: Option<T>, id: &str, caller_org_id: &str) -> Result<T> {
    match found {
        Some(entity) if is_in_scope(entity.organization_id(), caller_org_id) => Ok(entity),
        Some(entity) => {
            tracing::debug!(
                id,
                entity_org = entity.organization_id(),
                caller_org = caller_org_id,
                "cross-tenant access reported as missing"
            );
            Err(KernelError::not_found(T::KIND, id))
        }
        None => Err(KernelError::not_found(T::KIND, id)),
    }
}

/// Keep only entities belonging to the caller's organization
pub fn retain_in_scope<T: Scoped>(entities: Vec<T>, caller_org_id: &str) -> Vec<T> {
    entities
        .into_iter()
        .filter(|e| is_in_scope(e.organization_id(), caller_org_id))
        .collect()
}
