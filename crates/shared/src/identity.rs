//! Authenticated caller identity
//!
//! Produced by the authentication collaborator for each request. The role
//! is carried as the raw string it was issued with; resolution to a [`Role`]
//! happens at the gates, where an unknown string simply grants nothing.

use crate::role::Role;
use serde::{Deserialize, Serialize};

/// Membership status of a user within its organization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

/// Who is asking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub organization_id: String,
    pub role: String,
    #[serde(default)]
    pub status: UserStatus,
}

impl Identity {
    /// Create an active identity
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            role: role.into(),
            status: UserStatus::Active,
        }
    }

    /// Builder: set status
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    /// The resolved role, if the role string is one we know
    pub fn resolved_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.resolved_role() == Some(Role::Admin)
    }

    pub fn is_suspended(&self) -> bool {
        self.status == UserStatus::Suspended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_identity_is_active() {
        let caller = Identity::new("u1", "org1", "member");
        assert!(!caller.is_suspended());
        assert_eq!(caller.resolved_role(), Some(Role::Member));
    }

    #[test]
    fn test_unknown_role_does_not_resolve() {
        let caller = Identity::new("u1", "org1", "superuser");
        assert_eq!(caller.resolved_role(), None);
        assert!(!caller.is_admin());
    }

    #[test]
    fn test_identity_deserialize_defaults_status() {
        let json = r#"{"id":"u2","organizationId":"org1","role":"admin"}"#;
        let caller: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(caller.status, UserStatus::Active);
        assert!(caller.is_admin());
    }

    #[test]
    fn test_suspended_identity() {
        let caller = Identity::new("u1", "org1", "admin").with_status(UserStatus::Suspended);
        assert!(caller.is_suspended());
    }
}
