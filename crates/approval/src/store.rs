//! Approval persistence port and its in-memory adapter

use shared::{ApprovalRequest, ApprovalStatus, Commit, EntityKind, Result, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// What the workflow needs from the persistence collaborator.
///
/// Writes take a [`Commit`] hook, which the store runs after its
/// precondition holds and before the new record is visible. If the hook
/// fails nothing is written. `decide` is a compare-and-swap on `status`
/// and is what serializes two decisions racing on the same request.
pub trait ApprovalStore: Send + Sync {
    fn find_approval_by_id(&self, id: &str) -> std::result::Result<Option<ApprovalRequest>, StoreError>;

    fn insert_approval(&self, approval: &ApprovalRequest, commit: Commit<'_>) -> Result<()>;

    /// Store a decided request if the stored one still has status `expected`
    fn decide(
        &self,
        expected: ApprovalStatus,
        decided: &ApprovalRequest,
        commit: Commit<'_>,
    ) -> Result<()>;

    /// All requests of one organization, optionally filtered by status
    fn list_approvals(
        &self,
        organization_id: &str,
        status: Option<ApprovalStatus>,
    ) -> std::result::Result<Vec<ApprovalRequest>, StoreError>;
}

/// Thread-safe in-memory approval store.
///
/// Writers take turns on `writer`; readers only touch `approvals`, so a
/// slow commit hook never blocks a lookup and never exposes its record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApprovalStore {
    approvals: Arc<RwLock<HashMap<String, ApprovalRequest>>>,
    writer: Arc<Mutex<()>>,
}

impl InMemoryApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn turn(&self) -> std::result::Result<MutexGuard<'_, ()>, StoreError> {
        self.writer
            .lock()
            .map_err(|_| StoreError::persistence("Failed to acquire writer lock"))
    }

    fn publish(&self, approval: &ApprovalRequest) -> std::result::Result<(), StoreError> {
        let mut approvals = self
            .approvals
            .write()
            .map_err(|_| StoreError::persistence("Failed to acquire write lock"))?;
        approvals.insert(approval.id.clone(), approval.clone());
        Ok(())
    }
}

impl ApprovalStore for InMemoryApprovalStore {
    fn find_approval_by_id(&self, id: &str) -> std::result::Result<Option<ApprovalRequest>, StoreError> {
        let approvals = self
            .approvals
            .read()
            .map_err(|_| StoreError::persistence("Failed to acquire read lock"))?;
        Ok(approvals.get(id).cloned())
    }

    fn insert_approval(&self, approval: &ApprovalRequest, commit: Commit<'_>) -> Result<()> {
        let _turn = self.turn()?;
        if self.find_approval_by_id(&approval.id)?.is_some() {
            return Err(StoreError::persistence(format!(
                "approval '{}' already exists",
                approval.id
            ))
            .into());
        }
        commit()?;
        Ok(self.publish(approval)?)
    }

    fn decide(
        &self,
        expected: ApprovalStatus,
        decided: &ApprovalRequest,
        commit: Commit<'_>,
    ) -> Result<()> {
        let _turn = self.turn()?;
        match self.find_approval_by_id(&decided.id)? {
            Some(current) if current.status == expected => {}
            Some(_) => return Err(StoreError::conflict(EntityKind::Approval, &decided.id).into()),
            None => {
                return Err(StoreError::persistence(format!(
                    "approval '{}' vanished during update",
                    decided.id
                ))
                .into())
            }
        }
        commit()?;
        Ok(self.publish(decided)?)
    }

    fn list_approvals(
        &self,
        organization_id: &str,
        status: Option<ApprovalStatus>,
    ) -> std::result::Result<Vec<ApprovalRequest>, StoreError> {
        let approvals = self
            .approvals
            .read()
            .map_err(|_| StoreError::persistence("Failed to acquire read lock"))?;
        Ok(approvals
            .values()
            .filter(|a| a.organization_id == organization_id)
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{KernelError, NewApproval};

    fn a1() -> ApprovalRequest {
        ApprovalRequest::open(NewApproval::new("Laptop", "u2"), "org1", "u1").with_id("A1")
    }

    fn seeded() -> InMemoryApprovalStore {
        let store = InMemoryApprovalStore::new();
        store.insert_approval(&a1(), &mut || Ok(())).unwrap();
        store
    }

    // ============== Insert Tests ==============

    #[test]
    fn test_insert_and_find() {
        let store = seeded();

        let found = store.find_approval_by_id("A1").unwrap();
        assert_eq!(found.unwrap().title, "Laptop");
        assert!(store.find_approval_by_id("A2").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_rejected_before_commit() {
        let store = seeded();
        let mut committed = false;
        let result = store.insert_approval(&a1(), &mut || {
            committed = true;
            Ok(())
        });
        assert!(result.is_err());
        assert!(!committed);
    }

    #[test]
    fn test_failed_commit_leaves_insert_invisible() {
        let store = InMemoryApprovalStore::new();
        let err = store
            .insert_approval(&a1(), &mut || {
                assert!(store.find_approval_by_id("A1").unwrap().is_none());
                Err(KernelError::LogWriteFailed("down".to_string()))
            })
            .unwrap_err();

        assert_eq!(err.kind(), "log_write_failed");
        assert!(store.find_approval_by_id("A1").unwrap().is_none());
    }

    // ============== Decide Tests ==============

    #[test]
    fn test_decide_compare_and_swap() {
        let store = seeded();

        let mut decided = a1();
        decided.approve("u2", None, Utc::now()).unwrap();
        store.decide(ApprovalStatus::Pending, &decided, &mut || Ok(())).unwrap();

        // Second writer still expects pending; its hook never runs
        let mut late = a1();
        late.reject("u2", "no", Utc::now()).unwrap();
        let mut committed = false;
        let err = store
            .decide(ApprovalStatus::Pending, &late, &mut || {
                committed = true;
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_state");
        assert!(!committed);

        let stored = store.find_approval_by_id("A1").unwrap().unwrap();
        assert_eq!(stored.status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_decision_hidden_until_commit_succeeds() {
        let store = seeded();
        let mut decided = a1();
        decided.approve("u2", None, Utc::now()).unwrap();

        let mut seen = Vec::new();
        let result = store.decide(ApprovalStatus::Pending, &decided, &mut || {
            seen.push(store.find_approval_by_id("A1").unwrap().unwrap().status);
            Err(KernelError::LogWriteFailed("down".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(seen, vec![ApprovalStatus::Pending]);
        let stored = store.find_approval_by_id("A1").unwrap().unwrap();
        assert_eq!(stored.status, ApprovalStatus::Pending);
    }

    #[test]
    fn test_decide_missing_record() {
        let store = InMemoryApprovalStore::new();
        assert!(matches!(
            store.decide(ApprovalStatus::Pending, &a1(), &mut || Ok(())),
            Err(KernelError::Storage(_))
        ));
    }

    #[test]
    fn test_list_filters_org_and_status() {
        let store = seeded();
        let other_org =
            ApprovalRequest::open(NewApproval::new("Desk", "u7"), "org2", "u6").with_id("B1");
        store.insert_approval(&other_org, &mut || Ok(())).unwrap();

        assert_eq!(store.list_approvals("org1", None).unwrap().len(), 1);
        assert_eq!(
            store.list_approvals("org1", Some(ApprovalStatus::Approved)).unwrap().len(),
            0
        );
        assert_eq!(
            store.list_approvals("org2", Some(ApprovalStatus::Pending)).unwrap().len(),
            1
        );
    }
}
