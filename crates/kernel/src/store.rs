//! Task and announcement persistence ports with in-memory adapters
//!
//! Every write takes a [`Commit`] hook that runs once the write's
//! precondition holds and before anyone can see the result.

use crate::ops_kernel::Stores;
use approval::InMemoryApprovalStore;
use audit::InMemoryActivityLog;
use shared::{
    Announcement, Commit, EntityKind, KernelError, Result, StoreError, Task, TaskStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub trait TaskStore: Send + Sync {
    fn find_task_by_id(&self, id: &str) -> std::result::Result<Option<Task>, StoreError>;

    fn insert_task(&self, task: &Task, commit: Commit<'_>) -> Result<()>;

    /// Replace a task, provided it is unchanged since `seen` was read
    fn update_task(&self, seen: &Task, task: &Task, commit: Commit<'_>) -> Result<()>;

    /// Remove a task, provided it is unchanged since `seen` was read
    fn delete_task(&self, seen: &Task, commit: Commit<'_>) -> Result<()>;

    fn list_tasks(
        &self,
        organization_id: &str,
        status: Option<TaskStatus>,
    ) -> std::result::Result<Vec<Task>, StoreError>;
}

pub trait AnnouncementStore: Send + Sync {
    fn insert_announcement(&self, announcement: &Announcement, commit: Commit<'_>) -> Result<()>;

    fn list_announcements(
        &self,
        organization_id: &str,
    ) -> std::result::Result<Vec<Announcement>, StoreError>;
}

/// Rows plus a writer turn; readers never wait on a commit hook
#[derive(Debug)]
struct Table<T> {
    rows: RwLock<HashMap<String, T>>,
    writer: Mutex<()>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
        }
    }
}

impl<T> Table<T> {
    fn read(&self) -> std::result::Result<RwLockReadGuard<'_, HashMap<String, T>>, StoreError> {
        self.rows
            .read()
            .map_err(|_| StoreError::persistence("Failed to acquire read lock"))
    }

    fn write(&self) -> std::result::Result<RwLockWriteGuard<'_, HashMap<String, T>>, StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::persistence("Failed to acquire write lock"))
    }

    fn turn(&self) -> std::result::Result<MutexGuard<'_, ()>, StoreError> {
        self.writer
            .lock()
            .map_err(|_| StoreError::persistence("Failed to acquire writer lock"))
    }
}

/// In-memory task store
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<Table<Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored copy must still equal `seen`
    fn ensure_unchanged(&self, seen: &Task) -> Result<()> {
        match self.tasks.read()?.get(&seen.id) {
            Some(stored) if stored == seen => Ok(()),
            Some(_) => Err(StoreError::conflict(EntityKind::Task, &seen.id).into()),
            None => Err(KernelError::not_found(EntityKind::Task, &seen.id)),
        }
    }
}

impl TaskStore for InMemoryTaskStore {
    fn find_task_by_id(&self, id: &str) -> std::result::Result<Option<Task>, StoreError> {
        Ok(self.tasks.read()?.get(id).cloned())
    }

    fn insert_task(&self, task: &Task, commit: Commit<'_>) -> Result<()> {
        let _turn = self.tasks.turn()?;
        if self.tasks.read()?.contains_key(&task.id) {
            return Err(StoreError::persistence(format!("task '{}' already exists", task.id)).into());
        }
        commit()?;
        self.tasks.write()?.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn update_task(&self, seen: &Task, task: &Task, commit: Commit<'_>) -> Result<()> {
        let _turn = self.tasks.turn()?;
        self.ensure_unchanged(seen)?;
        commit()?;
        self.tasks.write()?.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn delete_task(&self, seen: &Task, commit: Commit<'_>) -> Result<()> {
        let _turn = self.tasks.turn()?;
        self.ensure_unchanged(seen)?;
        commit()?;
        self.tasks.write()?.remove(&seen.id);
        Ok(())
    }

    fn list_tasks(
        &self,
        organization_id: &str,
        status: Option<TaskStatus>,
    ) -> std::result::Result<Vec<Task>, StoreError> {
        Ok(self
            .tasks
            .read()?
            .values()
            .filter(|t| t.organization_id == organization_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect())
    }
}

/// In-memory announcement store
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnnouncementStore {
    announcements: Arc<Table<Announcement>>,
}

impl InMemoryAnnouncementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnouncementStore for InMemoryAnnouncementStore {
    fn insert_announcement(&self, announcement: &Announcement, commit: Commit<'_>) -> Result<()> {
        let _turn = self.announcements.turn()?;
        commit()?;
        self.announcements
            .write()?
            .insert(announcement.id.clone(), announcement.clone());
        Ok(())
    }

    fn list_announcements(
        &self,
        organization_id: &str,
    ) -> std::result::Result<Vec<Announcement>, StoreError> {
        Ok(self
            .announcements
            .read()?
            .values()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

/// A full set of in-memory stores; clones share state
#[derive(Debug, Clone, Default)]
pub struct InMemoryStores {
    pub tasks: InMemoryTaskStore,
    pub announcements: InMemoryAnnouncementStore,
    pub approvals: InMemoryApprovalStore,
    pub activity: InMemoryActivityLog,
}

impl InMemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stores(&self) -> Stores {
        Stores {
            tasks: Arc::new(self.tasks.clone()),
            announcements: Arc::new(self.announcements.clone()),
            approvals: Arc::new(self.approvals.clone()),
            activity: Arc::new(self.activity.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{NewAnnouncement, NewTask};

    fn t1() -> Task {
        Task::create(NewTask::new("Inventory"), "org1", "u1").with_id("T1")
    }

    fn seeded() -> InMemoryTaskStore {
        let store = InMemoryTaskStore::new();
        store.insert_task(&t1(), &mut || Ok(())).unwrap();
        store
    }

    fn edited(from: &Task, status: TaskStatus) -> Task {
        let mut task = from.clone();
        task.apply(&shared::TaskUpdate {
            status: Some(status),
            ..Default::default()
        });
        task
    }

    // ============== Task Store Tests ==============

    #[test]
    fn test_task_store_crud() {
        let store = seeded();
        assert!(store.insert_task(&t1(), &mut || Ok(())).is_err());

        let seen = store.find_task_by_id("T1").unwrap().unwrap();
        let done = edited(&seen, TaskStatus::Done);
        store.update_task(&seen, &done, &mut || Ok(())).unwrap();
        assert_eq!(
            store.find_task_by_id("T1").unwrap().unwrap().status,
            TaskStatus::Done
        );

        store.delete_task(&done, &mut || Ok(())).unwrap();
        assert!(store.find_task_by_id("T1").unwrap().is_none());

        let err = store.delete_task(&done, &mut || Ok(())).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_stale_update_is_a_conflict() {
        let store = seeded();
        let seen = store.find_task_by_id("T1").unwrap().unwrap();

        let first = edited(&seen, TaskStatus::Review);
        store.update_task(&seen, &first, &mut || Ok(())).unwrap();

        // A second editor still holding the old copy does not overwrite it
        let mut committed = false;
        let stale = edited(&seen, TaskStatus::Done);
        let err = store
            .update_task(&seen, &stale, &mut || {
                committed = true;
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_state");
        assert!(!committed);
        assert_eq!(
            store.find_task_by_id("T1").unwrap().unwrap().status,
            TaskStatus::Review
        );
        assert!(store.delete_task(&seen, &mut || Ok(())).is_err());
    }

    #[test]
    fn test_failed_commit_writes_nothing() {
        let store = seeded();
        let seen = store.find_task_by_id("T1").unwrap().unwrap();
        let fail = || -> Result<()> { Err(KernelError::LogWriteFailed("down".to_string())) };

        assert!(store
            .update_task(&seen, &edited(&seen, TaskStatus::Done), &mut fail.clone())
            .is_err());
        assert!(store.delete_task(&seen, &mut fail.clone()).is_err());
        let other = Task::create(NewTask::new("b"), "org1", "u1").with_id("T2");
        assert!(store.insert_task(&other, &mut fail.clone()).is_err());

        assert_eq!(store.find_task_by_id("T1").unwrap().unwrap(), seen);
        assert!(store.find_task_by_id("T2").unwrap().is_none());
    }

    #[test]
    fn test_task_store_list_filters() {
        let store = seeded();
        store
            .insert_task(&Task::create(NewTask::new("b"), "org2", "u1").with_id("T2"), &mut || Ok(()))
            .unwrap();

        assert_eq!(store.list_tasks("org1", None).unwrap().len(), 1);
        assert_eq!(store.list_tasks("org1", Some(TaskStatus::Todo)).unwrap().len(), 1);
        assert_eq!(store.list_tasks("org1", Some(TaskStatus::Done)).unwrap().len(), 0);
    }

    // ============== Announcement Store Tests ==============

    #[test]
    fn test_announcement_store() {
        let store = InMemoryAnnouncementStore::new();
        let announcement = Announcement::publish(NewAnnouncement::new("Hi", "All hands"), "org1", "u1");
        store.insert_announcement(&announcement, &mut || Ok(())).unwrap();

        assert_eq!(store.list_announcements("org1").unwrap().len(), 1);
        assert!(store.list_announcements("org2").unwrap().is_empty());

        let draft = Announcement::publish(NewAnnouncement::new("Draft", "Later"), "org1", "u1");
        let err = store
            .insert_announcement(&draft, &mut || Err(KernelError::LogWriteFailed("down".into())))
            .unwrap_err();
        assert_eq!(err.kind(), "log_write_failed");
        assert_eq!(store.list_announcements("org1").unwrap().len(), 1);
    }
}
