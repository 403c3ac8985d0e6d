//! In-memory storage backend.
//!
//! Reference [`TodoStorage`] implementation backed by `watch` channels.
//! The channels hold the stored sets: every confirmed write mutates the
//! set and re-emits it to observers in one step, so observation can never
//! run ahead of (or behind) the stored data.
//!
//! Writes serialize through a single async mutex. That matches the
//! one-writer discipline durable backends enforce and keeps the
//! conditional group delete atomic with respect to concurrent todo
//! inserts.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use todoflow_core::entity::{Group, GroupUid, Todo};
use todoflow_core::storage::{Result, TodoStorage};

struct Inner {
    write_lock: Mutex<()>,
    groups: watch::Sender<Vec<Group>>,
    todos: watch::Sender<Vec<Todo>>,
}

/// In-memory storage backend
///
/// Cloning is cheap; clones share the same stored sets.
///
/// # Example
///
/// ```ignore
/// let storage = MemoryStorage::with_records(
///     vec![Group::new(GroupUid::new(0), "💼".into(), "Work".into())],
///     Vec::new(),
/// );
/// let store = TodoStore::open(Arc::new(storage), TodoEnvironment::system());
/// ```
#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

impl MemoryStorage {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(Vec::new(), Vec::new())
    }

    /// Create a backend pre-seeded with records
    #[must_use]
    pub fn with_records(groups: Vec<Group>, todos: Vec<Todo>) -> Self {
        let (groups_tx, _) = watch::channel(groups);
        let (todos_tx, _) = watch::channel(todos);

        Self {
            inner: Arc::new(Inner {
                write_lock: Mutex::new(()),
                groups: groups_tx,
                todos: todos_tx,
            }),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStorage for MemoryStorage {
    fn insert_todo(&self, todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let _guard = self.inner.write_lock.lock().await;
            self.inner.todos.send_modify(|stored| stored.push(todo));
            Ok(())
        })
    }

    fn update_todo(&self, todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let _guard = self.inner.write_lock.lock().await;
            // A row deleted concurrently stays absent; the write still
            // confirms, mirroring the silent no-op contract.
            self.inner.todos.send_if_modified(|stored| {
                match stored.iter_mut().find(|t| t.uid == todo.uid) {
                    Some(slot) => {
                        *slot = todo;
                        true
                    }
                    None => false,
                }
            });
            Ok(())
        })
    }

    fn delete_todo(&self, todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let _guard = self.inner.write_lock.lock().await;
            self.inner.todos.send_if_modified(|stored| {
                let before = stored.len();
                stored.retain(|t| t.uid != todo.uid);
                stored.len() != before
            });
            Ok(())
        })
    }

    fn insert_group(&self, group: Group) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let _guard = self.inner.write_lock.lock().await;
            self.inner.groups.send_modify(|stored| stored.push(group));
            Ok(())
        })
    }

    fn update_group(&self, group: Group) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let _guard = self.inner.write_lock.lock().await;
            self.inner.groups.send_if_modified(|stored| {
                match stored.iter_mut().find(|g| g.uid == group.uid) {
                    Some(slot) => {
                        *slot = group;
                        true
                    }
                    None => false,
                }
            });
            Ok(())
        })
    }

    fn delete_group_if_empty(
        &self,
        uid: GroupUid,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + '_>> {
        Box::pin(async move {
            let _guard = self.inner.write_lock.lock().await;

            // The reference check and the delete share the write lock, so
            // no todo insert can slip between them.
            let referenced = self.inner.todos.borrow().iter().any(|t| t.group == uid);
            if referenced {
                return Ok(0);
            }

            let mut removed = false;
            self.inner.groups.send_if_modified(|stored| {
                let before = stored.len();
                stored.retain(|g| g.uid != uid);
                removed = stored.len() != before;
                removed
            });

            Ok(u64::from(removed))
        })
    }

    fn observe_todos(&self) -> watch::Receiver<Vec<Todo>> {
        self.inner.todos.subscribe()
    }

    fn observe_groups(&self) -> watch::Receiver<Vec<Group>> {
        self.inner.groups.subscribe()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("groups", &self.inner.groups.borrow().len())
            .field("todos", &self.inner.todos.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use todoflow_core::entity::TodoUid;

    #[allow(clippy::unwrap_used)] // Panics: hardcoded timestamp is valid
    fn sample_todo(uid: i64, group: i64) -> Todo {
        let stamp = Utc.timestamp_opt(1_000 + uid, 0).single().unwrap();
        Todo::new(
            TodoUid::new(uid),
            GroupUid::new(group),
            format!("todo {uid}"),
            String::new(),
            stamp,
        )
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)] // Test code can unwrap
    async fn test_insert_reaches_observers() {
        let storage = MemoryStorage::new();
        let mut observed = storage.observe_todos();

        storage.insert_todo(sample_todo(0, 1)).await.unwrap();

        observed.changed().await.unwrap();
        assert_eq!(observed.borrow().len(), 1);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)] // Test code can unwrap
    async fn test_update_replaces_matching_row() {
        let storage = MemoryStorage::with_records(Vec::new(), vec![sample_todo(0, 1)]);

        let mut edited = sample_todo(0, 1);
        edited.subject = "rewritten".to_string();
        storage.update_todo(edited).await.unwrap();

        assert_eq!(storage.observe_todos().borrow()[0].subject, "rewritten");
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)] // Test code can unwrap
    async fn test_update_of_missing_row_confirms_without_effect() {
        let storage = MemoryStorage::new();

        storage.update_todo(sample_todo(7, 1)).await.unwrap();

        assert!(storage.observe_todos().borrow().is_empty());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)] // Test code can unwrap
    async fn test_conditional_delete_refuses_referenced_group() {
        let group = Group::new(GroupUid::new(1), "💼".to_string(), "Work".to_string());
        let storage = MemoryStorage::with_records(vec![group], vec![sample_todo(0, 1)]);

        let deleted = storage.delete_group_if_empty(GroupUid::new(1)).await.unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(storage.observe_groups().borrow().len(), 1);
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)] // Test code can unwrap
    async fn test_conditional_delete_removes_unreferenced_group() {
        let group = Group::new(GroupUid::new(1), "💼".to_string(), "Work".to_string());
        let storage = MemoryStorage::with_records(vec![group], Vec::new());

        let deleted = storage.delete_group_if_empty(GroupUid::new(1)).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(storage.observe_groups().borrow().is_empty());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)] // Test code can unwrap
    async fn test_conditional_delete_of_missing_group_reports_zero() {
        let storage = MemoryStorage::new();

        let deleted = storage.delete_group_if_empty(GroupUid::new(9)).await.unwrap();

        assert_eq!(deleted, 0);
    }
}
