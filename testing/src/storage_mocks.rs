//! Mock storage backends for error-path tests

use std::future::Future;
use std::pin::Pin;

use tokio::sync::watch;

use todoflow_core::entity::{Group, GroupUid, Todo};
use todoflow_core::storage::{Result, StorageError, TodoStorage};

/// Storage backend that fails every write
///
/// Observation still serves the seeded records, so a store can hydrate
/// from it; every write resolves to the injected error. Use it to drive
/// the `StorageFailed` path without a real backend.
///
/// # Example
///
/// ```ignore
/// let storage = Arc::new(FailingStorage::with_records(vec![group], Vec::new()));
/// let store = TodoStore::open(storage, test_environment());
///
/// let mut handle = store.send(TodoAction::AddTodo { draft }).await?;
/// handle.wait().await;
///
/// assert!(store.state(|s| s.last_error.is_some()).await);
/// ```
#[derive(Debug)]
pub struct FailingStorage {
    error: StorageError,
    groups: watch::Sender<Vec<Group>>,
    todos: watch::Sender<Vec<Todo>>,
}

impl FailingStorage {
    /// Create an empty failing backend
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(Vec::new(), Vec::new())
    }

    /// Create a failing backend that still serves seeded records
    #[must_use]
    pub fn with_records(groups: Vec<Group>, todos: Vec<Todo>) -> Self {
        let (groups_tx, _) = watch::channel(groups);
        let (todos_tx, _) = watch::channel(todos);

        Self {
            error: StorageError::WriteFailed("injected write failure".to_string()),
            groups: groups_tx,
            todos: todos_tx,
        }
    }

    /// Override the error every write resolves to
    #[must_use]
    pub fn with_error(mut self, error: StorageError) -> Self {
        self.error = error;
        self
    }

    fn fail<T: Send + 'static>(&self) -> Pin<Box<dyn Future<Output = Result<T>> + Send + '_>> {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }
}

impl Default for FailingStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStorage for FailingStorage {
    fn insert_todo(&self, _todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.fail()
    }

    fn update_todo(&self, _todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.fail()
    }

    fn delete_todo(&self, _todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.fail()
    }

    fn insert_group(&self, _group: Group) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.fail()
    }

    fn update_group(&self, _group: Group) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.fail()
    }

    fn delete_group_if_empty(
        &self,
        _uid: GroupUid,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + '_>> {
        self.fail()
    }

    fn observe_todos(&self) -> watch::Receiver<Vec<Todo>> {
        self.todos.subscribe()
    }

    fn observe_groups(&self) -> watch::Receiver<Vec<Group>> {
        self.groups.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_fail_with_injected_error() {
        let storage = FailingStorage::new()
            .with_error(StorageError::Unavailable("backend offline".to_string()));

        let result = storage
            .insert_group(Group::new(
                GroupUid::new(0),
                "💼".to_string(),
                "Work".to_string(),
            ))
            .await;

        assert_eq!(
            result,
            Err(StorageError::Unavailable("backend offline".to_string()))
        );
    }

    #[tokio::test]
    async fn test_observation_serves_seeded_records() {
        let group = Group::new(GroupUid::new(0), "💼".to_string(), "Work".to_string());
        let storage = FailingStorage::with_records(vec![group], Vec::new());

        assert_eq!(storage.observe_groups().borrow().len(), 1);
        assert!(storage.observe_todos().borrow().is_empty());
    }
}
