//! Persistence interface consumed by the store.
//!
//! The data layer does not know which backend holds the records. It writes
//! through [`TodoStorage`] and observes the stored sets through `watch`
//! channels. Concrete durable backends (an embedded database, a file store)
//! live outside this workspace; the runtime crate ships an in-process
//! implementation for prototyping and tests.
//!
//! Write confirmation drives view republication: the store applies a change
//! to its published views only after the corresponding storage call has
//! returned `Ok`.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::entity::{Group, GroupUid, Todo};

/// Error type for storage operations.
///
/// Cloneable so a failure can ride inside a broadcast event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StorageError {
    /// The backend rejected or failed a write
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The backend is not reachable
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistence interface for todo and group records.
///
/// Writes are record-based and match stored rows by uid. Reads are push
/// driven: [`observe_todos`](TodoStorage::observe_todos) and
/// [`observe_groups`](TodoStorage::observe_groups) hand out `watch`
/// receivers whose current value is the full stored set, re-emitted after
/// every successful write. The store reads the receivers' initial value to
/// hydrate its state at startup.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
/// `impl Future` to enable trait object usage (`Arc<dyn TodoStorage>`),
/// required because the store holds its backend as an injected dependency.
pub trait TodoStorage: Send + Sync {
    /// Insert a new todo record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the write.
    fn insert_todo(&self, todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Replace the stored todo with the same uid.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the write.
    fn update_todo(&self, todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Delete the stored todo with the same uid.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the write.
    fn delete_todo(&self, todo: Todo) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Insert a new group record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the write.
    fn insert_group(&self, group: Group) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Replace the stored group with the same uid.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the write.
    fn update_group(&self, group: Group) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Delete the group only if no stored todo references it.
    ///
    /// A conditional delete guarded by a lookup against the todo set.
    ///
    /// # Returns
    ///
    /// The number of rows deleted: 1 when the group existed and was
    /// unreferenced, 0 otherwise (referenced or missing).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails the delete.
    fn delete_group_if_empty(
        &self,
        uid: GroupUid,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + '_>>;

    /// Observe the full stored todo set.
    ///
    /// The receiver's current value is the complete set at subscription
    /// time; a new value is published after every successful todo write.
    fn observe_todos(&self) -> watch::Receiver<Vec<Todo>>;

    /// Observe the full stored group set.
    ///
    /// Same contract as [`observe_todos`](TodoStorage::observe_todos).
    fn observe_groups(&self) -> watch::Receiver<Vec<Group>>;
}
