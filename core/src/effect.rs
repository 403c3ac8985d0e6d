//! Side effect descriptions returned by the reducer.
//!
//! Effects are NOT executed by the reducer. They are values describing what
//! the store runtime should do next: write a record through the persistence
//! interface, or announce an already-decided event to subscribers. The
//! runtime executes persistence ops on background tasks and feeds the
//! resulting events back through the reducer.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::action::TodoAction;
use crate::entity::{Group, GroupUid, Todo};

/// A persistence operation to run against the storage backend.
///
/// Each variant maps to one method of
/// [`TodoStorage`](crate::storage::TodoStorage) and carries the record the
/// call needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistOp {
    /// Insert a new todo
    InsertTodo(Todo),
    /// Replace a stored todo
    UpdateTodo(Todo),
    /// Delete a stored todo
    DeleteTodo(Todo),
    /// Insert a new group
    InsertGroup(Group),
    /// Replace a stored group
    UpdateGroup(Group),
    /// Conditionally delete a group that no todo references
    DeleteGroupIfEmpty(GroupUid),
}

impl PersistOp {
    /// Returns a short name for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InsertTodo(_) => "insert_todo",
            Self::UpdateTodo(_) => "update_todo",
            Self::DeleteTodo(_) => "delete_todo",
            Self::InsertGroup(_) => "insert_group",
            Self::UpdateGroup(_) => "update_group",
            Self::DeleteGroupIfEmpty(_) => "delete_group_if_empty",
        }
    }
}

/// Effect type - describes a side effect to be executed.
///
/// Effects are descriptions, returned from the reducer and executed by the
/// store runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Run a persistence operation; on success the corresponding event is
    /// fed back into the store, on failure a
    /// [`StorageFailed`](crate::action::TodoAction::StorageFailed) event is.
    Persist(PersistOp),

    /// Broadcast an event that needs no persistence and no state change
    /// (a refusal decided from in-memory state)
    Announce(TodoAction),
}

/// Effect buffer returned by a single reduce step.
///
/// Inline capacity of two: no current action produces more.
pub type Effects = SmallVec<[Effect; 2]>;
