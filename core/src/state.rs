//! Application state owned by the store.

use serde::{Deserialize, Serialize};

use crate::editor::EditorMode;
use crate::entity::{Group, GroupUid, Todo, TodoUid};
use crate::storage::StorageError;

/// The canonical state of the data layer.
///
/// Exactly one value of this type exists per store; everything the UI reads
/// is a published view derived from it. Collections keep insertion order;
/// display ordering is applied by the filtered view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// All groups, in insertion order
    pub groups: Vec<Group>,
    /// All todos, in insertion order
    pub todos: Vec<Todo>,
    /// The group selection driving the filtered view
    pub selected_group: GroupUid,
    /// Which modal editing workflow is active
    pub editor: EditorMode,
    /// The most recent storage failure, cleared by the next confirmed write
    pub last_error: Option<StorageError>,
    /// Next todo uid to assign; session-scoped, never reused
    next_todo_uid: i64,
    /// Next group uid to assign; session-scoped, never reused
    next_group_uid: i64,
}

impl AppState {
    /// Creates an empty state: no records, "all groups" selected, editor
    /// closed, uid counters at zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: Vec::new(),
            todos: Vec::new(),
            selected_group: GroupUid::ALL,
            editor: EditorMode::Closed,
            last_error: None,
            next_todo_uid: 0,
            next_group_uid: 0,
        }
    }

    /// Creates a state hydrated from stored records.
    ///
    /// Uid counters seed at `1 + max existing uid` (0 when the set is
    /// empty), so newly assigned uids never collide with loaded ones.
    #[must_use]
    pub fn hydrated(groups: Vec<Group>, todos: Vec<Todo>) -> Self {
        let next_todo_uid = todos.iter().map(|t| t.uid.value() + 1).max().unwrap_or(0);
        let next_group_uid = groups.iter().map(|g| g.uid.value() + 1).max().unwrap_or(0);
        Self {
            groups,
            todos,
            selected_group: GroupUid::ALL,
            editor: EditorMode::Closed,
            last_error: None,
            next_todo_uid,
            next_group_uid,
        }
    }

    /// Returns the todo with this uid, if present
    #[must_use]
    pub fn todo(&self, uid: TodoUid) -> Option<&Todo> {
        self.todos.iter().find(|t| t.uid == uid)
    }

    /// Returns the group with this uid, if present
    #[must_use]
    pub fn group(&self, uid: GroupUid) -> Option<&Group> {
        self.groups.iter().find(|g| g.uid == uid)
    }

    /// Returns true if any todo references this group
    #[must_use]
    pub fn group_is_referenced(&self, uid: GroupUid) -> bool {
        self.todos.iter().any(|t| t.group == uid)
    }

    /// Returns true if at least one group exists
    #[must_use]
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn todo_count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of groups
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns the next todo uid that will be assigned
    #[must_use]
    pub const fn next_todo_uid(&self) -> TodoUid {
        TodoUid::new(self.next_todo_uid)
    }

    /// Returns the next group uid that will be assigned
    #[must_use]
    pub const fn next_group_uid(&self) -> GroupUid {
        GroupUid::new(self.next_group_uid)
    }

    /// Reserves and returns the next todo uid.
    ///
    /// Reservation happens at command time, before the write confirms, so
    /// concurrent in-flight adds cannot collide. A reserved uid is spent
    /// even if the write later fails.
    pub(crate) const fn reserve_todo_uid(&mut self) -> TodoUid {
        let uid = TodoUid::new(self.next_todo_uid);
        self.next_todo_uid += 1;
        uid
    }

    /// Reserves and returns the next group uid
    pub(crate) const fn reserve_group_uid(&mut self) -> GroupUid {
        let uid = GroupUid::new(self.next_group_uid);
        self.next_group_uid += 1;
        uid
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
