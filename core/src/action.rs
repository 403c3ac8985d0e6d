//! The unified input type for the todoflow reducer.
//!
//! Actions split into *commands* (user intent, sent by the UI) and *events*
//! (facts fed back by the runtime after the matching storage write
//! confirmed, or announced directly for decisions that need no write).
//! Subscribers observing the store's event stream only ever see event
//! variants.

use serde::{Deserialize, Serialize};

use crate::effect::PersistOp;
use crate::entity::{Group, GroupDraft, GroupUid, Todo, TodoDraft, TodoUid};
use crate::storage::StorageError;

/// All possible inputs to the todoflow reducer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Add a new todo from a draft; the store assigns the uid and stamps
    /// missing timestamps
    AddTodo {
        /// The draft to store
        draft: TodoDraft,
    },
    /// Delete the todo with this uid; silent no-op when absent
    DeleteTodo {
        /// Uid of the todo to delete
        uid: TodoUid,
    },
    /// Replace the stored todo with the same uid in full; silent no-op when
    /// absent
    ModifyTodo {
        /// The replacement record
        todo: Todo,
    },
    /// Flip a todo's checked flag and refresh its check time
    ToggleChecked {
        /// The todo to toggle
        todo: Todo,
    },
    /// Add a new group from a draft; the store assigns the uid
    AddGroup {
        /// The draft to store
        draft: GroupDraft,
    },
    /// Replace the stored group with the same uid in full; silent no-op
    /// when absent
    ModifyGroup {
        /// The replacement record
        group: Group,
    },
    /// Delete a group only if no todo references it
    DeleteGroupIfEmpty {
        /// Uid of the group to delete
        uid: GroupUid,
    },
    /// Change the group selection driving the filtered view; no validation
    SelectGroup {
        /// The new selection; [`GroupUid::ALL`] shows every todo
        uid: GroupUid,
    },
    /// Open the todo editor on a fresh draft, or warn when no group exists
    RequestAddTodo,
    /// Open the todo editor on an existing todo
    RequestModifyTodo {
        /// The todo to edit
        todo: Todo,
    },
    /// Open the groups editor
    OpenGroupsEditor,
    /// Close whichever dialog is active
    DismissEditor,
    /// Confirm the open todo editor with its final group and text block
    ConfirmTodoEditor {
        /// Group chosen in the editor
        group: GroupUid,
        /// The editable block; first line becomes the subject
        text: String,
    },

    // ========== Events ==========
    /// A todo write confirmed; the record is now stored
    TodoAdded {
        /// The stored record
        todo: Todo,
    },
    /// A todo replacement confirmed
    TodoModified {
        /// The stored record
        todo: Todo,
    },
    /// A todo deletion confirmed
    TodoDeleted {
        /// Uid of the removed todo
        uid: TodoUid,
    },
    /// A group write confirmed
    GroupAdded {
        /// The stored record
        group: Group,
    },
    /// A group replacement confirmed
    GroupModified {
        /// The stored record
        group: Group,
    },
    /// A group deletion confirmed; if the group was selected, the selection
    /// resets to [`GroupUid::ALL`]
    GroupDeleted {
        /// Uid of the removed group
        uid: GroupUid,
    },
    /// A group deletion was refused because a todo still references the
    /// group, or no such group exists
    GroupDeleteRefused {
        /// Uid of the group left in place
        uid: GroupUid,
    },
    /// A storage write failed; the published views are unchanged
    StorageFailed {
        /// The operation that failed
        op: PersistOp,
        /// The backend error
        error: StorageError,
    },
}

impl TodoAction {
    /// Returns true if this action is a command
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::AddTodo { .. }
                | Self::DeleteTodo { .. }
                | Self::ModifyTodo { .. }
                | Self::ToggleChecked { .. }
                | Self::AddGroup { .. }
                | Self::ModifyGroup { .. }
                | Self::DeleteGroupIfEmpty { .. }
                | Self::SelectGroup { .. }
                | Self::RequestAddTodo
                | Self::RequestModifyTodo { .. }
                | Self::OpenGroupsEditor
                | Self::DismissEditor
                | Self::ConfirmTodoEditor { .. }
        )
    }

    /// Returns true if this action is an event
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }

    /// Returns a short name for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddTodo { .. } => "add_todo",
            Self::DeleteTodo { .. } => "delete_todo",
            Self::ModifyTodo { .. } => "modify_todo",
            Self::ToggleChecked { .. } => "toggle_checked",
            Self::AddGroup { .. } => "add_group",
            Self::ModifyGroup { .. } => "modify_group",
            Self::DeleteGroupIfEmpty { .. } => "delete_group_if_empty",
            Self::SelectGroup { .. } => "select_group",
            Self::RequestAddTodo => "request_add_todo",
            Self::RequestModifyTodo { .. } => "request_modify_todo",
            Self::OpenGroupsEditor => "open_groups_editor",
            Self::DismissEditor => "dismiss_editor",
            Self::ConfirmTodoEditor { .. } => "confirm_todo_editor",
            Self::TodoAdded { .. } => "todo_added",
            Self::TodoModified { .. } => "todo_modified",
            Self::TodoDeleted { .. } => "todo_deleted",
            Self::GroupAdded { .. } => "group_added",
            Self::GroupModified { .. } => "group_modified",
            Self::GroupDeleted { .. } => "group_deleted",
            Self::GroupDeleteRefused { .. } => "group_delete_refused",
            Self::StorageFailed { .. } => "storage_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_event_split() {
        let command = TodoAction::DeleteTodo {
            uid: TodoUid::new(0),
        };
        assert!(command.is_command());
        assert!(!command.is_event());

        let event = TodoAction::TodoDeleted {
            uid: TodoUid::new(0),
        };
        assert!(event.is_event());
        assert!(!event.is_command());
    }

    #[test]
    fn test_kind_names_are_stable() {
        assert_eq!(TodoAction::RequestAddTodo.kind(), "request_add_todo");
        assert_eq!(
            TodoAction::GroupDeleteRefused {
                uid: GroupUid::new(0)
            }
            .kind(),
            "group_delete_refused"
        );
    }
}
