//! Modal editor workflow state.

use serde::{Deserialize, Serialize};

use crate::entity::Todo;

/// Which modal editing workflow is currently active.
///
/// A single value of this enum lives in the application state, so at most
/// one dialog is ever active. All transitions are reducer cases on the
/// editor commands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorMode {
    /// No dialog active
    #[default]
    Closed,
    /// The todo editor is open on a fresh draft
    AddTodo,
    /// The todo editor is open on an existing todo
    ModifyTodo(Todo),
    /// The groups editor is open
    GroupsEditor,
    /// The "create a group first" warning is showing; confirming it opens
    /// the groups editor
    EmptyGroupsWarning,
}

impl EditorMode {
    /// Returns true if no dialog is active
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns the todo being modified, if the modify dialog is open
    #[must_use]
    pub const fn editing(&self) -> Option<&Todo> {
        match self {
            Self::ModifyTodo(todo) => Some(todo),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{GroupUid, TodoUid};
    use chrono::Utc;

    #[test]
    fn test_default_is_closed() {
        assert!(EditorMode::default().is_closed());
    }

    #[test]
    fn test_editing_exposes_the_open_todo() {
        let todo = Todo::new(
            TodoUid::new(1),
            GroupUid::new(0),
            "Buy milk".to_string(),
            String::new(),
            Utc::now(),
        );

        let mode = EditorMode::ModifyTodo(todo.clone());
        assert_eq!(mode.editing(), Some(&todo));
        assert!(EditorMode::AddTodo.editing().is_none());
    }
}
