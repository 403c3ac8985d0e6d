//! Reducer logic for the todoflow data layer.
//!
//! The reducer is a pure function over `(state, action, environment)`. All
//! business rules live here: uid assignment, the referential-integrity
//! guard on group deletion, editor-mode transitions, and the silent no-op
//! handling for mutations that reference a missing uid.
//!
//! Commands never touch the published collections directly. A durable
//! command reserves its uid, builds the record, and returns a
//! [`Effect::Persist`] description; the runtime feeds the matching event
//! back after the write confirms, and only that event application changes
//! the collections. Pure commands (selection, editor transitions) mutate
//! their state slice in place and return no effects.

use smallvec::{SmallVec, smallvec};

use crate::action::TodoAction;
use crate::editor::EditorMode;
use crate::effect::{Effect, Effects, PersistOp};
use crate::entity::{GroupUid, TodoDraft};
use crate::environment::TodoEnvironment;
use crate::state::AppState;
use crate::text::parse_editor_text;

/// Reducer for the todoflow data layer
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to state.
    ///
    /// Shared by the event arms of [`reduce`](Self::reduce); commands are
    /// never applied. Confirmed writes clear `last_error`.
    fn apply_event(state: &mut AppState, action: &TodoAction) {
        match action {
            TodoAction::TodoAdded { todo } => {
                state.todos.push(todo.clone());
                state.last_error = None;
            }
            TodoAction::TodoModified { todo } => {
                if let Some(stored) = state.todos.iter_mut().find(|t| t.uid == todo.uid) {
                    *stored = todo.clone();
                }
                state.last_error = None;
            }
            TodoAction::TodoDeleted { uid } => {
                state.todos.retain(|t| t.uid != *uid);
                state.last_error = None;
            }
            TodoAction::GroupAdded { group } => {
                state.groups.push(group.clone());
                state.last_error = None;
            }
            TodoAction::GroupModified { group } => {
                if let Some(stored) = state.groups.iter_mut().find(|g| g.uid == group.uid) {
                    *stored = group.clone();
                }
                state.last_error = None;
            }
            TodoAction::GroupDeleted { uid } => {
                state.groups.retain(|g| g.uid != *uid);
                // A deleted group cannot stay selected.
                if state.selected_group == *uid {
                    state.selected_group = GroupUid::ALL;
                }
                state.last_error = None;
            }
            TodoAction::GroupDeleteRefused { .. } => {
                // The group stays; nothing to apply.
            }
            TodoAction::StorageFailed { error, .. } => {
                state.last_error = Some(error.clone());
            }
            // Commands are not applied to state
            _ => {}
        }
    }

    /// Reduce an action into state changes and effects.
    ///
    /// # Arguments
    ///
    /// - `state`: Mutable reference to the canonical state
    /// - `action`: The command or event to process
    /// - `env`: Injected dependencies (the clock)
    ///
    /// # Returns
    ///
    /// Effect descriptions for the runtime to execute. Mutations that
    /// reference a missing uid return no effects and change nothing.
    #[must_use]
    pub fn reduce(
        &self,
        state: &mut AppState,
        action: TodoAction,
        env: &TodoEnvironment,
    ) -> Effects {
        match action {
            // ========== Commands: todos ==========
            TodoAction::AddTodo { draft } => {
                let uid = state.reserve_todo_uid();
                let todo = draft.into_todo(uid, env.clock.now());
                smallvec![Effect::Persist(PersistOp::InsertTodo(todo))]
            }

            TodoAction::DeleteTodo { uid } => match state.todo(uid) {
                Some(todo) => smallvec![Effect::Persist(PersistOp::DeleteTodo(todo.clone()))],
                None => SmallVec::new(),
            },

            TodoAction::ModifyTodo { todo } => {
                if state.todo(todo.uid).is_none() {
                    return SmallVec::new();
                }
                smallvec![Effect::Persist(PersistOp::UpdateTodo(todo))]
            }

            TodoAction::ToggleChecked { todo } => {
                if state.todo(todo.uid).is_none() {
                    return SmallVec::new();
                }
                let toggled = todo.toggled(env.clock.now());
                smallvec![Effect::Persist(PersistOp::UpdateTodo(toggled))]
            }

            // ========== Commands: groups ==========
            TodoAction::AddGroup { draft } => {
                let uid = state.reserve_group_uid();
                let group = draft.into_group(uid);
                smallvec![Effect::Persist(PersistOp::InsertGroup(group))]
            }

            TodoAction::ModifyGroup { group } => {
                if state.group(group.uid).is_none() {
                    return SmallVec::new();
                }
                smallvec![Effect::Persist(PersistOp::UpdateGroup(group))]
            }

            TodoAction::DeleteGroupIfEmpty { uid } => {
                // Missing groups and referenced groups both resolve to a
                // refusal (zero rows deleted), matching the conditional
                // delete the storage interface performs.
                if state.group(uid).is_none() || state.group_is_referenced(uid) {
                    return smallvec![Effect::Announce(TodoAction::GroupDeleteRefused { uid })];
                }
                smallvec![Effect::Persist(PersistOp::DeleteGroupIfEmpty(uid))]
            }

            // ========== Commands: selection ==========
            TodoAction::SelectGroup { uid } => {
                state.selected_group = uid;
                SmallVec::new()
            }

            // ========== Commands: editor workflow ==========
            TodoAction::RequestAddTodo => {
                if state.editor.is_closed() {
                    state.editor = if state.has_groups() {
                        EditorMode::AddTodo
                    } else {
                        EditorMode::EmptyGroupsWarning
                    };
                }
                SmallVec::new()
            }

            TodoAction::RequestModifyTodo { todo } => {
                if state.editor.is_closed() {
                    state.editor = EditorMode::ModifyTodo(todo);
                }
                SmallVec::new()
            }

            TodoAction::OpenGroupsEditor => {
                // Reachable from the closed state, from either todo dialog,
                // and from the empty-groups warning (its confirm button).
                state.editor = EditorMode::GroupsEditor;
                SmallVec::new()
            }

            TodoAction::DismissEditor => {
                state.editor = EditorMode::Closed;
                SmallVec::new()
            }

            TodoAction::ConfirmTodoEditor { group, text } => {
                Self::confirm_todo_editor(state, group, &text, env)
            }

            // ========== Events ==========
            TodoAction::TodoAdded { .. }
            | TodoAction::TodoModified { .. }
            | TodoAction::TodoDeleted { .. }
            | TodoAction::GroupAdded { .. }
            | TodoAction::GroupModified { .. }
            | TodoAction::GroupDeleted { .. }
            | TodoAction::GroupDeleteRefused { .. }
            | TodoAction::StorageFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            }
        }
    }

    /// Handles `ConfirmTodoEditor` based on which dialog is open.
    ///
    /// The editor closes immediately; the write confirms asynchronously.
    fn confirm_todo_editor(
        state: &mut AppState,
        group: GroupUid,
        text: &str,
        env: &TodoEnvironment,
    ) -> Effects {
        match state.editor.clone() {
            EditorMode::AddTodo => {
                state.editor = EditorMode::Closed;
                let (subject, content) = parse_editor_text(text);
                let draft = TodoDraft::new(group, &subject, &content);
                let uid = state.reserve_todo_uid();
                let todo = draft.into_todo(uid, env.clock.now());
                smallvec![Effect::Persist(PersistOp::InsertTodo(todo))]
            }
            EditorMode::ModifyTodo(original) => {
                state.editor = EditorMode::Closed;
                if state.todo(original.uid).is_none() {
                    return SmallVec::new();
                }
                let (subject, content) = parse_editor_text(text);
                let updated = original.with_edit(group, &subject, &content);
                smallvec![Effect::Persist(PersistOp::UpdateTodo(updated))]
            }
            // No todo dialog is open; nothing to confirm.
            _ => SmallVec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Group, GroupDraft, Todo, TodoUid};
    use crate::environment::Clock;
    use crate::storage::StorageError;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use std::sync::Arc;

    struct TestClock(DateTime<Utc>);

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[allow(clippy::unwrap_used)] // Panics: hardcoded timestamp is valid
    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap()
    }

    fn test_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(TestClock(t0())))
    }

    fn work_group() -> Group {
        Group::new(GroupUid::new(0), "💼".to_string(), "Work".to_string())
    }

    fn reduce(state: &mut AppState, action: TodoAction) -> Effects {
        TodoReducer::new().reduce(state, action, &test_env())
    }

    #[test]
    #[allow(clippy::panic)] // Panics: Test will fail if the effect shape is wrong
    fn test_add_todo_reserves_uid_and_persists() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        let effects = reduce(
            &mut state,
            TodoAction::AddTodo {
                draft: TodoDraft::new(GroupUid::new(0), "Buy milk", ""),
            },
        );

        // The collections stay untouched until the write confirms.
        assert_eq!(state.todo_count(), 0);
        assert_eq!(state.next_todo_uid(), TodoUid::new(1));

        let [Effect::Persist(PersistOp::InsertTodo(todo))] = &effects[..] else {
            panic!("expected a single insert effect, got {effects:?}");
        };
        assert_eq!(todo.uid, TodoUid::new(0));
        assert_eq!(todo.subject, "Buy milk");
        assert!(!todo.checked);
        assert_eq!(todo.create_time, t0());
    }

    #[test]
    fn test_delete_missing_todo_is_a_silent_no_op() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        let before = state.clone();
        let effects = reduce(
            &mut state,
            TodoAction::DeleteTodo {
                uid: TodoUid::new(9),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_modify_missing_todo_is_a_silent_no_op() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        let ghost = Todo::new(
            TodoUid::new(4),
            GroupUid::new(0),
            "Ghost".to_string(),
            String::new(),
            t0(),
        );

        assert!(reduce(&mut state, TodoAction::ModifyTodo { todo: ghost }).is_empty());
    }

    #[test]
    #[allow(clippy::unwrap_used, clippy::panic)] // Panics: Test will fail if the effect shape is wrong
    fn test_toggle_refreshes_check_time_only() {
        let created = Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 0).single().unwrap();
        let todo = Todo::new(
            TodoUid::new(0),
            GroupUid::new(0),
            "Buy milk".to_string(),
            String::new(),
            created,
        );
        let mut state = AppState::hydrated(vec![work_group()], vec![todo.clone()]);

        let effects = reduce(&mut state, TodoAction::ToggleChecked { todo });
        let [Effect::Persist(PersistOp::UpdateTodo(toggled))] = &effects[..] else {
            panic!("expected a single update effect, got {effects:?}");
        };
        assert!(toggled.checked);
        assert_eq!(toggled.check_time, t0());
        assert_eq!(toggled.create_time, created);
    }

    #[test]
    fn test_delete_group_refused_while_referenced() {
        let todo = Todo::new(
            TodoUid::new(0),
            GroupUid::new(0),
            "Buy milk".to_string(),
            String::new(),
            t0(),
        );
        let mut state = AppState::hydrated(vec![work_group()], vec![todo]);

        let effects = reduce(
            &mut state,
            TodoAction::DeleteGroupIfEmpty {
                uid: GroupUid::new(0),
            },
        );
        assert_eq!(
            effects.as_slice(),
            [Effect::Announce(TodoAction::GroupDeleteRefused {
                uid: GroupUid::new(0)
            })]
            .as_slice()
        );
        assert_eq!(state.group_count(), 1);
    }

    #[test]
    fn test_delete_missing_group_is_refused_not_an_error() {
        let mut state = AppState::new();
        let effects = reduce(
            &mut state,
            TodoAction::DeleteGroupIfEmpty {
                uid: GroupUid::new(3),
            },
        );
        assert_eq!(
            effects.as_slice(),
            [Effect::Announce(TodoAction::GroupDeleteRefused {
                uid: GroupUid::new(3)
            })]
            .as_slice()
        );
    }

    #[test]
    fn test_delete_unreferenced_group_goes_to_storage() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        let effects = reduce(
            &mut state,
            TodoAction::DeleteGroupIfEmpty {
                uid: GroupUid::new(0),
            },
        );
        assert_eq!(
            effects.as_slice(),
            [Effect::Persist(PersistOp::DeleteGroupIfEmpty(
                GroupUid::new(0)
            ))]
            .as_slice()
        );
        // The group stays in state until the conditional delete confirms.
        assert_eq!(state.group_count(), 1);
    }

    #[test]
    fn test_group_deleted_resets_matching_selection() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        state.selected_group = GroupUid::new(0);

        reduce(
            &mut state,
            TodoAction::GroupDeleted {
                uid: GroupUid::new(0),
            },
        );
        assert_eq!(state.group_count(), 0);
        assert_eq!(state.selected_group, GroupUid::ALL);
    }

    #[test]
    fn test_group_deleted_leaves_other_selection_alone() {
        let other = Group::new(GroupUid::new(1), "📖".to_string(), "Study".to_string());
        let mut state = AppState::hydrated(vec![work_group(), other], vec![]);
        state.selected_group = GroupUid::new(1);

        reduce(
            &mut state,
            TodoAction::GroupDeleted {
                uid: GroupUid::new(0),
            },
        );
        assert_eq!(state.selected_group, GroupUid::new(1));
    }

    #[test]
    fn test_request_add_todo_warns_without_groups() {
        let mut state = AppState::new();
        reduce(&mut state, TodoAction::RequestAddTodo);
        assert_eq!(state.editor, EditorMode::EmptyGroupsWarning);

        // Confirming the warning opens the groups editor.
        reduce(&mut state, TodoAction::OpenGroupsEditor);
        assert_eq!(state.editor, EditorMode::GroupsEditor);
    }

    #[test]
    fn test_request_add_todo_opens_editor_with_groups() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        reduce(&mut state, TodoAction::RequestAddTodo);
        assert_eq!(state.editor, EditorMode::AddTodo);

        // A second request while a dialog is open changes nothing.
        let todo = Todo::new(
            TodoUid::new(0),
            GroupUid::new(0),
            "Buy milk".to_string(),
            String::new(),
            t0(),
        );
        reduce(&mut state, TodoAction::RequestModifyTodo { todo });
        assert_eq!(state.editor, EditorMode::AddTodo);
    }

    #[test]
    #[allow(clippy::panic)] // Panics: Test will fail if the effect shape is wrong
    fn test_confirm_add_parses_text_and_closes() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        reduce(&mut state, TodoAction::RequestAddTodo);

        let effects = reduce(
            &mut state,
            TodoAction::ConfirmTodoEditor {
                group: GroupUid::new(0),
                text: "Buy milk\n2 liters\nwhole fat".to_string(),
            },
        );

        assert!(state.editor.is_closed());
        let [Effect::Persist(PersistOp::InsertTodo(todo))] = &effects[..] else {
            panic!("expected a single insert effect, got {effects:?}");
        };
        assert_eq!(todo.subject, "Buy milk");
        assert_eq!(todo.content, "2 liters\nwhole fat");
    }

    #[test]
    fn test_confirm_without_open_dialog_is_a_no_op() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        let effects = reduce(
            &mut state,
            TodoAction::ConfirmTodoEditor {
                group: GroupUid::new(0),
                text: "Buy milk".to_string(),
            },
        );
        assert!(effects.is_empty());
        assert!(state.editor.is_closed());
    }

    #[test]
    fn test_storage_failure_records_last_error_and_next_success_clears_it() {
        let mut state = AppState::hydrated(vec![work_group()], vec![]);
        let todo = Todo::new(
            TodoUid::new(0),
            GroupUid::new(0),
            "Buy milk".to_string(),
            String::new(),
            t0(),
        );

        reduce(
            &mut state,
            TodoAction::StorageFailed {
                op: PersistOp::InsertTodo(todo.clone()),
                error: StorageError::WriteFailed("disk full".to_string()),
            },
        );
        assert!(state.last_error.is_some());
        assert_eq!(state.todo_count(), 0);

        reduce(&mut state, TodoAction::TodoAdded { todo });
        assert!(state.last_error.is_none());
        assert_eq!(state.todo_count(), 1);
    }

    #[test]
    #[allow(clippy::panic)] // Panics: Test will fail if the effect shape is wrong
    fn test_add_group_reserves_uid() {
        let mut state = AppState::new();
        let effects = reduce(
            &mut state,
            TodoAction::AddGroup {
                draft: GroupDraft::new("💼", ""),
            },
        );

        let [Effect::Persist(PersistOp::InsertGroup(group))] = &effects[..] else {
            panic!("expected a single insert effect, got {effects:?}");
        };
        assert_eq!(group.uid, GroupUid::new(0));
        assert_eq!(group.name, "");
    }

    proptest! {
        /// Any sequence of adds (with their events fed back) yields unique,
        /// strictly increasing uids, with deletions mixed in freely.
        #[test]
        #[allow(clippy::panic)] // Panics: Test will fail if the effect shape is wrong
        fn prop_assigned_uids_strictly_increase(subjects in prop::collection::vec("[a-z]{1,8}", 1..20), delete_every in 1_usize..4) {
            let reducer = TodoReducer::new();
            let env = test_env();
            let mut state = AppState::hydrated(vec![work_group()], vec![]);
            let mut assigned = Vec::new();

            for (i, subject) in subjects.iter().enumerate() {
                let effects = reducer.reduce(
                    &mut state,
                    TodoAction::AddTodo {
                        draft: TodoDraft::new(GroupUid::new(0), subject, ""),
                    },
                    &env,
                );
                let [Effect::Persist(PersistOp::InsertTodo(todo))] = &effects[..] else {
                    panic!("expected a single insert effect");
                };
                assigned.push(todo.uid);
                let _ = reducer.reduce(&mut state, TodoAction::TodoAdded { todo: todo.clone() }, &env);

                // Interleave deletions; freed uids must never come back.
                if i % delete_every == 0 {
                    let _ = reducer.reduce(&mut state, TodoAction::TodoDeleted { uid: todo.uid }, &env);
                }
            }

            for pair in assigned.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
