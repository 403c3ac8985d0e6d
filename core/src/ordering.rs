//! Group filtering and display ordering for todo lists.
//!
//! The filtered view and its ordering are part of the data layer's output
//! contract; consumers render the list as-is without resorting.

use std::cmp::Ordering;

use crate::entity::{GroupUid, Todo};

/// Compares two todos by display position.
///
/// Unchecked todos sort before checked ones. Within the unchecked section,
/// newest `create_time` first; within the checked section, newest
/// `check_time` first. Ties break toward the higher uid (later insertion).
#[must_use]
pub fn display_order(a: &Todo, b: &Todo) -> Ordering {
    match (a.checked, b.checked) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, false) => b
            .create_time
            .cmp(&a.create_time)
            .then_with(|| b.uid.cmp(&a.uid)),
        (true, true) => b
            .check_time
            .cmp(&a.check_time)
            .then_with(|| b.uid.cmp(&a.uid)),
    }
}

/// Returns true if a todo in `group` is visible under `selected`.
///
/// Any negative selection (the virtual "all groups" view) admits every todo.
#[must_use]
pub const fn matches_selection(selected: GroupUid, group: GroupUid) -> bool {
    selected.is_all() || group.value() == selected.value()
}

/// Computes the visible todo list for a selection.
///
/// Filters to the selected group (all todos when the selection is the
/// virtual "all groups" view) and sorts by [`display_order`].
#[must_use]
pub fn visible_todos(todos: &[Todo], selected: GroupUid) -> Vec<Todo> {
    let mut visible: Vec<Todo> = todos
        .iter()
        .filter(|todo| matches_selection(selected, todo.group))
        .cloned()
        .collect();
    visible.sort_by(display_order);
    visible
}
