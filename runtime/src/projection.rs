//! Derived-view node joining the todo set with the group selection.
//!
//! The node owns a `watch` channel and republishes the filtered,
//! display-ordered todo list whenever either input changes. It runs as a
//! spawned task and stops when both inputs are gone or when every output
//! receiver has been dropped.

use tokio::sync::watch;

use todoflow_core::entity::{GroupUid, Todo};
use todoflow_core::ordering;

/// Spawn the filtered-todos node and return its output receiver.
///
/// The output starts at the filter of the inputs' current values, so
/// borrowing it right after store construction reflects the hydrated
/// state.
pub(crate) fn spawn_filtered_todos(
    mut todos: watch::Receiver<Vec<Todo>>,
    mut selected: watch::Receiver<GroupUid>,
) -> watch::Receiver<Vec<Todo>> {
    let initial = ordering::visible_todos(&todos.borrow(), *selected.borrow());
    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = todos.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = selected.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = tx.closed() => {
                    break;
                }
            }

            // Read both inputs at their latest values so a burst of
            // changes collapses into one recomputation.
            let visible = {
                let todos_now = todos.borrow_and_update();
                let selected_now = selected.borrow_and_update();
                ordering::visible_todos(&todos_now, *selected_now)
            };

            tx.send_if_modified(|current| {
                if *current == visible {
                    false
                } else {
                    *current = visible;
                    true
                }
            });
        }

        tracing::debug!("Filtered-todos node stopped");
    });

    rx
}
