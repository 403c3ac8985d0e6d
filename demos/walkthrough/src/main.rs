//! Walkthrough example binary
//!
//! Drives the todoflow data layer end to end: seeded groups, the editor
//! workflow, filtering and ordering, the checked toggle, the conditional
//! group delete, and error isolation on a failing backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todoflow_core::action::TodoAction;
use todoflow_core::entity::{Group, GroupDraft, GroupUid, Todo, TodoDraft};
use todoflow_core::environment::TodoEnvironment;
use todoflow_runtime::{MemoryStorage, TodoStore};
use todoflow_testing::{FailingStorage, test_clock};

fn print_todos(label: &str, todos: &[Todo]) {
    println!("{label} ({} visible):", todos.len());
    for todo in todos {
        let mark = if todo.checked { "[x]" } else { "[ ]" };
        println!("  {mark} #{} {}", todo.uid, todo.subject);
    }
}

fn print_groups(store: &TodoStore) {
    let groups = store.groups().borrow().clone();
    println!("Groups ({}):", groups.len());
    for group in &groups {
        println!("  #{} {} {}", group.uid, group.icon, group.name);
    }
}

/// Wait until the filtered view converges on an expected shape.
///
/// The projection recomputes on a background task, so the view trails the
/// store by a beat; waiting on a predicate keeps the printed snapshots
/// deterministic.
async fn view_when(
    filtered: &mut watch::Receiver<Vec<Todo>>,
    ready: impl FnMut(&Vec<Todo>) -> bool,
) -> Result<Vec<Todo>> {
    Ok(filtered.wait_for(ready).await?.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walkthrough=info,todoflow_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Todoflow Walkthrough ===\n");

    // Seed the backend the way a previous session would have left it
    let storage = MemoryStorage::with_records(
        vec![
            Group::new(GroupUid::new(0), "💼".to_string(), "Work".to_string()),
            Group::new(GroupUid::new(1), "📖".to_string(), "Study".to_string()),
            Group::new(GroupUid::new(2), "😊".to_string(), "Play".to_string()),
            Group::new(GroupUid::new(3), "🧺".to_string(), "Chores".to_string()),
        ],
        Vec::new(),
    );

    let environment = TodoEnvironment::new(Arc::new(test_clock()));
    let store = TodoStore::open(Arc::new(storage), environment);
    let mut filtered = store.filtered_todos();

    print_groups(&store);
    print_todos("\nAll groups", &filtered.borrow_and_update().clone());

    // ========== Groups editor ==========

    println!("\n>>> Sending: OpenGroupsEditor");
    let _ = store.send(TodoAction::OpenGroupsEditor).await?;
    println!("Editor mode: {:?}", store.editor_mode().borrow().clone());

    println!(">>> Sending: AddGroup 🧪 Lab");
    let mut handle = store
        .send(TodoAction::AddGroup {
            draft: GroupDraft::new("🧪", "Lab"),
        })
        .await?;
    handle.wait().await;

    println!(">>> Sending: DismissEditor");
    let _ = store.send(TodoAction::DismissEditor).await?;
    print_groups(&store);

    // ========== Adding todos through the editor ==========

    println!("\n>>> Sending: RequestAddTodo");
    let _ = store.send(TodoAction::RequestAddTodo).await?;
    println!("Editor mode: {:?}", store.editor_mode().borrow().clone());

    println!(">>> Sending: ConfirmTodoEditor (Work) with \"Buy milk\\n2 liters\"");
    let mut handle = store
        .send(TodoAction::ConfirmTodoEditor {
            group: GroupUid::new(0),
            text: "Buy milk\n2 liters".to_string(),
        })
        .await?;
    handle.wait().await;
    print_todos("All groups", &view_when(&mut filtered, |v| v.len() == 1).await?);

    // ========== Adding todos directly ==========

    println!("\n>>> Sending: AddTodo (Study) and AddTodo (Play)");
    let mut handle = store
        .send(TodoAction::AddTodo {
            draft: TodoDraft::new(GroupUid::new(1), "Read the ownership chapter", ""),
        })
        .await?;
    handle.wait().await;
    let mut handle = store
        .send(TodoAction::AddTodo {
            draft: TodoDraft::new(GroupUid::new(2), "Plan the hike", ""),
        })
        .await?;
    handle.wait().await;

    // Same creation instant under the fixed clock, so ties break toward
    // the newer uid.
    print_todos("All groups", &view_when(&mut filtered, |v| v.len() == 3).await?);

    // ========== Filtering ==========

    println!("\n>>> Sending: SelectGroup(Work)");
    let _ = store
        .send(TodoAction::SelectGroup {
            uid: GroupUid::new(0),
        })
        .await?;
    print_todos("Work", &view_when(&mut filtered, |v| v.len() == 1).await?);

    // ========== Toggling ==========

    let buy_milk = store
        .state(|s| s.todos.first().cloned())
        .await
        .ok_or_else(|| anyhow::anyhow!("the first todo should exist"))?;

    println!("\n>>> Sending: ToggleChecked #{}", buy_milk.uid);
    let mut handle = store.send(TodoAction::ToggleChecked { todo: buy_milk }).await?;
    handle.wait().await;
    print_todos(
        "Work",
        &view_when(&mut filtered, |v| v.first().is_some_and(|t| t.checked)).await?,
    );

    println!("\n>>> Sending: SelectGroup(all groups)");
    let _ = store.send(TodoAction::SelectGroup { uid: GroupUid::ALL }).await?;
    print_todos("All groups", &view_when(&mut filtered, |v| v.len() == 3).await?);

    // ========== Conditional group delete ==========

    println!("\n>>> delete_group_if_empty(Work)");
    let deleted = store
        .delete_group_if_empty(GroupUid::new(0), Duration::from_secs(1))
        .await?;
    println!("Deleted: {deleted} (Buy milk still references the group)");

    println!("\n>>> delete_group_if_empty(Chores)");
    let deleted = store
        .delete_group_if_empty(GroupUid::new(3), Duration::from_secs(1))
        .await?;
    println!("Deleted: {deleted}");
    print_groups(&store);

    // ========== Error isolation ==========

    println!("\n=== Error isolation on a failing backend ===");
    let fragile = TodoStore::open(
        Arc::new(FailingStorage::with_records(
            vec![Group::new(
                GroupUid::new(0),
                "💼".to_string(),
                "Work".to_string(),
            )],
            Vec::new(),
        )),
        TodoEnvironment::new(Arc::new(test_clock())),
    );

    let mut handle = fragile
        .send(TodoAction::AddTodo {
            draft: TodoDraft::new(GroupUid::new(0), "Doomed", ""),
        })
        .await?;
    handle.wait().await;

    let error = fragile.state(|s| s.last_error.clone()).await;
    println!("Recorded error: {error:?}");
    println!(
        "Todo count after the failure: {}",
        fragile.state(|s| s.todo_count()).await
    );

    // ========== Shutdown ==========

    store.shutdown_default().await?;
    fragile.shutdown_default().await?;
    tracing::info!("Both stores drained cleanly");

    println!("\n=== Walkthrough Complete ===");
    println!("\nKey concepts demonstrated:");
    println!("  • State: groups, todos, selection, editor mode, last error");
    println!("  • Commands vs events: writes confirm before collections change");
    println!("  • Views: watch channels with current value plus push updates");
    println!("  • Filtered projection: selection join, unchecked first, newest first");
    println!("  • Conditional delete: refused while any todo references the group");
    println!("  • Error isolation: a failed write never corrupts the collections");

    Ok(())
}
