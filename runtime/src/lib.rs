//! # Todoflow Runtime
//!
//! Store runtime for the todoflow data layer. The [`TodoStore`] owns the
//! canonical [`AppState`](todoflow_core::state::AppState), serializes all
//! mutations through the reducer, executes persistence effects on
//! background tasks, and republishes reactive read-only views after every
//! applied change.
//!
//! ## Data Flow
//!
//! 1. The UI sends a command with [`TodoStore::send`]
//! 2. The reducer runs under the state write lock; pure commands (selection,
//!    editor transitions) change state right there
//! 3. Durable commands return persist effects; each runs on a spawned task
//!    against the injected [`TodoStorage`](todoflow_core::storage::TodoStorage)
//! 4. A confirmed write feeds the matching event back through the reducer,
//!    which applies it to the collections; a failed write feeds
//!    `StorageFailed` instead and the collections stay untouched
//! 5. After every reduce the store republishes its `watch` views
//!    (change-detected) and broadcasts applied events to
//!    [`subscribe_events`](store::TodoStore::subscribe_events) observers
//!
//! ## Reactive Contract
//!
//! Every view accessor returns a `tokio::sync::watch::Receiver`: borrowing
//! yields the current value synchronously, `changed()` resolves on the next
//! republication, and dropping the receiver detaches the subscriber.
//!
//! ## Example
//!
//! ```ignore
//! let storage = Arc::new(MemoryStorage::new());
//! let store = TodoStore::open(storage, TodoEnvironment::system());
//!
//! let handle = store
//!     .send(TodoAction::AddGroup { draft: GroupDraft::new("💼", "Work") })
//!     .await?;
//! handle.wait().await;
//!
//! assert_eq!(store.groups().borrow().len(), 1);
//! ```

mod memory;
mod projection;

pub use memory::MemoryStorage;

/// Error types for the store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new commands
        ///
        /// This error is returned when `send()` is called after shutdown
        /// initiated. Events from writes already in flight still apply.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for pending writes to complete
        ///
        /// Some writes were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} writes still pending")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a deciding event
        ///
        /// Returned by waiting helpers when the timeout expires before the
        /// matching event is received.
        #[error("Timeout waiting for event")]
        Timeout,

        /// Event broadcast channel closed
        ///
        /// The event broadcast channel was closed, typically because the
        /// store was dropped.
        #[error("Event broadcast channel closed")]
        ChannelClosed,
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use error::StoreError;

/// Configuration for a [`TodoStore`]
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Capacity of the applied-event broadcast channel
    pub event_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(event_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            event_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the event broadcast capacity
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            event_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Handle for tracking write completion
///
/// Returned by [`TodoStore::send`](store::TodoStore::send) to allow waiting
/// for the persistence writes of one command to complete. Completion covers
/// the whole round trip: when [`wait`](Self::wait) returns, the write
/// confirmed (or failed) and the resulting event has been applied and
/// broadcast.
///
/// # Example
///
/// ```ignore
/// let handle = store.send(TodoAction::AddTodo { draft }).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The todo is now visible in the published views (or last_error is set).
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    writes: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new handle together with its internal tracking side
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            writes: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            writes: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Returns true if no write is still pending
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.writes.load(Ordering::SeqCst) == 0
    }

    /// Wait for all writes of the originating command to complete
    pub async fn wait(&mut self) {
        while self.writes.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Runtime side is gone; nothing left to wait for.
                break;
            }
        }
    }

    /// Wait for completion with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// writes complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_writes", &self.writes.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: write tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the write counter (write started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the write counter (write completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the write counter on drop.
///
/// Ensures the counter is always decremented, even if the write task panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - the runtime coordinator for the todoflow reducer
pub mod store {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::{RwLock, broadcast, watch};

    use todoflow_core::action::TodoAction;
    use todoflow_core::editor::EditorMode;
    use todoflow_core::effect::{Effect, PersistOp};
    use todoflow_core::entity::{Group, GroupUid, Todo};
    use todoflow_core::environment::TodoEnvironment;
    use todoflow_core::reducer::TodoReducer;
    use todoflow_core::state::AppState;
    use todoflow_core::storage::{StorageError, TodoStorage};

    use super::error::StoreError;
    use super::projection;
    use super::{AtomicCounterGuard, DecrementGuard, EffectHandle, EffectTracking, StoreConfig};

    /// The store - runtime coordinator for the todoflow data layer
    ///
    /// The store manages:
    /// 1. The canonical state (behind `RwLock`, mutated only by the reducer)
    /// 2. Persistence effect execution with a feedback loop
    /// 3. The published `watch` views and the applied-event broadcast
    ///
    /// Cloning a store is cheap; clones share the same state, views, and
    /// backend.
    pub struct TodoStore {
        state: Arc<RwLock<AppState>>,
        reducer: TodoReducer,
        environment: TodoEnvironment,
        storage: Arc<dyn TodoStorage>,
        config: StoreConfig,
        shutdown: Arc<AtomicBool>,
        pending_writes: Arc<AtomicUsize>,
        event_broadcast: broadcast::Sender<TodoAction>,
        groups_tx: watch::Sender<Vec<Group>>,
        todos_tx: watch::Sender<Vec<Todo>>,
        selected_tx: watch::Sender<GroupUid>,
        editor_tx: watch::Sender<EditorMode>,
        filtered: watch::Receiver<Vec<Todo>>,
    }

    impl TodoStore {
        /// Open a store over a storage backend with the default config.
        ///
        /// See [`open_with_config`](Self::open_with_config).
        ///
        /// # Panics
        ///
        /// Panics if called outside a Tokio runtime (the filtered-todos
        /// node runs as a spawned task).
        #[must_use]
        pub fn open(storage: Arc<dyn TodoStorage>, environment: TodoEnvironment) -> Self {
            Self::open_with_config(storage, environment, StoreConfig::default())
        }

        /// Open a store over a storage backend.
        ///
        /// Hydrates the state from the backend's observed current sets: uid
        /// counters seed past the highest stored uid, the selection starts
        /// at [`GroupUid::ALL`], and the editor starts closed.
        ///
        /// # Panics
        ///
        /// Panics if called outside a Tokio runtime (the filtered-todos
        /// node runs as a spawned task).
        #[must_use]
        pub fn open_with_config(
            storage: Arc<dyn TodoStorage>,
            environment: TodoEnvironment,
            config: StoreConfig,
        ) -> Self {
            let groups = storage.observe_groups().borrow().clone();
            let todos = storage.observe_todos().borrow().clone();
            let state = AppState::hydrated(groups, todos);

            tracing::info!(
                groups = state.group_count(),
                todos = state.todo_count(),
                "Hydrated store from storage"
            );

            let (event_broadcast, _) = broadcast::channel(config.event_capacity);
            let (groups_tx, _) = watch::channel(state.groups.clone());
            let (todos_tx, todos_rx) = watch::channel(state.todos.clone());
            let (selected_tx, selected_rx) = watch::channel(state.selected_group);
            let (editor_tx, _) = watch::channel(state.editor.clone());

            let filtered = projection::spawn_filtered_todos(todos_rx, selected_rx);

            Self {
                state: Arc::new(RwLock::new(state)),
                reducer: TodoReducer::new(),
                environment,
                storage,
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_writes: Arc::new(AtomicUsize::new(0)),
                event_broadcast,
                groups_tx,
                todos_tx,
                selected_tx,
                editor_tx,
                filtered,
            }
        }

        /// Send a command to the store
        ///
        /// This is the only write surface:
        /// 1. Acquires the write lock on state
        /// 2. Runs the reducer with (state, action, environment)
        /// 3. Republishes the views that changed
        /// 4. Executes returned persistence effects on background tasks
        ///
        /// `send` returns after starting the writes, not after they
        /// complete; await the returned handle to observe completion.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is
        /// shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: TodoAction) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!(action = action.kind(), "Rejected action: store is shutting down");
                return Err(StoreError::ShutdownInProgress);
            }

            let (handle, tracking) = EffectHandle::new();
            self.dispatch(action, &tracking).await;
            Ok(handle)
        }

        /// Send `DeleteGroupIfEmpty` and wait for the deciding event.
        ///
        /// # Returns
        ///
        /// `true` if the group was deleted, `false` if deletion was refused
        /// (a todo still references the group, the group does not exist, or
        /// the backend failed the conditional delete).
        ///
        /// # Errors
        ///
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        /// - [`StoreError::Timeout`]: no deciding event within `timeout`
        /// - [`StoreError::ChannelClosed`]: the store was dropped mid-wait
        ///
        /// # Notes
        ///
        /// Concurrent calls for the same group uid race benignly: each call
        /// resolves on the first deciding event for that uid.
        pub async fn delete_group_if_empty(
            &self,
            uid: GroupUid,
            timeout: Duration,
        ) -> Result<bool, StoreError> {
            // Subscribe BEFORE sending to avoid missing the deciding event
            let mut rx = self.event_broadcast.subscribe();

            self.send(TodoAction::DeleteGroupIfEmpty { uid }).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(TodoAction::GroupDeleted { uid: deleted }) if deleted == uid => {
                            return Ok(true);
                        }
                        Ok(TodoAction::GroupDeleteRefused { uid: refused }) if refused == uid => {
                            return Ok(false);
                        }
                        Ok(TodoAction::StorageFailed {
                            op: PersistOp::DeleteGroupIfEmpty(failed),
                            ..
                        }) if failed == uid => {
                            // The write failed, so no deletion occurred.
                            return Ok(false);
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Event observer lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        }
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Observe all groups, in insertion order
        #[must_use]
        pub fn groups(&self) -> watch::Receiver<Vec<Group>> {
            self.groups_tx.subscribe()
        }

        /// Observe all todos, in insertion order
        #[must_use]
        pub fn todos(&self) -> watch::Receiver<Vec<Todo>> {
            self.todos_tx.subscribe()
        }

        /// Observe the filtered, display-ordered todo list.
        ///
        /// Recomputed whenever the todo set or the group selection changes:
        /// todos of the selected group (all todos when the selection is the
        /// virtual "all groups" view), unchecked before checked, newest
        /// first within each section.
        #[must_use]
        pub fn filtered_todos(&self) -> watch::Receiver<Vec<Todo>> {
            self.filtered.clone()
        }

        /// Observe the current group selection
        #[must_use]
        pub fn selected_group(&self) -> watch::Receiver<GroupUid> {
            self.selected_tx.subscribe()
        }

        /// Observe the editor-mode state machine
        #[must_use]
        pub fn editor_mode(&self) -> watch::Receiver<EditorMode> {
            self.editor_tx.subscribe()
        }

        /// Subscribe to applied events.
        ///
        /// Only event variants appear on this stream, each exactly once,
        /// after the state application that carried it (refusals carry no
        /// state change and are announced directly). If the receiver lags
        /// it skips old events and observes `RecvError::Lagged`.
        #[must_use]
        pub fn subscribe_events(&self) -> broadcast::Receiver<TodoAction> {
            self.event_broadcast.subscribe()
        }

        /// Read current state via a closure.
        ///
        /// Access state through a closure to ensure the lock is released
        /// promptly:
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todo_count()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&AppState) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Gracefully shut down the store.
        ///
        /// Sets the shutdown flag (rejecting new commands) and waits for
        /// pending writes to complete. Events from writes already in flight
        /// still apply during the drain.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires
        /// with writes still pending.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");

            // Set shutdown flag to reject new commands
            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_writes.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All writes completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_writes = pending, "Shutdown timed out");
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(
                    pending_writes = pending,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Waiting for writes to complete"
                );

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Gracefully shut down with the configured default timeout.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the default timeout
        /// expires with writes still pending.
        pub async fn shutdown_default(&self) -> Result<(), StoreError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        /// Run the reducer on an action, republish views, broadcast the
        /// action if it is an event, and start any returned effects.
        ///
        /// The feedback path uses this directly, bypassing the shutdown
        /// gate: an in-flight write that confirms during shutdown must
        /// still apply its event.
        async fn dispatch(&self, action: TodoAction, tracking: &EffectTracking) {
            tracing::debug!(action = action.kind(), "Processing action");

            let broadcast_after = action.is_event().then(|| action.clone());

            let effects = {
                let mut state = self.state.write().await;

                if let TodoAction::AddTodo { draft } = &action {
                    // The editor workflow cannot produce this; direct API
                    // callers can. The todo is stored anyway and only
                    // surfaces under the all-groups view.
                    if state.group(draft.group).is_none() {
                        tracing::warn!(
                            group = %draft.group,
                            "Adding todo to a group that does not exist"
                        );
                    }
                }

                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                self.publish_views(&state);
                effects
            };

            if let Some(event) = broadcast_after {
                let _ = self.event_broadcast.send(event);
            }

            for effect in effects {
                self.execute_effect(effect, tracking.clone());
            }
        }

        /// Republish every view whose value changed.
        ///
        /// `send_if_modified` keeps the no-op guarantee: subscribers are
        /// not notified when a mutation left a view untouched.
        fn publish_views(&self, state: &AppState) {
            self.groups_tx.send_if_modified(|current| {
                if *current == state.groups {
                    false
                } else {
                    current.clone_from(&state.groups);
                    true
                }
            });
            self.todos_tx.send_if_modified(|current| {
                if *current == state.todos {
                    false
                } else {
                    current.clone_from(&state.todos);
                    true
                }
            });
            self.selected_tx.send_if_modified(|current| {
                if *current == state.selected_group {
                    false
                } else {
                    *current = state.selected_group;
                    true
                }
            });
            self.editor_tx.send_if_modified(|current| {
                if *current == state.editor {
                    false
                } else {
                    current.clone_from(&state.editor);
                    true
                }
            });
        }

        /// Execute one effect with write tracking.
        ///
        /// Persistence ops run on spawned tasks; the [`DecrementGuard`]
        /// ensures the handle's counter is decremented even if the task
        /// panics, and the pending-writes guard keeps shutdown accounting
        /// correct. Announcements are synchronous.
        fn execute_effect(&self, effect: Effect, tracking: EffectTracking) {
            match effect {
                Effect::Announce(event) => {
                    tracing::debug!(event = event.kind(), "Announcing event");
                    let _ = self.event_broadcast.send(event);
                }
                Effect::Persist(op) => {
                    tracing::debug!(op = op.kind(), "Starting write");
                    tracking.increment();

                    // Track global pending writes for shutdown
                    self.pending_writes.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_writes));

                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking);
                        let _pending_guard = pending_guard; // Decrement on drop

                        let event = store.run_persist_op(op).await;

                        // Feed the event back so it applies and broadcasts.
                        // A fresh tracking pair is fine: event application
                        // produces no further effects.
                        let (_, feedback_tracking) = EffectHandle::new();
                        store.dispatch(event, &feedback_tracking).await;
                    });
                }
            }
        }

        /// Run one persistence op and turn its outcome into an event
        async fn run_persist_op(&self, op: PersistOp) -> TodoAction {
            let result: Result<TodoAction, StorageError> = match &op {
                PersistOp::InsertTodo(todo) => self
                    .storage
                    .insert_todo(todo.clone())
                    .await
                    .map(|()| TodoAction::TodoAdded { todo: todo.clone() }),
                PersistOp::UpdateTodo(todo) => self
                    .storage
                    .update_todo(todo.clone())
                    .await
                    .map(|()| TodoAction::TodoModified { todo: todo.clone() }),
                PersistOp::DeleteTodo(todo) => self
                    .storage
                    .delete_todo(todo.clone())
                    .await
                    .map(|()| TodoAction::TodoDeleted { uid: todo.uid }),
                PersistOp::InsertGroup(group) => self
                    .storage
                    .insert_group(group.clone())
                    .await
                    .map(|()| TodoAction::GroupAdded {
                        group: group.clone(),
                    }),
                PersistOp::UpdateGroup(group) => self
                    .storage
                    .update_group(group.clone())
                    .await
                    .map(|()| TodoAction::GroupModified {
                        group: group.clone(),
                    }),
                PersistOp::DeleteGroupIfEmpty(uid) => self
                    .storage
                    .delete_group_if_empty(*uid)
                    .await
                    .map(|deleted| {
                        if deleted > 0 {
                            TodoAction::GroupDeleted { uid: *uid }
                        } else {
                            TodoAction::GroupDeleteRefused { uid: *uid }
                        }
                    }),
            };

            match result {
                Ok(event) => {
                    tracing::debug!(op = op.kind(), "Write confirmed");
                    event
                }
                Err(error) => {
                    tracing::error!(op = op.kind(), error = %error, "Write failed");
                    TodoAction::StorageFailed { op, error }
                }
            }
        }
    }

    impl Clone for TodoStore {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer,
                environment: self.environment.clone(),
                storage: Arc::clone(&self.storage),
                config: self.config.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_writes: Arc::clone(&self.pending_writes),
                event_broadcast: self.event_broadcast.clone(),
                groups_tx: self.groups_tx.clone(),
                todos_tx: self.todos_tx.clone(),
                selected_tx: self.selected_tx.clone(),
                editor_tx: self.editor_tx.clone(),
                filtered: self.filtered.clone(),
            }
        }
    }

    impl std::fmt::Debug for TodoStore {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TodoStore")
                .field(
                    "pending_writes",
                    &self.pending_writes.load(Ordering::SeqCst),
                )
                .field("shutdown", &self.shutdown.load(Ordering::Acquire))
                .finish_non_exhaustive()
        }
    }
}

// Re-export for convenience
pub use store::TodoStore;
