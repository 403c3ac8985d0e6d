//! # Todoflow Core
//!
//! Domain types and business logic for the todoflow data layer: the
//! reactive state model behind a personal to-do list application.
//!
//! ## Core Concepts
//!
//! - **Entities**: [`Todo`](entity::Todo) items and the
//!   [`Group`](entity::Group)s that organize them
//! - **State**: [`AppState`](state::AppState), the single canonical state a
//!   store owns
//! - **Action**: [`TodoAction`](action::TodoAction), unifying commands
//!   (user intent) and events (confirmed facts)
//! - **Reducer**: [`TodoReducer`](reducer::TodoReducer), a pure function
//!   `(State, Action, Environment) → Effects`
//! - **Effect**: [`Effect`](effect::Effect) descriptions executed by the
//!   store runtime, never by the reducer
//! - **Environment**: injected dependencies ([`Clock`](environment::Clock))
//! - **Storage**: [`TodoStorage`](storage::TodoStorage), the persistence
//!   interface the runtime writes through
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell: every business rule is a reducer
//!   case; all I/O lives in the runtime crate
//! - Unidirectional data flow: commands flow in, published views flow out
//! - Missing uids are silent no-ops, not errors
//! - Published views change only after a confirmed write
//!
//! ## Example
//!
//! ```
//! use todoflow_core::action::TodoAction;
//! use todoflow_core::entity::GroupUid;
//! use todoflow_core::environment::TodoEnvironment;
//! use todoflow_core::reducer::TodoReducer;
//! use todoflow_core::state::AppState;
//!
//! let reducer = TodoReducer::new();
//! let env = TodoEnvironment::system();
//! let mut state = AppState::new();
//!
//! // A pure command mutates state directly and returns no effects.
//! let effects = reducer.reduce(
//!     &mut state,
//!     TodoAction::SelectGroup {
//!         uid: GroupUid::ALL,
//!     },
//!     &env,
//! );
//! assert!(effects.is_empty());
//!
//! // A durable command returns a persistence effect for the runtime.
//! let effects = reducer.reduce(
//!     &mut state,
//!     TodoAction::AddGroup {
//!         draft: todoflow_core::entity::GroupDraft::new("💼", "Work"),
//!     },
//!     &env,
//! );
//! assert_eq!(effects.len(), 1);
//! ```

pub mod action;
pub mod editor;
pub mod effect;
pub mod entity;
pub mod environment;
pub mod ordering;
pub mod reducer;
pub mod state;
pub mod storage;
pub mod text;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::SmallVec;
