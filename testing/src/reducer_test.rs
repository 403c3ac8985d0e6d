//! Ergonomic testing utilities for the todo reducer
//!
//! This module provides a fluent API for testing the reducer with readable
//! Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use std::sync::Arc;

use todoflow_core::action::TodoAction;
use todoflow_core::effect::Effect;
use todoflow_core::environment::TodoEnvironment;
use todoflow_core::reducer::TodoReducer;
use todoflow_core::state::AppState;

use crate::mocks::test_clock;

/// Type alias for state assertion functions
type StateAssertion = Box<dyn FnOnce(&AppState)>;

/// Type alias for effect assertion functions
type EffectAssertion = Box<dyn FnOnce(&[Effect])>;

/// Fluent API for testing the reducer with Given-When-Then syntax
///
/// The environment defaults to the fixed test clock, so most tests only
/// state the interesting parts.
///
/// # Example
///
/// ```ignore
/// use todoflow_testing::{ReducerTest, assertions};
///
/// ReducerTest::new()
///     .given_state(AppState::new())
///     .when_action(TodoAction::SelectGroup { uid: GroupUid::new(2) })
///     .then_state(|state| {
///         assert_eq!(state.selected_group, GroupUid::new(2));
///     })
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest {
    reducer: TodoReducer,
    environment: Option<TodoEnvironment>,
    initial_state: Option<AppState>,
    action: Option<TodoAction>,
    state_assertions: Vec<StateAssertion>,
    effect_assertions: Vec<EffectAssertion>,
}

impl ReducerTest {
    /// Create a new reducer test
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reducer: TodoReducer::new(),
            environment: None,
            initial_state: None,
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Override the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: TodoEnvironment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: AppState) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: TodoAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&AppState) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the resulting effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state or action is not set, or if any assertions
    /// fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let action = self.action.expect("Action must be set with when_action()");

        let env = self
            .environment
            .unwrap_or_else(|| TodoEnvironment::new(Arc::new(test_clock())));

        // Execute reducer
        let effects = self.reducer.reduce(&mut state, action, &env);

        // Run state assertions
        for assertion in self.state_assertions {
            assertion(&state);
        }

        // Run effect assertions
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

impl Default for ReducerTest {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper assertions for effects
pub mod assertions {
    use todoflow_core::action::TodoAction;
    use todoflow_core::effect::{Effect, PersistOp};

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects(effects: &[Effect]) {
        assert!(
            effects.is_empty(),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count(effects: &[Effect], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that effects contain at least one persist effect
    ///
    /// # Panics
    ///
    /// Panics if no persist effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_persist_effect(effects: &[Effect]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Persist(_))),
            "Expected at least one persist effect, but none found"
        );
    }

    /// Assert that effects contain at least one announce effect
    ///
    /// # Panics
    ///
    /// Panics if no announce effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_announce_effect(effects: &[Effect]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Announce(_))),
            "Expected at least one announce effect, but none found"
        );
    }

    /// Extract the op from an effect list holding exactly one persist
    ///
    /// # Panics
    ///
    /// Panics if the list is not exactly one persist effect.
    #[must_use]
    #[allow(clippy::panic)] // Test assertion
    pub fn single_persist(effects: &[Effect]) -> &PersistOp {
        match effects {
            [Effect::Persist(op)] => op,
            other => panic!("Expected exactly one persist effect, found {other:?}"),
        }
    }

    /// Extract the event from an effect list holding exactly one announce
    ///
    /// # Panics
    ///
    /// Panics if the list is not exactly one announce effect.
    #[must_use]
    #[allow(clippy::panic)] // Test assertion
    pub fn single_announce(effects: &[Effect]) -> &TodoAction {
        match effects {
            [Effect::Announce(event)] => event,
            other => panic!("Expected exactly one announce effect, found {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoflow_core::entity::{GroupDraft, GroupUid};

    #[test]
    fn test_reducer_test_select_group() {
        ReducerTest::new()
            .given_state(AppState::new())
            .when_action(TodoAction::SelectGroup {
                uid: GroupUid::new(2),
            })
            .then_state(|state| {
                assert_eq!(state.selected_group, GroupUid::new(2));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_reducer_test_defaults_environment() {
        ReducerTest::new()
            .given_state(AppState::new())
            .when_action(TodoAction::AddGroup {
                draft: GroupDraft::new("💼", "Work"),
            })
            .then_effects(|effects| {
                let op = assertions::single_persist(effects);
                assert_eq!(op.kind(), "insert_group");
            })
            .run();
    }

    #[test]
    fn test_assertions_effects_count() {
        assertions::assert_effects_count(&[], 0);
    }
}
