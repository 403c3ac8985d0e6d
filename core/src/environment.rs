//! Injected dependencies for the reducer.
//!
//! All external inputs the reducer needs are abstracted behind traits and
//! injected via [`TodoEnvironment`], so business logic stays deterministic
//! and testable. The only dependency this domain needs is a clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// Production uses [`SystemClock`]; tests inject fixed or manually advanced
/// clocks from the testing crate.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Environment dependencies for the todoflow reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for stamping creation and check times
    pub clock: Arc<dyn Clock>,
}

impl TodoEnvironment {
    /// Creates an environment with the given clock
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Creates the production environment backed by the system clock
    #[must_use]
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Default for TodoEnvironment {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}
