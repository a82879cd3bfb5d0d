//! Explicit logging context
//!
//! The reconciler and scheduler do not rely on a process-wide subscriber.
//! They hold a [`LogContext`] and run their work inside it, so the binary
//! decides where lines go and tests can capture output per test.

use std::future::Future;
use tracing::Dispatch;
use tracing::instrument::{WithDispatch, WithSubscriber};

/// A tracing dispatcher that work is scoped to
#[derive(Clone)]
pub struct LogContext {
    dispatch: Dispatch,
}

impl LogContext {
    /// Send events to the given subscriber
    pub fn new(dispatch: impl Into<Dispatch>) -> Self {
        Self {
            dispatch: dispatch.into(),
        }
    }

    /// Drop every event
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Use whatever dispatcher is current when this is called
    pub fn current() -> Self {
        Self {
            dispatch: tracing::dispatcher::get_default(|d| d.clone()),
        }
    }

    /// The underlying dispatcher
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run a future with this context as the default dispatcher
    pub fn scope<F: Future>(&self, fut: F) -> WithDispatch<F> {
        fut.with_subscriber(self.dispatch.clone())
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::current()
    }
}

impl std::fmt::Debug for LogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogContext").finish_non_exhaustive()
    }
}
