//! # Run Context
//!
//! Carries cancellation and deadline information into keyword
//! validation. Keywords poll [`RunContext::is_done`] before doing more
//! work and stop once it returns `true`; errors already recorded stay in
//! the validation state.
//!
//! Cancellation uses `tokio_util`'s `CancellationToken`, which is cheap to
//! clone, works without a runtime, and propagates from parent to child
//! contexts.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Cancellation and deadline for one validation run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RunContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context driven by an existing cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Same cancellation, with an absolute deadline. An earlier existing
    /// deadline is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            token: self.token.clone(),
            deadline: Some(deadline),
        }
    }

    /// Same cancellation, with a deadline `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A child context: cancelled when this one is, but cancelling the
    /// child leaves the parent running.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
