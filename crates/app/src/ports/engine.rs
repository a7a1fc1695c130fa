//! Engine port — the protocol stack the event loop drives.
//!
//! The loop calls the lifecycle methods in order:
//!
//! 1. [`init`](Engine::init) — once; a failure is fatal for the process
//! 2. [`poll`](Engine::poll) — once per wake, until quit is requested
//! 3. [`shutdown`](Engine::shutdown) — once, after the loop has exited

use std::time::Instant;

use minioc_domain::error::MiniocError;

use crate::monitor::Waker;
use crate::ports::Application;

/// When the engine next needs to be polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextWake {
    /// No future work is scheduled; sleep until woken.
    Idle,
    /// Poll again no later than this instant.
    At(Instant),
}

impl NextWake {
    #[must_use]
    pub fn deadline(self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::At(at) => Some(at),
        }
    }

    /// The sooner of two wakes; `Idle` loses against any deadline.
    #[must_use]
    pub fn earliest(self, other: Self) -> Self {
        match (self, other) {
            (Self::Idle, next) | (next, Self::Idle) => next,
            (Self::At(a), Self::At(b)) => Self::At(a.min(b)),
        }
    }
}

/// The protocol/transport engine.
pub trait Engine {
    /// Initialise the stack and run the application callbacks.
    ///
    /// `waker` lets the engine interrupt a wait when new work arrives.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the stack or the application fails to
    /// initialise; the process must exit with [`EngineError::status`].
    fn init<A: Application>(&mut self, app: &A, waker: Waker) -> Result<(), EngineError>;

    /// Process all currently due work and report when to poll next.
    fn poll(&mut self) -> NextWake;

    /// Release engine resources.
    fn shutdown(&mut self);
}

/// Fatal initialisation failure.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An application callback rejected its configuration.
    #[error("application setup failed")]
    Application(#[from] MiniocError),

    /// The stack itself failed with a negative status.
    #[error("engine initialisation failed with status {0}")]
    Status(i32),
}

impl EngineError {
    /// Negative status the process exits with.
    #[must_use]
    pub fn status(&self) -> i32 {
        match self {
            Self::Application(_) => -1,
            Self::Status(status) => -status.saturating_abs().max(1),
        }
    }
}
