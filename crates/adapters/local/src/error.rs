//! Local engine error types.

use std::path::PathBuf;

use minioc_domain::error::MiniocError;

/// Errors specific to the local engine.
#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    /// The engine has shut down and no longer accepts requests.
    #[error("engine stopped")]
    EngineStopped,

    /// `init` was called on an engine that already runs an application.
    #[error("engine already initialised")]
    AlreadyInitialised,

    /// The credential storage directory could not be prepared.
    #[error("cannot prepare storage directory {path}")]
    StorageDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LocalError {
    /// Convert into a [`MiniocError::Engine`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> MiniocError {
        MiniocError::Engine(Box::new(self))
    }
}

impl From<LocalError> for MiniocError {
    fn from(err: LocalError) -> Self {
        err.into_domain()
    }
}
