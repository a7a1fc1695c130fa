//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`MiniocError`]
//! via `#[from]`.

use crate::interface::Interface;

/// Top-level error for registry, engine and application operations.
#[derive(Debug, thiserror::Error)]
pub enum MiniocError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("registration conflict")]
    Conflict(#[from] ConflictError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("engine error")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("resource path must not be empty")]
    EmptyPath,

    #[error("resource path {0:?} must start with '/'")]
    RelativePath(String),

    #[error("resource {path} must declare at least one resource type")]
    MissingResourceType { path: String },

    #[error("default interface {interface} is not supported by {path}")]
    DefaultInterfaceNotSupported { path: String, interface: Interface },

    #[error("handler {handler} cannot serve the state held by {path}")]
    HandlerStateMismatch { path: String, handler: &'static str },

    #[error("collection {path} does not accept request handlers")]
    CollectionHandler { path: String },

    #[error("link {href} in {collection} targets an unregistered resource")]
    DanglingLink { collection: String, href: String },

    #[error("link {href} in {collection} exposes interfaces the target does not support")]
    LinkInterfaceMismatch { collection: String, href: String },

    #[error("name must not be empty")]
    EmptyName,

    #[error("device type {0:?} must start with 'oic.d.'")]
    InvalidDeviceType(String),

    #[error("platform has not been initialised")]
    PlatformNotInitialised,

    #[error("no device has been added to the platform")]
    MissingDevice,
}

/// A resource path was registered twice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a resource is already registered at {path}")]
pub struct ConflictError {
    pub path: String,
}

/// A lookup targeted something that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
