//! Application port — the callbacks an engine invokes while initialising.
//!
//! An application describes what the server exposes: platform and device
//! metadata first, then its resources and collections. Both callbacks run
//! exactly once, in that order, from [`Engine::init`](super::Engine::init).

use minioc_domain::error::MiniocError;

use crate::platform::Platform;
use crate::registry::Registry;

/// A server application plugged into an engine.
pub trait Application {
    /// Set platform and device metadata.
    ///
    /// Pure configuration; it has no effect on request handling.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata violates domain invariants.
    fn init(&self, platform: &mut Platform) -> Result<(), MiniocError>;

    /// Create resources, bind their handlers and register collections.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Conflict`] on a duplicate path, or a
    /// validation error for an invalid definition or binding.
    fn register_resources(&self, registry: &mut Registry) -> Result<(), MiniocError>;
}
