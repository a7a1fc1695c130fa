//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the protocol
//! engine. They are defined here (in `app`) so that both the event loop and
//! the adapter layer can depend on them without creating circular
//! dependencies.

pub mod application;
pub mod engine;

pub use application::Application;
pub use engine::{Engine, EngineError, NextWake};
