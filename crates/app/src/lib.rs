//! # minioc-app
//!
//! Application layer — request handling, the event loop, and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** at the engine boundary:
//!   - `Engine` — init / poll / shutdown of the protocol stack
//!   - `Application` — platform setup and resource registration callbacks
//! - Hold registered resources, collections and their state (`Registry`)
//! - Route requests and run the per-resource GET/POST/PUT handlers
//! - Provide the **wake monitor** shared by the loop and the signal bridge
//! - Drive the poll → wait cycle until quit (`EventLoop`)
//! - Provide in-process infrastructure (notification bus) that doesn't need IO
//! - Ship the light/counter server application (`LightServer`)
//!
//! ## Dependency rule
//! Depends on `minioc-domain` only (plus `tokio::sync` for the bus).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_loop;
pub mod handlers;
pub mod light_server;
pub mod monitor;
pub mod notify;
pub mod platform;
pub mod ports;
pub mod registry;
