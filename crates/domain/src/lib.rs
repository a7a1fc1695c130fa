//! # minioc-domain
//!
//! Pure domain model for the minioc resource server.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define the **Representation** codec (ordered, typed name/value objects)
//! - Define **Interfaces** and interface masks (which fields a request may see)
//! - Define **Resources** (addressable, typed state holders: `/light/1`, …)
//! - Define **Collections** and **Links** (aggregation without ownership)
//! - Define **Platform** and **Device** metadata served at `/oic/p` and `/oic/d`
//! - Define request **Methods** and response **Statuses**
//! - Contain all invariant enforcement for the above
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or IO crates.
//! The engine boundary is expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod collection;
pub mod device;
pub mod interface;
pub mod message;
pub mod representation;
pub mod resource;
