//! Resource — an addressable entity with a typed, interface-gated
//! representation.
//!
//! A [`ResourceDefinition`] holds everything the server needs to route and
//! introspect a resource. The application state it guards lives alongside it
//! in the registry.

use std::time::Duration;

use crate::error::{MiniocError, ValidationError};
use crate::interface::{Interface, InterfaceMask};
use crate::representation::ObjectWriter;

/// Static description of a registered resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinition {
    /// URI path, the resource identity (e.g. `/light/1`).
    pub path: String,
    /// Resource-type tags (`rt`), in bind order.
    pub resource_types: Vec<String>,
    /// Supported interfaces; always contains [`Interface::Baseline`].
    pub interfaces: InterfaceMask,
    /// Interface applied when a request does not name one.
    pub default_interface: Interface,
    /// Listed by discovery.
    pub discoverable: bool,
    /// Requires a secured session when security is enabled.
    pub secure: bool,
    /// Period of unsolicited observe notifications, if any.
    pub observe_interval: Option<Duration>,
}

impl ResourceDefinition {
    /// Create a builder for constructing a [`ResourceDefinition`].
    #[must_use]
    pub fn builder() -> ResourceBuilder {
        ResourceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Validation`] when the path is empty or
    /// relative, no resource type is bound, or the default interface is not
    /// among the supported ones.
    pub fn validate(&self) -> Result<(), MiniocError> {
        validate_path(&self.path)?;
        if self.resource_types.is_empty() {
            return Err(ValidationError::MissingResourceType {
                path: self.path.clone(),
            }
            .into());
        }
        if !self.interfaces.contains(self.default_interface) {
            return Err(ValidationError::DefaultInterfaceNotSupported {
                path: self.path.clone(),
                interface: self.default_interface,
            }
            .into());
        }
        Ok(())
    }

    /// Whether `iface` may be requested on this resource.
    #[must_use]
    pub fn supports(&self, iface: Interface) -> bool {
        self.interfaces.contains(iface)
    }

    /// Emit the generic baseline section: resource types and interfaces.
    pub fn write_baseline(&self, writer: &mut ObjectWriter) {
        writer
            .set("rt", self.resource_types.clone())
            .set("if", self.interfaces.names());
    }
}

pub(crate) fn validate_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(ValidationError::RelativePath(path.to_string()));
    }
    Ok(())
}

/// Step-by-step builder for [`ResourceDefinition`].
///
/// Every resource starts out supporting the baseline interface, which is
/// also the default until another one is chosen.
#[derive(Debug)]
pub struct ResourceBuilder {
    path: Option<String>,
    resource_types: Vec<String>,
    interfaces: InterfaceMask,
    default_interface: Interface,
    discoverable: bool,
    secure: bool,
    observe_interval: Option<Duration>,
}

impl Default for ResourceBuilder {
    fn default() -> Self {
        Self {
            path: None,
            resource_types: Vec::new(),
            interfaces: InterfaceMask::from(Interface::Baseline),
            default_interface: Interface::Baseline,
            discoverable: false,
            secure: false,
            observe_interval: None,
        }
    }
}

impl ResourceBuilder {
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn resource_type(mut self, rt: impl Into<String>) -> Self {
        self.resource_types.push(rt.into());
        self
    }

    /// Add a supported interface.
    #[must_use]
    pub fn interface(mut self, iface: Interface) -> Self {
        self.interfaces.insert(iface);
        self
    }

    #[must_use]
    pub fn default_interface(mut self, iface: Interface) -> Self {
        self.default_interface = iface;
        self
    }

    #[must_use]
    pub fn discoverable(mut self, discoverable: bool) -> Self {
        self.discoverable = discoverable;
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Notify observers every `seconds`; zero disables periodic notification.
    #[must_use]
    pub fn periodic_observable(mut self, seconds: u16) -> Self {
        self.observe_interval = (seconds > 0).then(|| Duration::from_secs(u64::from(seconds)));
        self
    }

    /// Consume the builder, validate, and return a [`ResourceDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Validation`] if any invariant of
    /// [`ResourceDefinition::validate`] fails.
    pub fn build(self) -> Result<ResourceDefinition, MiniocError> {
        let definition = ResourceDefinition {
            path: self.path.unwrap_or_default(),
            resource_types: self.resource_types,
            interfaces: self.interfaces,
            default_interface: self.default_interface,
            discoverable: self.discoverable,
            secure: self.secure,
            observe_interval: self.observe_interval,
        };
        definition.validate()?;
        Ok(definition)
    }
}
