//! Collections and links.
//!
//! A [`Collection`] is a resource that aggregates other resources through
//! [`Link`]s. Links only reference their target by path. The set of links is
//! fixed once [`CollectionBuilder::build`] returns; a built collection
//! exposes its links read-only.

use crate::error::MiniocError;
use crate::interface::{Interface, InterfaceMask};
use crate::representation::{ObjectWriter, Representation};
use crate::resource::{ResourceBuilder, ResourceDefinition, validate_path};

/// Reference from a collection to a member resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    href: String,
    interfaces: InterfaceMask,
    resource_types: Vec<String>,
    baseline_policy: Option<String>,
}

impl Link {
    /// A link to `href` exposing only the baseline interface until narrowed
    /// with [`interfaces`](Self::interfaces).
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            interfaces: InterfaceMask::from(Interface::Baseline),
            resource_types: Vec::new(),
            baseline_policy: None,
        }
    }

    /// Replace the interface set advertised for the target.
    #[must_use]
    pub fn interfaces(mut self, interfaces: InterfaceMask) -> Self {
        self.interfaces = interfaces;
        self
    }

    #[must_use]
    pub fn resource_type(mut self, rt: impl Into<String>) -> Self {
        self.resource_types.push(rt.into());
        self
    }

    #[must_use]
    pub fn baseline_policy(mut self, bp: impl Into<String>) -> Self {
        self.baseline_policy = Some(bp.into());
        self
    }

    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    #[must_use]
    pub fn interface_mask(&self) -> InterfaceMask {
        self.interfaces
    }

    #[must_use]
    pub fn resource_types(&self) -> &[String] {
        &self.resource_types
    }

    #[must_use]
    pub fn policy(&self) -> Option<&str> {
        self.baseline_policy.as_deref()
    }

    /// Link entry as it appears in a `links` array.
    #[must_use]
    pub fn to_representation(&self) -> Representation {
        let mut writer = ObjectWriter::start_object();
        writer
            .set("href", self.href.as_str())
            .set("rt", self.resource_types.clone())
            .set("if", self.interfaces.names());
        if let Some(bp) = &self.baseline_policy {
            writer.set("bp", bp.as_str());
        }
        writer.end_object()
    }
}

/// A finalised collection resource and its links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    definition: ResourceDefinition,
    links: Vec<Link>,
}

impl Collection {
    /// Start describing a new collection.
    #[must_use]
    pub fn builder() -> CollectionBuilder {
        CollectionBuilder::default()
    }

    #[must_use]
    pub fn definition(&self) -> &ResourceDefinition {
        &self.definition
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.definition.path
    }

    /// Links in the order they were added.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Emit the `links` array.
    pub fn write_links(&self, writer: &mut ObjectWriter) {
        let links: Vec<Representation> = self.links.iter().map(Link::to_representation).collect();
        writer.set("links", links);
    }
}

/// Builder for [`Collection`]; the only place links can be attached.
///
/// Collections support the baseline and links-list interfaces and default to
/// links-list.
#[derive(Debug)]
pub struct CollectionBuilder {
    resource: ResourceBuilder,
    links: Vec<Link>,
}

impl Default for CollectionBuilder {
    fn default() -> Self {
        Self {
            resource: ResourceDefinition::builder()
                .interface(Interface::LinksList)
                .default_interface(Interface::LinksList),
            links: Vec::new(),
        }
    }
}

impl CollectionBuilder {
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.resource = self.resource.path(path);
        self
    }

    #[must_use]
    pub fn resource_type(mut self, rt: impl Into<String>) -> Self {
        self.resource = self.resource.resource_type(rt);
        self
    }

    #[must_use]
    pub fn discoverable(mut self, discoverable: bool) -> Self {
        self.resource = self.resource.discoverable(discoverable);
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.resource = self.resource.secure(secure);
        self
    }

    #[must_use]
    pub fn add_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Finalise the collection.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Validation`] when the collection definition is
    /// invalid or a link `href` is not an absolute path.
    pub fn build(self) -> Result<Collection, MiniocError> {
        let definition = self.resource.build()?;
        for link in &self.links {
            validate_path(&link.href)?;
        }
        Ok(Collection {
            definition,
            links: self.links,
        })
    }
}
