//! Resource registry — owns every resource and collection by path.
//!
//! Resources and collections share one path namespace. Registration order is
//! kept and drives iteration and discovery listings. Entries are never
//! removed; they live as long as the registry.

mod dispatch;

use std::collections::HashMap;
use std::time::Duration;

use minioc_domain::collection::Collection;
use minioc_domain::error::{ConflictError, MiniocError, NotFoundError, ValidationError};
use minioc_domain::message::Method;
use minioc_domain::resource::ResourceDefinition;

use crate::handlers::{BaselineGet, Handler, ResourceState};

pub use dispatch::ClientRequest;

/// Opaque reference to a registered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(usize);

#[derive(Debug, Default)]
struct MethodHandlers {
    get: Option<Handler>,
    post: Option<Handler>,
    put: Option<Handler>,
}

impl MethodHandlers {
    fn slot(&mut self, method: Method) -> &mut Option<Handler> {
        match method {
            Method::Get => &mut self.get,
            Method::Post => &mut self.post,
            Method::Put => &mut self.put,
        }
    }

    fn find(&self, method: Method) -> Option<Handler> {
        match method {
            Method::Get => self.get,
            Method::Post => self.post,
            Method::Put => self.put,
        }
    }
}

#[derive(Debug)]
struct ResourceEntry {
    definition: ResourceDefinition,
    state: ResourceState,
    handlers: MethodHandlers,
}

#[derive(Debug)]
enum Slot {
    Resource(ResourceEntry),
    Collection(Collection),
}

impl Slot {
    fn definition(&self) -> &ResourceDefinition {
        match self {
            Self::Resource(entry) => &entry.definition,
            Self::Collection(collection) => collection.definition(),
        }
    }
}

/// Path-indexed store of resources, their state and their handlers.
#[derive(Debug)]
pub struct Registry {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
    baseline: BaselineGet,
}

impl Registry {
    #[must_use]
    pub fn new(baseline: BaselineGet) -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            baseline,
        }
    }

    /// Register a resource and the application state it guards.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Validation`] for an invalid definition and
    /// [`MiniocError::Conflict`] when the path is already taken.
    pub fn create_resource(
        &mut self,
        definition: ResourceDefinition,
        state: ResourceState,
    ) -> Result<ResourceHandle, MiniocError> {
        definition.validate()?;
        let handle = self.reserve(&definition.path)?;
        tracing::debug!(path = %definition.path, "registered resource");
        self.slots.push(Slot::Resource(ResourceEntry {
            definition,
            state,
            handlers: MethodHandlers::default(),
        }));
        Ok(handle)
    }

    /// Bind `handler` to `method` on a resource, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::NotFound`] for a handle from another registry,
    /// and [`MiniocError::Validation`] when the handle names a collection or
    /// the handler cannot serve the resource's state.
    pub fn bind_handler(
        &mut self,
        handle: ResourceHandle,
        method: Method,
        handler: Handler,
    ) -> Result<(), MiniocError> {
        let slot = self.slots.get_mut(handle.0).ok_or_else(|| NotFoundError {
            entity: "resource",
            id: handle.0.to_string(),
        })?;
        let entry = match slot {
            Slot::Resource(entry) => entry,
            Slot::Collection(collection) => {
                return Err(ValidationError::CollectionHandler {
                    path: collection.path().to_string(),
                }
                .into());
            }
        };
        if !handler.accepts(&entry.state) {
            return Err(ValidationError::HandlerStateMismatch {
                path: entry.definition.path.clone(),
                handler: handler.name(),
            }
            .into());
        }
        *entry.handlers.slot(method) = Some(handler);
        Ok(())
    }

    /// Register a finalised collection.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Conflict`] when the path is taken, and
    /// [`MiniocError::Validation`] when a link targets an unregistered path
    /// or advertises interfaces its target does not support.
    pub fn add_collection(&mut self, collection: Collection) -> Result<ResourceHandle, MiniocError> {
        if self.index.contains_key(collection.path()) {
            return Err(ConflictError {
                path: collection.path().to_string(),
            }
            .into());
        }
        for link in collection.links() {
            let target = self
                .get(link.href())
                .ok_or_else(|| ValidationError::DanglingLink {
                    collection: collection.path().to_string(),
                    href: link.href().to_string(),
                })?;
            if !link.interface_mask().is_subset_of(target.interfaces) {
                return Err(ValidationError::LinkInterfaceMismatch {
                    collection: collection.path().to_string(),
                    href: link.href().to_string(),
                }
                .into());
            }
        }

        let handle = self.reserve(collection.path())?;
        tracing::debug!(
            path = collection.path(),
            links = collection.links().len(),
            "registered collection"
        );
        self.slots.push(Slot::Collection(collection));
        Ok(handle)
    }

    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<ResourceHandle> {
        self.index.get(path).copied().map(ResourceHandle)
    }

    /// Definition of the resource or collection at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ResourceDefinition> {
        self.resolve(path).and_then(|handle| self.definition(handle))
    }

    #[must_use]
    pub fn definition(&self, handle: ResourceHandle) -> Option<&ResourceDefinition> {
        self.slots.get(handle.0).map(Slot::definition)
    }

    /// Application state of a plain resource; collections hold none.
    #[must_use]
    pub fn state(&self, handle: ResourceHandle) -> Option<&ResourceState> {
        match self.slots.get(handle.0)? {
            Slot::Resource(entry) => Some(&entry.state),
            Slot::Collection(_) => None,
        }
    }

    /// Every definition, in registration order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.slots.iter().map(Slot::definition)
    }

    /// Definitions listed by discovery, in registration order.
    pub fn discoverable(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources().filter(|def| def.discoverable)
    }

    /// Paths with a periodic observe interval, in registration order.
    pub fn observable(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.resources()
            .filter_map(|def| def.observe_interval.map(|every| (def.path.as_str(), every)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn reserve(&mut self, path: &str) -> Result<ResourceHandle, ConflictError> {
        if self.index.contains_key(path) {
            return Err(ConflictError {
                path: path.to_string(),
            });
        }
        let index = self.slots.len();
        self.index.insert(path.to_string(), index);
        Ok(ResourceHandle(index))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(BaselineGet::default())
    }
}
