//! Routing from a client request to the handler bound on its target.

use minioc_domain::collection::Collection;
use minioc_domain::interface::Interface;
use minioc_domain::message::{Method, Status};
use minioc_domain::representation::{ObjectWriter, Representation};

use super::{Registry, ResourceEntry, Slot};
use crate::handlers::{BaselineGet, Request, Response};

/// A request addressed by path, before routing.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRequest {
    pub method: Method,
    pub path: String,
    /// Requested interface; the target's default applies when `None`.
    pub interface: Option<Interface>,
    pub payload: Representation,
}

impl ClientRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, Representation::new())
    }

    #[must_use]
    pub fn post(path: impl Into<String>, payload: Representation) -> Self {
        Self::new(Method::Post, path, payload)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, payload: Representation) -> Self {
        Self::new(Method::Put, path, payload)
    }

    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, payload: Representation) -> Self {
        Self {
            method,
            path: path.into(),
            interface: None,
            payload,
        }
    }

    /// Ask for a specific interface instead of the default one.
    #[must_use]
    pub fn interface(mut self, interface: Interface) -> Self {
        self.interface = Some(interface);
        self
    }
}

impl Registry {
    /// Route `request` to its target and run the bound handler.
    ///
    /// Routing failures are answered with an error status rather than an
    /// `Err`: unknown path, unbound method, or unsupported interface.
    pub fn dispatch(&mut self, request: &ClientRequest) -> Response {
        let baseline = self.baseline;
        let response = match self.index.get(&request.path).copied() {
            None => Response::empty(Status::NotFound),
            Some(index) => match &mut self.slots[index] {
                Slot::Resource(entry) => dispatch_resource(entry, request, baseline),
                Slot::Collection(collection) => dispatch_collection(collection, request),
            },
        };
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            interface = ?request.interface,
            status = %response.status,
            "dispatched request"
        );
        response
    }
}

fn dispatch_resource(
    entry: &mut ResourceEntry,
    request: &ClientRequest,
    baseline: BaselineGet,
) -> Response {
    let Some(handler) = entry.handlers.find(request.method) else {
        return Response::empty(Status::MethodNotAllowed);
    };
    let interface = request
        .interface
        .unwrap_or(entry.definition.default_interface);
    if !entry.definition.supports(interface) {
        return Response::empty(Status::BadRequest);
    }

    let handler_request = Request {
        resource: &entry.definition,
        interface,
        payload: &request.payload,
    };
    handler.handle(&handler_request, &mut entry.state, baseline)
}

fn dispatch_collection(collection: &Collection, request: &ClientRequest) -> Response {
    if request.method != Method::Get {
        return Response::empty(Status::MethodNotAllowed);
    }
    let definition = collection.definition();
    let interface = request.interface.unwrap_or(definition.default_interface);

    let mut writer = ObjectWriter::start_object();
    match interface {
        Interface::LinksList => collection.write_links(&mut writer),
        Interface::Baseline => {
            definition.write_baseline(&mut writer);
            collection.write_links(&mut writer);
        }
        _ => return Response::empty(Status::BadRequest),
    }
    Response::new(Status::Ok, writer.end_object())
}
