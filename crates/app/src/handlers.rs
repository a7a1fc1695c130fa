//! Request handlers — the closed set of behaviours a resource method can be
//! bound to.
//!
//! Each handler runs synchronously on the loop thread. It reads the request
//! and the resource's current state. POST and PUT may also mutate that state
//! before the response is encoded.

use serde::Deserialize;

use minioc_domain::interface::Interface;
use minioc_domain::message::Status;
use minioc_domain::representation::{ObjectWriter, Representation, Value};
use minioc_domain::resource::ResourceDefinition;

/// What a GET on the baseline interface returns besides the baseline section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineGet {
    /// Baseline section followed by the data fields.
    #[default]
    Union,
    /// Baseline section only.
    Exclusive,
}

/// Application state guarded by a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState {
    Bool(bool),
    Int(i64),
    /// Fixed set of fields, served read-only.
    Document(Representation),
}

/// A request as seen by a handler: resolved resource and interface.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub resource: &'a ResourceDefinition,
    pub interface: Interface,
    pub payload: &'a Representation,
}

/// Handler outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub payload: Representation,
}

impl Response {
    #[must_use]
    pub fn new(status: Status, payload: Representation) -> Self {
        Self { status, payload }
    }

    /// A response without payload.
    #[must_use]
    pub fn empty(status: Status) -> Self {
        Self::new(status, Representation::new())
    }
}

/// Built-in handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Read the boolean `state` field; data interface is read-write.
    GetState,
    /// Merge boolean fields of the payload into `state`.
    PostState,
    /// Same as [`PostState`](Self::PostState).
    PutState,
    /// Read the integer `count` field; data interface is read-only.
    GetCount,
    /// Read a static document; data interface is read-only.
    GetDocument,
}

impl Handler {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GetState => "get_state",
            Self::PostState => "post_state",
            Self::PutState => "put_state",
            Self::GetCount => "get_count",
            Self::GetDocument => "get_document",
        }
    }

    /// Whether this handler can serve `state`.
    #[must_use]
    pub fn accepts(self, state: &ResourceState) -> bool {
        matches!(
            (self, state),
            (
                Self::GetState | Self::PostState | Self::PutState,
                ResourceState::Bool(_)
            ) | (Self::GetCount, ResourceState::Int(_))
                | (Self::GetDocument, ResourceState::Document(_))
        )
    }

    /// Run the handler against `state`.
    ///
    /// A handler bound to a state it does not accept answers
    /// [`Status::InternalServerError`] without touching the state.
    pub fn handle(
        self,
        request: &Request<'_>,
        state: &mut ResourceState,
        baseline: BaselineGet,
    ) -> Response {
        match (self, state) {
            (Self::PutState, state) => Self::PostState.handle(request, state, baseline),
            (Self::GetState, ResourceState::Bool(value)) => {
                let value = *value;
                let response = get(request, baseline, Interface::ReadWrite, |writer| {
                    writer.set("state", value);
                });
                tracing::debug!(path = %request.resource.path, state = value, "light state");
                response
            }
            (Self::PostState, ResourceState::Bool(value)) => post_state(request, value),
            (Self::GetCount, ResourceState::Int(count)) => {
                let count = *count;
                get(request, baseline, Interface::ReadOnly, |writer| {
                    writer.set("count", count);
                })
            }
            (Self::GetDocument, ResourceState::Document(document)) => {
                get(request, baseline, Interface::ReadOnly, |writer| {
                    for field in &*document {
                        writer.set(field.name.as_str(), field.value.clone());
                    }
                })
            }
            (handler, _) => {
                tracing::warn!(
                    path = %request.resource.path,
                    handler = handler.name(),
                    "handler cannot serve resource state"
                );
                Response::empty(Status::InternalServerError)
            }
        }
    }
}

/// Shared GET shape: baseline section, then the data fields when the
/// interface is baseline (union mode) or the handler's data interface.
fn get(
    request: &Request<'_>,
    baseline: BaselineGet,
    data_interface: Interface,
    write_data: impl FnOnce(&mut ObjectWriter),
) -> Response {
    tracing::debug!(
        path = %request.resource.path,
        interface = %request.interface,
        "GET"
    );
    let mut writer = ObjectWriter::start_object();
    match request.interface {
        Interface::Baseline => {
            request.resource.write_baseline(&mut writer);
            if baseline == BaselineGet::Union {
                write_data(&mut writer);
            }
        }
        iface if iface == data_interface => write_data(&mut writer),
        _ => {}
    }
    Response::new(Status::Ok, writer.end_object())
}

fn post_state(request: &Request<'_>, state: &mut bool) -> Response {
    tracing::debug!(path = %request.resource.path, "POST");
    for field in request.payload {
        if let Value::Bool(value) = field.value {
            tracing::debug!(key = %field.name, value, "applying boolean field");
            *state = value;
        }
    }
    tracing::debug!(path = %request.resource.path, state = *state, "light state");

    let mut writer = ObjectWriter::start_object();
    writer.set("state", *state);
    Response::new(Status::Changed, writer.end_object())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> ResourceDefinition {
        ResourceDefinition::builder()
            .path("/light/1")
            .resource_type("oic.r.light")
            .interface(Interface::ReadWrite)
            .default_interface(Interface::ReadWrite)
            .build()
            .unwrap()
    }

    fn counter() -> ResourceDefinition {
        ResourceDefinition::builder()
            .path("/count/1")
            .resource_type("oic.r.counter")
            .interface(Interface::ReadOnly)
            .default_interface(Interface::ReadOnly)
            .build()
            .unwrap()
    }

    fn run(
        handler: Handler,
        resource: &ResourceDefinition,
        interface: Interface,
        payload: &Representation,
        state: &mut ResourceState,
        baseline: BaselineGet,
    ) -> Response {
        let request = Request {
            resource,
            interface,
            payload,
        };
        handler.handle(&request, state, baseline)
    }

    fn json(rep: &Representation) -> serde_json::Value {
        serde_json::to_value(rep).unwrap()
    }

    #[test]
    fn should_get_only_state_on_read_write_interface() {
        let mut state = ResourceState::Bool(true);
        let empty = Representation::new();
        let response = run(
            Handler::GetState,
            &light(),
            Interface::ReadWrite,
            &empty,
            &mut state,
            BaselineGet::Union,
        );
        assert_eq!(response.status, Status::Ok);
        assert_eq!(json(&response.payload), serde_json::json!({"state": true}));
    }

    #[test]
    fn should_fall_through_from_baseline_into_data_fields() {
        let mut state = ResourceState::Bool(false);
        let empty = Representation::new();
        let response = run(
            Handler::GetState,
            &light(),
            Interface::Baseline,
            &empty,
            &mut state,
            BaselineGet::Union,
        );
        assert_eq!(
            json(&response.payload),
            serde_json::json!({
                "rt": ["oic.r.light"],
                "if": ["oic.if.baseline", "oic.if.rw"],
                "state": false,
            })
        );
    }

    #[test]
    fn should_emit_only_baseline_section_in_exclusive_mode() {
        let mut state = ResourceState::Bool(false);
        let empty = Representation::new();
        let response = run(
            Handler::GetState,
            &light(),
            Interface::Baseline,
            &empty,
            &mut state,
            BaselineGet::Exclusive,
        );
        assert!(response.payload.get("state").is_none());
        assert!(response.payload.get("rt").is_some());
    }

    #[test]
    fn should_return_superset_on_baseline_for_counter() {
        let mut state = ResourceState::Int(7);
        let empty = Representation::new();
        let read = run(
            Handler::GetCount,
            &counter(),
            Interface::ReadOnly,
            &empty,
            &mut state,
            BaselineGet::Union,
        );
        let baseline = run(
            Handler::GetCount,
            &counter(),
            Interface::Baseline,
            &empty,
            &mut state,
            BaselineGet::Union,
        );

        for name in read.payload.names() {
            assert_eq!(baseline.payload.get(name), read.payload.get(name));
        }
        assert!(baseline.payload.len() > read.payload.len());
        assert_eq!(read.payload.get_int("count"), Some(7));
    }

    #[test]
    fn should_emit_nothing_with_ok_on_other_interface() {
        let mut state = ResourceState::Int(7);
        let empty = Representation::new();
        let response = run(
            Handler::GetCount,
            &counter(),
            Interface::Actuator,
            &empty,
            &mut state,
            BaselineGet::Union,
        );
        assert_eq!(response.status, Status::Ok);
        assert!(response.payload.is_empty());
    }

    #[test]
    fn should_apply_last_boolean_field_on_post() {
        let mut state = ResourceState::Bool(false);
        let payload: Representation = [
            ("state", Value::Bool(true)),
            ("other", Value::Bool(false)),
            ("state", Value::Bool(true)),
        ]
        .into_iter()
        .collect();
        let response = run(
            Handler::PostState,
            &light(),
            Interface::ReadWrite,
            &payload,
            &mut state,
            BaselineGet::Union,
        );
        assert_eq!(response.status, Status::Changed);
        assert_eq!(state, ResourceState::Bool(true));
        assert_eq!(json(&response.payload), serde_json::json!({"state": true}));
    }

    #[test]
    fn should_echo_unchanged_state_when_payload_has_no_booleans() {
        let mut state = ResourceState::Bool(true);
        let payload: Representation = [("state", Value::Int(0)), ("name", Value::from("x"))]
            .into_iter()
            .collect();
        let response = run(
            Handler::PostState,
            &light(),
            Interface::ReadWrite,
            &payload,
            &mut state,
            BaselineGet::Union,
        );
        assert_eq!(response.status, Status::Changed);
        assert_eq!(state, ResourceState::Bool(true));
        assert_eq!(json(&response.payload), serde_json::json!({"state": true}));
    }

    #[test]
    fn should_treat_put_exactly_like_post() {
        let payload: Representation = [("state", true)].into_iter().collect();
        let mut post_state = ResourceState::Bool(false);
        let mut put_state = ResourceState::Bool(false);

        let post = run(
            Handler::PostState,
            &light(),
            Interface::ReadWrite,
            &payload,
            &mut post_state,
            BaselineGet::Union,
        );
        let put = run(
            Handler::PutState,
            &light(),
            Interface::ReadWrite,
            &payload,
            &mut put_state,
            BaselineGet::Union,
        );

        assert_eq!(post, put);
        assert_eq!(post_state, put_state);
    }

    #[test]
    fn should_fail_without_mutation_when_state_type_does_not_match() {
        let mut state = ResourceState::Int(3);
        let payload: Representation = [("state", true)].into_iter().collect();
        let response = run(
            Handler::PostState,
            &counter(),
            Interface::ReadOnly,
            &payload,
            &mut state,
            BaselineGet::Union,
        );
        assert_eq!(response.status, Status::InternalServerError);
        assert_eq!(state, ResourceState::Int(3));
    }

    #[test]
    fn should_accept_only_matching_state() {
        assert!(Handler::GetState.accepts(&ResourceState::Bool(false)));
        assert!(Handler::PutState.accepts(&ResourceState::Bool(false)));
        assert!(!Handler::GetCount.accepts(&ResourceState::Bool(false)));
        assert!(Handler::GetCount.accepts(&ResourceState::Int(0)));
        assert!(Handler::GetDocument.accepts(&ResourceState::Document(Representation::new())));
        assert!(!Handler::GetDocument.accepts(&ResourceState::Int(0)));
    }

    #[test]
    fn should_deserialize_baseline_mode_from_lowercase() {
        let mode: BaselineGet = serde_json::from_str("\"exclusive\"").unwrap();
        assert_eq!(mode, BaselineGet::Exclusive);
        assert_eq!(BaselineGet::default(), BaselineGet::Union);
    }
}
