//! Light server — a switchable light, a read-only counter, and a collection
//! linking both.

use minioc_domain::collection::{Collection, Link};
use minioc_domain::device::DeviceInfo;
use minioc_domain::error::MiniocError;
use minioc_domain::interface::Interface;
use minioc_domain::message::Method;
use minioc_domain::resource::ResourceDefinition;

use crate::handlers::{Handler, ResourceState};
use crate::platform::Platform;
use crate::ports::Application;
use crate::registry::Registry;

pub const LIGHT_PATH: &str = "/light/1";
pub const LIGHT_RT: &str = "oic.r.light";
pub const COUNTER_PATH: &str = "/count/1";
pub const COUNTER_RT: &str = "oic.r.counter";
pub const COLLECTION_PATH: &str = "/lights";
pub const COLLECTION_RT: &str = "oic.wk.col";

/// Platform and device metadata announced by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub manufacturer: String,
    pub name: String,
    pub device_type: String,
    pub spec_version: String,
    pub data_model_version: String,
    pub custom_properties: Vec<(String, String)>,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            manufacturer: "Intel".to_string(),
            name: "Kishen's light".to_string(),
            device_type: "oic.d.light".to_string(),
            spec_version: "1.0".to_string(),
            data_model_version: "1.0".to_string(),
            custom_properties: vec![("purpose".to_string(), "desk lamp".to_string())],
        }
    }
}

/// The light/counter application.
#[derive(Debug, Clone)]
pub struct LightServer {
    profile: DeviceProfile,
    observe_interval: u16,
    secure: bool,
}

impl LightServer {
    #[must_use]
    pub fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            observe_interval: 1,
            secure: false,
        }
    }

    /// Period of observe notifications for the light and the counter, in
    /// seconds. Zero disables them.
    #[must_use]
    pub fn observe_interval(mut self, seconds: u16) -> Self {
        self.observe_interval = seconds;
        self
    }

    /// Mark every resource as requiring a secured session.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }
}

impl Default for LightServer {
    fn default() -> Self {
        Self::new(DeviceProfile::default())
    }
}

impl Application for LightServer {
    fn init(&self, platform: &mut Platform) -> Result<(), MiniocError> {
        let profile = &self.profile;
        platform.init_platform(&profile.manufacturer)?;

        let device = profile
            .custom_properties
            .iter()
            .fold(
                DeviceInfo::builder()
                    .device_type(profile.device_type.as_str())
                    .name(profile.name.as_str())
                    .spec_version(profile.spec_version.as_str())
                    .data_model_version(profile.data_model_version.as_str()),
                |builder, (name, value)| builder.custom_property(name.as_str(), value.as_str()),
            )
            .build()?;
        tracing::info!(name = %device.name, device_type = %device.device_type, "device added");
        platform.add_device(device)
    }

    fn register_resources(&self, registry: &mut Registry) -> Result<(), MiniocError> {
        let light = ResourceDefinition::builder()
            .path(LIGHT_PATH)
            .resource_type(LIGHT_RT)
            .interface(Interface::ReadWrite)
            .default_interface(Interface::ReadWrite)
            .secure(self.secure)
            .discoverable(true)
            .periodic_observable(self.observe_interval)
            .build()?;
        let handle = registry.create_resource(light, ResourceState::Bool(false))?;
        registry.bind_handler(handle, Method::Get, Handler::GetState)?;
        registry.bind_handler(handle, Method::Post, Handler::PostState)?;
        registry.bind_handler(handle, Method::Put, Handler::PutState)?;

        let counter = ResourceDefinition::builder()
            .path(COUNTER_PATH)
            .resource_type(COUNTER_RT)
            .interface(Interface::ReadOnly)
            .default_interface(Interface::ReadOnly)
            .secure(self.secure)
            .discoverable(true)
            .periodic_observable(self.observe_interval)
            .build()?;
        let handle = registry.create_resource(counter, ResourceState::Int(0))?;
        registry.bind_handler(handle, Method::Get, Handler::GetCount)?;

        let collection = Collection::builder()
            .path(COLLECTION_PATH)
            .resource_type(COLLECTION_RT)
            .discoverable(true)
            .secure(self.secure)
            .add_link(
                Link::new(LIGHT_PATH)
                    .interfaces(Interface::Baseline | Interface::ReadWrite)
                    .resource_type(LIGHT_RT)
                    .baseline_policy("if=oic.if.baseline"),
            )
            .add_link(
                Link::new(COUNTER_PATH)
                    .interfaces(Interface::Baseline | Interface::ReadOnly)
                    .resource_type(COUNTER_RT),
            )
            .build()?;
        registry.add_collection(collection)?;

        tracing::info!(resources = registry.len(), "light server resources registered");
        Ok(())
    }
}
