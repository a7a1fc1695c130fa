//! Platform setup collected during [`Application::init`](crate::ports::Application::init).

use minioc_domain::device::{DeviceInfo, PLATFORM_RT, PLATFORM_URI, PlatformInfo};
use minioc_domain::error::{ConflictError, MiniocError, ValidationError};
use minioc_domain::interface::Interface;
use minioc_domain::message::Method;
use minioc_domain::resource::ResourceDefinition;

use crate::handlers::{Handler, ResourceState};
use crate::registry::Registry;

/// Platform and device metadata set by the application.
#[derive(Debug, Default)]
pub struct Platform {
    info: Option<PlatformInfo>,
    device: Option<DeviceInfo>,
}

impl Platform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe the hosting platform. Calling it again replaces the platform.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Validation`] when `manufacturer` is empty.
    pub fn init_platform(&mut self, manufacturer: &str) -> Result<&PlatformInfo, MiniocError> {
        Ok(self.info.insert(PlatformInfo::new(manufacturer)?))
    }

    /// Add the device exposed by this server.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PlatformNotInitialised`] before
    /// [`init_platform`](Self::init_platform), and a [`ConflictError`] when a
    /// device is already present.
    pub fn add_device(&mut self, device: DeviceInfo) -> Result<(), MiniocError> {
        if self.info.is_none() {
            return Err(ValidationError::PlatformNotInitialised.into());
        }
        if let Some(existing) = &self.device {
            return Err(ConflictError {
                path: existing.uri.clone(),
            }
            .into());
        }
        self.device = Some(device);
        Ok(())
    }

    #[must_use]
    pub fn info(&self) -> Option<&PlatformInfo> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    /// Register the read-only platform and device documents.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the platform or device is missing, or a
    /// [`ConflictError`] if their paths are already taken.
    pub fn register_core_resources(&self, registry: &mut Registry) -> Result<(), MiniocError> {
        let info = self
            .info
            .as_ref()
            .ok_or(ValidationError::PlatformNotInitialised)?;
        let device = self.device.as_ref().ok_or(ValidationError::MissingDevice)?;

        let platform_def = document_resource(PLATFORM_URI, vec![PLATFORM_RT.to_string()])?;
        let handle =
            registry.create_resource(platform_def, ResourceState::Document(info.to_representation()))?;
        registry.bind_handler(handle, Method::Get, Handler::GetDocument)?;

        let device_def = document_resource(&device.uri, device.resource_types())?;
        let handle =
            registry.create_resource(device_def, ResourceState::Document(device.to_representation()))?;
        registry.bind_handler(handle, Method::Get, Handler::GetDocument)?;

        Ok(())
    }
}

fn document_resource(path: &str, types: Vec<String>) -> Result<ResourceDefinition, MiniocError> {
    types
        .into_iter()
        .fold(ResourceDefinition::builder().path(path), |builder, rt| {
            builder.resource_type(rt)
        })
        .interface(Interface::ReadOnly)
        .discoverable(true)
        .build()
}

#[cfg(test)]
mod tests {
    use minioc_domain::device::DEVICE_URI;
    use minioc_domain::representation::Value;

    use super::*;
    use crate::handlers::BaselineGet;
    use crate::registry::ClientRequest;

    fn lamp() -> DeviceInfo {
        DeviceInfo::builder()
            .device_type("oic.d.light")
            .name("Kishen's light")
            .custom_property("purpose", "desk lamp")
            .build()
            .unwrap()
    }

    #[test]
    fn should_reject_device_before_platform() {
        let mut platform = Platform::new();
        let result = platform.add_device(lamp());
        assert!(matches!(
            result,
            Err(MiniocError::Validation(ValidationError::PlatformNotInitialised))
        ));
    }

    #[test]
    fn should_reject_second_device() {
        let mut platform = Platform::new();
        platform.init_platform("Intel").unwrap();
        platform.add_device(lamp()).unwrap();
        assert!(matches!(
            platform.add_device(lamp()),
            Err(MiniocError::Conflict(_))
        ));
    }

    #[test]
    fn should_require_device_for_core_resources() {
        let mut platform = Platform::new();
        platform.init_platform("Intel").unwrap();
        let mut registry = Registry::new(BaselineGet::Union);

        let result = platform.register_core_resources(&mut registry);
        assert!(matches!(
            result,
            Err(MiniocError::Validation(ValidationError::MissingDevice))
        ));
    }

    #[test]
    fn should_serve_device_document() {
        let mut platform = Platform::new();
        platform.init_platform("Intel").unwrap();
        platform.add_device(lamp()).unwrap();
        let mut registry = Registry::new(BaselineGet::Union);
        platform.register_core_resources(&mut registry).unwrap();

        let response = registry.dispatch(&ClientRequest::get(DEVICE_URI).interface(Interface::ReadOnly));
        assert!(response.status.is_success());
        assert_eq!(
            response.payload.get("purpose"),
            Some(&Value::Text("desk lamp".to_string()))
        );
        assert!(response.payload.get("rt").is_none());
    }

    #[test]
    fn should_serve_platform_document_with_baseline_by_default() {
        let mut platform = Platform::new();
        platform.init_platform("Intel").unwrap();
        platform.add_device(lamp()).unwrap();
        let mut registry = Registry::new(BaselineGet::Union);
        platform.register_core_resources(&mut registry).unwrap();

        let response = registry.dispatch(&ClientRequest::get(PLATFORM_URI));
        let names: Vec<&str> = response.payload.names().collect();
        assert_eq!(names, vec!["rt", "if", "pi", "mnmn"]);
    }
}
