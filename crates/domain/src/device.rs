//! Platform and device metadata.
//!
//! Descriptive configuration set once during initialisation and served as
//! read-only documents at `/oic/p` and `/oic/d`. It has no influence on
//! request handling.

use crate::error::{MiniocError, ValidationError};
use crate::id::{DeviceId, PlatformId};
use crate::representation::{ObjectWriter, Representation};
use crate::resource::validate_path;

/// Path of the platform document.
pub const PLATFORM_URI: &str = "/oic/p";
/// Resource type of the platform document.
pub const PLATFORM_RT: &str = "oic.wk.p";
/// Default path of the device document.
pub const DEVICE_URI: &str = "/oic/d";
/// Resource type shared by every device document.
pub const DEVICE_RT: &str = "oic.wk.d";

/// The hardware platform hosting the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub id: PlatformId,
    pub manufacturer: String,
}

impl PlatformInfo {
    /// Describe a platform made by `manufacturer`.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Validation`] when `manufacturer` is empty.
    pub fn new(manufacturer: impl Into<String>) -> Result<Self, MiniocError> {
        let manufacturer = manufacturer.into();
        if manufacturer.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id: PlatformId::new(),
            manufacturer,
        })
    }

    #[must_use]
    pub fn to_representation(&self) -> Representation {
        let mut writer = ObjectWriter::start_object();
        writer
            .set("pi", self.id.to_string())
            .set("mnmn", self.manufacturer.as_str());
        writer.end_object()
    }
}

/// A logical device exposed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub uri: String,
    pub device_type: String,
    pub name: String,
    pub spec_version: String,
    pub data_model_version: String,
    /// Vendor-specific properties, in insertion order.
    pub custom_properties: Vec<(String, String)>,
}

impl DeviceInfo {
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Validation`] when the name is empty, the
    /// device type is not an `oic.d.*` type, or the URI is not absolute.
    pub fn validate(&self) -> Result<(), MiniocError> {
        validate_path(&self.uri)?;
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.device_type.starts_with("oic.d.") {
            return Err(ValidationError::InvalidDeviceType(self.device_type.clone()).into());
        }
        Ok(())
    }

    /// Resource types of the device document.
    #[must_use]
    pub fn resource_types(&self) -> Vec<String> {
        vec![DEVICE_RT.to_string(), self.device_type.clone()]
    }

    #[must_use]
    pub fn to_representation(&self) -> Representation {
        let mut writer = ObjectWriter::start_object();
        writer
            .set("di", self.id.to_string())
            .set("n", self.name.as_str())
            .set("icv", self.spec_version.as_str())
            .set("dmv", self.data_model_version.as_str());
        for (name, value) in &self.custom_properties {
            writer.set(name.as_str(), value.as_str());
        }
        writer.end_object()
    }
}

/// Step-by-step builder for [`DeviceInfo`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    uri: Option<String>,
    device_type: Option<String>,
    name: Option<String>,
    spec_version: Option<String>,
    data_model_version: Option<String>,
    custom_properties: Vec<(String, String)>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn spec_version(mut self, version: impl Into<String>) -> Self {
        self.spec_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn data_model_version(mut self, version: impl Into<String>) -> Self {
        self.data_model_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn custom_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_properties.push((name.into(), value.into()));
        self
    }

    /// Consume the builder, validate, and return a [`DeviceInfo`].
    ///
    /// # Errors
    ///
    /// Returns [`MiniocError::Validation`] if [`DeviceInfo::validate`] fails.
    pub fn build(self) -> Result<DeviceInfo, MiniocError> {
        let device = DeviceInfo {
            id: self.id.unwrap_or_default(),
            uri: self.uri.unwrap_or_else(|| DEVICE_URI.to_string()),
            device_type: self.device_type.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            spec_version: self.spec_version.unwrap_or_default(),
            data_model_version: self.data_model_version.unwrap_or_default(),
            custom_properties: self.custom_properties,
        };
        device.validate()?;
        Ok(device)
    }
}
