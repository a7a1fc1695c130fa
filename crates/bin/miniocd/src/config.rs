//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `miniocd.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;

use minioc_adapter_local::EngineConfig;
use minioc_app::handlers::BaselineGet;
use minioc_app::light_server::{DeviceProfile, LightServer};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Platform and device metadata.
    pub device: DeviceConfig,
    /// Request handling settings.
    pub server: ServerConfig,
    /// Credential storage.
    pub security: SecurityConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Platform and device metadata announced by the server.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Display name (`n`).
    pub name: String,
    /// Device type; must be an `oic.d.*` type.
    pub device_type: String,
    /// Platform manufacturer (`mnmn`).
    pub manufacturer: String,
    /// `purpose` custom property; left out when empty.
    pub purpose: String,
    /// Core spec version (`icv`).
    pub spec_version: String,
    /// Data model version (`dmv`).
    pub data_model_version: String,
}

/// Request handling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `union` or `exclusive`.
    pub baseline_get: BaselineGet,
    /// Observe notification period in seconds; zero disables it.
    pub observe_interval_secs: u16,
}

/// Credential storage configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Mark resources secure and prepare the storage directory.
    pub enabled: bool,
    /// Opaque credential storage directory.
    pub storage_dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `miniocd.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("miniocd.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MINIOC_DEVICE_NAME") {
            self.device.name = val;
        }
        if let Some(val) = var("MINIOC_STORAGE_DIR") {
            self.security.storage_dir = PathBuf::from(val);
        }
        if let Some(val) = var("MINIOC_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.name.is_empty() {
            return Err(ConfigError::Validation(
                "device name must not be empty".to_string(),
            ));
        }
        if self.device.manufacturer.is_empty() {
            return Err(ConfigError::Validation(
                "manufacturer must not be empty".to_string(),
            ));
        }
        if !self.device.device_type.starts_with("oic.d.") {
            return Err(ConfigError::Validation(format!(
                "device type {:?} must start with 'oic.d.'",
                self.device.device_type
            )));
        }
        if self.security.enabled && self.security.storage_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage_dir must be set when security is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the local engine.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            baseline_get: self.server.baseline_get,
            security: self.security.enabled,
            storage_dir: self.security.storage_dir.clone(),
            ..EngineConfig::default()
        }
    }

    /// The application to serve.
    #[must_use]
    pub fn light_server(&self) -> LightServer {
        LightServer::new(self.device.profile())
            .observe_interval(self.server.observe_interval_secs)
            .secure(self.security.enabled)
    }
}

impl DeviceConfig {
    fn profile(&self) -> DeviceProfile {
        let custom_properties = if self.purpose.is_empty() {
            Vec::new()
        } else {
            vec![("purpose".to_string(), self.purpose.clone())]
        };
        DeviceProfile {
            manufacturer: self.manufacturer.clone(),
            name: self.name.clone(),
            device_type: self.device_type.clone(),
            spec_version: self.spec_version.clone(),
            data_model_version: self.data_model_version.clone(),
            custom_properties,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let profile = DeviceProfile::default();
        let purpose = profile
            .custom_properties
            .iter()
            .find(|(name, _)| name == "purpose")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        Self {
            name: profile.name,
            device_type: profile.device_type,
            manufacturer: profile.manufacturer,
            purpose,
            spec_version: profile.spec_version,
            data_model_version: profile.data_model_version,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            baseline_get: BaselineGet::Union,
            observe_interval_secs: 1,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            storage_dir: PathBuf::from("./creds"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "miniocd=info,minioc=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
