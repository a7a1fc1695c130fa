//! Local engine configuration.

use std::path::PathBuf;

use serde::Deserialize;

use minioc_app::handlers::BaselineGet;

/// Configuration for [`LocalEngine`](crate::LocalEngine).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether a baseline GET also carries the data fields.
    pub baseline_get: BaselineGet,
    /// Keep credentials under [`storage_dir`](Self::storage_dir).
    pub security: bool,
    /// Opaque credential storage directory, created on init when
    /// [`security`](Self::security) is on.
    pub storage_dir: PathBuf,
    /// Notifications buffered per observer before it starts lagging.
    pub notification_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_get: BaselineGet::Union,
            security: false,
            storage_dir: PathBuf::from("./creds"),
            notification_capacity: 64,
        }
    }
}
