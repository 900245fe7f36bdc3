//! Platform services backing the app provider.
//!
//! - `directory` - Directory endpoints (HTTP, files, folders)
//! - `connections` - Connected apps seeded from settings
//! - `permissions` - Host permission grants from settings

pub mod connections;
pub mod directory;
pub mod permissions;

use crate::event_bus::LifecycleBus;
use crate::settings::Settings;
use connections::ConnectionRegistry;
use directory::DirectoryService;
use log::info;
use permissions::SettingsPermissions;
use std::sync::Arc;

/// Services wired together at startup.
pub struct Services {
    pub directory: Arc<DirectoryService>,
    pub connections: Arc<ConnectionRegistry>,
    pub permissions: Arc<SettingsPermissions>,
    pub lifecycle: Arc<LifecycleBus>,
}

/// Create all platform services from settings.
/// Call this once from main before initializing the app provider.
pub fn start_all(settings: &Settings) -> Services {
    info!("Starting platform services...");

    Services {
        directory: Arc::new(DirectoryService::new(settings.endpoints.clone())),
        connections: Arc::new(ConnectionRegistry::new(settings.connected_apps.clone())),
        permissions: Arc::new(SettingsPermissions::new(settings.permissions.clone())),
        lifecycle: Arc::new(LifecycleBus::new()),
    }
}
