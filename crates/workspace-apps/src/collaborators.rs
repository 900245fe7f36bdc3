//! Interfaces the provider consumes from the surrounding platform.
//!
//! Each seam is a trait so the host can plug in real services and tests can
//! plug in deterministic fakes.

use crate::error::AppsError;
use crate::types::{LifecycleEvent, Permission, PlatformApp};
use async_trait::async_trait;

/// Where a directory endpoint gets its apps from.
#[derive(Clone, Debug, PartialEq)]
pub enum EndpointSource {
    /// A url (or local path) serving a JSON array of apps.
    Url {
        path: String,
        credentials: Option<String>,
    },
    /// A named endpoint defined elsewhere in the platform settings.
    EndpointId(String),
    /// An inline endpoint configuration, interpreted by the registrar.
    Map(serde_json::Value),
}

/// A directory endpoint registered by the provider.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectoryEndpoint {
    /// Generated unique id (UUID v4).
    pub id: String,
    pub source: EndpointSource,
}

/// Registry and fetcher of directory endpoints.
#[async_trait]
pub trait DirectoryEndpoints: Send + Sync {
    /// Register an endpoint to be included in every later fetch.
    async fn add_endpoint(&self, endpoint: DirectoryEndpoint);

    /// Fetch the apps of all registered endpoints.
    async fn fetch_directory_apps(&self) -> Result<Vec<PlatformApp>, AppsError>;
}

/// Apps announced by live connections to the platform.
#[async_trait]
pub trait ConnectedApps: Send + Sync {
    async fn fetch_connected_apps(&self) -> Result<Vec<PlatformApp>, AppsError>;
}

/// Answers whether the host currently grants a permission.
#[async_trait]
pub trait PermissionOracle: Send + Sync {
    async fn query_granted(&self, permission: Permission) -> Result<bool, AppsError>;
}

/// Receives platform lifecycle events. Fire and forget.
pub trait LifecycleNotifier: Send + Sync {
    fn notify(&self, event: LifecycleEvent) -> Result<(), AppsError>;
}
