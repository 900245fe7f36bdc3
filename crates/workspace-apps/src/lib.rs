//! workspace-apps: Application directory for workspace platforms.
//!
//! Provides a single `AppProvider` that:
//! - Merges apps from registered directory endpoints and live connections
//! - Drops apps the host cannot run (manifest type allowlist, permissions)
//! - Caches the result for a configurable duration, on demand or on an interval
//! - Shares one in-flight refresh between all concurrent callers
//! - Raises an "apps-changed" lifecycle event when the list changes

pub mod collaborators;
pub mod error;
pub mod filter;
pub mod options;
pub mod provider;
pub mod types;
pub mod validation;

pub use collaborators::{
    ConnectedApps, DirectoryEndpoint, DirectoryEndpoints, EndpointSource, LifecycleNotifier,
    PermissionOracle,
};
pub use error::AppsError;
pub use options::{AppProviderOptions, EndpointRef, RefreshStrategy, SourceUrls};
pub use provider::AppProvider;
pub use types::{
    AppFilterOptions, AppList, LifecycleEvent, ManifestType, Permission, PermissionState,
    PlatformApp,
};
