//! Core types for the application directory.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared snapshot of validated apps.
/// Every caller served by the same refresh receives a clone of the same `Arc`.
pub type AppList = Arc<Vec<PlatformApp>>;

/// Manifest type tag of a directory entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ManifestType {
    View,
    InlineView,
    Window,
    InlineWindow,
    Snapshot,
    InlineSnapshot,
    Manifest,
    External,
    InlineExternal,
    AppAsset,
    InlineAppAsset,
    DesktopBrowser,
    Endpoint,
    Connection,
    UnregisteredApp,
    /// Any type this crate does not know about.
    Other(String),
}

impl ManifestType {
    /// The id used in directory documents (e.g. "inline-external").
    pub fn id(&self) -> &str {
        match self {
            ManifestType::View => "view",
            ManifestType::InlineView => "inline-view",
            ManifestType::Window => "window",
            ManifestType::InlineWindow => "inline-window",
            ManifestType::Snapshot => "snapshot",
            ManifestType::InlineSnapshot => "inline-snapshot",
            ManifestType::Manifest => "manifest",
            ManifestType::External => "external",
            ManifestType::InlineExternal => "inline-external",
            ManifestType::AppAsset => "appasset",
            ManifestType::InlineAppAsset => "inline-appasset",
            ManifestType::DesktopBrowser => "desktop-browser",
            ManifestType::Endpoint => "endpoint",
            ManifestType::Connection => "connection",
            ManifestType::UnregisteredApp => "unregistered-app",
            ManifestType::Other(id) => id,
        }
    }

    /// Launching this type spawns a native process on the host.
    pub fn requires_external_process(&self) -> bool {
        matches!(
            self,
            ManifestType::External
                | ManifestType::InlineExternal
                | ManifestType::AppAsset
                | ManifestType::InlineAppAsset
        )
    }

    /// Launching this type downloads an app asset first.
    pub fn requires_app_assets(&self) -> bool {
        matches!(self, ManifestType::AppAsset | ManifestType::InlineAppAsset)
    }
}

impl From<String> for ManifestType {
    fn from(id: String) -> Self {
        match id.as_str() {
            "view" => ManifestType::View,
            "inline-view" => ManifestType::InlineView,
            "window" => ManifestType::Window,
            "inline-window" => ManifestType::InlineWindow,
            "snapshot" => ManifestType::Snapshot,
            "inline-snapshot" => ManifestType::InlineSnapshot,
            "manifest" => ManifestType::Manifest,
            "external" => ManifestType::External,
            "inline-external" => ManifestType::InlineExternal,
            "appasset" => ManifestType::AppAsset,
            "inline-appasset" => ManifestType::InlineAppAsset,
            "desktop-browser" => ManifestType::DesktopBrowser,
            "endpoint" => ManifestType::Endpoint,
            "connection" => ManifestType::Connection,
            "unregistered-app" => ManifestType::UnregisteredApp,
            _ => ManifestType::Other(id),
        }
    }
}

impl From<&str> for ManifestType {
    fn from(id: &str) -> Self {
        ManifestType::from(id.to_string())
    }
}

impl From<ManifestType> for String {
    fn from(manifest_type: ManifestType) -> Self {
        manifest_type.id().to_string()
    }
}

impl std::fmt::Display for ManifestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A launchable application as served by a directory endpoint or a connection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformApp {
    /// Unique app identifier.
    pub app_id: String,
    /// Display name, also used as a fallback lookup key.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Manifest url or inline manifest reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_type: Option<ManifestType>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autostart: Option<bool>,
}

impl PlatformApp {
    pub fn is_private(&self) -> bool {
        self.private.unwrap_or(false)
    }

    pub fn is_autostart(&self) -> bool {
        self.autostart.unwrap_or(false)
    }
}

/// Narrowing options for `AppProvider::get_apps`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppFilterOptions {
    pub private: Option<bool>,
    pub autostart: Option<bool>,
}

impl AppFilterOptions {
    pub fn is_empty(&self) -> bool {
        self.private.is_none() && self.autostart.is_none()
    }
}

/// Host permissions consulted during validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Permission {
    LaunchExternalProcess,
    DownloadAppAssets,
}

impl Permission {
    /// Permission name as understood by the host runtime.
    pub fn name(&self) -> &'static str {
        match self {
            Permission::LaunchExternalProcess => "System.launchExternalProcess",
            Permission::DownloadAppAssets => "System.downloadAsset",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Permission grants captured for a single validation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PermissionState {
    pub can_launch_external_process: bool,
    pub can_download_app_assets: bool,
}

/// Platform lifecycle events raised by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    AppsChanged,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::AppsChanged => "apps-changed",
        }
    }
}
