//! Platform settings loaded at startup.
//!
//! Settings live in a single JSON document. A missing or malformed file
//! falls back to defaults so the starter always comes up.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use workspace_apps::{AppProviderOptions, PlatformApp};

/// A named (or inline) directory endpoint definition.
///
/// Exactly one of `url` or `path` is expected; `url` wins if both are set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointDefinition {
    /// Id referenced from `appProvider.endpointIds`. Inline definitions may omit it.
    pub id: Option<String>,
    /// HTTP(S) url serving a JSON array of apps.
    pub url: Option<String>,
    /// Local JSON file, or a folder scanned for `*.json` app files.
    pub path: Option<PathBuf>,
    /// Extra request headers for `url`.
    pub headers: HashMap<String, String>,
    /// Request timeout for `url`, in seconds.
    pub timeout_secs: Option<u64>,
}

/// Root settings document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Options for the app provider. Absent leaves the provider uninitialized.
    pub app_provider: Option<AppProviderOptions>,
    /// Endpoint definitions resolvable by id.
    pub endpoints: Vec<EndpointDefinition>,
    /// Host permissions granted to the platform (e.g. "System.launchExternalProcess").
    pub permissions: Vec<String>,
    /// Apps of clients connected at startup.
    pub connected_apps: Vec<PlatformApp>,
}

impl Settings {
    /// Load from a settings file, or return defaults if missing or invalid.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not read settings {}: {}. Using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Invalid settings {}: {}. Using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Default settings location.
/// Typically ~/.config/workspace-starter/settings.json
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("workspace-starter")
        .join("settings.json")
}
