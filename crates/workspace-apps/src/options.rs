//! Provider configuration as supplied by the platform bootstrap.

use crate::collaborators::EndpointSource;
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the cache is kept fresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshStrategy {
    /// Refetch lazily when a caller finds the cache older than its TTL.
    #[default]
    OnDemand,
    /// A background task refetches every TTL; reads skip the TTL check.
    Interval,
}

/// Legacy `appsSourceUrl` accepts one url or a list of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceUrls {
    Single(String),
    Many(Vec<String>),
}

impl SourceUrls {
    pub fn urls(&self) -> Vec<&str> {
        let urls = match self {
            SourceUrls::Single(url) => vec![url.as_str()],
            SourceUrls::Many(urls) => urls.iter().map(String::as_str).collect(),
        };
        urls.into_iter().filter(|url| !url.is_empty()).collect()
    }
}

/// An entry of `endpointIds`: either a string or an inline endpoint config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointRef {
    Id(String),
    Map(serde_json::Value),
}

/// Options recognised by `AppProvider::initialize`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppProviderOptions {
    /// Deprecated, use `endpoint_ids`. Takes priority when present.
    pub apps_source_url: Option<SourceUrls>,
    /// Credentials mode forwarded with url endpoints (e.g. "include").
    pub include_credential_on_source_request: Option<String>,
    pub endpoint_ids: Vec<EndpointRef>,
    pub cache_duration_in_seconds: Option<u64>,
    pub cache_duration_in_minutes: Option<u64>,
    /// Allowed manifest type ids. Empty allows every type.
    pub manifest_types: Vec<String>,
    pub cache_retrieval_strategy: RefreshStrategy,
}

impl AppProviderOptions {
    /// Total cache time to live: seconds and minutes components summed.
    pub fn cache_duration(&self) -> Duration {
        let seconds = self.cache_duration_in_seconds.unwrap_or(0);
        let minutes = self.cache_duration_in_minutes.unwrap_or(0);
        let minutes = Duration::from_secs(minutes.saturating_mul(60));
        Duration::from_secs(seconds).saturating_add(minutes)
    }

    /// Directory endpoints described by these options, in declaration order.
    pub fn endpoint_sources(&self) -> Vec<EndpointSource> {
        let credentials = self.include_credential_on_source_request.clone();

        if let Some(source_urls) = self.apps_source_url.as_ref().filter(|s| !s.urls().is_empty()) {
            info!(
                "Using appsSourceUrl (backwards compatibility mode). Define endpoints and use endpointIds instead"
            );
            return source_urls
                .urls()
                .into_iter()
                .map(|url| EndpointSource::Url {
                    path: url.to_string(),
                    credentials: credentials.clone(),
                })
                .collect();
        }

        self.endpoint_ids
            .iter()
            .map(|endpoint| match endpoint {
                EndpointRef::Id(id) if id.starts_with("http") => EndpointSource::Url {
                    path: id.clone(),
                    credentials: credentials.clone(),
                },
                EndpointRef::Id(id) => EndpointSource::EndpointId(id.clone()),
                EndpointRef::Map(map) => EndpointSource::Map(map.clone()),
            })
            .collect()
    }
}
