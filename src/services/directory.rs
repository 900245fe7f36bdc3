//! Directory endpoint service.
//!
//! Resolves registered endpoints to concrete targets and fetches their apps:
//! - `http(s)` urls via ureq on the blocking pool
//! - local `.json` files
//! - folders scanned for `*.json` app files (one app or an array per file)

use crate::settings::EndpointDefinition;
use async_trait::async_trait;
use futures_util::future::join_all;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;
use workspace_apps::{
    AppsError, DirectoryEndpoint, DirectoryEndpoints, EndpointSource, PlatformApp,
};

/// Request timeout when an endpoint does not set one.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Max folder depth scanned for app files.
const MAX_SCAN_DEPTH: usize = 3;

/// Where an endpoint's apps actually come from.
#[derive(Clone, Debug, PartialEq)]
enum Target {
    Http {
        url: String,
        headers: HashMap<String, String>,
        timeout: Duration,
    },
    Local(PathBuf),
}

impl Target {
    fn from_location(location: &str, headers: HashMap<String, String>, timeout: Duration) -> Self {
        if location.starts_with("http") {
            Target::Http {
                url: location.to_string(),
                headers,
                timeout,
            }
        } else {
            Target::Local(PathBuf::from(location))
        }
    }

    fn from_definition(definition: &EndpointDefinition) -> Result<Self, AppsError> {
        let timeout = Duration::from_secs(definition.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        if let Some(url) = &definition.url {
            return Ok(Target::from_location(url, definition.headers.clone(), timeout));
        }

        match &definition.path {
            Some(path) => Ok(Target::Local(path.clone())),
            None => Err(AppsError::InvalidEndpoint(format!(
                "endpoint {} has neither url nor path",
                definition.id.as_deref().unwrap_or("<inline>")
            ))),
        }
    }
}

/// A directory document: a list of apps or a single app.
#[derive(Deserialize)]
#[serde(untagged)]
enum AppDocument {
    Many(Vec<PlatformApp>),
    One(Box<PlatformApp>),
}

fn parse_apps(content: &str) -> Result<Vec<PlatformApp>, AppsError> {
    match serde_json::from_str(content)? {
        AppDocument::Many(apps) => Ok(apps),
        AppDocument::One(app) => Ok(vec![*app]),
    }
}

/// Directory endpoints registered by the app provider.
pub struct DirectoryService {
    /// Named endpoint definitions from settings.
    definitions: Vec<EndpointDefinition>,
    /// Endpoints registered so far, in registration order.
    endpoints: RwLock<Vec<DirectoryEndpoint>>,
}

impl DirectoryService {
    pub fn new(definitions: Vec<EndpointDefinition>) -> Self {
        Self {
            definitions,
            endpoints: RwLock::new(Vec::new()),
        }
    }

    /// Number of registered endpoints.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.read().map(|e| e.len()).unwrap_or(0)
    }

    fn resolve(&self, source: &EndpointSource) -> Result<Target, AppsError> {
        match source {
            EndpointSource::Url { path, credentials } => {
                if let Some(mode) = credentials {
                    debug!("Credentials mode '{}' requested for {}", mode, path);
                }
                Ok(Target::from_location(
                    path,
                    HashMap::new(),
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                ))
            }
            EndpointSource::EndpointId(id) => self
                .definitions
                .iter()
                .find(|d| d.id.as_deref() == Some(id.as_str()))
                .ok_or_else(|| AppsError::UnknownEndpoint(id.clone()))
                .and_then(Target::from_definition),
            EndpointSource::Map(map) => {
                let definition: EndpointDefinition = serde_json::from_value(map.clone())
                    .map_err(|e| AppsError::InvalidEndpoint(e.to_string()))?;
                Target::from_definition(&definition)
            }
        }
    }

    async fn fetch_endpoint(
        &self,
        endpoint: &DirectoryEndpoint,
    ) -> Result<Vec<PlatformApp>, AppsError> {
        let target = self.resolve(&endpoint.source)?;
        debug!("Fetching endpoint {} from {:?}", endpoint.id, target);

        tokio::task::spawn_blocking(move || match target {
            Target::Http {
                url,
                headers,
                timeout,
            } => fetch_url(&url, &headers, timeout),
            Target::Local(path) => load_path(&path),
        })
        .await
        .map_err(|e| AppsError::Io(std::io::Error::other(e)))?
    }
}

#[async_trait]
impl DirectoryEndpoints for DirectoryService {
    async fn add_endpoint(&self, endpoint: DirectoryEndpoint) {
        info!("Adding directory endpoint {}", endpoint.id);
        if let Ok(mut guard) = self.endpoints.write() {
            guard.push(endpoint);
        }
    }

    async fn fetch_directory_apps(&self) -> Result<Vec<PlatformApp>, AppsError> {
        let endpoints = self
            .endpoints
            .read()
            .map(|e| e.clone())
            .unwrap_or_default();

        let results = join_all(endpoints.iter().map(|e| self.fetch_endpoint(e))).await;

        let mut apps = Vec::new();
        for (endpoint, result) in endpoints.iter().zip(results) {
            match result {
                Ok(endpoint_apps) => {
                    debug!("Endpoint {} returned {} apps", endpoint.id, endpoint_apps.len());
                    apps.extend(endpoint_apps);
                }
                Err(e) => warn!("Skipping endpoint {}: {}", endpoint.id, e),
            }
        }

        Ok(apps)
    }
}

fn fetch_url(
    url: &str,
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> Result<Vec<PlatformApp>, AppsError> {
    let mut request = ureq::get(url).timeout(timeout);
    for (name, value) in headers {
        request = request.set(name, value);
    }

    let body = request
        .call()
        .map_err(|e| AppsError::Http(format!("{url}: {e}")))?
        .into_string()?;

    parse_apps(&body)
}

/// Load apps from a JSON file, or every `*.json` file below a folder.
fn load_path(path: &Path) -> Result<Vec<PlatformApp>, AppsError> {
    if !path.is_dir() {
        return parse_apps(&fs::read_to_string(path)?);
    }

    let mut apps = Vec::new();
    let walker = walkdir::WalkDir::new(path)
        .follow_links(true)
        .max_depth(MAX_SCAN_DEPTH)
        .sort_by_file_name();

    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let file = entry.path();
        if !entry.file_type().is_file()
            || file.extension().and_then(|e| e.to_str()) != Some("json")
        {
            continue;
        }

        match fs::read_to_string(file)
            .map_err(AppsError::from)
            .and_then(|content| parse_apps(&content))
        {
            Ok(file_apps) => apps.extend(file_apps),
            Err(e) => warn!("Skipping app file {}: {}", file.display(), e),
        }
    }

    Ok(apps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// A fresh scratch folder under the system temp dir.
    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "workspace-starter-directory-{}-{}",
            std::process::id(),
            DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn endpoint(source: EndpointSource) -> DirectoryEndpoint {
        DirectoryEndpoint {
            id: format!("{:?}", source),
            source,
        }
    }

    #[test]
    fn test_parse_single_and_many() {
        let many = parse_apps(r#"[{"appId":"a","name":"A"},{"appId":"b","name":"B"}]"#).unwrap();
        assert_eq!(many.len(), 2);

        let one = parse_apps(r#"{"appId":"a","name":"A","manifestType":"view"}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].app_id, "a");

        assert!(parse_apps("not json").is_err());
    }

    #[test]
    fn test_resolve_sources() {
        let service = DirectoryService::new(vec![EndpointDefinition {
            id: Some("remote".to_string()),
            url: Some("https://example.com/apps.json".to_string()),
            timeout_secs: Some(5),
            ..Default::default()
        }]);

        let target = service
            .resolve(&EndpointSource::EndpointId("remote".to_string()))
            .unwrap();
        assert!(matches!(
            target,
            Target::Http { timeout, .. } if timeout == Duration::from_secs(5)
        ));

        assert!(matches!(
            service.resolve(&EndpointSource::EndpointId("missing".to_string())),
            Err(AppsError::UnknownEndpoint(_))
        ));

        let target = service
            .resolve(&EndpointSource::Map(serde_json::json!({ "path": "/tmp/apps" })))
            .unwrap();
        assert_eq!(target, Target::Local(PathBuf::from("/tmp/apps")));

        assert!(matches!(
            service.resolve(&EndpointSource::Map(serde_json::json!({ "headers": {} }))),
            Err(AppsError::InvalidEndpoint(_))
        ));

        let target = service
            .resolve(&EndpointSource::Url {
                path: "apps.json".to_string(),
                credentials: None,
            })
            .unwrap();
        assert_eq!(target, Target::Local(PathBuf::from("apps.json")));
    }

    #[tokio::test]
    async fn test_fetch_from_folder_and_file() {
        let dir = scratch_dir();
        fs::write(
            dir.join("a.json"),
            r#"{"appId":"a","name":"A","manifestType":"view"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("b.json"),
            r#"[{"appId":"b","name":"B"},{"appId":"c","name":"C"}]"#,
        )
        .unwrap();
        fs::write(dir.join("broken.json"), "{").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let single = dir.join("single.json.txt");
        fs::write(&single, r#"[{"appId":"d","name":"D"}]"#).unwrap();

        let service = DirectoryService::new(Vec::new());
        service
            .add_endpoint(endpoint(EndpointSource::Map(
                serde_json::json!({ "path": dir.clone() }),
            )))
            .await;
        service
            .add_endpoint(endpoint(EndpointSource::Url {
                path: single.to_string_lossy().to_string(),
                credentials: None,
            }))
            .await;
        assert_eq!(service.endpoint_count(), 2);

        let apps = service.fetch_directory_apps().await.unwrap();
        let ids: Vec<&str> = apps.iter().map(|a| a.app_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_failing_endpoint_is_skipped() {
        let dir = scratch_dir();
        fs::write(dir.join("apps.json"), r#"[{"appId":"ok","name":"Ok"}]"#).unwrap();

        let service = DirectoryService::new(vec![EndpointDefinition {
            id: Some("local".to_string()),
            path: Some(dir.join("apps.json")),
            ..Default::default()
        }]);
        service
            .add_endpoint(endpoint(EndpointSource::EndpointId("unknown".to_string())))
            .await;
        service
            .add_endpoint(endpoint(EndpointSource::EndpointId("local".to_string())))
            .await;

        let apps = service.fetch_directory_apps().await.unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].app_id, "ok");

        fs::remove_dir_all(&dir).ok();
    }
}
