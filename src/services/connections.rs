//! Connected apps registry.
//!
//! Seeded from the `connectedApps` settings at startup. An app id listed
//! more than once keeps its last entry.

use async_trait::async_trait;
use log::info;
use std::sync::RwLock;
use workspace_apps::{AppsError, ConnectedApps, PlatformApp};

#[derive(Default)]
pub struct ConnectionRegistry {
    apps: RwLock<Vec<PlatformApp>>,
}

impl ConnectionRegistry {
    pub fn new(apps: Vec<PlatformApp>) -> Self {
        let registry = Self::default();
        for app in apps {
            registry.register(app);
        }
        registry
    }

    /// Add an app, replacing an earlier entry with the same id.
    fn register(&self, app: PlatformApp) {
        if let Ok(mut guard) = self.apps.write() {
            info!("Connected app registered: {}", app.app_id);
            match guard.iter_mut().find(|a| a.app_id == app.app_id) {
                Some(existing) => *existing = app,
                None => guard.push(app),
            }
        }
    }

    pub fn apps(&self) -> Vec<PlatformApp> {
        self.apps.read().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ConnectedApps for ConnectionRegistry {
    async fn fetch_connected_apps(&self) -> Result<Vec<PlatformApp>, AppsError> {
        Ok(self.apps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, name: &str) -> PlatformApp {
        PlatformApp {
            app_id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_ids_keep_last_entry() {
        let registry =
            ConnectionRegistry::new(vec![app("a", "First"), app("b", "B"), app("a", "Second")]);

        let apps = registry.apps();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].name, "Second");
    }

    #[tokio::test]
    async fn test_fetch_returns_registered_apps() {
        let registry = ConnectionRegistry::new(vec![app("a", "A")]);
        let apps = registry.fetch_connected_apps().await.unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].app_id, "a");
    }
}
