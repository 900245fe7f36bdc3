//! Permission oracle backed by the granted permissions in settings.

use async_trait::async_trait;
use std::collections::HashSet;
use workspace_apps::{AppsError, Permission, PermissionOracle};

pub struct SettingsPermissions {
    granted: HashSet<String>,
}

impl SettingsPermissions {
    pub fn new<I>(granted: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            granted: granted.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PermissionOracle for SettingsPermissions {
    async fn query_granted(&self, permission: Permission) -> Result<bool, AppsError> {
        Ok(self.granted.contains(permission.name()))
    }
}
