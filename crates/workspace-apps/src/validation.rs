//! Manifest type and permission validation of fetched apps.

use crate::collaborators::PermissionOracle;
use crate::types::{Permission, PermissionState, PlatformApp};
use log::{error, warn};

/// Query both permissions once, concurrently. A failed query counts as not granted.
pub async fn query_permissions(oracle: &dyn PermissionOracle) -> PermissionState {
    let (launch, download) = tokio::join!(
        query(oracle, Permission::LaunchExternalProcess),
        query(oracle, Permission::DownloadAppAssets)
    );

    PermissionState {
        can_launch_external_process: launch,
        can_download_app_assets: download,
    }
}

async fn query(oracle: &dyn PermissionOracle, permission: Permission) -> bool {
    match oracle.query_granted(permission).await {
        Ok(granted) => granted,
        Err(e) => {
            error!("Error while querying for {} permission: {}", permission, e);
            false
        }
    }
}

/// Keep the apps that are allowed by `allowed_types` and can run with `permissions`.
///
/// An empty `allowed_types` allows every manifest type.
pub fn filter_valid(
    apps: Vec<PlatformApp>,
    allowed_types: &[String],
    permissions: PermissionState,
) -> Vec<PlatformApp> {
    let mut validated = Vec::with_capacity(apps.len());
    let mut rejected_ids = Vec::new();

    for app in apps {
        let manifest_type = match &app.manifest_type {
            Some(t) if !t.id().is_empty() => t.clone(),
            _ => {
                warn!("Application {} does not have a manifestType", app.app_id);
                continue;
            }
        };

        if !allowed_types.is_empty() && !allowed_types.iter().any(|t| t == manifest_type.id()) {
            warn!(
                "Application {} is not in the list of supported manifest types: {}",
                app.app_id, manifest_type
            );
            continue;
        }

        if !manifest_type.requires_external_process() {
            validated.push(app);
        } else if !permissions.can_launch_external_process
            || (manifest_type.requires_app_assets() && !permissions.can_download_app_assets)
        {
            rejected_ids.push(app.app_id);
        } else {
            validated.push(app);
        }
    }

    if !rejected_ids.is_empty() {
        warn!(
            "Not passing the following applications as they cannot run on this machine due to missing permissions: {:?}",
            rejected_ids
        );
    }

    validated
}

/// Validate a candidate list against the allowlist and the current host grants.
pub async fn validate_entries(
    apps: Vec<PlatformApp>,
    allowed_types: &[String],
    oracle: &dyn PermissionOracle,
) -> Vec<PlatformApp> {
    let permissions = query_permissions(oracle).await;
    filter_valid(apps, allowed_types, permissions)
}
