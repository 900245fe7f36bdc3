//! Pure selection helpers over a validated app list.

use crate::types::{AppFilterOptions, PlatformApp};

/// Whether `app` passes the private/autostart filter.
/// Absent flags on the app count as `false`.
pub fn matches_filter(app: &PlatformApp, filter: &AppFilterOptions) -> bool {
    match (filter.private, filter.autostart) {
        (Some(private), Some(autostart)) => {
            app.is_private() == private && app.is_autostart() == autostart
        }
        (Some(private), None) => app.is_private() == private,
        (None, Some(autostart)) => app.is_autostart() == autostart,
        (None, None) => true,
    }
}

/// Apps passing `filter`, in their original order.
pub fn filter_apps(apps: &[PlatformApp], filter: &AppFilterOptions) -> Vec<PlatformApp> {
    apps.iter()
        .filter(|app| matches_filter(app, filter))
        .cloned()
        .collect()
}

/// Tag match: any requested tag, or every requested tag when `must_match_all`.
/// Apps without tags and empty requests never match.
pub fn matches_tags(app: &PlatformApp, tags: &[String], must_match_all: bool) -> bool {
    if app.tags.is_empty() || tags.is_empty() {
        return false;
    }

    if must_match_all {
        tags.iter().all(|tag| app.tags.contains(tag))
    } else {
        tags.iter().any(|tag| app.tags.contains(tag))
    }
}

/// First app whose id equals `app_id`, else the first whose name does.
pub fn find_app<'a>(apps: &'a [PlatformApp], app_id: &str) -> Option<&'a PlatformApp> {
    apps.iter()
        .find(|app| app.app_id == app_id)
        .or_else(|| apps.iter().find(|app| app.name == app_id))
}
