//! The app provider: a time-boxed cache of validated directory apps.
//!
//! Every read goes through `get_entries`, which either serves the cache,
//! joins the refresh already in flight, or starts the single refresh that
//! all later callers wait on until it completes. Under the interval
//! strategy the TTL check is bypassed: every read refreshes (still shared
//! with concurrent readers) and a background timer refreshes as well.

use crate::collaborators::{
    ConnectedApps, DirectoryEndpoint, DirectoryEndpoints, LifecycleNotifier, PermissionOracle,
};
use crate::filter::{filter_apps, find_app, matches_tags};
use crate::options::{AppProviderOptions, RefreshStrategy};
use crate::types::{AppFilterOptions, AppList, LifecycleEvent, PlatformApp};
use crate::validation::validate_entries;
use futures_util::FutureExt;
use log::{debug, error, info, warn};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Configuration fixed by the first successful `initialize`.
struct ProviderConfig {
    endpoints: Arc<dyn DirectoryEndpoints>,
    cache_duration: Duration,
    strategy: RefreshStrategy,
    manifest_types: Vec<String>,
}

/// Mutable cache state. Never locked across an `.await`.
#[derive(Default)]
struct CacheState {
    apps: AppList,
    /// When the last refresh started. `None` until the first one.
    last_update: Option<Instant>,
    /// `Some` while a refresh is in flight; holds the callers waiting on it.
    waiters: Option<Vec<oneshot::Sender<AppList>>>,
}

impl CacheState {
    fn is_stale(&self, config: &ProviderConfig) -> bool {
        let Some(last_update) = self.last_update else {
            return true;
        };

        match config.strategy {
            RefreshStrategy::Interval => true,
            RefreshStrategy::OnDemand => {
                config.cache_duration.is_zero() || last_update.elapsed() > config.cache_duration
            }
        }
    }
}

/// Outcome of looking at the cache state for one read.
enum Entry {
    Cached(AppList),
    Wait(oneshot::Receiver<AppList>),
    Refresh,
}

/// Cached, permission-filtered application directory.
pub struct AppProvider {
    config: OnceLock<ProviderConfig>,
    connections: Arc<dyn ConnectedApps>,
    permissions: Arc<dyn PermissionOracle>,
    lifecycle: Arc<dyn LifecycleNotifier>,
    state: Mutex<CacheState>,
    interval_task: Mutex<Option<JoinHandle<()>>>,
}

impl AppProvider {
    /// Create an uninitialized provider.
    pub fn new(
        connections: Arc<dyn ConnectedApps>,
        permissions: Arc<dyn PermissionOracle>,
        lifecycle: Arc<dyn LifecycleNotifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config: OnceLock::new(),
            connections,
            permissions,
            lifecycle,
            state: Mutex::new(CacheState::default()),
            interval_task: Mutex::new(None),
        })
    }

    /// One-time setup. Later calls log a warning and keep the first configuration.
    ///
    /// Registers every configured endpoint under a fresh UUID and, for the
    /// interval strategy with a non-zero TTL, starts the background refresh.
    pub async fn initialize(
        self: &Arc<Self>,
        options: Option<AppProviderOptions>,
        endpoints: Arc<dyn DirectoryEndpoints>,
    ) {
        if self.is_initialized() {
            warn!("The app provider is already initialized");
            return;
        }

        let Some(options) = options else {
            warn!("No app provider options supplied, the app provider stays uninitialized");
            return;
        };

        let config = ProviderConfig {
            endpoints: endpoints.clone(),
            cache_duration: options.cache_duration(),
            strategy: options.cache_retrieval_strategy,
            manifest_types: options.manifest_types.clone(),
        };
        let cache_duration = config.cache_duration;
        let strategy = config.strategy;

        if self.config.set(config).is_err() {
            warn!("The app provider is already initialized");
            return;
        }

        for source in options.endpoint_sources() {
            let endpoint = DirectoryEndpoint {
                id: uuid::Uuid::new_v4().to_string(),
                source,
            };
            debug!("Registering directory endpoint {}: {:?}", endpoint.id, endpoint.source);
            endpoints.add_endpoint(endpoint).await;
        }

        info!(
            "App provider initialized (strategy: {:?}, cache duration: {:?})",
            strategy, cache_duration
        );

        if strategy == RefreshStrategy::Interval && !cache_duration.is_zero() {
            *lock(&self.interval_task) =
                spawn_interval_refresh(Arc::downgrade(self), cache_duration);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config.get().is_some()
    }

    /// Configured cache TTL, zero when uninitialized.
    pub fn cache_duration(&self) -> Duration {
        self.config
            .get()
            .map(|c| c.cache_duration)
            .unwrap_or_default()
    }

    /// The validated app list, optionally narrowed by `filter`.
    ///
    /// Without a filter (or with an empty one) the shared snapshot itself is
    /// returned. Before initialization this logs a warning and returns an
    /// empty list.
    pub async fn get_apps(&self, filter: Option<&AppFilterOptions>) -> AppList {
        if !self.is_initialized() {
            warn!("Calling get_apps before the app provider is initialized");
            return AppList::default();
        }

        info!("Requesting apps");
        let apps = self.get_entries().await;

        match filter {
            Some(filter) if !filter.is_empty() => Arc::new(filter_apps(&apps, filter)),
            _ => apps,
        }
    }

    /// Apps carrying any of `tags`, or all of them when `must_match_all`.
    pub async fn get_apps_by_tag(
        &self,
        tags: &[String],
        must_match_all: bool,
        filter: Option<&AppFilterOptions>,
    ) -> Vec<PlatformApp> {
        let apps = self.get_apps(filter).await;

        apps.iter()
            .filter(|app| matches_tags(app, tags, must_match_all))
            .cloned()
            .collect()
    }

    /// Look up an app by id, falling back to its display name.
    pub async fn get_app(&self, app_id: &str) -> Option<PlatformApp> {
        if app_id.is_empty() {
            return None;
        }

        let apps = self.get_apps(None).await;
        let app = find_app(&apps, app_id).cloned();

        if app.as_ref().is_none_or(|app| app.app_id != app_id) {
            info!(
                "App not found by id {}, fell back to name lookup. App found: {}",
                app_id,
                app.is_some()
            );
        }
        app
    }

    /// Serve the cache, join the refresh in flight, or start one.
    async fn get_entries(&self) -> AppList {
        let Some(config) = self.config.get() else {
            return AppList::default();
        };

        let entry = {
            let mut state = lock(&self.state);

            if let Some(waiters) = state.waiters.as_mut() {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Entry::Wait(rx)
            } else if !state.is_stale(config) {
                Entry::Cached(state.apps.clone())
            } else {
                state.waiters = Some(Vec::new());
                state.last_update = Some(Instant::now());
                Entry::Refresh
            }
        };

        match entry {
            Entry::Cached(apps) => apps,
            Entry::Refresh => match AssertUnwindSafe(self.refresh(config)).catch_unwind().await {
                Ok(apps) => apps,
                Err(_) => {
                    error!("Apps refresh panicked, returning an empty list");
                    AppList::default()
                }
            },
            Entry::Wait(rx) => {
                debug!("Refresh in progress, waiting for its result");
                match rx.await {
                    Ok(apps) => apps,
                    Err(_) => {
                        error!("Apps refresh ended without a result, returning an empty list");
                        AppList::default()
                    }
                }
            }
        }
    }

    /// Fetch, validate and publish a new snapshot. The caller has already
    /// marked the refresh as in flight.
    async fn refresh(&self, config: &ProviderConfig) -> AppList {
        let mut guard = RefreshGuard {
            provider: self,
            completed: false,
        };

        info!("Apps cache expired, refreshing");
        let candidates = self.fetch_candidates(config).await;
        let validated: AppList = Arc::new(
            validate_entries(candidates, &config.manifest_types, self.permissions.as_ref()).await,
        );

        let (previous, waiters) = {
            let mut state = lock(&self.state);
            let previous = std::mem::replace(&mut state.apps, validated.clone());
            (previous, state.waiters.take().unwrap_or_default())
        };
        guard.completed = true;

        if !waiters.is_empty() {
            info!("Resolving {} waiting apps requests", waiters.len());
            for waiter in waiters {
                let _ = waiter.send(validated.clone());
            }
        }

        if fingerprint(&previous) != fingerprint(&validated) {
            info!("Apps changed ({} apps)", validated.len());
            if let Err(e) = self.lifecycle.notify(LifecycleEvent::AppsChanged) {
                warn!("Failed to notify {}: {}", LifecycleEvent::AppsChanged.name(), e);
            }
        }

        validated
    }

    /// Directory apps followed by connected apps. A failing source adds nothing.
    async fn fetch_candidates(&self, config: &ProviderConfig) -> Vec<PlatformApp> {
        let mut apps = Vec::new();

        info!("Getting directory apps");
        match config.endpoints.fetch_directory_apps().await {
            Ok(directory_apps) => apps.extend(directory_apps),
            Err(e) => error!("Error fetching directory apps: {}", e),
        }

        info!("Getting connected apps");
        match self.connections.fetch_connected_apps().await {
            Ok(connected) if !connected.is_empty() => {
                info!(
                    "Adding {} apps from connected apps to the list to be validated",
                    connected.len()
                );
                apps.extend(connected);
            }
            Ok(_) => {}
            Err(e) => error!("Error fetching connected apps: {}", e),
        }

        apps
    }
}

impl Drop for AppProvider {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.interval_task).take() {
            handle.abort();
        }
    }
}

/// Releases waiters and clears the in-flight marker if a refresh is dropped
/// before publishing (panic or cancellation). Waiters then see an empty list.
struct RefreshGuard<'a> {
    provider: &'a AppProvider,
    completed: bool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }

        let waiters = lock(&self.provider.state).waiters.take();
        warn!(
            "Apps refresh aborted, releasing {} waiting requests",
            waiters.map(|w| w.len()).unwrap_or(0)
        );
    }
}

/// Background refresh every `period`. Ticks run one at a time and missed
/// ticks are skipped rather than queued.
fn spawn_interval_refresh(provider: Weak<AppProvider>, period: Duration) -> Option<JoinHandle<()>> {
    let Some(start) = Instant::now().checked_add(period) else {
        warn!("Cache duration {:?} is too long for interval refresh", period);
        return None;
    };

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let Some(provider) = provider.upgrade() else {
                break;
            };
            debug!("Interval refresh of the apps cache");
            provider.get_entries().await;
        }
    }))
}

/// Structural snapshot used to detect changes between refreshes.
fn fingerprint(apps: &[PlatformApp]) -> Option<String> {
    serde_json::to_string(apps).ok()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
