//! Workspace Starter - reference platform host
//!
//! Loads settings, wires the platform services and prints the app catalog
//! resolved by the app provider.

mod event_bus;
mod services;
mod settings;

use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use workspace_apps::{AppProvider, PlatformApp, RefreshStrategy};

const USAGE: &str =
    "usage: workspace-starter [SETTINGS.json] [--tag TAG]... [--all-tags] [--app ID] [--watch]";

/// Command line arguments.
#[derive(Debug, Default, PartialEq)]
struct Args {
    settings_path: Option<PathBuf>,
    tags: Vec<String>,
    all_tags: bool,
    app: Option<String>,
    watch: bool,
}

impl Args {
    fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--tag" => parsed
                    .tags
                    .push(args.next().ok_or("--tag needs a value")?),
                "--all-tags" => parsed.all_tags = true,
                "--app" => parsed.app = Some(args.next().ok_or("--app needs a value")?),
                "--watch" => parsed.watch = true,
                flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
                path if parsed.settings_path.is_none() => {
                    parsed.settings_path = Some(PathBuf::from(path))
                }
                extra => return Err(format!("unexpected argument {extra}")),
            }
        }

        Ok(parsed)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse(std::env::args().skip(1)).map_err(|e| format!("{e}\n{USAGE}"))?;

    info!("Starting Workspace Starter...");

    let settings_path = args
        .settings_path
        .clone()
        .unwrap_or_else(settings::default_settings_path);
    let settings = settings::Settings::load(&settings_path);

    let services = services::start_all(&settings);
    let mut changes = services.lifecycle.subscribe();

    let provider = AppProvider::new(
        services.connections.clone(),
        services.permissions.clone(),
        services.lifecycle.clone(),
    );
    provider
        .initialize(settings.app_provider.clone(), services.directory.clone())
        .await;

    info!(
        "{} directory endpoints registered",
        services.directory.endpoint_count()
    );

    if let Some(app_id) = &args.app {
        match provider.get_app(app_id).await {
            Some(app) => println!("{}", serde_json::to_string_pretty(&app)?),
            None => println!("No app found for '{app_id}'"),
        }
        return Ok(());
    }

    print_catalog(&provider, &args).await;

    if !args.watch {
        return Ok(());
    }

    let interval = settings
        .app_provider
        .as_ref()
        .is_some_and(|o| o.cache_retrieval_strategy == RefreshStrategy::Interval);
    if !interval || provider.cache_duration().is_zero() {
        warn!("--watch only sees changes with the interval strategy and a cache duration");
    }

    // The initial load already printed; skip its notification.
    event_bus::drain(&mut changes);

    info!("Watching for app changes...");
    loop {
        match changes.recv().await {
            Ok(event) => {
                println!(
                    "[{}] {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    event.name()
                );
                print_catalog(&provider, &args).await;
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }

    Ok(())
}

async fn print_catalog(provider: &AppProvider, args: &Args) {
    let apps = if args.tags.is_empty() {
        provider.get_apps(None).await.to_vec()
    } else {
        provider
            .get_apps_by_tag(&args.tags, args.all_tags, None)
            .await
    };

    println!("{} apps", apps.len());
    for app in &apps {
        println!("{}", format_app(app));
    }
}

fn format_app(app: &PlatformApp) -> String {
    let manifest_type = app
        .manifest_type
        .as_ref()
        .map(|t| t.id())
        .unwrap_or("-");
    let mut line = format!("  {:<24} {:<32} {}", app.app_id, app.name, manifest_type);

    if !app.tags.is_empty() {
        line.push_str(&format!(" [{}]", app.tags.join(", ")));
    }
    if app.is_private() {
        line.push_str(" (private)");
    }
    if app.is_autostart() {
        line.push_str(" (autostart)");
    }
    line
}
