//! Companion - voice/video assistant widget
//!
//! Usage: `companion [config.toml]`, or set `COMPANION_CONFIG`.

use anyhow::{Context, Result};
use companion::config::WidgetConfig;
use companion::controls::{DeviceChoiceStore, JsonFileStore, MemoryStore};
use companion::ui::CompanionApp;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("COMPANION_CONFIG").map(PathBuf::from))
}

fn main() -> Result<()> {
    let loaded = config_path().map(|path| (WidgetConfig::load(&path), path));
    let config = match &loaded {
        Some((Ok(config), _)) => config.clone(),
        _ => WidgetConfig::default(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match loaded {
        Some((Ok(_), path)) => info!("Loaded configuration from {}", path.display()),
        Some((Err(e), path)) => warn!("Ignoring {}: {}; using defaults", path.display(), e),
        None => {}
    }
    info!("Starting {}", config.app_name);

    let store: Arc<dyn DeviceChoiceStore> = match config.device_store_path() {
        Some(path) if config.save_user_choices => Arc::new(JsonFileStore::open(path)),
        Some(_) => Arc::new(MemoryStore::new()),
        None => {
            warn!("No config directory; device choices will not be saved");
            Arc::new(MemoryStore::new())
        }
    };

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let handle = runtime.handle().clone();

    let title = config.app_name.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([480.0, 420.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(CompanionApp::new(cc, config, handle, store)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    drop(runtime);
    Ok(())
}
