//! Quarry - Headless asset preloader
//!
//! Boots the loading pipeline against a directory of assets, loads every
//! entry of a preload list and reports what resolved.

mod settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use quarry_assets::{AssetServer, FsStorage, StandardDecoder};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::settings::PreloadSettings;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = PreloadSettings::load(settings_path.as_deref());

    info!(
        "Preloading {} assets from {:?}",
        settings.preload.len(),
        settings.asset_root
    );

    let storage = Arc::new(FsStorage::new(&settings.asset_root));
    if !storage.base_path().is_dir() {
        warn!("Asset root {:?} is not a directory", storage.base_path());
    }
    let mut server = AssetServer::initialize(settings.loader.clone(), storage, Arc::new(StandardDecoder))
        .context("Failed to start asset server")?;

    let started = Instant::now();
    for entry in &settings.preload {
        let descriptor = entry
            .descriptor()
            .with_context(|| format!("Invalid preload entry '{}'", entry.path))?;
        server.load_async(descriptor, false);
    }

    let mut missing = 0;
    for entry in &settings.preload {
        let descriptor = entry.descriptor()?;
        let id = descriptor.identity().clone();
        match server.get_or_load(descriptor) {
            Some(asset) => info!(
                "{} ready ({} sub-assets)",
                id,
                asset.sub_assets().len()
            ),
            None => {
                warn!("{} did not load", id);
                missing += 1;
            }
        }
    }

    let stats = server.stats();
    info!(
        "Preload finished in {:?}: {} published, {} failed, {} still in flight",
        started.elapsed(),
        stats.published,
        stats.failed,
        stats.in_flight()
    );
    server.shutdown();

    if missing > 0 {
        anyhow::bail!("{} of {} preload entries failed", missing, settings.preload.len());
    }
    Ok(())
}
