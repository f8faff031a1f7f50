use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use quarry_core::{AssetDescriptor, AssetIdentity};
use tracing::{info, warn};

use crate::asset::Asset;
use crate::config::LoaderConfig;
use crate::decoder::FormatDecoder;
use crate::error::AssetError;
use crate::loader::AssetLoader;
use crate::stats::StatsSnapshot;
use crate::storage::StorageReader;

/// Owns the loader's worker threads: one disk reader, `basic_threads`
/// basic parsers and `complex_threads` complex parsers.
///
/// Requests go through [`AssetServer::loader`], a cloneable handle that can
/// be passed to any system that needs assets. Dropping the server shuts the
/// workers down.
pub struct AssetServer {
    loader: AssetLoader,
    /// Joined in spawn order: disk reader, basic pool, complex pool.
    workers: Vec<JoinHandle<()>>,
}

impl AssetServer {
    /// Validate `config` and start every worker thread.
    pub fn initialize(
        config: LoaderConfig,
        storage: Arc<dyn StorageReader>,
        decoder: Arc<dyn FormatDecoder>,
    ) -> Result<Self, AssetError> {
        config.validate()?;
        let (basic, complex) = (config.basic_threads, config.complex_threads);

        let mut server = Self {
            loader: AssetLoader::new(config, storage, decoder),
            workers: Vec::with_capacity(1 + basic + complex),
        };

        server.spawn("quarry-disk".into(), AssetLoader::run_disk_reader)?;
        for i in 0..basic {
            server.spawn(format!("quarry-basic-{i}"), AssetLoader::run_basic_parser)?;
        }
        for i in 0..complex {
            server.spawn(format!("quarry-complex-{i}"), AssetLoader::run_complex_parser)?;
        }

        info!(
            "AssetServer started: 1 disk reader, {} basic parsers, {} complex parsers",
            basic, complex
        );
        Ok(server)
    }

    fn spawn(&mut self, name: String, stage: fn(&AssetLoader)) -> Result<(), AssetError> {
        let loader = self.loader.clone();
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || stage(&loader))
            .map_err(AssetError::ThreadSpawn)?;
        self.workers.push(handle);
        Ok(())
    }

    /// Stop and join every worker. Safe to call more than once.
    ///
    /// Queued work is abandoned; blocked waiters return `None`.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        info!("AssetServer shutting down");

        let ctx = &self.loader.inner;
        ctx.shutdown.store(true, Ordering::Release);
        ctx.disk_queue.wake_all();
        ctx.basic_parse.wake_all();
        ctx.complex_parse.wake_all();
        ctx.table.signal().broadcast();

        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("quarry-worker").to_string();
            if handle.join().is_err() {
                warn!("Worker '{}' panicked", name);
            }
        }

        let stats = self.loader.stats();
        info!(
            "AssetServer stopped: {} published, {} failed",
            stats.published, stats.failed
        );
    }

    /// A shared handle for issuing requests.
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    pub fn load(&self, descriptor: AssetDescriptor) -> Result<Arc<Asset>, AssetError> {
        self.loader.load(descriptor)
    }

    pub fn load_async(&self, descriptor: AssetDescriptor, highest_priority: bool) {
        self.loader.load_async(descriptor, highest_priority)
    }

    pub fn is_loaded(&self, id: &AssetIdentity) -> bool {
        self.loader.is_loaded(id)
    }

    pub fn is_loaded_or_loading(&self, id: &AssetIdentity) -> bool {
        self.loader.is_loaded_or_loading(id)
    }

    pub fn get(&self, id: &AssetIdentity) -> Option<Arc<Asset>> {
        self.loader.get(id)
    }

    pub fn get_or_load(&self, descriptor: AssetDescriptor) -> Option<Arc<Asset>> {
        self.loader.get_or_load(descriptor)
    }

    pub fn get_when_loaded(&self, id: &AssetIdentity, timeout: Duration) -> Option<Arc<Asset>> {
        self.loader.get_when_loaded(id, timeout)
    }

    pub fn wait_for(&self, id: &AssetIdentity, timeout: Duration) -> Result<Arc<Asset>, AssetError> {
        self.loader.wait_for(id, timeout)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.loader.stats()
    }
}

impl Drop for AssetServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
