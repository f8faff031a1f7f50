//! The loader context: the shared handle through which every request enters
//! the pipeline, including the nested requests made by composite parsers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use quarry_core::{AssetDescriptor, AssetIdentity};
use tracing::{debug, warn};

use crate::asset::Asset;
use crate::config::LoaderConfig;
use crate::decoder::{Decoded, FormatDecoder};
use crate::error::AssetError;
use crate::pipeline::{LoadRequest, PendingRead, BASIC_LANE, COMPLEX_LANE};
use crate::queue::WorkQueue;
use crate::registry::IdentityRegistry;
use crate::stats::{LoaderStats, StatsSnapshot};
use crate::storage::{RawData, StorageReader};
use crate::table::LoadedTable;

/// State shared by the façade and every worker thread.
pub(crate) struct LoaderContext {
    pub(crate) config: LoaderConfig,
    pub(crate) storage: Arc<dyn StorageReader>,
    pub(crate) decoder: Arc<dyn FormatDecoder>,
    pub(crate) registry: IdentityRegistry,
    pub(crate) table: LoadedTable,
    /// Two lanes: basic reads drain before complex reads.
    pub(crate) disk_queue: WorkQueue<LoadRequest>,
    pub(crate) basic_parse: WorkQueue<PendingRead>,
    pub(crate) complex_parse: WorkQueue<PendingRead>,
    pub(crate) shutdown: AtomicBool,
    pub(crate) stats: LoaderStats,
}

/// Cloneable handle to a running loader.
///
/// Obtained from [`crate::AssetServer::loader`]; every clone talks to the
/// same registry, queues and loaded table.
#[derive(Clone)]
pub struct AssetLoader {
    pub(crate) inner: Arc<LoaderContext>,
}

impl AssetLoader {
    pub(crate) fn new(
        config: LoaderConfig,
        storage: Arc<dyn StorageReader>,
        decoder: Arc<dyn FormatDecoder>,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderContext {
                config,
                storage,
                decoder,
                registry: IdentityRegistry::new(),
                table: LoadedTable::new(),
                disk_queue: WorkQueue::with_lanes(2),
                basic_parse: WorkQueue::new(),
                complex_parse: WorkQueue::new(),
                shutdown: AtomicBool::new(false),
                stats: LoaderStats::default(),
            }),
        }
    }

    /// Load an asset on the calling thread and return it.
    ///
    /// Fails with [`AssetError::AlreadyLoading`] if the identity is already
    /// claimed. Sub-assets of a composite are still loaded by the workers.
    pub fn load(&self, descriptor: AssetDescriptor) -> Result<Arc<Asset>, AssetError> {
        if self.is_shutting_down() {
            return Err(AssetError::ShuttingDown);
        }
        let id = descriptor.identity().clone();
        if !self.inner.registry.try_claim(&id) {
            return Err(AssetError::AlreadyLoading(id));
        }
        self.inner.stats.record_claim();
        debug!("Loading '{}' synchronously", id);

        let result = self
            .inner
            .storage
            .read(descriptor.path(), descriptor.file_kind())
            .and_then(|data| {
                self.inner.stats.record_read();
                self.decode_and_resolve(&descriptor, &data)
            });

        match result {
            Ok(asset) => Ok(self.publish(&id, asset)),
            Err(e) => {
                self.fail(&id, &e);
                Err(e)
            }
        }
    }

    /// Queue an asset for background loading. Does nothing if the identity is
    /// already loading or loaded.
    ///
    /// `highest_priority` puts the request at the front of the disk queue and,
    /// later, of the parse queue.
    pub fn load_async(&self, descriptor: AssetDescriptor, highest_priority: bool) {
        if self.is_shutting_down() {
            warn!("Ignoring request for '{}': loader is shut down", descriptor.identity());
            return;
        }
        if !self.inner.registry.try_claim(descriptor.identity()) {
            return;
        }
        self.inner.stats.record_claim();
        debug!(
            "Queued '{}'{}",
            descriptor.identity(),
            if highest_priority { " (priority)" } else { "" }
        );

        let lane = if descriptor.is_complex() {
            COMPLEX_LANE
        } else {
            BASIC_LANE
        };
        let request = LoadRequest {
            descriptor,
            priority: highest_priority,
        };
        if highest_priority {
            self.inner.disk_queue.push_priority_to(lane, request);
        } else {
            self.inner.disk_queue.push_normal_to(lane, request);
        }
    }

    /// Whether the asset is resolved.
    pub fn is_loaded(&self, id: &AssetIdentity) -> bool {
        self.inner.table.contains(id)
    }

    /// Whether the asset is resolved or currently in the pipeline.
    pub fn is_loaded_or_loading(&self, id: &AssetIdentity) -> bool {
        self.inner.registry.is_claimed(id)
    }

    /// Non-blocking lookup of a resolved asset.
    pub fn get(&self, id: &AssetIdentity) -> Option<Arc<Asset>> {
        self.inner.table.get(id)
    }

    /// Start loading the asset if nobody has, then wait for it using the
    /// top-level wait limit.
    pub fn get_or_load(&self, descriptor: AssetDescriptor) -> Option<Arc<Asset>> {
        let id = descriptor.identity().clone();
        if !self.is_loaded_or_loading(&id) {
            self.load_async(descriptor, false);
        }
        self.get_when_loaded(&id, self.inner.config.top_level_wait())
    }

    /// Wait up to `timeout` for the asset to be resolved.
    ///
    /// Returns `None` as soon as the identity is neither loaded nor loading
    /// (the load failed or was never requested), or when the timeout elapses.
    /// Timing out leaves the load itself untouched.
    pub fn get_when_loaded(&self, id: &AssetIdentity, timeout: Duration) -> Option<Arc<Asset>> {
        self.wait_for(id, timeout).ok()
    }

    /// Like [`get_when_loaded`](Self::get_when_loaded), but says why nothing
    /// was returned: [`AssetError::NotLoading`], [`AssetError::Timeout`] or
    /// [`AssetError::ShuttingDown`].
    pub fn wait_for(&self, id: &AssetIdentity, timeout: Duration) -> Result<Arc<Asset>, AssetError> {
        let start = Instant::now();
        let deadline = start
            .checked_add(timeout)
            .unwrap_or_else(|| start + Duration::from_secs(u32::MAX as u64));
        let signal = self.inner.table.signal();

        loop {
            let seen = signal.generation();
            if let Some(asset) = self.inner.table.get(id) {
                return Ok(asset);
            }
            if self.is_shutting_down() {
                return Err(AssetError::ShuttingDown);
            }
            if !self.inner.registry.is_claimed(id) {
                return Err(AssetError::NotLoading(id.clone()));
            }
            if !signal.wait_past(seen, deadline) {
                debug!("Gave up waiting for '{}' after {:?}", id, timeout);
                return Err(AssetError::Timeout(id.clone()));
            }
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    /// Number of resolved assets.
    pub fn loaded_count(&self) -> usize {
        self.inner.table.len()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Decode `data` and, for composites, load and splice every sub-asset.
    ///
    /// Sub-assets are all requested at high priority before the first wait so
    /// they load in parallel. No lock is held while waiting.
    pub(crate) fn decode_and_resolve(
        &self,
        descriptor: &AssetDescriptor,
        data: &RawData,
    ) -> Result<Asset, AssetError> {
        let Decoded {
            mut asset,
            placeholders,
        } = self.inner.decoder.decode(descriptor, data)?;

        if !descriptor.is_complex() {
            if !placeholders.is_empty() {
                return Err(AssetError::parse(
                    descriptor.identity(),
                    "basic asset reported sub-assets",
                ));
            }
            return Ok(asset);
        }

        for slot in &placeholders {
            if !slot.descriptor.has_path() {
                return Err(AssetError::Dependency {
                    identity: descriptor.identity().clone(),
                    dependency: slot.descriptor.identity().clone(),
                });
            }
            self.load_async(slot.descriptor.clone(), true);
        }

        for slot in &placeholders {
            let child_id = slot.descriptor.identity();
            let wait = self
                .inner
                .config
                .nested_wait(descriptor.asset_type(), &slot.descriptor);
            let child = self.wait_for(child_id, wait).map_err(|e| {
                if matches!(e, AssetError::Timeout(_)) {
                    warn!("'{}' timed out waiting for '{}'", descriptor.identity(), child_id);
                }
                AssetError::Dependency {
                    identity: descriptor.identity().clone(),
                    dependency: child_id.clone(),
                }
            })?;
            asset.splice(slot, child)?;
        }

        if !asset.is_fully_resolved() {
            return Err(AssetError::parse(
                descriptor.identity(),
                "composite left with unresolved sub-assets",
            ));
        }
        Ok(asset)
    }

    /// Insert a resolved asset and wake every waiter.
    pub(crate) fn publish(&self, id: &AssetIdentity, asset: Asset) -> Arc<Asset> {
        let asset = Arc::new(asset);
        if self.inner.table.insert(id.clone(), Arc::clone(&asset)) {
            self.inner.stats.record_publish();
            debug!("Published '{}'", id);
        } else {
            warn!("'{}' was already published; keeping the first instance", id);
        }
        self.inner.table.signal().broadcast();
        asset
    }

    /// Release a failed identity so it can be retried, and wake every waiter.
    pub(crate) fn fail(&self, id: &AssetIdentity, error: &AssetError) {
        warn!("Failed to load '{}': {}", id, error);
        self.inner.stats.record_failure();
        self.inner.registry.release(id);
        self.inner.table.signal().broadcast();
    }
}
