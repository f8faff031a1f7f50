//! Worker stages: one disk reader feeding a basic and a complex parser pool

use quarry_core::AssetDescriptor;
use tracing::{debug, info};

use crate::loader::AssetLoader;
use crate::storage::RawData;

/// Disk queue lane for assets without sub-assets; drained first.
pub(crate) const BASIC_LANE: usize = 0;
/// Disk queue lane for composite assets.
pub(crate) const COMPLEX_LANE: usize = 1;

/// A claimed asset waiting to be read from storage.
#[derive(Debug, Clone)]
pub(crate) struct LoadRequest {
    pub descriptor: AssetDescriptor,
    pub priority: bool,
}

/// Raw file contents waiting for a parser.
#[derive(Debug, Clone)]
pub(crate) struct PendingRead {
    pub descriptor: AssetDescriptor,
    pub data: RawData,
}

impl AssetLoader {
    /// Disk reader loop. Basic reads are served before complex ones since
    /// complex parses are usually waiting on them.
    pub(crate) fn run_disk_reader(&self) {
        let ctx = &self.inner;
        info!("Disk reader started");

        while let Some(request) = ctx.disk_queue.pop_blocking(&ctx.shutdown) {
            let LoadRequest {
                descriptor,
                priority,
            } = request;

            let data = match ctx.storage.read(descriptor.path(), descriptor.file_kind()) {
                Ok(data) => data,
                Err(e) => {
                    self.fail(descriptor.identity(), &e);
                    continue;
                }
            };
            ctx.stats.record_read();
            debug!("Read '{}' ({} bytes)", descriptor.identity(), data.len());

            let queue = if descriptor.is_complex() {
                &ctx.complex_parse
            } else {
                &ctx.basic_parse
            };
            let read = PendingRead { descriptor, data };
            if priority {
                queue.push_priority(read);
            } else {
                queue.push_normal(read);
            }
        }

        info!("Disk reader stopped");
    }

    /// Basic parser loop. Decoding never waits on another asset.
    pub(crate) fn run_basic_parser(&self) {
        let ctx = &self.inner;
        debug!("Basic parser started");

        while let Some(read) = ctx.basic_parse.pop_blocking(&ctx.shutdown) {
            self.parse_and_publish(read);
        }

        debug!("Basic parser stopped");
    }

    /// Complex parser loop. Each composite requests its sub-assets at high
    /// priority and blocks until they resolve, fail or time out.
    pub(crate) fn run_complex_parser(&self) {
        let ctx = &self.inner;
        debug!("Complex parser started");

        while let Some(read) = ctx.complex_parse.pop_blocking(&ctx.shutdown) {
            self.parse_and_publish(read);
        }

        debug!("Complex parser stopped");
    }

    fn parse_and_publish(&self, read: PendingRead) {
        let id = read.descriptor.identity();
        match self.decode_and_resolve(&read.descriptor, &read.data) {
            Ok(asset) => {
                self.publish(id, asset);
            }
            Err(e) => self.fail(id, &e),
        }
    }
}
