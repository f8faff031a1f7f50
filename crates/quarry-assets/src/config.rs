use std::time::Duration;

use quarry_core::{AssetDescriptor, AssetType};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AssetError;

/// Worker counts and wait limits for the loader.
///
/// Nested waits must not outlast the top-level wait, otherwise a child could
/// still be waited on after its parent's caller has given up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Threads parsing assets without sub-assets
    pub basic_threads: usize,
    /// Threads parsing composite assets (these block on their sub-assets)
    pub complex_threads: usize,
    /// How long an animation waits for its skeleton mesh, in milliseconds
    pub skeleton_wait_ms: u64,
    /// How long a composite waits for any other sub-asset, in milliseconds
    pub sub_asset_wait_ms: u64,
    /// How long `get_or_load` waits, in milliseconds
    pub top_level_wait_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            basic_threads: 2,
            complex_threads: 2,
            skeleton_wait_ms: 5_000,
            sub_asset_wait_ms: 20_000,
            top_level_wait_ms: 600_000, // 10 minutes
        }
    }
}

impl LoaderConfig {
    /// Check thread counts and the ordering of wait limits
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.basic_threads == 0 || self.complex_threads == 0 {
            return Err(AssetError::InvalidConfig(
                "basic_threads and complex_threads must be at least 1".into(),
            ));
        }
        if self.skeleton_wait_ms > self.top_level_wait_ms
            || self.sub_asset_wait_ms > self.top_level_wait_ms
        {
            return Err(AssetError::InvalidConfig(format!(
                "nested waits ({} ms, {} ms) must not exceed the top-level wait ({} ms)",
                self.skeleton_wait_ms, self.sub_asset_wait_ms, self.top_level_wait_ms
            )));
        }
        if self.complex_threads == 1 {
            warn!("complex_threads = 1: a composite nested in a composite will time out");
        }
        Ok(())
    }

    pub fn top_level_wait(&self) -> Duration {
        Duration::from_millis(self.top_level_wait_ms)
    }

    /// Wait limit for a sub-asset of `parent` described by `child`
    pub fn nested_wait(&self, parent: AssetType, child: &AssetDescriptor) -> Duration {
        if parent == AssetType::SkeletonAnimation && child.asset_type() == AssetType::SkeletonMesh {
            Duration::from_millis(self.skeleton_wait_ms)
        } else {
            Duration::from_millis(self.sub_asset_wait_ms)
        }
    }
}
