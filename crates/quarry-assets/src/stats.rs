use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the pipeline stages.
#[derive(Debug, Default)]
pub struct LoaderStats {
    claimed: AtomicU64,
    read: AtomicU64,
    published: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`LoaderStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Identities claimed for loading (each one traverses the pipeline once).
    pub claimed: u64,
    /// Files read from storage.
    pub read: u64,
    /// Assets inserted into the loaded table.
    pub published: u64,
    /// Loads that ended in a release.
    pub failed: u64,
}

impl LoaderStats {
    pub(crate) fn record_claim(&self) {
        self.claimed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self) {
        self.read.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_publish(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            claimed: self.claimed.load(Ordering::Relaxed),
            read: self.read.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Loads that are claimed but have neither published nor failed.
    pub fn in_flight(&self) -> u64 {
        self.claimed.saturating_sub(self.published + self.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_counts() {
        let stats = LoaderStats::default();
        stats.record_claim();
        stats.record_claim();
        stats.record_claim();
        stats.record_read();
        stats.record_publish();
        stats.record_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.claimed, 3);
        assert_eq!(snap.read, 1);
        assert_eq!(snap.in_flight(), 1);
    }
}
