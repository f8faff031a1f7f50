use std::collections::HashSet;

use parking_lot::Mutex;
use quarry_core::AssetIdentity;

/// Set of identities that are in flight or already resolved.
///
/// A successful claim is the only way work for an identity enters the
/// queues, so each identity traverses the pipeline at most once until a
/// failure releases it.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    claimed: Mutex<HashSet<AssetIdentity>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`. Returns false if it was already claimed.
    pub fn try_claim(&self, id: &AssetIdentity) -> bool {
        let mut claimed = self.claimed.lock();
        if claimed.contains(id) {
            return false;
        }
        claimed.insert(id.clone())
    }

    /// Drop a claim after a failed load so the identity can be retried.
    pub fn release(&self, id: &AssetIdentity) {
        self.claimed.lock().remove(id);
    }

    pub fn is_claimed(&self, id: &AssetIdentity) -> bool {
        self.claimed.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.claimed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::AssetType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn id(path: &str) -> AssetIdentity {
        AssetIdentity::new(AssetType::Texture2D, path, 0)
    }

    #[test]
    fn claim_release_reclaim() {
        let registry = IdentityRegistry::new();
        assert!(registry.try_claim(&id("a.png")));
        assert!(!registry.try_claim(&id("A.PNG")));
        assert!(registry.is_claimed(&id("a.png")));

        registry.release(&id("a.png"));
        assert!(!registry.is_claimed(&id("a.png")));
        assert!(registry.try_claim(&id("a.png")));
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        let registry = Arc::new(IdentityRegistry::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let threads: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    if registry.try_claim(&id("shared.png")) {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }
}
