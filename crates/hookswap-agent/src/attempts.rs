use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;
use std::time::Duration;

use hookswap_primitives::alloy::primitives::B256;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// In-memory record of swap ids the agent already attempted to complete.
/// Entries expire after `ttl` so the map does not grow without bound.
#[derive(Debug, Clone)]
pub struct AttemptRegistry {
    ttl: Duration,
    attempts: Arc<Mutex<HashMap<B256, Instant>>>,
}

impl AttemptRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Claim `swap_id` for a completion attempt. Returns false if it was
    /// already claimed within the ttl.
    pub async fn try_claim(&self, swap_id: B256) -> bool {
        let now = Instant::now();
        let mut attempts = self.attempts.lock().await;
        attempts.retain(|_, claimed_at| now.duration_since(*claimed_at) < self.ttl);

        match attempts.entry(swap_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Forget a claim so a redelivered event can try again.
    pub async fn release(&self, swap_id: B256) {
        self.attempts.lock().await.remove(&swap_id);
    }

    pub async fn len(&self) -> usize {
        self.attempts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
