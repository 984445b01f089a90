use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Write locks for tag sets, one per tag set ID.
///
/// Tags are stored inside their tag set, so changing a tag is a read-modify-write of the
/// whole set. Operations on different sets never wait on each other.
#[derive(Debug, Default)]
pub struct TagSetLocks {
    sets: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held for the duration of a tag operation. Dropping it releases every locked set.
#[derive(Debug)]
pub struct TagSetGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl TagSetLocks {
    /// Entries nobody holds or waits on are dropped here, so the map only grows with the
    /// number of sets in use at once.
    async fn handle(&self, tag_set_id: &str) -> Arc<Mutex<()>> {
        let mut sets = self.sets.lock().await;
        sets.retain(|_, lock| Arc::strong_count(lock) > 1);
        sets.entry(tag_set_id.to_string()).or_default().clone()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sets.lock().await.len()
    }

    pub async fn lock(&self, tag_set_id: &str) -> TagSetGuard {
        self.lock_all(&[tag_set_id]).await
    }

    /// Lock several sets at once, e.g. when a tag moves between sets.
    /// Sets are locked in sorted order so two opposite moves cannot deadlock.
    pub async fn lock_all(&self, tag_set_ids: &[&str]) -> TagSetGuard {
        let mut ids = tag_set_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.handle(id).await.lock_owned().await);
        }
        TagSetGuard { _guards: guards }
    }
}
