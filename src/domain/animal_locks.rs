//! Per-animal write serialization.
//!
//! [`AnimalLocks`] hands out one [`tokio::sync::Mutex`] per animal. Every
//! mutation of an animal's series holds that mutex across its read-then-write
//! sequence, so two concurrent edits can never both read a stale "latest"
//! observation and each commit a different summary.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::AnimalId;

/// Keyed mutex over [`AnimalId`]s.
///
/// # Concurrency
///
/// - Mutations of the same animal are serialized.
/// - Mutations of different animals run concurrently.
/// - Readers never take these locks.
#[derive(Debug, Default)]
pub struct AnimalLocks {
    locks: RwLock<HashMap<AnimalId, Arc<Mutex<()>>>>,
}

impl AnimalLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and returns the write guard of `animal_id`.
    ///
    /// The guard releases the animal when dropped.
    pub async fn acquire(&self, animal_id: AnimalId) -> OwnedMutexGuard<()> {
        let existing = self.locks.read().await.get(&animal_id).map(Arc::clone);
        let lock = match existing {
            Some(lock) => lock,
            None => {
                let mut map = self.locks.write().await;
                Arc::clone(map.entry(animal_id).or_default())
            }
        };
        lock.lock_owned().await
    }

    /// Drops table entries no task currently holds or waits on.
    pub async fn prune(&self) {
        let mut map = self.locks.write().await;
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Returns the number of animals with a lock entry.
    pub async fn len(&self) -> usize {
        self.locks.read().await.len()
    }

    /// Returns `true` if no lock entries exist.
    pub async fn is_empty(&self) -> bool {
        self.locks.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_animal_is_serialized() {
        let locks = Arc::new(AnimalLocks::new());
        let id = AnimalId::new();

        let guard = locks.acquire(id).await;
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        let joined = tokio::time::timeout(Duration::from_secs(1), contender).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn different_animals_do_not_block() {
        let locks = AnimalLocks::new();
        let _a = locks.acquire(AnimalId::new()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(AnimalId::new())).await;
        assert!(b.is_ok());
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let locks = AnimalLocks::new();
        let held = AnimalId::new();
        let _guard = locks.acquire(held).await;
        drop(locks.acquire(AnimalId::new()).await);

        locks.prune().await;
        assert_eq!(locks.len().await, 1);
        assert!(!locks.is_empty().await);
    }
}
