//! Snapshot store
//!
//! Holds the most recently published batch behind a reader/writer lock.
//! Readers keep the shared lock for the whole render, the generator takes
//! the exclusive lock only long enough to swap the batch in.

use parking_lot::RwLock;
use time::OffsetDateTime;

use super::batch::Batch;

/// Current batch, shared between the generator and the request handlers
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Batch>,
}

impl SnapshotStore {
    /// Create a store holding an empty batch
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Batch::empty()),
        }
    }

    /// Run `f` against the current batch under the shared lock
    ///
    /// Must not be held across an `.await`.
    pub fn read<R>(&self, f: impl FnOnce(&Batch) -> R) -> R {
        let guard = self.current.read();
        f(&guard)
    }

    /// Replace the current batch
    pub fn publish(&self, batch: Batch) {
        let previous = {
            let mut guard = self.current.write();
            std::mem::replace(&mut *guard, batch)
        };
        // Old batch is freed outside the lock
        drop(previous);
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    pub fn generated_at(&self) -> OffsetDateTime {
        self.current.read().generated_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_empty() {
        let store = SnapshotStore::new();
        assert!(store.is_empty());
        assert_eq!(store.generated_at(), OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_publish_replaces() {
        let store = SnapshotStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let now = OffsetDateTime::now_utc();

        store.publish(Batch::generate(&mut rng, false, now));
        assert_eq!(store.len(), crate::core::BATCH_SIZE);
        assert_eq!(store.generated_at(), now);

        store.publish(Batch::empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_readers_never_see_torn_batch() {
        // Each published batch is tagged through every record's factor_one,
        // so a torn read would show two different tags.
        fn tagged(tag: u32) -> Batch {
            let mut rng = ChaCha8Rng::seed_from_u64(tag as u64);
            let batch = Batch::generate(&mut rng, false, OffsetDateTime::now_utc());
            let records: Vec<_> = batch
                .records()
                .iter()
                .cloned()
                .map(|mut r| {
                    r.factor_one = tag;
                    r
                })
                .collect();
            Batch::from_records(records, OffsetDateTime::now_utc())
        }

        let store = Arc::new(SnapshotStore::new());
        store.publish(tagged(1));
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let done = done.clone();
                thread::spawn(move || {
                    let mut reads = 0u32;
                    while !done.load(Ordering::Relaxed) || reads == 0 {
                        store.read(|batch| {
                            let first = batch.records()[0].factor_one;
                            assert!(batch.records().iter().all(|r| r.factor_one == first));
                            assert_eq!(batch.len(), crate::core::BATCH_SIZE);
                        });
                        reads += 1;
                    }
                })
            })
            .collect();

        for tag in 2..12 {
            store.publish(tagged(tag));
        }
        done.store(true, Ordering::Relaxed);

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
