//! Batch generation
//!
//! A batch is one full board: exactly [`BATCH_SIZE`] records in generation
//! order. Batches are immutable once published.

use rand::Rng;
use time::OffsetDateTime;

use super::record::Record;

/// Records per batch
pub const BATCH_SIZE: usize = 10_000;

/// One generated board
#[derive(Debug, Clone)]
pub struct Batch {
    records: Vec<Record>,
    generated_at: OffsetDateTime,
    real_index: Option<usize>,
    emit_ids: bool,
}

impl Batch {
    /// Empty placeholder served until the first generation cycle completes
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            generated_at: OffsetDateTime::UNIX_EPOCH,
            real_index: None,
            emit_ids: false,
        }
    }

    /// Generate a fresh batch of synthetic records
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, emit_ids: bool, now: OffsetDateTime) -> Self {
        let records = (0..BATCH_SIZE)
            .map(|_| Record::synthetic(rng, emit_ids))
            .collect();

        Self {
            records,
            generated_at: now,
            real_index: None,
            emit_ids,
        }
    }

    /// Wrap already-built records, e.g. fixtures
    pub fn from_records(records: Vec<Record>, generated_at: OffsetDateTime) -> Self {
        let emit_ids = records.iter().any(|r| r.id.is_some());
        Self {
            records,
            generated_at,
            real_index: None,
            emit_ids,
        }
    }

    /// Overwrite one uniformly chosen slot with the real record
    ///
    /// Returns the slot index. A batch holds at most one real record, so a
    /// second call replaces the slot chosen by the first.
    pub fn inject_real<R: Rng + ?Sized>(&mut self, rng: &mut R, name: &str) -> Option<usize> {
        if self.records.is_empty() {
            return None;
        }

        if let Some(previous) = self.real_index.take() {
            self.records[previous] = Record::synthetic(rng, self.emit_ids);
        }

        let idx = rng.gen_range(0..self.records.len());
        self.records[idx] = Record::real(rng, name);
        self.real_index = Some(idx);
        Some(idx)
    }

    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn generated_at(&self) -> OffsetDateTime {
        self.generated_at
    }

    #[inline]
    pub fn real_index(&self) -> Option<usize> {
        self.real_index
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn real_count(batch: &Batch, name: &str) -> usize {
        batch
            .records()
            .iter()
            .filter(|r| r.name == name && r.is_exact())
            .count()
    }

    #[test]
    fn test_batch_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xDEADBEEF);
        let batch = Batch::generate(&mut rng, true, OffsetDateTime::now_utc());
        assert_eq!(batch.len(), BATCH_SIZE);
        assert!(batch.real_index().is_none());
    }

    #[test]
    fn test_empty_batch() {
        let batch = Batch::empty();
        assert!(batch.is_empty());
        assert_eq!(batch.generated_at(), OffsetDateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_inject_real_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xCAFEBABE);
        let mut batch = Batch::generate(&mut rng, true, OffsetDateTime::now_utc());

        let idx = batch.inject_real(&mut rng, "@me").unwrap();
        assert_eq!(batch.len(), BATCH_SIZE);
        assert_eq!(batch.real_index(), Some(idx));
        assert_eq!(batch.records()[idx].name, "@me");
        assert!(batch.records()[idx].id.is_none());
        assert_eq!(real_count(&batch, "@me"), 1);
    }

    #[test]
    fn test_inject_real_twice_keeps_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut batch = Batch::generate(&mut rng, true, OffsetDateTime::now_utc());

        batch.inject_real(&mut rng, "@me");
        batch.inject_real(&mut rng, "@me");
        assert_eq!(real_count(&batch, "@me"), 1);
        assert_eq!(batch.records().iter().filter(|r| r.is_exact()).count(), 1);
    }

    #[test]
    fn test_inject_into_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut batch = Batch::empty();
        assert_eq!(batch.inject_real(&mut rng, "@me"), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_synthetic_rows_follow_formula(seed in any::<u64>(), emit_ids in any::<bool>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let batch = Batch::generate(&mut rng, emit_ids, OffsetDateTime::now_utc());

            prop_assert_eq!(batch.len(), BATCH_SIZE);
            for record in batch.records() {
                prop_assert!(record.name.starts_with('@'));
                prop_assert!((6..=20).contains(&record.name.len()));
                prop_assert!((1..=999).contains(&record.factor_one));
                prop_assert!((1..=999).contains(&record.factor_two));
                prop_assert_eq!(record.id.is_some(), emit_ids);

                let reachable = (1..=4u32).any(|d1| {
                    (1..=4u32).any(|d2| {
                        (record.factor_one + d1) * (record.factor_two + d2) == record.product
                    })
                });
                prop_assert!(reachable);
            }
        }
    }
}
