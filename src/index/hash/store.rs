//! C2: bucket store.
//!
//! Pure storage: a sub-table is `B` buckets of `S` slots each. No hashing,
//! no eviction policy — just `slot_at`/`replace`/`swap`/`clear`/`iter`. The
//! eviction engine (C3) owns all the "where does this key go" logic; this
//! module only knows how to read and write a `(table, bucket, slot)`
//! coordinate.

use crate::data::Value;

#[derive(Clone)]
pub(crate) struct Slot<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

pub(crate) struct SubTable<K, V> {
    pub(crate) seed: u64,
    buckets: Vec<Vec<Slot<K, V>>>,
    slots_per_bucket: usize,
}

impl<K, V> SubTable<K, V>
where
    K: Clone + Eq,
    V: Value,
{
    pub(crate) fn new(seed: u64, buckets: usize, slots: usize, empty_key: &K) -> Self {
        let mut store = Vec::with_capacity(buckets);
        for _ in 0..buckets {
            let mut bucket = Vec::with_capacity(slots);
            for _ in 0..slots {
                bucket.push(Slot {
                    key: empty_key.clone(),
                    value: V::default(),
                });
            }
            store.push(bucket);
        }
        SubTable {
            seed,
            buckets: store,
            slots_per_bucket: slots,
        }
    }

    #[inline]
    pub(crate) fn slots(&self) -> usize {
        self.slots_per_bucket
    }

    #[inline]
    pub(crate) fn slot_at(&self, b: usize, s: usize) -> &Slot<K, V> {
        &self.buckets[b][s]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, b: usize, s: usize) -> &mut Slot<K, V> {
        &mut self.buckets[b][s]
    }

    /// Writes `(key, value)` into `(b, s)` unconditionally. Caller is
    /// responsible for invariant I4 (the bucket index matches
    /// `hash_t(key) mod B`).
    pub(crate) fn replace(&mut self, b: usize, s: usize, key: K, value: V) {
        self.buckets[b][s] = Slot { key, value };
    }

    /// Writes `(key, value)` into `(b, s)`, returning what was there
    /// before. Used by the eviction step (§4.3) — the displaced occupant
    /// becomes the next pair to place.
    pub(crate) fn swap(&mut self, b: usize, s: usize, key: K, value: V) -> (K, V) {
        let slot = &mut self.buckets[b][s];
        let old_key = std::mem::replace(&mut slot.key, key);
        let old_value = std::mem::replace(&mut slot.value, value);
        (old_key, old_value)
    }

    /// Clears `(b, s)` back to the empty-key sentinel, returning the value
    /// that was stored there (Open Question decision 4: slots hold `V`
    /// directly, so clearing needs `V: Default` to produce a placeholder).
    pub(crate) fn clear(&mut self, b: usize, s: usize, empty_key: &K) -> V {
        let slot = &mut self.buckets[b][s];
        slot.key = empty_key.clone();
        std::mem::replace(&mut slot.value, V::default())
    }

    pub(crate) fn bucket_full(&self, b: usize, empty_key: &K) -> bool {
        self.buckets[b].iter().all(|slot| &slot.key != empty_key)
    }

    pub(crate) fn iter<'a>(&'a self, empty_key: &'a K) -> impl Iterator<Item = (&'a K, &'a V)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter())
            .filter(move |slot| &slot.key != empty_key)
            .map(|slot| (&slot.key, &slot.value))
    }
}
