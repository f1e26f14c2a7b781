//! C3: eviction engine.
//!
//! `CuckooTable<K, V>` is the container itself: `T` sub-tables of `B`
//! buckets of `S` slots, a dedicated empty-key cell, the eviction RNG, and
//! the insertion-chain state machine that ties them together.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CuckooConfig;
use crate::data::{Key, Value};
use crate::error::{CuckooError, Result};
use crate::index::RandomOps;
use crate::index::hash::counters::{Counters, TableCounters, TraceOp, TraceRecord};
use crate::index::hash::family::HashFamily;
use crate::index::hash::store::SubTable;
use crate::primes::next_prime;

enum ChainOutcome {
    Success(i64),
    Fail(i64),
}

/// A multi-table, multi-slot cuckoo hash map with random eviction.
///
/// `T` sub-tables, `B` buckets per table, `S` slots per bucket; capacity
/// `T*B*S`; one hash per sub-table; O(1) worst-case lookup/delete. See
/// SPEC_FULL.md §4.3 for the full insertion state machine this drives.
pub struct CuckooTable<K, V>
where
    K: Key,
    V: Value,
{
    tables: Vec<SubTable<K, V>>,
    buckets: usize,
    slots: usize,
    empty_key: K,
    empty_cell: Option<V>,
    config: CuckooConfig,
    hash_family: HashFamily,
    rng: StdRng,
    rot: usize,
    elements: usize,
    max_elements: usize,
    limited: bool,
    encode_buf: Vec<u8>,
    counters: Counters,
    trace: Option<Vec<TraceRecord<K, V>>>,
    trace_seq: u64,
}

impl<K, V> CuckooTable<K, V>
where
    K: Key,
    V: Value,
{
    /// Builds a container with `tables` sub-tables of `slots` slots per
    /// bucket. `buckets > 0` is used as given; `buckets < 0` picks the
    /// smallest prime `>= |buckets|` (§6's `B < 0` construction
    /// convention). `eviction_seed` seeds the container-owned eviction RNG
    /// (§5: must be seedable and reproducible, never process-global).
    pub fn new(
        tables: usize,
        buckets: i64,
        slots: usize,
        eviction_seed: u64,
        max_load_factor: f64,
        hash_name: &str,
        empty_key: K,
    ) -> Result<Self> {
        let b = if buckets > 0 {
            buckets as usize
        } else if buckets < 0 {
            next_prime(buckets.unsigned_abs() as usize)
        } else {
            0
        };

        if tables == 0 || b == 0 || slots == 0 {
            return Err(CuckooError::InvalidShape {
                tables,
                buckets: b,
                slots,
            });
        }
        if !(0.0..=1.0).contains(&max_load_factor) {
            return Err(CuckooError::InvalidLoadFactor(max_load_factor));
        }
        let hash_family = HashFamily::by_name(hash_name)?;

        let mut subtables = Vec::with_capacity(tables);
        for t in 0..tables {
            subtables.push(SubTable::new((t + 1) as u64, b, slots, &empty_key));
        }

        let config = CuckooConfig {
            max_load_factor,
            ..CuckooConfig::default()
        };
        let max_elements = ((tables * b * slots) as f64 * max_load_factor).floor() as usize;

        Ok(CuckooTable {
            tables: subtables,
            buckets: b,
            slots,
            empty_key,
            empty_cell: None,
            counters: Counters::new(tables, config.start_level),
            config,
            hash_family,
            rng: StdRng::seed_from_u64(eviction_seed),
            rot: 0,
            elements: 0,
            max_elements,
            limited: false,
            encode_buf: Vec::new(),
            trace: None,
            trace_seq: 0,
        })
    }

    #[inline]
    fn bucket_index(&mut self, t: usize, key: &K) -> usize {
        let seed = self.tables[t].seed;
        let family = self.hash_family;
        let numeric_key_size = self.config.numeric_key_size;
        self.encode_buf.clear();
        let shape = key.shape(&mut self.encode_buf);
        let h = family.hash_shape(seed, &shape, numeric_key_size);
        (h % self.buckets as u64) as usize
    }

    fn trace_push(&mut self, level: i64, op: TraceOp, t: usize, b: usize, s: usize, key: &K, value: &V) {
        if let Some(trace) = &mut self.trace {
            let index = self.trace_seq;
            self.trace_seq += 1;
            trace.push(TraceRecord {
                index,
                level,
                op,
                table: t,
                bucket: b,
                slot: s,
                key: key.clone(),
                value: value.clone(),
            });
        }
    }

    /// Looks a key up. `&mut self` because a lookup still advances the
    /// `lookups`/`probes` counters.
    pub fn lookup(&mut self, key: &K) -> Option<&V> {
        self.counters.lookups += 1;
        if key == &self.empty_key {
            return self.empty_cell.as_ref();
        }
        for t in 0..self.tables.len() {
            let b = self.bucket_index(t, key);
            let slots = self.tables[t].slots();
            for s in 0..slots {
                self.counters.probes += 1;
                if &self.tables[t].slot_at(b, s).key == key {
                    return Some(&self.tables[t].slot_at(b, s).value);
                }
            }
        }
        None
    }

    /// Mutable lookup, backing [`RandomOps::rmw`].
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.counters.lookups += 1;
        if key == &self.empty_key {
            return self.empty_cell.as_mut();
        }
        for t in 0..self.tables.len() {
            let b = self.bucket_index(t, key);
            let slots = self.tables[t].slots();
            for s in 0..slots {
                if &self.tables[t].slot_at(b, s).key == key {
                    return Some(&mut self.tables[t].slot_mut(b, s).value);
                }
            }
        }
        None
    }

    /// Internal existence check used by the abort/recovery window (§4.3,
    /// P6): does not touch the public `lookups` counter, since it isn't a
    /// caller-initiated lookup.
    fn contains_key(&mut self, key: &K) -> bool {
        if key == &self.empty_key {
            return self.empty_cell.is_some();
        }
        for t in 0..self.tables.len() {
            let b = self.bucket_index(t, key);
            let slots = self.tables[t].slots();
            for s in 0..slots {
                if &self.tables[t].slot_at(b, s).key == key {
                    return true;
                }
            }
        }
        false
    }

    pub fn delete(&mut self, key: &K) -> Option<V> {
        self.counters.deletes += 1;
        if key == &self.empty_key {
            return self.empty_cell.take().map(|v| {
                self.elements = self
                    .elements
                    .checked_sub(1)
                    .expect("cuckoo-table: element count underflow");
                v
            });
        }
        for t in 0..self.tables.len() {
            let b = self.bucket_index(t, key);
            let slots = self.tables[t].slots();
            for s in 0..slots {
                self.counters.probes += 1;
                if &self.tables[t].slot_at(b, s).key == key {
                    let old = self.tables[t].clear(b, s, &self.empty_key);
                    self.counters.tables[t].elements = self.counters.tables[t]
                        .elements
                        .checked_sub(1)
                        .expect("cuckoo-table: per-table element count underflow");
                    self.elements = self
                        .elements
                        .checked_sub(1)
                        .expect("cuckoo-table: element count underflow");
                    return Some(old);
                }
            }
        }
        None
    }

    /// Inserts `(key, value)`, returning `(success, level)` — the level
    /// classifies the outcome per §7's error taxonomy: `level == start_level`
    /// is an immediate `Success`, `0 < level < start_level` is a `Success`
    /// reached after one or more evictions, `level <= 0` within the
    /// recovery window is a late `Success`/`Abort`, and a `Fail` is
    /// signalled by `success == false`.
    pub fn insert_with_level(&mut self, key: K, value: V) -> (bool, i64) {
        // Step 1 (spec.md §4.3): the load-factor ceiling gates every insert,
        // including the empty-key branch below it — otherwise the empty-key
        // cell could push `elements` past `max_elements` (I2).
        if self.elements >= self.max_elements {
            self.limited = true;
            self.counters.limited += 1;
            log::warn!(
                "cuckoo-table: insert refused, load-factor ceiling reached ({}/{})",
                self.elements,
                self.max_elements
            );
            return (false, 0);
        }

        if key == self.empty_key {
            let was_valid = self.empty_cell.is_some();
            self.empty_cell = Some(value);
            if !was_valid {
                self.elements += 1;
            }
            self.counters.inserts += 1;
            return (true, self.config.start_level);
        }

        loop {
            if self.elements >= self.max_elements {
                self.limited = true;
                self.counters.limited += 1;
                log::warn!(
                    "cuckoo-table: insert refused, load-factor ceiling reached ({}/{})",
                    self.elements,
                    self.max_elements
                );
                return (false, 0);
            }

            match self.try_insert_chain(key.clone(), value.clone()) {
                ChainOutcome::Success(level) => {
                    self.counters.inserts += 1;
                    self.rot = (self.rot + 1) % self.tables.len();
                    return (true, level);
                }
                ChainOutcome::Fail(level) => {
                    if self.config.grow {
                        self.add_table();
                        self.counters.table_grows += 1;
                        log::debug!(
                            "cuckoo-table: insertion chain exhausted, growing to {} tables",
                            self.tables.len()
                        );
                        continue;
                    }
                    self.counters.fails += 1;
                    log::debug!("cuckoo-table: insert failed, chain exhausted at level {}", level);
                    return (false, level);
                }
            }
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_with_level(key, value).0
    }

    /// The insertion-chain state machine (§4.3): walks the `T` sub-tables
    /// starting at `rot`, looking for an empty or matching slot; failing
    /// that, evicts a random slot in the current table and carries its
    /// former occupant onward. `level` counts down from `start_level`;
    /// hitting exactly `0` counts as an `Abort` and jumps to `-1` to enter
    /// the recovery window, where the chain keeps going as long as the
    /// *original* key still isn't present anywhere in the table (the
    /// data-loss-avoidance rationale carried over from the original
    /// implementation's `calcHashes` comment, SPEC_FULL.md SUPPLEMENTAL).
    fn try_insert_chain(&mut self, key: K, value: V) -> ChainOutcome {
        let orig_key = key.clone();
        let mut cur_key = key;
        let mut cur_val = value;
        let mut level = self.config.start_level;
        let start_t = self.rot;
        let n = self.tables.len();
        let mut depth: usize = 0;

        loop {
            self.counters.iterations += 1;

            for i in 0..n {
                let t = (start_t + i) % n;
                let b = self.bucket_index(t, &cur_key);
                let slots = self.tables[t].slots();

                // A matching key always wins over an earlier empty slot in
                // the same bucket — otherwise a replace-after-delete can
                // write into a stale empty slot and leave the real match
                // untouched further along the bucket (duplicate key, I1/I5).
                let mut first_empty: Option<usize> = None;
                let mut found_slot: Option<(usize, bool)> = None;
                for s in 0..slots {
                    self.counters.probes += 1;
                    let slot_key = self.tables[t].slot_at(b, s).key.clone();
                    let is_empty = slot_key == self.empty_key;
                    log::trace!("cuckoo-table: probe table={} bucket={} slot={} level={}", t, b, s, level);
                    if self.trace.is_some() {
                        let slot_val = self.tables[t].slot_at(b, s).value.clone();
                        self.trace_push(level, TraceOp::Probe, t, b, s, &slot_key, &slot_val);
                    }
                    if slot_key == cur_key {
                        found_slot = Some((s, false));
                        break;
                    }
                    if is_empty && first_empty.is_none() {
                        first_empty = Some(s);
                    }
                }
                if found_slot.is_none() {
                    found_slot = first_empty.map(|s| (s, true));
                }

                if let Some((s, was_empty)) = found_slot {
                    self.trace_push(level, TraceOp::Write, t, b, s, &cur_key, &cur_val);
                    self.tables[t].replace(b, s, cur_key, cur_val);
                    if was_empty {
                        self.counters.tables[t].elements += 1;
                        self.elements += 1;
                    }
                    return ChainOutcome::Success(level);
                }

                if self.config.short_circuit
                    && n > 2
                    && depth == 0
                    && self.tables[t].bucket_full(b, &self.empty_key)
                {
                    continue;
                }

                let victim = self.rng.gen_range(0, slots);
                log::trace!("cuckoo-table: evict table={} bucket={} slot={} level={}", t, b, victim, level);
                self.trace_push(level, TraceOp::Evict, t, b, victim, &cur_key, &cur_val);
                let (evicted_key, evicted_val) = self.tables[t].swap(b, victim, cur_key, cur_val);
                self.counters.bumps += 1;
                self.counters.tables[t].bumps += 1;
                cur_key = evicted_key;
                cur_val = evicted_val;
            }

            depth += 1;
            level -= 1;
            if level == 0 {
                self.counters.aborts += 1;
                level = -1;
            }
            self.counters.max_path_length = self.counters.max_path_length.max(depth as u64);
            self.counters.min_level_achieved = self.counters.min_level_achieved.min(level);

            if level <= self.config.lowest_level {
                return ChainOutcome::Fail(level);
            }
            if level <= 0 && !self.contains_key(&orig_key) {
                return ChainOutcome::Fail(level);
            }
        }
    }

    /// Appends a sub-table with the same `(B, S)` shape as the rest, seeded
    /// `T+1` (§4.2: "appended sub-table at position k gets seed k+1").
    fn add_table(&mut self) {
        let new_seed = (self.tables.len() + 1) as u64;
        self.tables
            .push(SubTable::new(new_seed, self.buckets, self.slots, &self.empty_key));
        self.counters.tables.push(TableCounters::default());
        debug_assert_eq!(
            self.tables.len(),
            self.counters.tables.len(),
            "cuckoo-table: hash-family/table-count mismatch after growth"
        );
        self.max_elements =
            ((self.tables.len() * self.buckets * self.slots) as f64 * self.config.max_load_factor).floor() as usize;
    }

    /// Walks every live entry (empty-key cell first, then each sub-table in
    /// order), invoking `callback(key, value)`. Stops as soon as `callback`
    /// returns `false`. No ordering guarantee beyond "empty-key cell, then
    /// table order, then bucket order, then slot order" (Non-goal: stable
    /// iteration order is not part of the contract).
    pub fn iter<F>(&self, mut callback: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        if let Some(value) = &self.empty_cell {
            if !callback(&self.empty_key, value) {
                return;
            }
        }
        for table in &self.tables {
            for (k, v) in table.iter(&self.empty_key) {
                if !callback(k, v) {
                    return;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements == 0
    }

    pub fn capacity(&self) -> usize {
        self.tables.len() * self.buckets * self.slots
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn limited(&self) -> bool {
        self.limited
    }

    pub fn get_load_factor(&self) -> f64 {
        self.elements as f64 / self.capacity() as f64
    }

    pub fn config(&self) -> &CuckooConfig {
        &self.config
    }

    pub fn set_start_level(&mut self, level: i64) {
        self.config.start_level = level;
    }

    pub fn set_lowest_level(&mut self, level: i64) {
        self.config.lowest_level = level;
    }

    pub fn set_grow(&mut self, grow: bool) {
        self.config.grow = grow;
    }

    pub fn set_short_circuit(&mut self, enabled: bool) {
        self.config.short_circuit = enabled;
    }

    pub fn set_eviction_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Opts byte-encoded keys of exactly 4 or 8 bytes back into the numeric
    /// hash fast path (§4.2).
    pub fn set_numeric_key_size(&mut self, bytes: u8) {
        assert!(
            bytes == 4 || bytes == 8,
            "cuckoo-table: numeric key size must be 4 or 8 bytes, got {}",
            bytes
        );
        self.config.numeric_key_size = Some(bytes);
    }

    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = if enabled { Some(Vec::new()) } else { None };
    }

    pub fn take_trace(&mut self) -> Option<Vec<TraceRecord<K, V>>> {
        self.trace.take()
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Looks a named global counter up by name (§4.4). Panics on an
    /// unrecognized name — this is a programmer error (§7), not a
    /// recoverable one.
    pub fn get_counter(&self, name: &str) -> i64 {
        match name {
            "inserts" => self.counters.inserts as i64,
            "deletes" => self.counters.deletes as i64,
            "lookups" => self.counters.lookups as i64,
            "probes" => self.counters.probes as i64,
            "iterations" => self.counters.iterations as i64,
            "aborts" => self.counters.aborts as i64,
            "fails" => self.counters.fails as i64,
            "limited" => self.counters.limited as i64,
            "bumps" => self.counters.bumps as i64,
            "table_grows" => self.counters.table_grows as i64,
            "max_path_length" => self.counters.max_path_length as i64,
            "min_level_achieved" => self.counters.min_level_achieved,
            "elements" => self.elements as i64,
            other => panic!("cuckoo-table: unknown counter `{}`", other),
        }
    }

    pub fn get_table_counter(&self, table: usize, name: &str) -> i64 {
        let counters = self
            .counters
            .tables
            .get(table)
            .unwrap_or_else(|| panic!("cuckoo-table: unknown table index {}", table));
        match name {
            "elements" => counters.elements as i64,
            "bumps" => counters.bumps as i64,
            other => panic!("cuckoo-table: unknown table counter `{}`", other),
        }
    }
}

impl<K, V> RandomOps<K, V> for CuckooTable<K, V>
where
    K: Key,
    V: Value,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        self.lookup(key)
    }

    fn put(&mut self, key: &K, value: V) -> bool {
        self.insert(key.clone(), value)
    }

    fn rmw<F>(&mut self, key: &K, mut f: F)
    where
        F: FnMut(&mut V),
    {
        if let Some(v) = self.get_mut(key) {
            f(v);
        }
    }
}
