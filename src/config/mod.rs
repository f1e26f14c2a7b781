//! Tunable parameters of a [`crate::CuckooTable`].
//!
//! Generalizes `britt-marie`'s `IndexConfig`/`WriteMode` pattern: a plain
//! struct with a `Default` impl and small read-only accessors. Values are
//! validated once at construction; the container's own `set_*` methods are
//! the only way to change them afterwards.

/// Eviction-engine parameters (SPEC_FULL.md §4.3, §9).
#[derive(Debug, Clone, PartialEq)]
pub struct CuckooConfig {
    pub(crate) max_load_factor: f64,
    pub(crate) grow: bool,
    pub(crate) short_circuit: bool,
    pub(crate) start_level: i64,
    pub(crate) lowest_level: i64,
    pub(crate) numeric_key_size: Option<u8>,
}

impl Default for CuckooConfig {
    fn default() -> Self {
        CuckooConfig {
            max_load_factor: 1.0,
            grow: false,
            short_circuit: false,
            start_level: 2000,
            lowest_level: -8000,
            numeric_key_size: None,
        }
    }
}

impl CuckooConfig {
    #[inline(always)]
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    #[inline(always)]
    pub fn grow(&self) -> bool {
        self.grow
    }

    #[inline(always)]
    pub fn short_circuit(&self) -> bool {
        self.short_circuit
    }

    #[inline(always)]
    pub fn start_level(&self) -> i64 {
        self.start_level
    }

    #[inline(always)]
    pub fn lowest_level(&self) -> i64 {
        self.lowest_level
    }

    #[inline(always)]
    pub fn numeric_key_size(&self) -> Option<u8> {
        self.numeric_key_size
    }
}
