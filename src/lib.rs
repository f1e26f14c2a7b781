//! `cuckoo-table`: an in-memory associative container mapping fixed-shape
//! keys to values using multi-table, multi-slot cuckoo hashing with random
//! eviction.
//!
//! `T` sub-tables of `B` buckets of `S` slots give `T*B*S` capacity, one
//! hash per sub-table, and O(1) worst-case lookup/delete. The container is
//! tuned for the 90-99% load-factor range: a failed insertion chain is
//! recoverable (it can grow by adding a sub-table) or reported back to the
//! caller with the level at which it gave up.
//!
//! Concurrent access, persistence, stable iteration order, ordered keys and
//! resize-in-place are all out of scope — see [`CuckooTable`].

/// Container configuration
pub mod config;
/// Key/value shape traits
pub mod data;
/// Construction and programmer errors
pub mod error;
/// Index traits and the hash-based container
pub mod index;
mod primes;

pub use config::CuckooConfig;
#[cfg(feature = "protobuf")]
pub use data::ProstKey;
pub use data::{Encode, Key, KeyShape, Value};
pub use error::{CuckooError, Result};
pub use index::hash::{Counters, CuckooTable, HashFamily, TableCounters, TraceOp, TraceRecord};
pub use index::RandomOps;
