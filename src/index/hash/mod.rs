//! The cuckoo hash index: C1 (hash family) through C4 (counters/trace),
//! wired together by the eviction engine in [`engine`].

mod counters;
mod engine;
mod family;
mod store;

pub use counters::{Counters, TableCounters, TraceOp, TraceRecord};
pub use engine::CuckooTable;
pub use family::HashFamily;
