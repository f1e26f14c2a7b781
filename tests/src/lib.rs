//! Integration test harness crate for `cuckoo-table`.
//!
//! No public API of its own; see `tests/` for the scenario and property
//! suites exercised against the published crate.
