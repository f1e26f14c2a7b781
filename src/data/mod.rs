//! Key/value shape traits.
//!
//! `britt-marie`'s `Key`/`Value` traits were prost-`Message` blanket impls
//! tied to its RocksDB-backed `raw_store`. This container has no byte-level
//! storage format of its own — the sub-tables hold typed `K`/`V` directly —
//! so the traits here are about two things instead: routing a key to the
//! right hash fast-path (`Encode`/`KeyShape`), and the one thing a value
//! must support so a cleared slot still holds something (`Value`).

use std::fmt::Debug;

/// The shape a key presents to the hash family (SPEC_FULL.md §4.2): the
/// two fast numeric widths, or a byte-encoded fallback for everything else.
pub enum KeyShape<'a> {
    U32(u32),
    U64(u64),
    Bytes(&'a [u8]),
}

/// Deterministic, injective encoding from a key to its [`KeyShape`] (§9
/// design notes: "the key encoder must be deterministic and injective on
/// the key domain").
///
/// `shape` may borrow from the caller-provided scratch buffer for the
/// `Bytes` case; numeric keys ignore it.
pub trait Encode {
    fn shape<'a>(&'a self, scratch: &'a mut Vec<u8>) -> KeyShape<'a>;
}

impl Encode for u32 {
    #[inline]
    fn shape<'a>(&'a self, _scratch: &'a mut Vec<u8>) -> KeyShape<'a> {
        KeyShape::U32(*self)
    }
}

impl Encode for u64 {
    #[inline]
    fn shape<'a>(&'a self, _scratch: &'a mut Vec<u8>) -> KeyShape<'a> {
        KeyShape::U64(*self)
    }
}

/// Bound satisfied by any type usable as a `CuckooTable` key.
pub trait Key: Encode + Clone + Eq + Debug + 'static {}
impl<T> Key for T where T: Encode + Clone + Eq + Debug + 'static {}

/// Bound satisfied by any type usable as a `CuckooTable` value.
///
/// `Default` supplies the placeholder a cleared slot holds (SPEC_FULL.md
/// Open Question decision 4 — slots store `V` directly, not `Option<V>`);
/// `Clone` and `Debug` are needed for the optional trace, which records a
/// copy of the value at each probe/write/evict.
pub trait Value: Default + Clone + Debug + 'static {}
impl<T> Value for T where T: Default + Clone + Debug + 'static {}

#[cfg(feature = "protobuf")]
mod protobuf_key {
    use super::{Encode, KeyShape};
    use prost::Message;

    /// Wraps a protobuf message so it can be used as a `CuckooTable` key
    /// via the generic byte-encoding fallback path. Generated message
    /// types usually aren't `Copy` and often carry variable-length fields,
    /// so they can't implement `Encode` with a borrowed, allocation-free
    /// `shape` the way the numeric fast paths do — this wrapper owns the
    /// scratch buffer's contents for the call instead.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct ProstKey<T>(pub T);

    impl<T> Encode for ProstKey<T>
    where
        T: Message + Default + Clone,
    {
        fn shape<'a>(&'a self, scratch: &'a mut Vec<u8>) -> KeyShape<'a> {
            scratch.clear();
            self.0
                .encode(scratch)
                .expect("ProstKey encode is infallible for a well-formed message");
            KeyShape::Bytes(&scratch[..])
        }
    }
}

#[cfg(feature = "protobuf")]
pub use protobuf_key::ProstKey;
