//! C1: hash family.
//!
//! Produces one 64-bit hash per sub-table from a per-table seed and a key.
//! Fast paths for the two numeric key widths; a byte-hash fallback for
//! everything else, fed by the injected [`crate::data::Encode`] impl.
//!
//! The Go original this container is modeled on resets and re-feeds a
//! stateful `hash.Hash32` on every call (`calcHashes`); here that collapses
//! to fresh `Hasher` instances per call, which is what `write_u64`/`write`
//! already give us without needing to hold a `Hasher` across calls.

use std::hash::Hasher;

use fxhash::FxHasher;

use crate::data::KeyShape;
use crate::error::CuckooError;

/// Selectable hash primitives (§4.2: "Selection by name; unknown name fails
/// construction; at least one family provided, multiple quality/speed
/// tradeoffs permitted").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFamily {
    /// `fxhash`: fast, not DoS-resistant. The default — matches
    /// `britt-marie`'s own choice of `FxBuildHasher` ("most keys tend to be
    /// small").
    Fx,
    /// `seahash`: slower, better-distributed for adversarial key sets.
    Sea,
}

impl HashFamily {
    pub fn by_name(name: &str) -> Result<Self, CuckooError> {
        match name {
            "fx" => Ok(HashFamily::Fx),
            "sea" => Ok(HashFamily::Sea),
            other => Err(CuckooError::UnknownHashFamily(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashFamily::Fx => "fx",
            HashFamily::Sea => "sea",
        }
    }

    #[inline]
    pub fn hash_u32(self, seed: u64, key: u32) -> u64 {
        match self {
            HashFamily::Fx => {
                let mut h = FxHasher::default();
                h.write_u64(seed);
                h.write_u32(key);
                h.finish()
            }
            HashFamily::Sea => {
                let (k1, k2, k3, k4) = splitmix_subkeys(seed);
                seahash::hash_seeded(&key.to_le_bytes(), k1, k2, k3, k4)
            }
        }
    }

    #[inline]
    pub fn hash_u64(self, seed: u64, key: u64) -> u64 {
        match self {
            HashFamily::Fx => {
                let mut h = FxHasher::default();
                h.write_u64(seed);
                h.write_u64(key);
                h.finish()
            }
            HashFamily::Sea => {
                let (k1, k2, k3, k4) = splitmix_subkeys(seed);
                seahash::hash_seeded(&key.to_le_bytes(), k1, k2, k3, k4)
            }
        }
    }

    #[inline]
    pub fn hash_bytes(self, seed: u64, bytes: &[u8]) -> u64 {
        match self {
            HashFamily::Fx => {
                let mut h = FxHasher::default();
                h.write_u64(seed);
                h.write(bytes);
                h.finish()
            }
            HashFamily::Sea => {
                let (k1, k2, k3, k4) = splitmix_subkeys(seed);
                seahash::hash_seeded(bytes, k1, k2, k3, k4)
            }
        }
    }

    /// Dispatches on the encoded key's shape. `numeric_key_size` lets a
    /// caller that knows its byte-encoded keys are always 4 or 8 bytes
    /// long opt back into the numeric fast path (the `set_numeric_key_size`
    /// tuning operation).
    pub(crate) fn hash_shape(
        self,
        seed: u64,
        shape: &KeyShape<'_>,
        numeric_key_size: Option<u8>,
    ) -> u64 {
        match shape {
            KeyShape::U32(v) => self.hash_u32(seed, *v),
            KeyShape::U64(v) => self.hash_u64(seed, *v),
            KeyShape::Bytes(b) => match numeric_key_size {
                Some(4) if b.len() == 4 => {
                    let arr = [b[0], b[1], b[2], b[3]];
                    self.hash_u32(seed, u32::from_le_bytes(arr))
                }
                Some(8) if b.len() == 8 => {
                    let mut arr = [0u8; 8];
                    arr.copy_from_slice(b);
                    self.hash_u64(seed, u64::from_le_bytes(arr))
                }
                _ => self.hash_bytes(seed, b),
            },
        }
    }
}

/// Derives four SeaHash sub-keys from one `u64` seed (SplitMix64).
/// `seahash::hash_seeded` wants four independent 64-bit keys; the
/// container only owns one seed per sub-table, so we spread it out rather
/// than threading four seed fields through config and construction.
fn splitmix_subkeys(seed: u64) -> (u64, u64, u64, u64) {
    let mut x = seed;
    let mut next = move || {
        x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = x;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    };
    (next(), next(), next(), next())
}
