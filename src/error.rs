use thiserror::Error;

/// Errors returned by [`crate::CuckooTable::new`].
///
/// This is the recoverable half of the error taxonomy: bad construction
/// parameters. The other half — a negative element count, an unknown
/// counter name, or a hash-family/table-count mismatch — are programmer
/// errors and panic rather than returning a value here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CuckooError {
    #[error("invalid table shape: tables={tables}, buckets={buckets}, slots={slots} (all must be >= 1)")]
    InvalidShape {
        tables: usize,
        buckets: usize,
        slots: usize,
    },
    #[error("max_load_factor must be within [0.0, 1.0], got {0}")]
    InvalidLoadFactor(f64),
    #[error("unknown hash family `{0}`")]
    UnknownHashFamily(String),
}

pub type Result<T> = std::result::Result<T, CuckooError>;
