use num_bigint::BigInt;

/// Errors raised while populating a square.
#[derive(Debug, thiserror::Error)]
pub enum SquareError {
    /// The entropy source could not produce bytes.
    #[error("random source unavailable: {0}")]
    RandomSource(String),
    /// A determined fill ended with fewer distinct values than cells.
    #[error("failed to populate unique square: {distinct} distinct values, {required} required")]
    NonUniqueFill { distinct: usize, required: usize },
    #[error("empty value range: upper bound {upper} is below lower bound {lower}")]
    EmptyRange { lower: BigInt, upper: BigInt },
    /// Only raised when `PopulateParams::max_attempts` is set.
    #[error("no unused value found after {attempts} attempts")]
    RetriesExhausted { attempts: u64 },
}

pub type Result<T> = std::result::Result<T, SquareError>;
