//! Uniform arbitrary-precision random values.
//!
//! Draws are made by rejection sampling: take `bits(width)` random bits from
//! the entropy source and redraw while the candidate is not below `width`.
//! Each draw is accepted with probability above one half, so the expected
//! number of rounds is under two.

use crate::error::{Result, SquareError};
use num_bigint::{BigInt, BigUint};
use rand::TryRngCore;

/// Draws a uniform integer from the inclusive range `[lower, upper]` and
/// raises it to `power` when `power > 1`.
///
/// Any [`TryRngCore`] works as the source: infallible generators such as
/// `ChaCha20Rng` as well as `OsRng`, whose failures surface as
/// [`SquareError::RandomSource`].
///
/// # Errors
/// - [`SquareError::EmptyRange`] if `upper < lower`.
/// - [`SquareError::RandomSource`] if the source fails to fill bytes.
///
/// # Panics
/// Panics if `power == 0`.
pub fn random_value<R: TryRngCore + ?Sized>(
    rng: &mut R,
    lower: &BigInt,
    upper: &BigInt,
    power: u32,
) -> Result<BigInt> {
    assert!(power >= 1, "power must be at least 1");
    if upper < lower {
        return Err(SquareError::EmptyRange {
            lower: lower.clone(),
            upper: upper.clone(),
        });
    }

    let width = (upper - lower + 1u32).magnitude().clone();
    let base = lower + BigInt::from(uniform_below(rng, &width)?);
    if power > 1 {
        Ok(base.pow(power))
    } else {
        Ok(base)
    }
}

/// Returns a uniform value in `[0, bound)`. `bound` must be non-zero.
fn uniform_below<R: TryRngCore + ?Sized>(rng: &mut R, bound: &BigUint) -> Result<BigUint> {
    let bits = bound.bits();
    let len = bits.div_ceil(8) as usize;
    // High bits of the most significant byte that lie above `bits`.
    let excess = (len as u64 * 8 - bits) as u32;
    let mut buf = vec![0u8; len];

    loop {
        rng.try_fill_bytes(&mut buf)
            .map_err(|e| SquareError::RandomSource(e.to_string()))?;
        if let Some(top) = buf.last_mut() {
            *top >>= excess;
        }
        let candidate = BigUint::from_bytes_le(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

/// A source whose entropy is never available.
#[cfg(test)]
pub(crate) struct DeadSource;

#[cfg(test)]
impl TryRngCore for DeadSource {
    type Error = std::io::Error;

    fn try_next_u32(&mut self) -> std::result::Result<u32, Self::Error> {
        Err(std::io::Error::other("entropy unavailable"))
    }

    fn try_next_u64(&mut self) -> std::result::Result<u64, Self::Error> {
        Err(std::io::Error::other("entropy unavailable"))
    }

    fn try_fill_bytes(&mut self, _dst: &mut [u8]) -> std::result::Result<(), Self::Error> {
        Err(std::io::Error::other("entropy unavailable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    #[test]
    fn values_stay_within_bounds() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let lower = BigInt::from(-17);
        let upper = BigInt::from(42);
        for _ in 0..2_000 {
            let v = random_value(&mut rng, &lower, &upper, 1).unwrap();
            assert!(v >= lower && v <= upper, "{} escaped [{}, {}]", v, lower, upper);
        }
    }

    #[test]
    fn both_bounds_are_reachable() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let lower = BigInt::from(10);
        let upper = BigInt::from(13);
        let seen: HashSet<BigInt> = (0..500)
            .map(|_| random_value(&mut rng, &lower, &upper, 1).unwrap())
            .collect();
        assert_eq!(seen.len(), 4, "every value of a width-4 range should appear");
        assert!(seen.contains(&lower));
        assert!(seen.contains(&upper));
    }

    #[test]
    fn power_is_exact() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let v: BigInt = "123456789012345678901234567890".parse().unwrap();
        let squared = random_value(&mut rng, &v, &v, 2).unwrap();
        assert_eq!(squared, &v * &v);

        let cubed = random_value(&mut rng, &v, &v, 3).unwrap();
        assert_eq!(cubed, &v * &v * &v);
    }

    #[test]
    fn powered_values_stay_within_powered_bounds() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let lower = BigInt::from(2);
        let upper = BigInt::from(50);
        for _ in 0..500 {
            let v = random_value(&mut rng, &lower, &upper, 3).unwrap();
            assert!(v >= BigInt::from(8) && v <= BigInt::from(125_000));
            assert_eq!(v.cbrt().pow(3), v, "{} should be a perfect cube", v);
        }
    }

    #[test]
    fn wide_ranges_exceed_fixed_width() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let lower = BigInt::from(u128::MAX);
        let upper = &lower * &lower;
        let v = random_value(&mut rng, &lower, &upper, 1).unwrap();
        assert!(v >= lower && v <= upper);
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let err = random_value(&mut rng, &BigInt::from(5), &BigInt::from(4), 1).unwrap_err();
        assert!(matches!(err, SquareError::EmptyRange { .. }), "{:?}", err);
    }

    #[test]
    fn dead_source_reports_random_source_error() {
        let err = random_value(&mut DeadSource, &BigInt::from(1), &BigInt::from(100), 1)
            .unwrap_err();
        match err {
            SquareError::RandomSource(msg) => assert!(msg.contains("entropy unavailable")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "power must be at least 1")]
    fn zero_power_panics() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let _ = random_value(&mut rng, &BigInt::from(1), &BigInt::from(10), 0);
    }

    #[test]
    fn same_seed_same_values() {
        let lower = BigInt::from(1);
        let upper = BigInt::from(1_000_000);
        let mut rng1 = ChaCha20Rng::seed_from_u64(9);
        let mut rng2 = ChaCha20Rng::seed_from_u64(9);
        for _ in 0..20 {
            assert_eq!(
                random_value(&mut rng1, &lower, &upper, 1).unwrap(),
                random_value(&mut rng2, &lower, &upper, 1).unwrap()
            );
        }
    }
}
