use crate::error::{Result, SquareError};
use crate::random::random_value;
use crate::square::MagicSquare;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use rand::TryRngCore;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Parameters shared by both population strategies.
#[derive(Debug, Clone)]
pub struct PopulateParams {
    /// Inclusive lower bound of the base values, before `power` is applied.
    pub lower: BigInt,
    /// Inclusive upper bound of the base values, before `power` is applied.
    pub upper: BigInt,
    /// Cap on draws per cell while looking for an unused value.
    ///
    /// If `None`, a cell is redrawn until an unused value turns up. That loop
    /// never ends when the range holds fewer distinct values than the cells
    /// still to fill, so callers must pass a wide enough range.
    pub max_attempts: Option<u64>,
}

impl Default for PopulateParams {
    fn default() -> Self {
        Self {
            lower: BigInt::from(1),
            upper: BigInt::from(1_000_000),
            max_attempts: None,
        }
    }
}

impl MagicSquare {
    /// Fills every cell with an independent random value.
    ///
    /// Cells are filled row-major. With `unique` set, each cell is redrawn
    /// until its value is not already in the grid. No magic-square property
    /// is sought.
    ///
    /// # Errors
    /// Propagates generator errors and [`SquareError::RetriesExhausted`].
    /// The grid is left partially overwritten on failure.
    pub fn populate_random<R: TryRngCore + ?Sized>(
        &mut self,
        rng: &mut R,
        params: &PopulateParams,
    ) -> Result<()> {
        let n = self.n();
        let config = *self.config();
        debug!(n, unique = config.unique, power = config.power, "random population");

        let mut used = HashSet::with_capacity(n * n);
        for r in 0..n {
            for c in 0..n {
                let value =
                    draw_unused(rng, params, config.power, config.unique.then_some(&used))?;
                if config.unique {
                    used.insert(value.clone());
                }
                self.set_unchecked(r, c, value);
            }
        }
        Ok(())
    }

    /// Fills the grid so that every row and every column has the same sum.
    ///
    /// Row 0 is drawn at random and its sum becomes the target. Each later
    /// row draws its interior cells at random and derives its last cell to
    /// hit the target; the last row is derived cell by cell so that each
    /// column hits the target. Both diagonals are left to chance.
    ///
    /// When `lower >= 0`, interior draws are capped so that the row and
    /// column still have room for the minimum value in every cell left to
    /// fill. If no such value exists the full range is used and the derived
    /// cells absorb the excess, possibly going below `lower^power` or
    /// negative.
    ///
    /// # Errors
    /// - [`SquareError::NonUniqueFill`] if `unique` is set and a derived cell
    ///   repeats a value already in the grid.
    /// - Generator errors and [`SquareError::RetriesExhausted`] from drawing.
    pub fn populate_determined<R: TryRngCore + ?Sized>(
        &mut self,
        rng: &mut R,
        params: &PopulateParams,
    ) -> Result<()> {
        let n = self.n();
        if n == 0 {
            return Ok(());
        }
        let config = *self.config();
        let last = n - 1;
        debug!(n, unique = config.unique, power = config.power, "determined population");

        let mut used: HashSet<BigInt> = HashSet::with_capacity(n * n);
        let mut col_sums = vec![BigInt::zero(); n];

        let mut row_sum = BigInt::zero();
        for (c, col_sum) in col_sums.iter_mut().enumerate() {
            let value =
                draw_unused(rng, params, config.power, config.unique.then_some(&used))?;
            row_sum += &value;
            *col_sum += &value;
            used.insert(value.clone());
            self.set_unchecked(0, c, value);
        }
        debug!(%row_sum, "first row fixed");

        let budget = Budget::new(params, config.power, &row_sum, last);
        for r in 1..n {
            let mut partial = BigInt::zero();
            for c in 0..n {
                let value = if r == last {
                    &row_sum - &col_sums[c]
                } else if c == last {
                    &row_sum - &partial
                } else {
                    let used = config.unique.then_some(&used);
                    let scoped = budget.scope(params, &partial, &col_sums[c], r, c, used);
                    draw_unused(rng, scoped.as_ref().unwrap_or(params), config.power, used)?
                };
                partial += &value;
                col_sums[c] += &value;
                used.insert(value.clone());
                self.set_unchecked(r, c, value);
            }
        }

        let required = n * n;
        if config.unique && used.len() < required {
            warn!(distinct = used.len(), required, "determined fill repeated values");
            return Err(SquareError::NonUniqueFill {
                distinct: used.len(),
                required,
            });
        }
        debug!("determined population complete");
        Ok(())
    }
}

/// Draws values until one is absent from `used` (when given).
fn draw_unused<R: TryRngCore + ?Sized>(
    rng: &mut R,
    params: &PopulateParams,
    power: u32,
    used: Option<&HashSet<BigInt>>,
) -> Result<BigInt> {
    let mut attempts = 0u64;
    loop {
        let value = random_value(rng, &params.lower, &params.upper, power)?;
        attempts += 1;
        match used {
            Some(used) if used.contains(&value) => {
                trace!(%value, attempts, "rejected repeated value");
                if params.max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(SquareError::RetriesExhausted { attempts });
                }
            }
            _ => return Ok(value),
        }
    }
}

/// Remaining-sum bookkeeping for interior cells of a determined fill.
struct Budget<'a> {
    row_sum: &'a BigInt,
    /// Smallest value a draw can produce, `lower^power`.
    floor: BigInt,
    power: u32,
    last: usize,
    enabled: bool,
}

impl<'a> Budget<'a> {
    fn new(params: &PopulateParams, power: u32, row_sum: &'a BigInt, last: usize) -> Self {
        // With a negative lower bound, values are not monotone in the base
        // under even powers, so no cap is derived.
        let enabled = params.lower.sign() != Sign::Minus && params.lower <= params.upper;
        Self {
            row_sum,
            floor: params.lower.pow(power),
            power,
            last,
            enabled,
        }
    }

    /// Returns narrowed parameters for interior cell `(r, c)`, or `None` to
    /// draw from the full range.
    ///
    /// A narrowed range whose every value is already in `used` is never
    /// returned, so the cap cannot stall a uniqueness redraw loop.
    fn scope(
        &self,
        params: &PopulateParams,
        partial_row: &BigInt,
        partial_col: &BigInt,
        r: usize,
        c: usize,
        used: Option<&HashSet<BigInt>>,
    ) -> Option<PopulateParams> {
        if !self.enabled {
            return None;
        }
        // Cells after this one, counting the derived cell at the end.
        let row_left = BigInt::from(self.last - c);
        let col_left = BigInt::from(self.last - r);
        let row_cap = self.row_sum - partial_row - &self.floor * row_left;
        let col_cap = self.row_sum - partial_col - &self.floor * col_left;
        let cap = row_cap.min(col_cap);
        if cap < self.floor {
            return None;
        }

        let base_cap = if self.power > 1 {
            cap.nth_root(self.power)
        } else {
            cap
        };
        let upper = base_cap.min(params.upper.clone());
        if upper < params.lower {
            return None;
        }
        if let Some(used) = used {
            let width = &upper - &params.lower + 1u32;
            if BigInt::from(self.taken_in(used, &upper)) >= width {
                trace!(%upper, "narrowed range exhausted, drawing from the full range");
                return None;
            }
        }
        Some(PopulateParams {
            upper,
            ..params.clone()
        })
    }

    /// Counts used values that a draw from `[lower, upper]` could produce.
    fn taken_in(&self, used: &HashSet<BigInt>, upper: &BigInt) -> usize {
        let ceiling = upper.pow(self.power);
        used.iter()
            .filter(|&v| *v >= self.floor && *v <= ceiling)
            .filter(|&v| self.power == 1 || v.nth_root(self.power).pow(self.power) == *v)
            .count()
    }
}
