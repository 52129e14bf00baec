use num_bigint::BigInt;
use num_traits::Zero;
use std::fmt;

/// Immutable shape and value constraints of a [`MagicSquare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareConfig {
    /// Grid order `n`. Zero yields an empty grid, which is never magic.
    pub size: usize,
    /// When true, no value may appear twice in a populated grid.
    pub unique: bool,
    /// Exponent applied to every generated base value (1 keeps values as drawn).
    pub power: u32,
}

impl Default for SquareConfig {
    fn default() -> Self {
        Self {
            size: 3,
            unique: true,
            power: 1,
        }
    }
}

/// An `n x n` grid of arbitrary-precision integers, candidate for the
/// magic-square property.
///
/// A magic square is a grid whose rows, columns and both diagonals all sum
/// to the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicSquare {
    config: SquareConfig,
    cells: Vec<BigInt>,
}

impl MagicSquare {
    /// Creates an all-zero grid of order `config.size`.
    ///
    /// # Panics
    /// Panics if `config.power == 0` or if `size * size` overflows `usize`.
    pub fn new(config: SquareConfig) -> Self {
        assert!(config.power >= 1, "power must be at least 1");
        let len = config
            .size
            .checked_mul(config.size)
            .expect("square size overflows usize");
        Self {
            config,
            cells: vec![BigInt::zero(); len],
        }
    }

    /// Builds a grid from explicit rows, with uniqueness off and power 1.
    ///
    /// # Panics
    /// Panics if any row's length differs from the number of rows.
    pub fn from_rows<R, T>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = T>,
        T: Into<BigInt>,
    {
        let rows: Vec<Vec<BigInt>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        let n = rows.len();
        assert!(
            rows.iter().all(|row| row.len() == n),
            "every row must have {} cells",
            n
        );
        Self {
            config: SquareConfig {
                size: n,
                unique: false,
                power: 1,
            },
            cells: rows.into_iter().flatten().collect(),
        }
    }

    /// Returns the order of the grid.
    pub fn n(&self) -> usize {
        self.config.size
    }

    pub fn config(&self) -> &SquareConfig {
        &self.config
    }

    /// Returns the value at position `(r, c)`.
    ///
    /// # Panics
    /// Panics if `r >= n` or `c >= n`.
    pub fn get(&self, r: usize, c: usize) -> &BigInt {
        assert!(r < self.n() && c < self.n(), "index out of bounds");
        &self.cells[r * self.n() + c]
    }

    /// Sets the value at position `(r, c)` without checking any constraint.
    pub(crate) fn set_unchecked(&mut self, r: usize, c: usize, v: BigInt) {
        let n = self.n();
        self.cells[r * n + c] = v;
    }

    /// Returns the cells as a flat slice in row-major order.
    ///
    /// The cell at position (r, c) is at index `r * n + c`.
    pub fn cells(&self) -> &[BigInt] {
        &self.cells
    }

    /// Iterates over the rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[BigInt]> {
        // `chunks` rejects a zero chunk size; an empty grid has no rows anyway.
        self.cells.chunks(self.n().max(1))
    }

    /// Returns true if every row, every column and both diagonals share the
    /// sum of row 0. An empty grid is never magic.
    pub fn is_magic(&self) -> bool {
        self.magic_sum().is_some()
    }

    /// Returns the common sum if the grid is magic.
    ///
    /// Rows are checked first, then columns, then the two diagonals; the
    /// scan stops at the first mismatch.
    pub fn magic_sum(&self) -> Option<BigInt> {
        let n = self.n();
        if n == 0 {
            return None;
        }

        let target = self.row_sum(0);
        for r in 1..n {
            if self.row_sum(r) != target {
                return None;
            }
        }
        for c in 0..n {
            if self.col_sum(c) != target {
                return None;
            }
        }

        let main: BigInt = (0..n).map(|i| self.get(i, i)).sum();
        let anti: BigInt = (0..n).map(|i| self.get(i, n - 1 - i)).sum();
        (main == target && anti == target).then_some(target)
    }

    /// Returns the verdict line printed after a square, e.g.
    /// `"Random square IS a Magic Square!"`.
    pub fn status_line(&self, label: &str) -> String {
        if self.is_magic() {
            format!("{} square IS a Magic Square!", label)
        } else {
            format!("{} square IS NOT a Magic Square.", label)
        }
    }

    /// Renders the grid row-major, one row per line, cells joined by `delim`.
    pub fn to_delimited(&self, delim: &str) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_delimited(&mut out, delim);
        out
    }

    fn row_sum(&self, r: usize) -> BigInt {
        let n = self.n();
        self.cells[r * n..(r + 1) * n].iter().sum()
    }

    fn col_sum(&self, c: usize) -> BigInt {
        (0..self.n()).map(|r| self.get(r, c)).sum()
    }

    fn write_delimited<W: fmt::Write>(&self, out: &mut W, delim: &str) -> fmt::Result {
        for row in self.rows() {
            for (c, v) in row.iter().enumerate() {
                if c > 0 {
                    out.write_str(delim)?;
                }
                write!(out, "{}", v)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Tab-separated rendering, one row per line.
impl fmt::Display for MagicSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_delimited(f, "\t")
    }
}
