//! Dense right-hand operand and device output

use std::fmt;
use std::ops::Range;

use rand::Rng;

use crate::error::{ModelError, Result};

/// Square dense matrix, stored flat in row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMatrix {
    n: usize,
    data: Vec<i32>,
}

impl DenseMatrix {
    /// Random matrix with every element drawn from `range`
    ///
    /// # Panics
    ///
    /// Panics if `range` is empty.
    pub fn random<R: Rng + ?Sized>(n: usize, range: Range<i32>, rng: &mut R) -> Self {
        let data = (0..n * n).map(|_| rng.gen_range(range.clone())).collect();
        Self { n, data }
    }

    /// All-zero matrix
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0; n * n],
        }
    }

    /// Wrap flat row-major data
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DenseSizeMismatch`] unless `data.len() == n * n`.
    pub fn from_vec(n: usize, data: Vec<i32>) -> Result<Self> {
        if data.len() != n * n {
            return Err(ModelError::DenseSizeMismatch {
                expected: n * n,
                got: data.len(),
            });
        }
        Ok(Self { n, data })
    }

    pub(crate) fn from_cells(n: usize, data: Vec<i32>) -> Self {
        debug_assert_eq!(data.len(), n * n);
        Self { n, data }
    }

    /// Matrix dimension
    pub const fn size(&self) -> usize {
        self.n
    }

    /// Element at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.data[row * self.n + col]
    }

    /// One row
    pub fn row(&self, row: usize) -> &[i32] {
        &self.data[row * self.n..(row + 1) * self.n]
    }

    /// Contiguous rows `rows.start..rows.end`, flattened
    pub fn rows(&self, rows: Range<usize>) -> &[i32] {
        &self.data[rows.start * self.n..rows.end * self.n]
    }

    /// Flat row-major view
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }
}

impl fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.n {
            for v in self.row(i) {
                write!(f, "{v:>4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
