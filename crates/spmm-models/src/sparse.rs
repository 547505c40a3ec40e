//! Compressed row-sparse left-hand operand and its generators

use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;
use spmm_chip::StreamMode;

use crate::error::{ModelError, Result};

/// Shape selector for [`SparseMatrix::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SparseShape {
    /// Every cell present; value `i * n + j`.
    Full,
    /// First `n / 2` columns of each row; value = row index. `n` must be even.
    Half,
    /// Unit diagonal.
    Identity,
    /// Row pairs share one run of `n` entries split at a random column, so
    /// the odd row of a pair may be empty. `n` must be even.
    LineSeparated,
    /// A single nonzero in row 0; every row end offset is 0.
    Degenerate,
    /// Per-row entry count drawn from `row_nnz` (clamped to `n`), distinct
    /// random columns, values in `0..10`. Row 0 gets at least one entry.
    Random {
        /// Range the per-row count is drawn from
        row_nnz: Range<usize>,
    },
}

/// Sparse matrix in compressed row form with inclusive row end offsets.
///
/// Immutable once built; the stream mode travels with the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseMatrix {
    n: usize,
    row_end: Vec<u32>,
    col: Vec<u32>,
    val: Vec<i32>,
    mode: StreamMode,
}

impl SparseMatrix {
    /// Build a matrix of dimension `n` with the given shape and mode.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`, or if `n` is odd for [`SparseShape::Half`] and
    /// [`SparseShape::LineSeparated`].
    pub fn generate<R: Rng + ?Sized>(
        shape: &SparseShape,
        n: usize,
        mode: StreamMode,
        rng: &mut R,
    ) -> Self {
        assert!(n > 0, "sparse matrix dimension must be positive");
        let rows: Vec<Vec<(u32, i32)>> = match shape {
            SparseShape::Full => (0..n)
                .map(|i| (0..n).map(|j| (wire(j), value(i * n + j))).collect())
                .collect(),
            SparseShape::Half => {
                assert!(n % 2 == 0, "half-density generator needs an even n, got {n}");
                (0..n)
                    .map(|i| (0..n / 2).map(|j| (wire(j), value(i))).collect())
                    .collect()
            }
            SparseShape::Identity => (0..n).map(|i| vec![(wire(i), 1)]).collect(),
            SparseShape::LineSeparated => {
                assert!(n % 2 == 0, "line-separated generator needs an even n, got {n}");
                let mut rows = Vec::with_capacity(n);
                for i in (0..n).step_by(2) {
                    let sep = rng.gen_range(0..n);
                    let run: Vec<(u32, i32)> =
                        (0..n).map(|j| (wire(j), value(i * n + j))).collect();
                    let (head, tail) = run.split_at(sep + 1);
                    rows.push(head.to_vec());
                    rows.push(tail.to_vec());
                }
                rows
            }
            SparseShape::Degenerate => {
                let mut rows = vec![Vec::new(); n];
                rows[0].push((wire(2.min(n - 1)), 2));
                rows
            }
            SparseShape::Random { row_nnz } => {
                let mut columns: Vec<u32> = (0..n).map(wire).collect();
                (0..n)
                    .map(|i| {
                        let mut count = rng.gen_range(row_nnz.clone()).min(n);
                        if i == 0 {
                            count = count.max(1);
                        }
                        columns.shuffle(rng);
                        columns[..count]
                            .iter()
                            .map(|&c| (c, rng.gen_range(0..10)))
                            .collect()
                    })
                    .collect()
            }
        };
        Self::from_rows(n, mode, &rows)
    }

    /// Build from raw arrays, checking every encoding invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidSparse`] if `row_end` is not `n` long,
    /// decreases, does not end at `nnz - 1`, if `col`/`val` lengths differ,
    /// or if a column index is out of range.
    pub fn from_parts(
        n: usize,
        mode: StreamMode,
        row_end: Vec<u32>,
        col: Vec<u32>,
        val: Vec<i32>,
    ) -> Result<Self> {
        if n == 0 {
            return Err(ModelError::invalid_sparse("dimension must be positive"));
        }
        if row_end.len() != n {
            return Err(ModelError::invalid_sparse(format!(
                "row_end has {} entries, expected {n}",
                row_end.len()
            )));
        }
        if col.len() != val.len() {
            return Err(ModelError::invalid_sparse(format!(
                "col has {} entries but val has {}",
                col.len(),
                val.len()
            )));
        }
        if let Some(i) = row_end.windows(2).position(|w| w[1] < w[0]) {
            return Err(ModelError::invalid_sparse(format!(
                "row_end decreases between rows {i} and {}",
                i + 1
            )));
        }
        let last = row_end[n - 1] as usize;
        if col.is_empty() || last != col.len() - 1 {
            return Err(ModelError::invalid_sparse(format!(
                "last row end is {last} but there are {} nonzeros",
                col.len()
            )));
        }
        if let Some(&c) = col.iter().find(|&&c| c as usize >= n) {
            return Err(ModelError::invalid_sparse(format!(
                "column {c} out of range for n = {n}"
            )));
        }
        Ok(Self {
            n,
            row_end,
            col,
            val,
            mode,
        })
    }

    fn from_rows(n: usize, mode: StreamMode, rows: &[Vec<(u32, i32)>]) -> Self {
        assert!(
            rows.first().is_some_and(|r| !r.is_empty()),
            "row 0 must hold at least one entry under inclusive end offsets"
        );
        let mut row_end = Vec::with_capacity(n);
        let mut col = Vec::new();
        let mut val = Vec::new();
        for row in rows {
            for &(c, v) in row {
                col.push(c);
                val.push(v);
            }
            row_end.push(wire(col.len() - 1));
        }
        Self {
            n,
            row_end,
            col,
            val,
            mode,
        }
    }

    /// Matrix dimension
    pub const fn size(&self) -> usize {
        self.n
    }

    /// Stream mode this matrix is sent in
    pub const fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.col.len()
    }

    /// Inclusive row end offsets, as driven on `lhs_ptr`
    pub fn row_end(&self) -> &[u32] {
        &self.row_end
    }

    /// Column index per entry
    pub fn col(&self) -> &[u32] {
        &self.col
    }

    /// Value per entry
    pub fn val(&self) -> &[i32] {
        &self.val
    }

    /// Offset of the final entry (`row_end[n - 1]`)
    pub fn last_offset(&self) -> usize {
        self.row_end[self.n - 1] as usize
    }

    /// Index range of row `i` in the entry arrays.
    ///
    /// Empty when the row repeats the previous end offset.
    pub fn row_range(&self, i: usize) -> Range<usize> {
        let start = if i == 0 {
            0
        } else {
            self.row_end[i - 1] as usize + 1
        };
        start..self.row_end[i] as usize + 1
    }

    /// `(column, value)` pairs of row `i`
    pub fn row_entries(&self, i: usize) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.row_range(i)
            .map(move |k| (self.col[k] as usize, self.val[k]))
    }

    /// Row `i` expanded to `n` cells; `None` where no entry is stored
    pub fn dense_row(&self, i: usize) -> Vec<Option<i32>> {
        let mut row = vec![None; self.n];
        for (c, v) in self.row_entries(i) {
            row[c] = Some(v);
        }
        row
    }
}

#[allow(clippy::cast_possible_truncation)]
fn wire(index: usize) -> u32 {
    index as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn value(v: usize) -> i32 {
    v as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn all_shapes() -> Vec<SparseShape> {
        vec![
            SparseShape::Full,
            SparseShape::Half,
            SparseShape::Identity,
            SparseShape::LineSeparated,
            SparseShape::Degenerate,
            SparseShape::Random { row_nnz: 0..5 },
            SparseShape::Random { row_nnz: 3..9 },
        ]
    }

    fn assert_invariants(m: &SparseMatrix) {
        let n = m.size();
        assert_eq!(m.row_end().len(), n);
        assert!(m.row_end().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(m.last_offset(), m.nnz() - 1);
        assert_eq!(m.col().len(), m.val().len());
        assert!(m.col().iter().all(|&c| (c as usize) < n));
    }

    #[test]
    fn every_generator_respects_the_encoding() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in [4, 8, 16] {
            for shape in all_shapes() {
                let m = SparseMatrix::generate(&shape, n, StreamMode::Ns, &mut rng);
                assert_invariants(&m);
                SparseMatrix::from_parts(
                    n,
                    m.mode(),
                    m.row_end().to_vec(),
                    m.col().to_vec(),
                    m.val().to_vec(),
                )
                .unwrap_or_else(|e| panic!("{shape:?} at n={n}: {e}"));
            }
        }
    }

    #[test]
    fn identity_layout() {
        let mut rng = StdRng::seed_from_u64(0);
        let m = SparseMatrix::generate(&SparseShape::Identity, 4, StreamMode::Ws, &mut rng);
        assert_eq!(m.row_end(), &[0, 1, 2, 3]);
        assert_eq!(m.col(), &[0, 1, 2, 3]);
        assert_eq!(m.val(), &[1, 1, 1, 1]);
        assert_eq!(m.mode(), StreamMode::Ws);
    }

    #[test]
    fn degenerate_only_fills_row_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        let m = SparseMatrix::generate(&SparseShape::Degenerate, 8, StreamMode::Ns, &mut rng);
        assert_eq!(m.nnz(), 1);
        assert!(m.row_end().iter().all(|&e| e == 0));
        assert_eq!(m.row_range(0).len(), 1);
        assert!((1..8).all(|i| m.row_range(i).is_empty()));
    }

    #[test]
    fn random_rows_have_distinct_columns() {
        let mut rng = StdRng::seed_from_u64(3);
        let m = SparseMatrix::generate(
            &SparseShape::Random { row_nnz: 0..9 },
            8,
            StreamMode::Os,
            &mut rng,
        );
        assert!(!m.row_range(0).is_empty());
        for i in 0..8 {
            let mut cols: Vec<_> = m.row_entries(i).map(|(c, _)| c).collect();
            let len = cols.len();
            cols.sort_unstable();
            cols.dedup();
            assert_eq!(cols.len(), len, "row {i} repeats a column");
        }
    }

    #[test]
    fn line_separated_pairs_cover_full_runs() {
        let mut rng = StdRng::seed_from_u64(5);
        let m = SparseMatrix::generate(&SparseShape::LineSeparated, 8, StreamMode::Ns, &mut rng);
        assert_eq!(m.nnz(), 8 / 2 * 8);
        for i in (0..8).step_by(2) {
            assert_eq!(m.row_range(i).len() + m.row_range(i + 1).len(), 8);
        }
    }

    #[test]
    fn dense_row_marks_absent_cells() {
        let m = SparseMatrix::from_parts(3, StreamMode::Ns, vec![1, 1, 2], vec![0, 2, 1], vec![5, 6, 7])
            .unwrap();
        assert_eq!(m.dense_row(0), vec![Some(5), None, Some(6)]);
        assert_eq!(m.dense_row(1), vec![None, None, None]);
        assert_eq!(m.dense_row(2), vec![None, Some(7), None]);
    }

    #[test]
    fn from_parts_rejects_broken_offsets() {
        let decreasing = SparseMatrix::from_parts(2, StreamMode::Ns, vec![1, 0], vec![0, 1], vec![1, 1]);
        assert!(matches!(decreasing, Err(ModelError::InvalidSparse { .. })));

        let short = SparseMatrix::from_parts(2, StreamMode::Ns, vec![0, 0], vec![0, 1], vec![1, 1]);
        assert!(short.is_err());

        let bad_col = SparseMatrix::from_parts(2, StreamMode::Ns, vec![0, 1], vec![0, 2], vec![1, 1]);
        assert!(bad_col.is_err());
    }

    #[test]
    #[should_panic(expected = "even n")]
    fn half_rejects_odd_dimension() {
        let mut rng = StdRng::seed_from_u64(0);
        let _ = SparseMatrix::generate(&SparseShape::Half, 5, StreamMode::Ns, &mut rng);
    }
}
