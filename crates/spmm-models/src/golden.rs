//! Golden evaluator
//!
//! Computes the expected device output for one or more (sparse, dense)
//! contributions summed into a single output, then compares cell by cell.
//!
//! ```text
//! gold[i][j] = ( Σ_p Σ_{k ∈ row i of S_p} val_p[k] · D_p[col_p[k]][j] ) mod 256
//! ```
//!
//! A mismatch is a reported result, not an error: [`Verification`] carries
//! the mismatching cells and renders the full side-by-side dump through its
//! `Display` impl.

use std::fmt;

use spmm_chip::burst::truncate_cell;

use crate::dense::DenseMatrix;
use crate::sparse::SparseMatrix;

/// One contribution to an output: a sparse weight and its dense partner
pub type Pair<'a> = (&'a SparseMatrix, &'a DenseMatrix);

/// Expected output for `pairs` accumulated into one result.
///
/// # Panics
///
/// Panics if `pairs` is empty or the matrices disagree on dimension.
pub fn golden_product(pairs: &[Pair<'_>]) -> DenseMatrix {
    let n = common_size(pairs);
    let mut cells = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let sum: i64 = pairs
                .iter()
                .flat_map(|(sparse, dense)| {
                    sparse
                        .row_entries(i)
                        .map(move |(c, v)| i64::from(v) * i64::from(dense.get(c, j)))
                })
                .sum();
            cells.push(truncate_cell(sum));
        }
    }
    DenseMatrix::from_cells(n, cells)
}

/// Compare `actual` against the golden result for `pairs`.
///
/// # Panics
///
/// Panics under the same conditions as [`golden_product`], or if `actual`
/// has a different dimension.
pub fn verify<'a>(pairs: &[Pair<'a>], actual: &'a DenseMatrix) -> Verification<'a> {
    let expected = golden_product(pairs);
    let n = expected.size();
    assert_eq!(actual.size(), n, "actual output has the wrong dimension");

    let mismatches = (0..n)
        .flat_map(|row| (0..n).map(move |col| (row, col)))
        .filter(|&(row, col)| actual.get(row, col) != expected.get(row, col))
        .map(|(row, col)| CellMismatch {
            row,
            col,
            actual: actual.get(row, col),
            expected: expected.get(row, col),
        })
        .collect();

    Verification {
        pairs: pairs.to_vec(),
        actual,
        expected,
        mismatches,
    }
}

fn common_size(pairs: &[Pair<'_>]) -> usize {
    let (first, _) = pairs.first().expect("golden evaluation needs at least one pair");
    let n = first.size();
    for (p, (sparse, dense)) in pairs.iter().enumerate() {
        assert!(
            sparse.size() == n && dense.size() == n,
            "pair {p} has dimensions {}/{}, expected {n}",
            sparse.size(),
            dense.size()
        );
    }
    n
}

/// A cell where the device disagrees with the golden model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMismatch {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
    /// Value read from the device
    pub actual: i32,
    /// Golden value
    pub expected: i32,
}

/// Outcome of comparing one device output with its golden result
#[derive(Debug, Clone)]
pub struct Verification<'a> {
    pairs: Vec<Pair<'a>>,
    actual: &'a DenseMatrix,
    expected: DenseMatrix,
    mismatches: Vec<CellMismatch>,
}

impl Verification<'_> {
    /// Every cell matched
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Cells that differ
    pub fn mismatches(&self) -> &[CellMismatch] {
        &self.mismatches
    }

    /// Golden output
    pub fn expected(&self) -> &DenseMatrix {
        &self.expected
    }
}

/// Side-by-side dump: each sparse operand (blank where no entry is stored)
/// next to its dense partner, then the device output next to the golden one.
impl fmt::Display for Verification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.expected.size();
        writeln!(
            f,
            "mismatch in {} of {} cells",
            self.mismatches.len(),
            n * n
        )?;
        for (p, (sparse, dense)) in self.pairs.iter().enumerate() {
            writeln!(f, "group {p} ({}):", sparse.mode())?;
            for i in 0..n {
                for cell in sparse.dense_row(i) {
                    match cell {
                        Some(v) => write!(f, "{v:>4}")?,
                        None => write!(f, "    ")?,
                    }
                }
                write!(f, "  |  ")?;
                for v in dense.row(i) {
                    write!(f, "{v:>4}")?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f, "Got: {:width$}Expected:", "", width = 4 * n)?;
        for i in 0..n {
            for v in self.actual.row(i) {
                write!(f, "{v:>4}")?;
            }
            write!(f, "  |  ")?;
            for v in self.expected.row(i) {
                write!(f, "{v:>4}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
