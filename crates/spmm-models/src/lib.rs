#![deny(unsafe_code)]

//! Matrix models for the SpMM conformance harness
//!
//! This crate holds the data side of the harness: the compressed sparse
//! left-hand operand, the dense right-hand operand, their generators, and the
//! golden evaluator the device output is checked against.
//!
//! # Sparse encoding
//!
//! Row offsets are cumulative **inclusive end indices** into a shared
//! nonzero array, not per-row counts:
//!
//! ```text
//! row_end = [1, 1, 4]      row 0 → entries 0..=1
//! col     = [0, 2, 0, 1, 2] row 1 → empty (repeats previous end)
//! val     = [5, 6, 7, 8, 9] row 2 → entries 2..=4
//! ```
//!
//! # Example
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use spmm_chip::StreamMode;
//! use spmm_models::{golden_product, DenseMatrix, SparseMatrix, SparseShape};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let eye = SparseMatrix::generate(&SparseShape::Identity, 4, StreamMode::Ns, &mut rng);
//! let dense = DenseMatrix::from_vec(4, (1..=16).collect()).unwrap();
//! assert_eq!(golden_product(&[(&eye, &dense)]), dense);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod dense;
mod error;
pub mod golden;
mod sparse;

pub use dense::DenseMatrix;
pub use error::{ModelError, Result};
pub use golden::{golden_product, verify, CellMismatch, Pair, Verification};
pub use sparse::{SparseMatrix, SparseShape};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        golden_product, verify, DenseMatrix, Pair, SparseMatrix, SparseShape, Verification,
    };
    pub use spmm_chip::StreamMode;
}
