//! Cycle-level host driver for the streaming SpMM accelerator.
//!
//! The accelerator multiplies a square sparse matrix (row-offset encoded) by
//! a square dense matrix. This crate talks to it one clock edge at a time
//! through its ready/start handshakes, and ships a behavioural software model
//! so the whole harness runs without an RTL simulator.
//!
//! # Device hierarchy
//!
//! ```text
//! SpmmDevice (trait)          port access + eval()
//!   SoftwareSpmm              behavioural model (CI, reference)
//!   StalledDevice<D>          one ready line pinned low (timeout tests)
//! ```
//!
//! # Quick start
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use spmm_driver::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut driver = Driver::new(SoftwareSpmm::new(4)?);
//! let n = driver.reset()?;
//! driver.set_timeout(64);
//!
//! let sparse = SparseMatrix::generate(&SparseShape::Full, n, StreamMode::Ns, &mut rng);
//! let dense = DenseMatrix::random(n, 0..100, &mut rng);
//! driver.send_dense(&dense)?;
//! driver.send_sparse(&sparse)?;
//! let out = driver.receive_output()?;
//!
//! assert!(verify(&[(&sparse, &dense)], &out).is_match());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod backends;
mod channel;
mod device;
mod driver;
mod error;
pub mod trace;

pub use backends::{ReadyLine, SoftwareSpmm, StalledDevice};
pub use device::SpmmDevice;
pub use driver::Driver;
pub use error::{DriverError, Result};
pub use trace::{HandshakeTrace, TraceFrame};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{Driver, DriverError, SoftwareSpmm, SpmmDevice};
    pub use spmm_models::prelude::*;
}
