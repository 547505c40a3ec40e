//! Conformance scenarios for the streaming SpMM accelerator.
//!
//! A fixed catalog of choreographies drives the device through every
//! protocol feature (double buffering, weight-stationary reuse,
//! output-stationary accumulation) and checks each output against the
//! golden evaluator.
//!
//! ```no_run
//! use spmm_bench::{BenchConfig, ScenarioKind, ValidationSuite};
//! use spmm_driver::{Driver, SoftwareSpmm};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut driver = Driver::new(SoftwareSpmm::new(8)?);
//! let mut suite = ValidationSuite::new(BenchConfig::default());
//! suite.run_all(&mut driver, &ScenarioKind::ALL);
//! assert!(suite.finish());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod catalog;
mod config;
mod context;
mod features;
pub mod results;
mod suite;

pub use catalog::ScenarioKind;
pub use config::BenchConfig;
pub use context::{Check, ScenarioContext};
pub use features::Features;
pub use suite::{ScenarioOutcome, ScenarioReport, ValidationSuite};
