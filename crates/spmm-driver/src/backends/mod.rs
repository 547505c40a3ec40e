//! Device implementations
//!
//! - **Software**: behavioural model of the accelerator, used for CI and as
//!   a reference when an RTL simulation disagrees with the golden evaluator
//! - **Stalled**: wrapper that withholds one ready line, for timeout tests

pub mod software;
pub mod stalled;

pub use software::SoftwareSpmm;
pub use stalled::{ReadyLine, StalledDevice};
