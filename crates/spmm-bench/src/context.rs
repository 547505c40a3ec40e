//! Per-scenario state: the driver, a seeded generator and recorded checks

use rand::rngs::StdRng;
use rand::SeedableRng;
use spmm_chip::StreamMode;
use spmm_driver::{Driver, Result, SpmmDevice};
use spmm_models::{verify, DenseMatrix, Pair, SparseMatrix, SparseShape};
use tracing::error;

/// Dense operand values; wide enough that products overflow a byte
const DENSE_RANGE: std::ops::Range<i32> = 0..256;

/// One golden comparison made by a scenario
#[derive(Debug, Clone)]
pub struct Check {
    /// What was compared, e.g. `"S0·D1"`
    pub label: String,
    /// Output matched the golden result
    pub passed: bool,
    /// Side-by-side dump, present on mismatch
    pub report: Option<String>,
}

/// What a scenario body sees
#[derive(Debug)]
pub struct ScenarioContext<'a, D> {
    driver: &'a mut Driver<D>,
    rng: StdRng,
    checks: Vec<Check>,
}

impl<'a, D: SpmmDevice> ScenarioContext<'a, D> {
    /// Wrap a freshly reset driver
    pub fn new(driver: &'a mut Driver<D>, seed: u64) -> Self {
        Self {
            driver,
            rng: StdRng::seed_from_u64(seed),
            checks: Vec::new(),
        }
    }

    /// Device dimension
    pub fn n(&self) -> usize {
        self.driver.size()
    }

    /// Generate a sparse operand of the device's size
    pub fn sparse(&mut self, shape: &SparseShape, mode: StreamMode) -> SparseMatrix {
        SparseMatrix::generate(shape, self.driver.size(), mode, &mut self.rng)
    }

    /// Generate a dense operand of the device's size
    pub fn dense(&mut self) -> DenseMatrix {
        DenseMatrix::random(self.driver.size(), DENSE_RANGE, &mut self.rng)
    }

    /// See [`Driver::send_sparse`]
    ///
    /// # Errors
    ///
    /// Propagates a driver timeout.
    pub fn send_sparse(&mut self, matrix: &SparseMatrix) -> Result<()> {
        self.driver.send_sparse(matrix)
    }

    /// See [`Driver::send_dense`]
    ///
    /// # Errors
    ///
    /// Propagates a driver timeout.
    pub fn send_dense(&mut self, matrix: &DenseMatrix) -> Result<()> {
        self.driver.send_dense(matrix)
    }

    /// See [`Driver::receive_output`]
    ///
    /// # Errors
    ///
    /// Propagates a driver timeout.
    pub fn read(&mut self) -> Result<DenseMatrix> {
        self.driver.receive_output()
    }

    /// See [`Driver::step`]
    ///
    /// # Errors
    ///
    /// Propagates a driver timeout.
    pub fn step(&mut self) -> Result<()> {
        self.driver.step()
    }

    /// Compare `actual` with the golden result for `pairs` and record it.
    /// A mismatch is logged and recorded; the scenario carries on.
    pub fn check(&mut self, label: impl Into<String>, pairs: &[Pair<'_>], actual: &DenseMatrix) {
        let label = label.into();
        let v = verify(pairs, actual);
        let report = if v.is_match() {
            None
        } else {
            let dump = v.to_string();
            error!("{label}: {dump}");
            Some(dump)
        };
        self.checks.push(Check {
            label,
            passed: report.is_none(),
            report,
        });
    }

    /// Checks recorded so far
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub(crate) fn into_checks(self) -> Vec<Check> {
        self.checks
    }
}
