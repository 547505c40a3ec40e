// SPDX-License-Identifier: AGPL-3.0-only

//! Validation suite
//!
//! Runs catalog scenarios one after another against a single device, which
//! is reset (and its size rediscovered) before each one. A scenario passes
//! when every check matched and no handshake timed out.
//!
//! Console output follows the bench convention:
//!
//! ```text
//!   01 ns-onepass        base            ✓ PASS
//!   10 os-pipe           dbbuf+os        ✗ FAIL
//!          out[1][0]: mismatch in 3 of 16 cells
//! ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//! Result: 10 passed, 1 failed  (10/11)
//! ```

use spmm_driver::{Driver, DriverError, HandshakeTrace, SpmmDevice};
use tracing::{info, warn};

use crate::catalog::ScenarioKind;
use crate::config::BenchConfig;
use crate::context::{Check, ScenarioContext};

/// How a scenario ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    /// Every check matched
    Passed,
    /// At least one check mismatched
    Mismatch,
    /// A ready line never asserted
    TimedOut {
        /// Cycle count when the budget ran out
        cycles: u64,
        /// Signal being waited on
        waiting_for: &'static str,
    },
    /// The device could not be brought up
    Error(String),
}

impl ScenarioOutcome {
    /// Counts as a pass in the results log
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Everything recorded about one scenario run
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// 1-based position in the run, used for the trace file number
    pub index: usize,
    /// Which scenario
    pub kind: ScenarioKind,
    /// Device dimension it ran at
    pub n: usize,
    /// Final result
    pub outcome: ScenarioOutcome,
    /// Golden comparisons made before the scenario ended
    pub checks: Vec<Check>,
    /// Cycles used, counted from reset
    pub cycles: u64,
    /// Handshake trace, when tracing was on
    pub trace: Option<HandshakeTrace>,
}

impl ScenarioReport {
    /// Trace file name, `NN-name.trace`
    pub fn trace_file_name(&self) -> String {
        format!("{:02}-{}.trace", self.index, self.kind.name())
    }
}

/// Runs scenarios and tallies the results
#[derive(Debug)]
pub struct ValidationSuite {
    config: BenchConfig,
    reports: Vec<ScenarioReport>,
}

impl ValidationSuite {
    /// Empty suite
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            reports: Vec::new(),
        }
    }

    /// Run configuration
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run every scenario in `kinds`, in order
    pub fn run_all<D: SpmmDevice>(&mut self, driver: &mut Driver<D>, kinds: &[ScenarioKind]) {
        for &kind in kinds {
            self.run(driver, kind);
        }
    }

    /// Reset the device and run one scenario
    pub fn run<D: SpmmDevice>(&mut self, driver: &mut Driver<D>, kind: ScenarioKind) -> &ScenarioReport {
        let index = self.reports.len() + 1;
        let report = self.execute(driver, kind, index);
        self.print(&report);
        self.reports.push(report);
        &self.reports[index - 1]
    }

    fn execute<D: SpmmDevice>(
        &self,
        driver: &mut Driver<D>,
        kind: ScenarioKind,
        index: usize,
    ) -> ScenarioReport {
        let n = match driver.reset() {
            Ok(n) => n,
            Err(e) => {
                warn!("{}: reset failed: {e}", kind.name());
                return ScenarioReport {
                    index,
                    kind,
                    n: driver.size(),
                    outcome: ScenarioOutcome::Error(e.to_string()),
                    checks: Vec::new(),
                    cycles: driver.cycles(),
                    trace: None,
                };
            }
        };
        driver.set_timeout(kind.budget(n).saturating_mul(self.config.timeout_scale));
        if self.config.trace {
            driver.enable_trace();
        }
        info!("START: {} (n = {n}, {})", kind.name(), kind.features());

        let mut ctx = ScenarioContext::new(driver, self.config.scenario_seed(kind.index()));
        let result = kind.run(&mut ctx);
        let checks = ctx.into_checks();

        let outcome = match result {
            Ok(()) if checks.iter().all(|c| c.passed) => ScenarioOutcome::Passed,
            Ok(()) => ScenarioOutcome::Mismatch,
            Err(DriverError::Timeout {
                cycles,
                waiting_for,
            }) => {
                warn!("{}: timeout after {cycles} cycles waiting for {waiting_for}", kind.name());
                ScenarioOutcome::TimedOut {
                    cycles,
                    waiting_for,
                }
            }
            Err(e) => ScenarioOutcome::Error(e.to_string()),
        };
        info!("FINISH: {} ({} cycles)", kind.name(), driver.cycles());

        ScenarioReport {
            index,
            kind,
            n,
            outcome,
            checks,
            cycles: driver.cycles(),
            trace: driver.take_trace(),
        }
    }

    fn print(&self, report: &ScenarioReport) {
        print!(
            "  {:02} {:<16} {:<14} ",
            report.index,
            report.kind.name(),
            report.kind.features().to_string()
        );
        match &report.outcome {
            ScenarioOutcome::Passed => {
                println!("✓ PASS");
                if self.config.verbose {
                    for c in &report.checks {
                        println!("         {}: match ({} cycles)", c.label, report.cycles);
                    }
                }
            }
            ScenarioOutcome::Mismatch => {
                println!("✗ FAIL");
                for c in report.checks.iter().filter(|c| !c.passed) {
                    let dump = c.report.as_deref().unwrap_or_default();
                    if self.config.verbose {
                        println!("         {}:\n{dump}", c.label);
                    } else {
                        let headline = dump.lines().next().unwrap_or_default();
                        println!("         {}: {headline}", c.label);
                    }
                }
            }
            ScenarioOutcome::TimedOut {
                cycles,
                waiting_for,
            } => {
                println!("✗ TIMEOUT");
                println!("         {cycles} cycles waiting for {waiting_for}");
            }
            ScenarioOutcome::Error(message) => {
                println!("✗ ERROR");
                println!("         {message}");
            }
        }
    }

    /// Reports in run order
    pub fn reports(&self) -> &[ScenarioReport] {
        &self.reports
    }

    /// Scenarios that passed
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_pass()).count()
    }

    /// Scenarios that did not pass
    pub fn failed(&self) -> usize {
        self.reports.len() - self.passed()
    }

    /// Print the summary; true when nothing failed
    pub fn finish(&self) -> bool {
        let total = self.reports.len();
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!(
            "Result: {} passed, {} failed  ({}/{total})",
            self.passed(),
            self.failed(),
            self.passed()
        );
        if self.failed() == 0 {
            println!("All scenarios passed ✓");
            true
        } else {
            println!("VALIDATION FAILED: {} scenario(s) require attention", self.failed());
            false
        }
    }
}
