//! Full catalog runs against the software device

use std::fs;

use spmm_bench::results::{append_results, write_traces};
use spmm_bench::{BenchConfig, ScenarioKind, ScenarioOutcome, ScenarioReport, ValidationSuite};
use spmm_chip::{DeviceInputs, DeviceOutputs, StreamMode};
use spmm_driver::{Driver, ReadyLine, SoftwareSpmm, SpmmDevice, StalledDevice};

fn run_catalog(n: usize, config: BenchConfig) -> ValidationSuite {
    let mut driver = Driver::new(SoftwareSpmm::new(n).unwrap());
    let mut suite = ValidationSuite::new(config);
    suite.run_all(&mut driver, &ScenarioKind::ALL);
    suite
}

#[test]
fn catalog_passes_on_the_software_device() {
    for n in [4, 8, 16] {
        let suite = run_catalog(n, BenchConfig::default());
        for r in suite.reports() {
            assert_eq!(r.outcome, ScenarioOutcome::Passed, "{} at n = {n}", r.kind.name());
            assert!(!r.checks.is_empty());
            assert!(r.cycles <= r.kind.budget(n));
        }
        assert!(suite.finish());
    }
}

fn corrupting(n: usize) -> Driver<Corrupting> {
    let inner = SoftwareSpmm::new(n).unwrap();
    let outputs = inner.outputs().clone();
    Driver::new(Corrupting { inner, outputs })
}

fn dumps(report: &ScenarioReport) -> Vec<String> {
    report.checks.iter().filter_map(|c| c.report.clone()).collect()
}

#[test]
fn scenario_operands_do_not_depend_on_run_order() {
    let config = BenchConfig {
        seed: 7,
        ..BenchConfig::default()
    };

    let mut driver = corrupting(4);
    let mut full = ValidationSuite::new(config.clone());
    full.run_all(&mut driver, &ScenarioKind::ALL);

    for kind in [ScenarioKind::OsPipe, ScenarioKind::WosPipe, ScenarioKind::RhsDbbuf] {
        let mut driver = corrupting(4);
        let mut alone = ValidationSuite::new(config.clone());
        let single = dumps(alone.run(&mut driver, kind));
        let in_catalog = dumps(&full.reports()[kind.index()]);

        assert!(!single.is_empty(), "{}", kind.name());
        assert_eq!(single, in_catalog, "{} operands differ when run alone", kind.name());
    }
}

#[test]
fn different_suite_seeds_give_different_operands() {
    let mut a = ValidationSuite::new(BenchConfig::default());
    let mut b = ValidationSuite::new(BenchConfig {
        seed: 43,
        ..BenchConfig::default()
    });
    let da = dumps(a.run(&mut corrupting(4), ScenarioKind::NsOnepass));
    let db = dumps(b.run(&mut corrupting(4), ScenarioKind::NsOnepass));
    assert_ne!(da, db);
}

#[test]
fn huge_timeout_scale_saturates() {
    let config = BenchConfig {
        timeout_scale: u64::MAX,
        ..BenchConfig::default()
    };
    let mut driver = Driver::new(SoftwareSpmm::new(4).unwrap());
    let mut suite = ValidationSuite::new(config);
    let report = suite.run(&mut driver, ScenarioKind::OsPipe);
    assert_eq!(report.outcome, ScenarioOutcome::Passed);
}

#[test]
fn withheld_output_times_out_every_scenario() {
    let dev = StalledDevice::new(SoftwareSpmm::new(4).unwrap(), ReadyLine::Output);
    let mut driver = Driver::new(dev);
    let mut suite = ValidationSuite::new(BenchConfig::default());
    suite.run_all(&mut driver, &ScenarioKind::ALL);

    for r in suite.reports() {
        match &r.outcome {
            ScenarioOutcome::TimedOut {
                cycles,
                waiting_for,
            } => {
                assert_eq!(*cycles, r.kind.budget(4), "{}", r.kind.name());
                assert_eq!(*waiting_for, "out_ready");
            }
            other => panic!("{}: expected a timeout, got {other:?}", r.kind.name()),
        }
    }
    assert_eq!(suite.passed(), 0);
    assert!(!suite.finish());
}

#[test]
fn withheld_os_line_only_stops_os_scenarios() {
    let dev = StalledDevice::new(SoftwareSpmm::new(4).unwrap(), ReadyLine::Sparse(StreamMode::Os));
    let mut driver = Driver::new(dev);
    let mut suite = ValidationSuite::new(BenchConfig::default());
    suite.run_all(&mut driver, &ScenarioKind::ALL);

    for r in suite.reports() {
        let needs_os_line = matches!(
            r.kind,
            ScenarioKind::OsOnepass | ScenarioKind::OsRhsDbbuf | ScenarioKind::OsPipe
        );
        assert_eq!(!r.outcome.is_pass(), needs_os_line, "{}", r.kind.name());
    }
}

/// Bumps the first cell of every output chunk
#[derive(Debug)]
struct Corrupting {
    inner: SoftwareSpmm,
    outputs: DeviceOutputs,
}

impl SpmmDevice for Corrupting {
    fn inputs(&self) -> &DeviceInputs {
        self.inner.inputs()
    }

    fn inputs_mut(&mut self) -> &mut DeviceInputs {
        self.inner.inputs_mut()
    }

    fn outputs(&self) -> &DeviceOutputs {
        &self.outputs
    }

    fn eval(&mut self) {
        self.inner.eval();
        self.outputs.clone_from(self.inner.outputs());
        self.outputs.out_data[0][0] = (self.outputs.out_data[0][0] + 1) % 256;
    }
}

#[test]
fn corrupted_output_is_a_mismatch_not_a_timeout() {
    let mut driver = corrupting(4);
    let mut suite = ValidationSuite::new(BenchConfig::default());
    let report = suite.run(&mut driver, ScenarioKind::NsOnepass);

    assert_eq!(report.outcome, ScenarioOutcome::Mismatch);
    let check = &report.checks[0];
    assert!(!check.passed);
    let dump = check.report.as_deref().unwrap();
    assert!(dump.starts_with("mismatch in 1 of 16 cells"));
}

#[test]
fn results_log_appends_mask_and_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("SpMM.tb.out");

    let suite = run_catalog(4, BenchConfig::default());
    append_results(&log, suite.reports()).unwrap();
    append_results(&log, suite.reports()).unwrap();

    let text = fs::read_to_string(&log).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2 * ScenarioKind::ALL.len());
    assert_eq!(lines[0], "0 1");
    assert_eq!(lines[6], "6 1");
    assert_eq!(lines[9], "10 1");
    assert_eq!(lines[10], "12 1");
}

#[test]
fn traces_land_in_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = BenchConfig {
        trace: true,
        ..BenchConfig::default()
    };
    let mut driver = Driver::new(SoftwareSpmm::new(4).unwrap());
    let mut suite = ValidationSuite::new(config);
    suite.run(&mut driver, ScenarioKind::NsOnepass);
    suite.run(&mut driver, ScenarioKind::WosPipe);

    let written = write_traces(dir.path(), suite.reports()).unwrap();
    assert_eq!(written, 2);

    let first = fs::read_to_string(dir.path().join("01-ns-onepass.trace")).unwrap();
    assert!(first.starts_with("# time clock"));
    let report = &suite.reports()[0];
    // tracing starts after the reset tick
    let ticks = usize::try_from(report.cycles).unwrap() - 1;
    assert_eq!(first.lines().count(), 1 + 2 * ticks);
    assert!(dir.path().join("02-wos-pipe.trace").exists());
}
