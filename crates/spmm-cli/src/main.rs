// SPDX-License-Identifier: AGPL-3.0-only

//! `spmm`: conformance runner for the streaming SpMM accelerator.
//!
//! ```text
//! USAGE:
//!   spmm list                        Show the scenario catalog
//!   spmm run [scenario...]           Run scenarios against the software device
//!     --size <n>                     Device dimension (multiple of 4)
//!     --seed <s>                     Suite seed
//!     --results <file>               Append "<mask> <0|1>" lines
//!     --trace-dir <dir>              Write NN-name.trace per scenario
//!     --stall <line>                 Hold one ready line low
//! ```

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use spmm_bench::results::{append_results, write_traces};
use spmm_bench::{BenchConfig, ScenarioKind, ValidationSuite};
use spmm_chip::StreamMode;
use spmm_driver::{Driver, ReadyLine, SoftwareSpmm, SpmmDevice, StalledDevice};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spmm", about = "SpMM accelerator conformance suite", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List the scenario catalog with feature masks and cycle budgets.
    List {
        /// Dimension used to compute budgets.
        #[arg(long, default_value_t = 16)]
        size: usize,
    },
    /// Run scenarios (all of them when none are named).
    Run {
        /// Scenario names, in run order.
        scenarios: Vec<String>,
        /// Device dimension; must be a positive multiple of 4.
        #[arg(long, default_value_t = 16)]
        size: usize,
        /// Suite seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Multiply every cycle budget by this factor.
        #[arg(long, default_value_t = 1)]
        timeout_scale: u64,
        /// Append the results log here.
        #[arg(long)]
        results: Option<PathBuf>,
        /// Record handshake traces into this directory.
        #[arg(long)]
        trace_dir: Option<PathBuf>,
        /// Hold one ready line low (fault injection).
        #[arg(long, value_enum)]
        stall: Option<StallLine>,
        /// Print details for passing scenarios and full mismatch dumps.
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StallLine {
    Ns,
    Ws,
    Os,
    Wos,
    Rhs,
    Out,
}

impl From<StallLine> for ReadyLine {
    fn from(line: StallLine) -> Self {
        match line {
            StallLine::Ns => Self::Sparse(StreamMode::Ns),
            StallLine::Ws => Self::Sparse(StreamMode::Ws),
            StallLine::Os => Self::Sparse(StreamMode::Os),
            StallLine::Wos => Self::Sparse(StreamMode::Wos),
            StallLine::Rhs => Self::Dense,
            StallLine::Out => Self::Output,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::List { size } => cmd_list(size),
        Cmd::Run {
            scenarios,
            size,
            seed,
            timeout_scale,
            results,
            trace_dir,
            stall,
            verbose,
        } => {
            let config = BenchConfig {
                seed,
                timeout_scale,
                trace: trace_dir.is_some(),
                verbose,
            };
            let ok = cmd_run(&scenarios, size, config, stall, results, trace_dir)?;
            if !ok {
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn cmd_list(size: usize) {
    println!("{:<4}{:<16}{:<14}{:>5}{:>10}", "#", "scenario", "features", "mask", "budget");
    for (i, kind) in ScenarioKind::ALL.iter().enumerate() {
        println!(
            "{:<4}{:<16}{:<14}{:>5}{:>10}",
            i + 1,
            kind.name(),
            kind.features().to_string(),
            kind.features().bits(),
            kind.budget(size)
        );
    }
}

fn select(names: &[String]) -> Result<Vec<ScenarioKind>> {
    if names.is_empty() {
        return Ok(ScenarioKind::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| {
            ScenarioKind::from_name(name).with_context(|| {
                let known: Vec<_> = ScenarioKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown scenario '{name}' (known: {})", known.join(", "))
            })
        })
        .collect()
}

fn cmd_run(
    names: &[String],
    size: usize,
    config: BenchConfig,
    stall: Option<StallLine>,
    results: Option<PathBuf>,
    trace_dir: Option<PathBuf>,
) -> Result<bool> {
    let kinds = select(names)?;
    if config.timeout_scale == 0 {
        bail!("--timeout-scale must be at least 1");
    }

    let software = SoftwareSpmm::new(size)?;
    let device: Box<dyn SpmmDevice> = match stall {
        Some(line) => Box::new(StalledDevice::new(software, line.into())),
        None => Box::new(software),
    };
    let mut driver = Driver::new(device);

    println!("SpMM conformance suite: n = {size}, seed = {}", config.seed);
    if let Some(line) = stall {
        println!("Fault injection: {} held low", ReadyLine::from(line));
    }
    println!();

    let mut suite = ValidationSuite::new(config);
    suite.run_all(&mut driver, &kinds);
    let ok = suite.finish();

    if let Some(path) = results {
        append_results(&path, suite.reports())
            .with_context(|| format!("writing results log {}", path.display()))?;
        info!("Results appended to {}", path.display());
    }
    if let Some(dir) = trace_dir {
        let written = write_traces(&dir, suite.reports())
            .with_context(|| format!("writing traces to {}", dir.display()))?;
        println!("{written} trace file(s) in {}", dir.display());
    }

    Ok(ok)
}
