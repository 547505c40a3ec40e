//! Run artifacts: the results log and per-scenario trace files
//!
//! The results log has one `"<mask> <0|1>"` line per scenario, where `mask`
//! is the decimal [`Features`](crate::Features) mask. Runs append, so one
//! log can collect several devices or sizes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::suite::ScenarioReport;

/// Write one log line per report
///
/// # Errors
///
/// Propagates I/O errors from `w`.
pub fn write_results<W: Write>(mut w: W, reports: &[ScenarioReport]) -> io::Result<()> {
    for r in reports {
        writeln!(
            w,
            "{} {}",
            r.kind.features().bits(),
            u8::from(r.outcome.is_pass())
        )?;
    }
    w.flush()
}

/// Append to the results log at `path`, creating it if needed
///
/// # Errors
///
/// Returns any error opening or writing the file.
pub fn append_results(path: &Path, reports: &[ScenarioReport]) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    write_results(BufWriter::new(file), reports)?;
    debug!("Appended {} results to {}", reports.len(), path.display());
    Ok(())
}

/// Write every recorded trace into `dir` as `NN-name.trace`.
/// Returns how many files were written.
///
/// # Errors
///
/// Returns any error creating the directory or writing a file.
pub fn write_traces(dir: &Path, reports: &[ScenarioReport]) -> io::Result<usize> {
    fs::create_dir_all(dir)?;
    let mut written = 0;
    for r in reports {
        if let Some(trace) = &r.trace {
            let path = dir.join(r.trace_file_name());
            trace.write_to(BufWriter::new(File::create(&path)?))?;
            debug!("Trace written: {} ({} frames)", path.display(), trace.len());
            written += 1;
        }
    }
    Ok(written)
}
