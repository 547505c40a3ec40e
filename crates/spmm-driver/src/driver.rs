//! Cycle-level protocol driver
//!
//! Owns the device and the single logical clock. Every blocking operation is
//! built on [`Driver::advance_until`], which steps the clock until a
//! predicate over the device outputs holds; nothing runs in the background.
//!
//! ```text
//! step():  drive channels ─► clock=0, eval ─► clock=1, eval ─► timeout check
//! send():  advance_until(ready) ─► begin transfer ─► present chunk 0 ─► eval
//! ```
//!
//! A `send_*` call returns as soon as the transfer has started; the remaining
//! chunks go out on later clock ticks, so sparse, dense and output transfers
//! overlap freely.

use spmm_chip::{dense_chunks, BURST_ROWS};
use spmm_models::{DenseMatrix, SparseMatrix};
use tracing::{debug, info, trace, warn};

use crate::channel::{DenseChannel, SparseChannel};
use crate::device::SpmmDevice;
use crate::error::{DriverError, Result};
use crate::trace::HandshakeTrace;

/// Host-side driver for one device
#[derive(Debug)]
pub struct Driver<D> {
    device: D,
    n: usize,
    half_cycles: u64,
    timeout: Option<u64>,
    sparse: SparseChannel,
    dense: DenseChannel,
    trace: Option<HandshakeTrace>,
}

impl<D: SpmmDevice> Driver<D> {
    /// Wrap a device. Call [`reset`](Self::reset) before any transfer.
    pub fn new(device: D) -> Self {
        Self {
            device,
            n: 0,
            half_cycles: 0,
            timeout: None,
            sparse: SparseChannel::default(),
            dense: DenseChannel::default(),
            trace: None,
        }
    }

    /// Pulse reset for one tick and read back the device dimension.
    ///
    /// Clears the cycle counter, the timeout and any transfer in flight, so
    /// a device left mid-protocol by a failed scenario is usable again.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::UnsupportedSize`] if the device reports a
    /// dimension the burst layout cannot carry.
    pub fn reset(&mut self) -> Result<usize> {
        self.half_cycles = 0;
        self.timeout = None;
        self.sparse.clear();
        self.dense.clear();

        let port = self.device.inputs_mut();
        port.out_start = false;
        port.reset = true;
        self.step()?;
        self.device.inputs_mut().reset = false;

        let n = self.device.outputs().num_el;
        if n == 0 || n % BURST_ROWS != 0 {
            return Err(DriverError::unsupported_size(n));
        }
        self.n = n;
        info!("Device reset: n = {n}");
        Ok(n)
    }

    /// Dimension discovered at the last reset
    pub const fn size(&self) -> usize {
        self.n
    }

    /// Full clock cycles since reset (the reset tick included)
    pub const fn cycles(&self) -> u64 {
        self.half_cycles / 2
    }

    /// Fail once [`cycles`](Self::cycles) reaches `cycles`
    pub fn set_timeout(&mut self, cycles: u64) {
        debug!("Timeout set at {cycles} cycles");
        self.timeout = Some(cycles);
    }

    /// Remove the cycle budget
    pub fn clear_timeout(&mut self) {
        self.timeout = None;
    }

    /// Start recording a fresh handshake trace
    pub fn enable_trace(&mut self) {
        self.trace = Some(HandshakeTrace::new());
    }

    /// Trace recorded so far, if enabled
    pub fn trace(&self) -> Option<&HandshakeTrace> {
        self.trace.as_ref()
    }

    /// Stop recording and hand back the trace
    pub fn take_trace(&mut self) -> Option<HandshakeTrace> {
        self.trace.take()
    }

    /// The driven device
    pub const fn device(&self) -> &D {
        &self.device
    }

    /// Release the device
    pub fn into_device(self) -> D {
        self.device
    }

    /// No sparse transfer in flight
    pub const fn sparse_idle(&self) -> bool {
        self.sparse.is_idle()
    }

    /// No dense transfer in flight
    pub const fn dense_idle(&self) -> bool {
        self.dense.is_idle()
    }

    /// Advance one clock cycle.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] when the cycle budget is reached.
    pub fn step(&mut self) -> Result<()> {
        let n = self.n;
        self.sparse.drive(self.device.inputs_mut(), n, true);
        self.dense.drive(self.device.inputs_mut(), n, true);

        self.half_edge(false);
        self.half_edge(true);
        trace!(
            "tick {}: sparse chunk {:?}, dense chunk {:?}",
            self.cycles(),
            self.sparse.cursor(),
            self.dense.cursor()
        );

        if let Some(limit) = self.timeout {
            if self.cycles() >= limit {
                warn!("Timeout: {} cycles", self.cycles());
                return Err(DriverError::timeout(self.cycles(), "clock"));
            }
        }
        Ok(())
    }

    fn half_edge(&mut self, level: bool) {
        self.device.inputs_mut().clock = level;
        self.device.eval();
        if let Some(trace) = self.trace.as_mut() {
            trace.record(self.half_cycles, self.device.inputs(), self.device.outputs());
        }
        self.half_cycles += 1;
    }

    /// Advance `cycles` clock cycles.
    ///
    /// # Errors
    ///
    /// Propagates a timeout from [`step`](Self::step).
    pub fn step_n(&mut self, cycles: usize) -> Result<()> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Step until `ready` holds. Returns immediately if it already does.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] naming `waiting_for` if the budget
    /// runs out first.
    pub fn advance_until<F>(&mut self, waiting_for: &'static str, ready: F) -> Result<()>
    where
        F: Fn(&Self) -> bool,
    {
        let started = self.cycles();
        while !ready(&*self) {
            self.step().map_err(|e| e.waiting_for(waiting_for))?;
        }
        let waited = self.cycles() - started;
        if waited > 0 {
            trace!("{waiting_for} after {waited} cycles");
        }
        Ok(())
    }

    /// Begin streaming a sparse operand.
    ///
    /// Waits for the ready line of the matrix's mode and for any previous
    /// sparse transfer to finish, then presents the first chunk with
    /// `lhs_start` high.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] if the ready line never asserts.
    ///
    /// # Panics
    ///
    /// Panics if the matrix dimension differs from the device's.
    pub fn send_sparse(&mut self, matrix: &SparseMatrix) -> Result<()> {
        assert_eq!(
            matrix.size(),
            self.n,
            "sparse operand dimension does not match the device"
        );
        let mode = matrix.mode();
        self.advance_until(mode.ready_line(), |d| {
            d.sparse.is_idle() && d.device.outputs().lhs_ready(mode)
        })?;
        debug!("Sparse ({mode}, nnz {}) at cycle {}", matrix.nnz(), self.cycles());

        self.sparse.begin(matrix.clone());
        let n = self.n;
        self.sparse.drive(self.device.inputs_mut(), n, false);
        self.device.eval();
        Ok(())
    }

    /// Begin streaming a dense operand, four rows per cycle.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] if `rhs_ready` never asserts.
    ///
    /// # Panics
    ///
    /// Panics if the matrix dimension differs from the device's.
    pub fn send_dense(&mut self, matrix: &DenseMatrix) -> Result<()> {
        assert_eq!(
            matrix.size(),
            self.n,
            "dense operand dimension does not match the device"
        );
        self.advance_until("rhs_ready", |d| {
            d.dense.is_idle() && d.device.outputs().rhs_ready
        })?;
        debug!("Dense at cycle {}", self.cycles());

        self.dense.begin(matrix.clone());
        let n = self.n;
        self.dense.drive(self.device.inputs_mut(), n, false);
        self.device.eval();
        Ok(())
    }

    /// Wait for a result and read it out, `n / 4` cycles.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] if `out_ready` never asserts or the
    /// budget runs out mid-read, and [`DriverError::Model`] if the device
    /// bus is narrower than its reported dimension.
    pub fn receive_output(&mut self) -> Result<DenseMatrix> {
        self.advance_until("out_ready", |d| d.device.outputs().out_ready)?;
        debug!("Output at cycle {}", self.cycles());

        let n = self.n;
        self.device.inputs_mut().out_start = true;
        self.device.eval();

        let mut data = Vec::with_capacity(n * n);
        for _ in 0..dense_chunks(n) {
            for lane in &self.device.outputs().out_data {
                data.extend_from_slice(lane);
            }
            self.step().map_err(|e| e.waiting_for("out_data"))?;
            self.device.inputs_mut().out_start = false;
        }
        Ok(DenseMatrix::from_vec(n, data)?)
    }
}
