// SPDX-License-Identifier: AGPL-3.0-only

//! Software (behavioural) SpMM device
//!
//! Implements [`SpmmDevice`] with plain Rust state machines that honour the
//! same signal contract as the RTL. This enables:
//!
//! 1. **CI without a simulator**: the whole scenario catalog runs against
//!    this model, so the harness itself is tested on every build.
//!
//! 2. **A reference for the RTL**: when a Verilated device disagrees with the
//!    golden evaluator, running the same seed here separates harness bugs
//!    from hardware bugs.
//!
//! ## Microarchitecture
//!
//! ```text
//!   lhs_* ──► sparse rx ──► sparse queue (1) ──┐
//!                                              ├──► multiply ──► result slots (2) ──► out_data
//!   rhs_* ──► dense rx  ──► dense queue  (2) ──┘         ▲
//!                                                        └── resident weight (ws)
//! ```
//!
//! - A sparse transfer takes `ceil(nnz / n)` cycles; a dense one `n / 4`.
//! - One pass consumes one weight and one dense. A weight-stationary weight
//!   stays resident and serves every later dense until the next sparse
//!   transfer begins.
//! - An output-stationary pass adds into the newest result slot while that
//!   slot has not started draining; otherwise it opens a fresh slot.
//! - `out_ready` stays low on a lone open slot while an output-stationary
//!   contribution is still on its way, so the host never drains a partial sum.

use std::collections::VecDeque;

use spmm_chip::burst::truncate_cell;
use spmm_chip::{dense_chunks, DeviceInputs, DeviceOutputs, StreamMode, BURST_ROWS};
use tracing::{debug, trace, warn};

use crate::device::SpmmDevice;
use crate::error::{DriverError, Result};

/// Dense operands the device can hold ahead of compute
const DENSE_SLOTS: usize = 2;
/// Results the device can hold ahead of the host reading them
const OUTPUT_SLOTS: usize = 2;

/// A received sparse operand, decoded from the wire
#[derive(Debug, Clone)]
struct Weight {
    row_end: Vec<usize>,
    col: Vec<usize>,
    val: Vec<i32>,
    mode: StreamMode,
}

impl Weight {
    /// `acc += self · dense`, wide accumulation
    fn multiply_into(&self, dense: &[i32], n: usize, acc: &mut [i64]) {
        let mut start = 0;
        for (i, &end) in self.row_end.iter().enumerate() {
            let stop = (end + 1).min(self.col.len());
            for k in start..stop {
                let c = self.col[k];
                if c >= n {
                    continue;
                }
                let v = i64::from(self.val[k]);
                let src = &dense[c * n..(c + 1) * n];
                for (cell, &d) in acc[i * n..(i + 1) * n].iter_mut().zip(src) {
                    *cell += v * i64::from(d);
                }
            }
            start = end + 1;
        }
    }
}

#[derive(Debug)]
struct SparseRx {
    weight: Weight,
    expected: usize,
}

#[derive(Debug)]
struct DenseRx {
    data: Vec<i32>,
    chunks: usize,
}

#[derive(Debug)]
struct ResultSlot {
    acc: Vec<i64>,
    /// Draining has begun; no further accumulation
    sealed: bool,
}

/// Behavioural model of the streaming SpMM accelerator.
///
/// Sized at construction; `n` is what the device reports on `num_el`.
#[derive(Debug)]
pub struct SoftwareSpmm {
    n: usize,
    inputs: DeviceInputs,
    outputs: DeviceOutputs,
    last_clock: bool,

    sparse_rx: Option<SparseRx>,
    sparse_queue: VecDeque<Weight>,
    resident: Option<Weight>,

    dense_rx: Option<DenseRx>,
    dense_queue: VecDeque<Vec<i32>>,

    results: VecDeque<ResultSlot>,
    /// Index of the chunk on `out_data` while a result drains
    drain: Option<usize>,

    passes: u64,
}

impl SoftwareSpmm {
    /// Create a device of dimension `n`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::UnsupportedSize`] unless `n` is a positive
    /// multiple of the dense burst height.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 || n % BURST_ROWS != 0 {
            return Err(DriverError::unsupported_size(n));
        }
        debug!("Software SpMM device: n = {n}");
        let mut device = Self {
            n,
            inputs: DeviceInputs::new(n),
            outputs: DeviceOutputs::new(n),
            last_clock: false,
            sparse_rx: None,
            sparse_queue: VecDeque::new(),
            resident: None,
            dense_rx: None,
            dense_queue: VecDeque::new(),
            results: VecDeque::new(),
            drain: None,
            passes: 0,
        };
        device.settle();
        Ok(device)
    }

    /// Multiply passes completed since reset
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Mode of the retained weight, if one is resident
    pub fn resident_mode(&self) -> Option<StreamMode> {
        self.resident.as_ref().map(|w| w.mode)
    }

    /// Results waiting to be read (including one mid-drain)
    pub fn pending_results(&self) -> usize {
        self.results.len()
    }

    fn clear(&mut self) {
        self.sparse_rx = None;
        self.sparse_queue.clear();
        self.resident = None;
        self.dense_rx = None;
        self.dense_queue.clear();
        self.results.clear();
        self.drain = None;
        self.passes = 0;
    }

    fn sparse_path_free(&self) -> bool {
        self.sparse_rx.is_none() && self.sparse_queue.is_empty()
    }

    fn lhs_ready(&self, mode: StreamMode) -> bool {
        let free = self.sparse_path_free();
        if mode.output_stationary() {
            free
        } else {
            free && self.results.len() < OUTPUT_SLOTS
        }
    }

    fn rhs_ready(&self) -> bool {
        self.dense_rx.is_none() && self.dense_queue.len() < DENSE_SLOTS
    }

    /// An output-stationary contribution has not been folded in yet.
    ///
    /// Looks at start pulses already on the port too: `out_ready` must drop
    /// in the same evaluation that presents such a transfer.
    fn accumulation_pending(&self) -> bool {
        let os_start = self.sparse_rx.is_none() && self.inputs.lhs_start && self.inputs.lhs_os;
        let dense_incoming = self.dense_rx.is_some()
            || !self.dense_queue.is_empty()
            || self.inputs.rhs_start;
        let resident_os = self
            .resident
            .as_ref()
            .is_some_and(|w| w.mode.output_stationary());
        os_start
            || self
                .sparse_rx
                .as_ref()
                .is_some_and(|rx| rx.weight.mode.output_stationary())
            || self.sparse_queue.iter().any(|w| w.mode.output_stationary())
            || (resident_os && dense_incoming)
    }

    fn out_ready(&self) -> bool {
        match self.results.front() {
            None => false,
            Some(slot) => slot.sealed || self.results.len() > 1 || !self.accumulation_pending(),
        }
    }

    fn posedge(&mut self) {
        self.advance_drain();
        self.receive_dense();
        self.receive_sparse();
        self.compute();
    }

    fn advance_drain(&mut self) {
        if let Some(cursor) = self.drain {
            self.drain = Some(cursor + 1);
        } else if self.inputs.out_start {
            if !self.out_ready() {
                warn!("out_start while out_ready is low, ignored");
                return;
            }
            if let Some(slot) = self.results.front_mut() {
                slot.sealed = true;
            }
            self.drain = Some(1);
        }
        if self.drain == Some(dense_chunks(self.n)) {
            self.results.pop_front();
            self.drain = None;
            trace!("result released, {} still held", self.results.len());
        }
    }

    fn receive_dense(&mut self) {
        if self.dense_rx.is_none() {
            if !self.inputs.rhs_start {
                return;
            }
            if !self.rhs_ready() {
                warn!("rhs_start while rhs_ready is low, ignored");
                return;
            }
            self.dense_rx = Some(DenseRx {
                data: Vec::with_capacity(self.n * self.n),
                chunks: 0,
            });
        }
        let Some(rx) = self.dense_rx.as_mut() else {
            return;
        };
        for lane in &self.inputs.rhs_data {
            rx.data.extend_from_slice(lane);
        }
        rx.chunks += 1;
        if rx.chunks == dense_chunks(self.n) {
            if let Some(done) = self.dense_rx.take() {
                self.dense_queue.push_back(done.data);
                trace!("dense received, {} queued", self.dense_queue.len());
            }
        }
    }

    fn receive_sparse(&mut self) {
        if self.sparse_rx.is_none() {
            if !self.inputs.lhs_start {
                return;
            }
            let mode = self.inputs.lhs_mode();
            if !self.lhs_ready(mode) {
                warn!("lhs_start ({mode}) while {} is low, ignored", mode.ready_line());
                return;
            }
            let row_end: Vec<usize> = self.inputs.lhs_ptr.iter().map(|&p| p as usize).collect();
            let expected = row_end.last().map_or(0, |&last| last + 1);
            if self.resident.take().is_some() {
                trace!("resident weight retired by new sparse");
            }
            self.sparse_rx = Some(SparseRx {
                weight: Weight {
                    row_end,
                    col: Vec::with_capacity(expected),
                    val: Vec::with_capacity(expected),
                    mode,
                },
                expected,
            });
        }
        let Some(rx) = self.sparse_rx.as_mut() else {
            return;
        };
        let take = (rx.expected - rx.weight.col.len()).min(self.n);
        rx.weight
            .col
            .extend(self.inputs.lhs_col[..take].iter().map(|&c| c as usize));
        rx.weight.val.extend_from_slice(&self.inputs.lhs_data[..take]);
        if rx.weight.col.len() == rx.expected {
            if let Some(done) = self.sparse_rx.take() {
                trace!("sparse received ({}, nnz {})", done.weight.mode, done.expected);
                self.sparse_queue.push_back(done.weight);
            }
        }
    }

    fn compute(&mut self) {
        loop {
            let Some(mode) = self
                .sparse_queue
                .front()
                .or(self.resident.as_ref())
                .map(|w| w.mode)
            else {
                break;
            };
            if self.dense_queue.is_empty() {
                break;
            }
            let accumulate =
                mode.output_stationary() && self.results.back().is_some_and(|slot| !slot.sealed);
            if !accumulate && self.results.len() >= OUTPUT_SLOTS {
                break;
            }

            let Some(dense) = self.dense_queue.pop_front() else {
                break;
            };
            let Some(weight) = self.sparse_queue.pop_front().or_else(|| self.resident.take()) else {
                break;
            };

            let n = self.n;
            if accumulate {
                if let Some(slot) = self.results.back_mut() {
                    weight.multiply_into(&dense, n, &mut slot.acc);
                }
            } else {
                let mut acc = vec![0; n * n];
                weight.multiply_into(&dense, n, &mut acc);
                self.results.push_back(ResultSlot { acc, sealed: false });
            }
            self.passes += 1;
            trace!(
                "pass {} ({mode}{})",
                self.passes,
                if accumulate { ", accumulated" } else { "" }
            );

            if weight.mode.weight_stationary() {
                self.resident = Some(weight);
            }
        }
    }

    fn settle(&mut self) {
        for mode in StreamMode::ALL {
            let ready = self.lhs_ready(mode);
            self.outputs.set_lhs_ready(mode, ready);
        }
        self.outputs.rhs_ready = self.rhs_ready();
        self.outputs.out_ready = self.out_ready();
        self.outputs.num_el = self.n;

        let chunk = self.drain.unwrap_or(0);
        let n = self.n;
        if let Some(slot) = self.results.front() {
            for (r, lane) in self.outputs.out_data.iter_mut().enumerate() {
                let base = (chunk * BURST_ROWS + r) * n;
                for (cell, &acc) in lane.iter_mut().zip(&slot.acc[base..base + n]) {
                    *cell = truncate_cell(acc);
                }
            }
        }
    }
}

impl SpmmDevice for SoftwareSpmm {
    fn inputs(&self) -> &DeviceInputs {
        &self.inputs
    }

    fn inputs_mut(&mut self) -> &mut DeviceInputs {
        &mut self.inputs
    }

    fn outputs(&self) -> &DeviceOutputs {
        &self.outputs
    }

    fn eval(&mut self) {
        let rising = self.inputs.clock && !self.last_clock;
        self.last_clock = self.inputs.clock;
        if rising {
            if self.inputs.reset {
                self.clear();
            } else {
                self.posedge();
            }
        }
        self.settle();
    }
}
