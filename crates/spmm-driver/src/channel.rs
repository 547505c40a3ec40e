//! Host-side transfer state for the two input channels
//!
//! Each channel owns at most one in-flight operand and a chunk cursor. On
//! every tick the driver asks the channel to present its current chunk on
//! the input port; `advance` moves the cursor on (a clock tick) while a
//! non-advancing drive only re-presents it (combinational settle).

use spmm_chip::{dense_chunks, DeviceInputs, BURST_ROWS};
use spmm_models::{DenseMatrix, SparseMatrix};

#[derive(Debug)]
struct Transfer<T> {
    cursor: usize,
    payload: T,
}

impl<T> Transfer<T> {
    const fn new(payload: T) -> Self {
        Self { cursor: 0, payload }
    }
}

/// Sparse (lhs) channel: row pointers and mode on the first chunk, then
/// `n` column/value pairs per chunk. Goes idle once the chunk just presented
/// covers the last stored entry, so a transfer takes `ceil(nnz / n)` ticks.
#[derive(Debug, Default)]
pub(crate) struct SparseChannel {
    transfer: Option<Transfer<SparseMatrix>>,
}

impl SparseChannel {
    pub(crate) const fn is_idle(&self) -> bool {
        self.transfer.is_none()
    }

    pub(crate) fn begin(&mut self, matrix: SparseMatrix) {
        debug_assert!(self.is_idle(), "sparse transfer already in flight");
        self.transfer = Some(Transfer::new(matrix));
    }

    pub(crate) fn clear(&mut self) {
        self.transfer = None;
    }

    /// Chunk presented on the next drive, if a transfer is in flight
    pub(crate) fn cursor(&self) -> Option<usize> {
        self.transfer.as_ref().map(|t| t.cursor)
    }

    pub(crate) fn drive(&mut self, port: &mut DeviceInputs, n: usize, advance: bool) {
        port.lhs_start = self.transfer.as_ref().is_some_and(|t| t.cursor == 0);
        let Some(t) = self.transfer.as_mut() else {
            return;
        };
        let m = &t.payload;
        if t.cursor == 0 {
            port.lhs_ptr.copy_from_slice(m.row_end());
            port.lhs_ws = m.mode().weight_stationary();
            port.lhs_os = m.mode().output_stationary();
        }

        let base = t.cursor * n;
        let end = m.nnz().min(base + n);
        if base < end {
            let len = end - base;
            port.lhs_col[..len].copy_from_slice(&m.col()[base..end]);
            port.lhs_data[..len].copy_from_slice(&m.val()[base..end]);
        }

        if advance {
            // Frees the channel on the tick that presents the last entry,
            // one tick before a `ptr[n-1] <= tick * n` testbench would.
            if m.last_offset() < base + n {
                self.transfer = None;
            } else {
                t.cursor += 1;
            }
        }
    }
}

/// Dense (rhs) channel: four rows per chunk, `n / 4` chunks.
#[derive(Debug, Default)]
pub(crate) struct DenseChannel {
    transfer: Option<Transfer<DenseMatrix>>,
}

impl DenseChannel {
    pub(crate) const fn is_idle(&self) -> bool {
        self.transfer.is_none()
    }

    pub(crate) fn begin(&mut self, matrix: DenseMatrix) {
        debug_assert!(self.is_idle(), "dense transfer already in flight");
        self.transfer = Some(Transfer::new(matrix));
    }

    pub(crate) fn clear(&mut self) {
        self.transfer = None;
    }

    pub(crate) fn cursor(&self) -> Option<usize> {
        self.transfer.as_ref().map(|t| t.cursor)
    }

    pub(crate) fn drive(&mut self, port: &mut DeviceInputs, n: usize, advance: bool) {
        port.rhs_start = self.transfer.as_ref().is_some_and(|t| t.cursor == 0);
        let Some(t) = self.transfer.as_mut() else {
            return;
        };
        let first = t.cursor * BURST_ROWS;
        for (r, lane) in port.rhs_data.iter_mut().enumerate() {
            lane.copy_from_slice(t.payload.row(first + r));
        }

        if advance {
            t.cursor += 1;
            if t.cursor == dense_chunks(n) {
                self.transfer = None;
            }
        }
    }
}
