//! Port structs for the synchronous device boundary.
//!
//! Widths are fixed per device instance: every vector is allocated for the
//! device's `n` and never resized.

use crate::burst::BURST_ROWS;
use crate::mode::StreamMode;

/// Signals driven by the harness and sampled by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInputs {
    /// Clock level.
    pub clock: bool,
    /// Synchronous reset, sampled on the rising edge.
    pub reset: bool,

    /// First cycle of a sparse transfer.
    pub lhs_start: bool,
    /// Weight-stationary flag, valid on the start cycle only.
    pub lhs_ws: bool,
    /// Output-stationary flag, valid on the start cycle only.
    pub lhs_os: bool,
    /// Row end offsets (inclusive), valid on the start cycle only.
    pub lhs_ptr: Vec<u32>,
    /// One chunk of column indices.
    pub lhs_col: Vec<u32>,
    /// One chunk of values, index-aligned with `lhs_col`.
    pub lhs_data: Vec<i32>,

    /// First cycle of a dense transfer.
    pub rhs_start: bool,
    /// One 4-row chunk of the dense matrix.
    pub rhs_data: [Vec<i32>; BURST_ROWS],

    /// First cycle of an output readout.
    pub out_start: bool,
}

impl DeviceInputs {
    /// Zeroed inputs for a device of dimension `n`.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            clock: false,
            reset: false,
            lhs_start: false,
            lhs_ws: false,
            lhs_os: false,
            lhs_ptr: vec![0; n],
            lhs_col: vec![0; n],
            lhs_data: vec![0; n],
            rhs_start: false,
            rhs_data: std::array::from_fn(|_| vec![0; n]),
            out_start: false,
        }
    }

    /// Stream mode encoded by the current `lhs_ws` / `lhs_os` pair.
    #[must_use]
    pub const fn lhs_mode(&self) -> StreamMode {
        StreamMode::from_flags(self.lhs_ws, self.lhs_os)
    }
}

/// Signals driven by the device and sampled by the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutputs {
    /// Matrix dimension, valid after reset.
    pub num_el: usize,

    /// Sparse input accepted in [`StreamMode::Ns`].
    pub lhs_ready_ns: bool,
    /// Sparse input accepted in [`StreamMode::Ws`].
    pub lhs_ready_ws: bool,
    /// Sparse input accepted in [`StreamMode::Os`].
    pub lhs_ready_os: bool,
    /// Sparse input accepted in [`StreamMode::Wos`].
    pub lhs_ready_wos: bool,

    /// Dense input accepted.
    pub rhs_ready: bool,

    /// An output is available for readout.
    pub out_ready: bool,
    /// One 4-row chunk of the output being read.
    pub out_data: [Vec<i32>; BURST_ROWS],
}

impl DeviceOutputs {
    /// Idle outputs for a device of dimension `n`.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            num_el: n,
            lhs_ready_ns: false,
            lhs_ready_ws: false,
            lhs_ready_os: false,
            lhs_ready_wos: false,
            rhs_ready: false,
            out_ready: false,
            out_data: std::array::from_fn(|_| vec![0; n]),
        }
    }

    /// Ready line for a sparse transfer in `mode`.
    #[must_use]
    pub const fn lhs_ready(&self, mode: StreamMode) -> bool {
        match mode {
            StreamMode::Ns => self.lhs_ready_ns,
            StreamMode::Ws => self.lhs_ready_ws,
            StreamMode::Os => self.lhs_ready_os,
            StreamMode::Wos => self.lhs_ready_wos,
        }
    }

    /// Drive the ready line for `mode`.
    pub fn set_lhs_ready(&mut self, mode: StreamMode, ready: bool) {
        match mode {
            StreamMode::Ns => self.lhs_ready_ns = ready,
            StreamMode::Ws => self.lhs_ready_ws = ready,
            StreamMode::Os => self.lhs_ready_os = ready,
            StreamMode::Wos => self.lhs_ready_wos = ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_sized_for_n() {
        let inputs = DeviceInputs::new(8);
        assert_eq!(inputs.lhs_ptr.len(), 8);
        assert!(inputs.rhs_data.iter().all(|row| row.len() == 8));

        let outputs = DeviceOutputs::new(8);
        assert_eq!(outputs.num_el, 8);
        assert!(outputs.out_data.iter().all(|row| row.len() == 8));
    }

    #[test]
    fn ready_lines_dispatch_by_mode() {
        let mut outputs = DeviceOutputs::new(4);
        outputs.set_lhs_ready(StreamMode::Os, true);
        assert!(outputs.lhs_ready(StreamMode::Os));
        assert!(!outputs.lhs_ready(StreamMode::Ns));
        assert!(!outputs.lhs_ready(StreamMode::Ws));
        assert!(!outputs.lhs_ready(StreamMode::Wos));
    }
}
