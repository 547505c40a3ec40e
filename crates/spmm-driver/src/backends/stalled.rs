//! Fault-injecting wrapper that pins one ready line low
//!
//! Used to exercise the driver's timeout path: the wrapped device behaves
//! normally except that the chosen handshake never completes.

use std::fmt;

use spmm_chip::{DeviceInputs, DeviceOutputs, StreamMode};

use crate::device::SpmmDevice;

/// Ready line to withhold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyLine {
    /// `lhs_ready_*` for one stream mode
    Sparse(StreamMode),
    /// `rhs_ready`
    Dense,
    /// `out_ready`
    Output,
}

impl ReadyLine {
    fn force_low(self, outputs: &mut DeviceOutputs) {
        match self {
            Self::Sparse(mode) => outputs.set_lhs_ready(mode, false),
            Self::Dense => outputs.rhs_ready = false,
            Self::Output => outputs.out_ready = false,
        }
    }
}

impl fmt::Display for ReadyLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sparse(mode) => write!(f, "{}", mode.ready_line()),
            Self::Dense => write!(f, "rhs_ready"),
            Self::Output => write!(f, "out_ready"),
        }
    }
}

/// Device wrapper whose `line` never asserts
#[derive(Debug)]
pub struct StalledDevice<D> {
    inner: D,
    line: ReadyLine,
    outputs: DeviceOutputs,
}

impl<D: SpmmDevice> StalledDevice<D> {
    /// Wrap `inner`, holding `line` low from now on
    pub fn new(inner: D, line: ReadyLine) -> Self {
        let mut outputs = inner.outputs().clone();
        line.force_low(&mut outputs);
        Self {
            inner,
            line,
            outputs,
        }
    }

    /// The withheld line
    pub const fn line(&self) -> ReadyLine {
        self.line
    }

    /// Unwrap the healthy device
    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: SpmmDevice> SpmmDevice for StalledDevice<D> {
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
        self.line.force_low(&mut self.outputs);
    }
}
