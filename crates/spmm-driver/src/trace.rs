//! Handshake trace
//!
//! Two frames per clock tick (after the low and the high evaluation), each
//! holding the control and handshake signals. Data buses are not recorded:
//! a stuck scenario is diagnosed from who was waiting on whom.

use std::io::{self, Write};

use spmm_chip::{DeviceInputs, DeviceOutputs, StreamMode};

/// Control and handshake signals at one half-cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceFrame {
    /// Half-cycles since reset
    pub time: u64,
    /// Clock level
    pub clock: bool,
    /// Reset level
    pub reset: bool,
    /// Sparse start pulse
    pub lhs_start: bool,
    /// Mode presented with the sparse transfer
    pub lhs_mode: StreamMode,
    /// Dense start pulse
    pub rhs_start: bool,
    /// Output start pulse
    pub out_start: bool,
    /// Sparse ready lines, indexed like [`StreamMode::ALL`]
    pub lhs_ready: [bool; 4],
    /// Dense ready
    pub rhs_ready: bool,
    /// Output ready
    pub out_ready: bool,
}

impl TraceFrame {
    fn capture(time: u64, inputs: &DeviceInputs, outputs: &DeviceOutputs) -> Self {
        Self {
            time,
            clock: inputs.clock,
            reset: inputs.reset,
            lhs_start: inputs.lhs_start,
            lhs_mode: inputs.lhs_mode(),
            rhs_start: inputs.rhs_start,
            out_start: inputs.out_start,
            lhs_ready: StreamMode::ALL.map(|mode| outputs.lhs_ready(mode)),
            rhs_ready: outputs.rhs_ready,
            out_ready: outputs.out_ready,
        }
    }
}

/// Recorded frames for one scenario
#[derive(Debug, Clone, Default)]
pub struct HandshakeTrace {
    frames: Vec<TraceFrame>,
}

impl HandshakeTrace {
    /// Empty trace
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, time: u64, inputs: &DeviceInputs, outputs: &DeviceOutputs) {
        self.frames.push(TraceFrame::capture(time, inputs, outputs));
    }

    /// Frames in time order
    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// No frames recorded
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Write as a whitespace-separated table, one frame per line.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `w`.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(
            w,
            "# time clock reset lhs_start mode lhs_ready_ns lhs_ready_ws lhs_ready_os lhs_ready_wos rhs_start rhs_ready out_start out_ready"
        )?;
        for f in &self.frames {
            let [ns, ws, os, wos] = f.lhs_ready.map(u8::from);
            writeln!(
                w,
                "{} {} {} {} {} {ns} {ws} {os} {wos} {} {} {} {}",
                f.time,
                u8::from(f.clock),
                u8::from(f.reset),
                u8::from(f.lhs_start),
                f.lhs_mode,
                u8::from(f.rhs_start),
                u8::from(f.rhs_ready),
                u8::from(f.out_start),
                u8::from(f.out_ready),
            )?;
        }
        w.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_a_header_and_one_line_per_frame() {
        let mut inputs = DeviceInputs::new(4);
        let mut outputs = DeviceOutputs::new(4);
        let mut trace = HandshakeTrace::new();
        trace.record(0, &inputs, &outputs);
        inputs.clock = true;
        inputs.lhs_os = true;
        outputs.rhs_ready = true;
        trace.record(1, &inputs, &outputs);

        let mut buf = Vec::new();
        trace.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("# time clock"));
        assert_eq!(lines[1], "0 0 0 0 ns 0 0 0 0 0 0 0 0");
        assert_eq!(lines[2], "1 1 0 0 os 0 0 0 0 0 1 0 0");
    }
}
