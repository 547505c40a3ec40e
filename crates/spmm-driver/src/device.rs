//! Device abstraction
//!
//! The harness never looks inside the accelerator. It writes the input port,
//! asks the device to evaluate, and samples the output port. A Verilator model
//! exposes the same contract. Anything that honours that contract
//! (the behavioural [`SoftwareSpmm`](crate::SoftwareSpmm), an RTL simulation
//! bound through FFI, a fault-injecting wrapper) can be driven.

use std::fmt::Debug;

use spmm_chip::{DeviceInputs, DeviceOutputs};

/// A clocked SpMM device seen from its signal boundary
pub trait SpmmDevice: Debug {
    /// Current input port values
    fn inputs(&self) -> &DeviceInputs;

    /// Input port, for the driver to write before the next evaluation
    fn inputs_mut(&mut self) -> &mut DeviceInputs;

    /// Output port as of the last evaluation
    fn outputs(&self) -> &DeviceOutputs;

    /// Settle combinational logic; a low→high change of `clock` since the
    /// previous evaluation is a rising edge and advances sequential state.
    fn eval(&mut self);
}

impl<D: SpmmDevice + ?Sized> SpmmDevice for Box<D> {
    fn inputs(&self) -> &DeviceInputs {
        (**self).inputs()
    }

    fn inputs_mut(&mut self) -> &mut DeviceInputs {
        (**self).inputs_mut()
    }

    fn outputs(&self) -> &DeviceOutputs {
        (**self).outputs()
    }

    fn eval(&mut self) {
        (**self).eval();
    }
}
