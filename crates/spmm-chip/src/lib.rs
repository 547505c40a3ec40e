//! Signal model for the streaming SpMM accelerator.
//!
//! This crate has **no dependencies** and **no device access**. It is a
//! pure model of the synchronous boundary: port layout, the four sparse
//! stream modes and the burst geometry of each channel.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`burst`] | Burst widths, output byte truncation |
//! | [`mode`] | `StreamMode`, the `(ws, os)` flag pair as one value |
//! | [`signals`] | `DeviceInputs` / `DeviceOutputs` port structs |
//!
//! # Signal map
//!
//! ```text
//! driver → device              device → driver
//! ───────────────              ───────────────
//! clock, reset                 num_el
//! lhs_start lhs_ws lhs_os      lhs_ready_{ns,ws,os,wos}
//! lhs_ptr[n]                   rhs_ready
//! lhs_col[n] lhs_data[n]       out_ready
//! rhs_start rhs_data[4][n]     out_data[4][n]
//! out_start
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod burst;
pub mod mode;
pub mod signals;

pub use burst::{dense_chunks, BURST_ROWS, OUTPUT_MODULUS};
pub use mode::StreamMode;
pub use signals::{DeviceInputs, DeviceOutputs};
