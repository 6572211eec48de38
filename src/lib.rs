// src/lib.rs
//! Rainflow cycle counting for fatigue analysis of load and stress time series.
//!
//! The engine is a pure pipeline: [`reversals()`] reduces a signal to turning points,
//! [`extract_cycles`] counts closed and residual cycles, [`count_cycles`] bins them into
//! a range histogram and [`rainflow_report`] builds the detail table and range × mean
//! matrix. Configuration loading, file input and the CLI live in [`config`],
//! [`timeseries`] and [`app_logic`].

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

pub mod app_logic;
pub mod batch;
pub mod config;
pub mod error;
pub mod histogram;
pub mod matrix;
pub mod rainflow;
pub mod reversals;
pub mod start_stop;
pub mod timeseries;

pub use batch::count_channels;
pub use error::RainflowError;
pub use histogram::{count_cycles, count_cycles_with, Binning, CycleAggregator, HistogramEntry};
pub use matrix::{rainflow_report, MatrixInput, MatrixOptions, RainflowReport, RangeMeanMatrix};
pub use rainflow::{cycles_from_reversals, extract_cycles, Cycle};
pub use reversals::{peaks_and_valleys, reversals, ReversalPoint};
pub use start_stop::{count_start_stop, StartStopSummary};

// When the "wasm" feature is enabled, expose the cycle table to the host. Each cycle
// takes five consecutive values: range, mean, count, start index, end index.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub fn run_rainflow(signal: &[f64]) -> Vec<f64> {
    flatten_cycles(signal)
}

#[cfg_attr(not(feature = "wasm"), allow(dead_code))]
fn flatten_cycles(signal: &[f64]) -> Vec<f64> {
    extract_cycles(signal)
        .flat_map(|c| [c.range, c.mean, c.count, c.start_index as f64, c.end_index as f64])
        .collect()
}
