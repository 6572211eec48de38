//! Per-cycle detail table and range × mean rainflow matrix for reporting.
use log::debug;
use nalgebra::DMatrix;

use crate::error::RainflowError;
use crate::rainflow::{cycles_from_reversals, extract_cycles, Cycle};
use crate::reversals::ReversalPoint;

/// Where the reporting entry point takes its turning points from.
#[derive(Debug, Clone, Copy)]
pub enum MatrixInput<'a> {
    /// A raw signal, reduced to reversals first.
    Signal(&'a [f64]),
    /// Extrema already verified by the caller, counted as they are.
    Extrema(&'a [ReversalPoint]),
}

/// Grid resolution of the rainflow matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixOptions {
    pub range_bins: usize,
    pub mean_bins: usize,
}

impl MatrixOptions {
    pub fn validate(&self) -> Result<(), RainflowError> {
        if self.range_bins == 0 || self.mean_bins == 0 {
            return Err(RainflowError::InvalidConfiguration(format!(
                "matrix bins must be greater than 0, got {}x{}",
                self.range_bins, self.mean_bins
            )));
        }
        Ok(())
    }
}

impl Default for MatrixOptions {
    fn default() -> Self {
        MatrixOptions {
            range_bins: 10,
            mean_bins: 10,
        }
    }
}

/// Two-dimensional histogram of cycles. Rows follow the range axis, columns the mean
/// axis. Cells hold equivalent full cycles, so a half cycle adds 0.5.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeMeanMatrix {
    pub counts: DMatrix<f64>,
    pub range_edges: Vec<f64>,
    pub mean_edges: Vec<f64>,
}

impl RangeMeanMatrix {
    pub fn empty() -> Self {
        RangeMeanMatrix {
            counts: DMatrix::zeros(0, 0),
            range_edges: Vec::new(),
            mean_edges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.counts.sum()
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.counts
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RainflowReport {
    /// Every counted cycle in discovery order.
    pub cycles: Vec<Cycle>,
    /// Present when a grid was requested.
    pub matrix: Option<RangeMeanMatrix>,
}

/// Counts the cycles of `input` and, if `options` is given, bins them into a
/// range × mean matrix.
pub fn rainflow_report(
    input: MatrixInput<'_>,
    options: Option<MatrixOptions>,
) -> Result<RainflowReport, RainflowError> {
    if let Some(options) = options {
        options.validate()?;
    }
    let cycles: Vec<Cycle> = match input {
        MatrixInput::Signal(signal) => extract_cycles(signal).collect(),
        MatrixInput::Extrema(extrema) => cycles_from_reversals(extrema.iter().copied()).collect(),
    };
    let matrix = options
        .map(|options| range_mean_matrix(&cycles, options))
        .transpose()?;
    Ok(RainflowReport { cycles, matrix })
}

/// Bins `cycles` into a `range_bins` × `mean_bins` grid.
///
/// # Errors
///
/// Returns [`RainflowError::InvalidConfiguration`] if either axis has zero bins.
pub fn range_mean_matrix(
    cycles: &[Cycle],
    options: MatrixOptions,
) -> Result<RangeMeanMatrix, RainflowError> {
    options.validate()?;
    if cycles.is_empty() {
        return Ok(RangeMeanMatrix::empty());
    }
    let range_edges = edges(cycles.iter().map(|c| c.range), options.range_bins);
    let mean_edges = edges(cycles.iter().map(|c| c.mean), options.mean_bins);
    let mut counts = DMatrix::<f64>::zeros(options.range_bins, options.mean_bins);
    for cycle in cycles {
        let row = bin_of(&range_edges, cycle.range);
        let col = bin_of(&mean_edges, cycle.mean);
        counts[(row, col)] += cycle.count;
    }
    debug!(
        "binned {} cycles into a {}x{} rainflow matrix",
        cycles.len(),
        options.range_bins,
        options.mean_bins
    );
    Ok(RangeMeanMatrix {
        counts,
        range_edges,
        mean_edges,
    })
}

// Equally spaced edges over the observed values; a single value gets a unit-wide span.
fn edges(values: impl Iterator<Item = f64>, bins: usize) -> Vec<f64> {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let step = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * step).collect();
    edges[bins] = hi;
    edges
}

// Half-open bins except the last, which includes its right edge.
fn bin_of(edges: &[f64], value: f64) -> usize {
    let bins = edges.len() - 1;
    edges.partition_point(|&e| e <= value).saturating_sub(1).min(bins - 1)
}
