//! A module for the main application logic of the rainflow counting tool
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::Path;

use crate::config::{load_config, Config};
use crate::histogram::{span, HistogramEntry};
use crate::matrix::{rainflow_report, MatrixInput, RangeMeanMatrix};
use crate::rainflow::Cycle;
use crate::start_stop::{count_start_stop, StartStopSummary};
use crate::timeseries::{read_column, TimeSeries};

/// Everything a run reports, ready to be serialized.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub samples: usize,
    pub cycles: usize,
    /// Sum of cycle counts, i.e. equivalent full cycles.
    pub equivalent_cycles: f64,
    pub histogram: Vec<HistogramEntry>,
    pub matrix: Option<MatrixView>,
    pub start_stop: Option<StartStopSummary>,
}

#[derive(Debug, Serialize)]
pub struct MatrixView {
    pub range_edges: Vec<f64>,
    pub mean_edges: Vec<f64>,
    /// Row-major, one row per range bin.
    pub counts: Vec<Vec<f64>>,
}

impl From<&RangeMeanMatrix> for MatrixView {
    fn from(matrix: &RangeMeanMatrix) -> Self {
        MatrixView {
            range_edges: matrix.range_edges.clone(),
            mean_edges: matrix.mean_edges.clone(),
            counts: matrix.rows(),
        }
    }
}

// A row of the exported detail table.
#[derive(Debug, Serialize)]
struct CycleRecord {
    range: f64,
    mean: f64,
    count: f64,
    start_index: usize,
    end_index: usize,
    start_time: Option<f64>,
    end_time: Option<f64>,
}

impl CycleRecord {
    fn new(cycle: &Cycle, sampling_rate: Option<f64>) -> Self {
        CycleRecord {
            range: cycle.range,
            mean: cycle.mean,
            count: cycle.count,
            start_index: cycle.start_index,
            end_index: cycle.end_index,
            start_time: sampling_rate.map(|fs| cycle.start_time(fs)),
            end_time: sampling_rate.map(|fs| cycle.end_time(fs)),
        }
    }
}

/// Loads and validates the configuration at `config_path`, then counts its signal.
pub fn run(config_path: &str) -> Result<RunReport> {
    info!("Running with configuration: {}", config_path);
    let conf = load_config(config_path)
        .with_context(|| format!("failed to load configuration {}", config_path))?;
    conf.validate().context("invalid configuration")?;
    run_config(&conf)
}

pub fn run_config(conf: &Config) -> Result<RunReport> {
    // resolved before the signal is read
    let aggregator = conf.binning.aggregator()?;

    let series = TimeSeries::read(&conf.input)
        .with_context(|| format!("failed to read signal from {}", conf.input.path))?;
    info!("Loaded {} samples from {}", series.len(), conf.input.path);

    let report = rainflow_report(
        MatrixInput::Signal(&series.samples),
        conf.matrix.as_ref().map(|m| m.options()),
    )?;
    let pairs = report.cycles.iter().map(|c| (c.range, c.count));
    let histogram = aggregator.aggregate(pairs, span(&series.samples))?;
    info!(
        "Counted {} cycles into {} bins (dense: {})",
        report.cycles.len(),
        histogram.len(),
        aggregator.binning().is_dense()
    );

    if let Some(path) = &conf.output.cycles_csv {
        write_cycles(path, &report.cycles, series.sampling_rate)
            .with_context(|| format!("failed to write cycle table to {}", path))?;
        info!("Wrote cycle table to {}", path);
    }

    let start_stop = match &conf.start_stop {
        Some(section) => {
            let delimiter = conf.input.delimiter_byte()?;
            let channel =
                read_column(&conf.input.path, &section.column, conf.input.header, delimiter)
                .context("failed to read start/stop column")?;
            Some(count_start_stop(&channel))
        }
        None => None,
    };

    Ok(RunReport {
        samples: series.len(),
        cycles: report.cycles.len(),
        equivalent_cycles: report.cycles.iter().map(|c| c.count).sum(),
        histogram,
        matrix: report.matrix.as_ref().map(MatrixView::from),
        start_stop,
    })
}

/// Writes one CSV row per cycle, with start/end times when the sampling rate is known.
pub fn write_cycles<P: AsRef<Path>>(
    path: P,
    cycles: &[Cycle],
    sampling_rate: Option<f64>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for cycle in cycles {
        writer.serialize(CycleRecord::new(cycle, sampling_rate))?;
    }
    writer.flush()?;
    Ok(())
}
