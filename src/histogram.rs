//! One-dimensional cycle histograms keyed by range.
use hashbrown::HashMap;
use log::{debug, warn};
use serde::Serialize;

use crate::error::RainflowError;
use crate::rainflow::{extract_cycles, Cycle};

/// Default overshoot, in bins, past the last bin under [`Binning::FixedBinCount`] that is
/// treated as floating-point noise.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Upper bound on the number of bins a dense table may allocate.
pub const MAX_DENSE_BINS: usize = 1 << 24;

/// How cycle ranges are mapped onto histogram keys.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Binning {
    /// Exact range values; sparse.
    #[default]
    NoBinning,
    /// Range rounded to the given number of decimals; sparse. Negative values round to
    /// tens, hundreds, ...
    DigitRounding(i32),
    /// Bin size derived from the signal span divided by the bin count; dense.
    FixedBinCount(usize),
    /// Explicit bin size; dense.
    FixedBinSize(f64),
}

impl Binning {
    /// Maps the three optional selectors onto a single binning policy.
    ///
    /// # Errors
    ///
    /// Returns [`RainflowError::InvalidConfiguration`] if more than one selector is set,
    /// or if the selected one is out of its domain.
    ///
    /// ```
    /// use rainflow_fatigue::Binning;
    ///
    /// assert_eq!(Binning::from_options(None, None, None).unwrap(), Binning::NoBinning);
    /// assert_eq!(Binning::from_options(Some(2), None, None).unwrap(), Binning::DigitRounding(2));
    /// assert!(Binning::from_options(Some(2), Some(10), None).is_err());
    /// ```
    pub fn from_options(
        ndigits: Option<i32>,
        nbins: Option<usize>,
        binsize: Option<f64>,
    ) -> Result<Binning, RainflowError> {
        let selected = [ndigits.is_some(), nbins.is_some(), binsize.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        if selected > 1 {
            return Err(RainflowError::InvalidConfiguration(
                "ndigits, nbins and binsize are mutually exclusive".into(),
            ));
        }
        let binning = match (ndigits, nbins, binsize) {
            (Some(n), _, _) => Binning::DigitRounding(n),
            (_, Some(n), _) => Binning::FixedBinCount(n),
            (_, _, Some(s)) => Binning::FixedBinSize(s),
            _ => Binning::NoBinning,
        };
        binning.validate()?;
        Ok(binning)
    }

    pub fn validate(&self) -> Result<(), RainflowError> {
        match *self {
            Binning::FixedBinCount(0) => Err(RainflowError::InvalidConfiguration(
                "nbins must be greater than 0".into(),
            )),
            Binning::FixedBinSize(s) if !(s.is_finite() && s > 0.0) => {
                Err(RainflowError::InvalidConfiguration(format!(
                    "binsize must be a positive number, got {}",
                    s
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, Binning::FixedBinCount(_) | Binning::FixedBinSize(_))
    }
}

/// A histogram bin: its key and the cumulative cycle count that fell into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramEntry {
    pub key: f64,
    pub count: f64,
}

/// Reduces (range, count) pairs into an ascending histogram.
#[derive(Debug, Clone, Copy)]
pub struct CycleAggregator {
    binning: Binning,
    tolerance: f64,
}

impl CycleAggregator {
    pub fn new(binning: Binning) -> Self {
        CycleAggregator {
            binning,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn binning(&self) -> Binning {
        self.binning
    }

    /// Aggregates `cycles` taken from a signal whose sample span is `(min, max)`.
    /// The span is only consulted under [`Binning::FixedBinCount`].
    ///
    /// # Errors
    ///
    /// Fails on an invalid binning or tolerance, on a bin size that cannot hold the
    /// given ranges, and when a range lands past the last of `nbins` bins by more than
    /// the tolerance.
    pub fn aggregate<I>(
        &self,
        cycles: I,
        span: (f64, f64),
    ) -> Result<Vec<HistogramEntry>, RainflowError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        self.binning.validate()?;
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(RainflowError::InvalidConfiguration(format!(
                "tolerance must not be negative, got {}",
                self.tolerance
            )));
        }
        let table = match self.binning {
            Binning::NoBinning => sparse(cycles, |range| range),
            Binning::DigitRounding(ndigits) => sparse(cycles, |range| round_to(range, ndigits)),
            Binning::FixedBinSize(binsize) => self.dense(cycles, binsize, None)?,
            Binning::FixedBinCount(nbins) => {
                let binsize = (span.1 - span.0) / nbins as f64;
                self.dense(cycles, binsize, Some(nbins))?
            }
        };
        debug!("aggregated cycles into {} bins ({:?})", table.len(), self.binning);
        Ok(table)
    }

    fn dense<I>(
        &self,
        cycles: I,
        binsize: f64,
        nbins: Option<usize>,
    ) -> Result<Vec<HistogramEntry>, RainflowError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut cycles = cycles.into_iter().peekable();
        if cycles.peek().is_some() && !(binsize.is_finite() && binsize > 0.0) {
            return Err(RainflowError::InvalidConfiguration(format!(
                "bin size must be a positive number, got {} ({:?})",
                binsize, self.binning
            )));
        }
        let mut counts: Vec<f64> = Vec::new();
        let mut zero_bin: Option<f64> = None;
        for (range, count) in cycles {
            let quotient = range / binsize;
            if !(quotient.is_finite() && quotient >= 0.0) {
                return Err(RainflowError::InvalidConfiguration(format!(
                    "range {} cannot be binned with bin size {}",
                    range, binsize
                )));
            }
            let mut index = quotient.ceil() as usize;
            if let Some(nbins) = nbins {
                if index > nbins {
                    if quotient - nbins as f64 > self.tolerance {
                        return Err(RainflowError::Inconsistency { index, nbins, quotient });
                    }
                    warn!("bin index {} corrected to {} (quotient {})", index, nbins, quotient);
                    index = nbins;
                }
            }
            if index > MAX_DENSE_BINS {
                return Err(RainflowError::InvalidConfiguration(format!(
                    "range {} needs {} bins of size {}, more than {}",
                    range, index, binsize, MAX_DENSE_BINS
                )));
            }
            if index == 0 {
                *zero_bin.get_or_insert(0.0) += count;
                continue;
            }
            if counts.len() < index {
                counts.resize(index, 0.0);
            }
            counts[index - 1] += count;
        }
        let zero = zero_bin.map(|count| HistogramEntry { key: 0.0, count });
        Ok(zero
            .into_iter()
            .chain(counts.into_iter().enumerate().map(|(i, count)| HistogramEntry {
                key: (i + 1) as f64 * binsize,
                count,
            }))
            .collect())
    }
}

// Rounds to `ndigits` decimals; a scale that over- or underflows leaves the value as is,
// or rounds it to zero.
fn round_to(value: f64, ndigits: i32) -> f64 {
    let scale = 10f64.powi(ndigits);
    if scale == 0.0 {
        return 0.0;
    }
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

fn sparse<I, F>(cycles: I, key_of: F) -> Vec<HistogramEntry>
where
    I: IntoIterator<Item = (f64, f64)>,
    F: Fn(f64) -> f64,
{
    // keyed by bit pattern; +0.0 folds -0.0 so both land in one bin
    let mut counts: HashMap<u64, f64> = HashMap::new();
    for (range, count) in cycles {
        let key = key_of(range) + 0.0;
        *counts.entry(key.to_bits()).or_insert(0.0) += count;
    }
    let mut table: Vec<HistogramEntry> = counts
        .into_iter()
        .map(|(bits, count)| HistogramEntry { key: f64::from_bits(bits), count })
        .collect();
    table.sort_by(|a, b| a.key.total_cmp(&b.key));
    table
}

/// Minimum and maximum of `signal`; `(0.0, 0.0)` when empty.
pub fn span(signal: &[f64]) -> (f64, f64) {
    if signal.is_empty() {
        return (0.0, 0.0);
    }
    signal
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)))
}

/// Counts the cycles of `signal` into a histogram keyed by range.
///
/// The binning is validated before the signal is read.
///
/// ```
/// use rainflow_fatigue::{count_cycles, Binning};
///
/// let table = count_cycles(&[0.0, 10.0, 0.0, 10.0, 0.0], Binning::NoBinning).unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!((table[0].key, table[0].count), (10.0, 2.0));
/// ```
pub fn count_cycles(
    signal: &[f64],
    binning: Binning,
) -> Result<Vec<HistogramEntry>, RainflowError> {
    count_cycles_with(signal, CycleAggregator::new(binning))
}

pub fn count_cycles_with(
    signal: &[f64],
    aggregator: CycleAggregator,
) -> Result<Vec<HistogramEntry>, RainflowError> {
    aggregator.binning().validate()?;
    let pairs = extract_cycles(signal).map(|c: Cycle| (c.range, c.count));
    aggregator.aggregate(pairs, span(signal))
}
