//! Reduction of a raw signal to its turning points.
use serde::Serialize;
use std::iter::Enumerate;

/// A turning point of a signal: its offset into the original samples and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReversalPoint {
    pub index: usize,
    pub value: f64,
}

impl ReversalPoint {
    pub fn new(index: usize, value: f64) -> Self {
        ReversalPoint { index, value }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Start,
    Running {
        // last accepted sample, i.e. the last value that differed from its predecessor
        value: f64,
        slope: f64,
        // last sample seen, emitted as the closing boundary
        last: ReversalPoint,
    },
    Done,
}

/// Lazy, single-pass iterator over the reversal points of a sample sequence.
///
/// The first and last samples are always emitted as boundary points so that the
/// residual swings at either end of the record can be closed by the cycle counter.
/// Interior points are emitted only where the slope changes sign; a plateau of equal
/// samples is collapsed and reported at its trailing sample.
#[derive(Debug, Clone)]
pub struct Reversals<I> {
    samples: Enumerate<I>,
    state: State,
}

impl<I: Iterator<Item = f64>> Reversals<I> {
    pub fn new(samples: I) -> Self {
        Reversals {
            samples: samples.enumerate(),
            state: State::Start,
        }
    }
}

impl<I: Iterator<Item = f64>> Iterator for Reversals<I> {
    type Item = ReversalPoint;

    fn next(&mut self) -> Option<ReversalPoint> {
        loop {
            match self.state {
                State::Done => return None,
                State::Start => {
                    let (first, second) = match (self.samples.next(), self.samples.next()) {
                        (Some(first), Some(second)) => (first, second),
                        _ => {
                            self.state = State::Done;
                            return None;
                        }
                    };
                    self.state = State::Running {
                        value: second.1,
                        slope: second.1 - first.1,
                        last: ReversalPoint::new(second.0, second.1),
                    };
                    return Some(ReversalPoint::new(first.0, first.1));
                }
                State::Running { value, slope, last } => match self.samples.next() {
                    None => {
                        self.state = State::Done;
                        return Some(last);
                    }
                    Some((index, sample)) => {
                        let last = ReversalPoint::new(index, sample);
                        if sample == value {
                            self.state = State::Running { value, slope, last };
                            continue;
                        }
                        let next_slope = sample - value;
                        self.state = State::Running {
                            value: sample,
                            slope: next_slope,
                            last,
                        };
                        if slope * next_slope < 0.0 {
                            return Some(ReversalPoint::new(index - 1, value));
                        }
                    }
                },
            }
        }
    }
}

/// Reversal points of `signal`, including both boundary samples.
pub fn reversals(signal: &[f64]) -> Reversals<std::iter::Copied<std::slice::Iter<'_, f64>>> {
    Reversals::new(signal.iter().copied())
}

/// Strict interior peaks and valleys: samples strictly above or strictly below both
/// neighbours. Boundaries and plateau samples are never reported.
///
/// The result can be handed to the reporting entry point as pre-extracted extrema.
pub fn peaks_and_valleys(signal: &[f64]) -> Vec<ReversalPoint> {
    signal
        .windows(3)
        .enumerate()
        .filter(|(_, w)| (w[1] > w[0] && w[1] > w[2]) || (w[1] < w[0] && w[1] < w[2]))
        .map(|(i, w)| ReversalPoint::new(i + 1, w[1]))
        .collect()
}
