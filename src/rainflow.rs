//! Stack-based four-point rainflow counting (ASTM E1049).
use serde::Serialize;
use std::collections::VecDeque;

use crate::reversals::{reversals, ReversalPoint};

/// Multiplicity of a fully closed hysteresis loop.
pub const FULL_CYCLE: f64 = 1.0;
/// Multiplicity of a residual, still-open swing.
pub const HALF_CYCLE: f64 = 0.5;

/// One counted cycle. The field order (range, mean, count, start, end) is the canonical
/// order used by every projection in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cycle {
    pub range: f64,
    pub mean: f64,
    pub count: f64,
    pub start_index: usize,
    pub end_index: usize,
}

impl Cycle {
    fn from_points(from: &ReversalPoint, to: &ReversalPoint, count: f64) -> Self {
        Cycle {
            range: (from.value - to.value).abs(),
            mean: 0.5 * (from.value + to.value),
            count,
            start_index: from.index,
            end_index: to.index,
        }
    }

    pub fn is_full(&self) -> bool {
        self.count == FULL_CYCLE
    }

    /// Time of the first reversal of the cycle for a signal sampled at `fs` Hz,
    /// rounded to a tenth of a second.
    pub fn start_time(&self, fs: f64) -> f64 {
        round_tenth(self.start_index as f64 / fs)
    }

    pub fn end_time(&self, fs: f64) -> f64 {
        round_tenth(self.end_index as f64 / fs)
    }

    /// Canonical tuple view: (range, mean, count, start_index, end_index).
    pub fn as_tuple(&self) -> (f64, f64, f64, usize, usize) {
        (self.range, self.mean, self.count, self.start_index, self.end_index)
    }
}

fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Lazy iterator over the cycles found in a sequence of reversal points, in discovery
/// order.
#[derive(Debug, Clone)]
pub struct Cycles<R> {
    points: R,
    stack: VecDeque<ReversalPoint>,
    exhausted: bool,
}

impl<R: Iterator<Item = ReversalPoint>> Cycles<R> {
    pub fn new(points: R) -> Self {
        Cycles {
            points,
            stack: VecDeque::new(),
            exhausted: false,
        }
    }

    // Inspects the three newest points; returns a cycle if one can be retired.
    fn close(&mut self) -> Option<Cycle> {
        let n = self.stack.len();
        if n < 3 {
            return None;
        }
        let (p1, p2, p3) = (self.stack[n - 3], self.stack[n - 2], self.stack[n - 1]);
        let x = (p3.value - p2.value).abs();
        let y = (p2.value - p1.value).abs();
        if x < y {
            return None;
        }
        if n == 3 {
            self.stack.pop_front();
            return Some(Cycle::from_points(&p1, &p2, HALF_CYCLE));
        }
        self.stack.truncate(n - 3);
        self.stack.push_back(p3);
        Some(Cycle::from_points(&p1, &p2, FULL_CYCLE))
    }

    fn flush(&mut self) -> Option<Cycle> {
        if self.stack.len() < 2 {
            return None;
        }
        let first = self.stack.pop_front()?;
        Some(Cycle::from_points(&first, &self.stack[0], HALF_CYCLE))
    }
}

impl<R: Iterator<Item = ReversalPoint>> Iterator for Cycles<R> {
    type Item = Cycle;

    fn next(&mut self) -> Option<Cycle> {
        while !self.exhausted {
            if let Some(cycle) = self.close() {
                return Some(cycle);
            }
            match self.points.next() {
                Some(point) => self.stack.push_back(point),
                None => self.exhausted = true,
            }
        }
        // The last residual point is never paired with anything.
        self.flush()
    }
}

/// Counts cycles directly from reversal points, e.g. extrema from an external peak
/// detector. No further reversal reduction is applied.
pub fn cycles_from_reversals<R>(points: R) -> Cycles<R::IntoIter>
where
    R: IntoIterator<Item = ReversalPoint>,
{
    Cycles::new(points.into_iter())
}

/// Extracts closed (count 1.0) and residual (count 0.5) cycles from a raw signal.
///
/// A signal without any variation carries no load cycles and yields nothing.
pub fn extract_cycles(signal: &[f64]) -> Cycles<impl Iterator<Item = ReversalPoint> + '_> {
    let flat = signal.windows(2).all(|w| w[0] == w[1]);
    Cycles::new(reversals(signal).filter(move |_| !flat))
}
