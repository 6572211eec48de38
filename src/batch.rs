//! Independent counting of many channels on the rayon pool.
use rayon::prelude::*;

use crate::error::RainflowError;
use crate::histogram::{count_cycles_with, CycleAggregator, HistogramEntry};

/// Counts every channel with the same aggregator. Results keep the channel order and
/// one failing channel does not affect the others.
pub fn count_channels<S>(
    channels: &[S],
    aggregator: CycleAggregator,
) -> Vec<Result<Vec<HistogramEntry>, RainflowError>>
where
    S: AsRef<[f64]> + Sync,
{
    channels
        .par_iter()
        .map(|channel| count_cycles_with(channel.as_ref(), aggregator))
        .collect()
}
