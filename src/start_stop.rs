//! Startup and shutdown counting on a speed-like channel, where zero means stopped.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Stopped,
    Unknown,
}

impl RunState {
    fn of(sample: Option<&f64>) -> RunState {
        match sample {
            Some(&x) if x > 0.0 => RunState::Running,
            Some(_) => RunState::Stopped,
            None => RunState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartStopSummary {
    pub startups: usize,
    pub shutdowns: usize,
    pub initial: RunState,
    pub last: RunState,
}

/// Counts `0 -> positive` transitions as startups and `positive -> 0` transitions as
/// shutdowns. Negative samples are neither running nor exactly stopped and never
/// take part in a transition.
pub fn count_start_stop(channel: &[f64]) -> StartStopSummary {
    let (startups, shutdowns) = channel.windows(2).fold((0, 0), |(up, down), w| {
        if w[0] == 0.0 && w[1] > 0.0 {
            (up + 1, down)
        } else if w[0] > 0.0 && w[1] == 0.0 {
            (up, down + 1)
        } else {
            (up, down)
        }
    });
    StartStopSummary {
        startups,
        shutdowns,
        initial: RunState::of(channel.first()),
        last: RunState::of(channel.last()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_transitions() {
        let speed = [0.0, 0.0, 12.0, 15.0, 0.0, 0.0, 3.0, 0.0, 8.0];
        let summary = count_start_stop(&speed);
        assert_eq!(summary.startups, 3);
        assert_eq!(summary.shutdowns, 2);
        assert_eq!(summary.initial, RunState::Stopped);
        assert_eq!(summary.last, RunState::Running);
    }

    #[test]
    fn test_negative_samples_do_not_transition() {
        let summary = count_start_stop(&[0.0, -1.0, 4.0, -2.0, 0.0]);
        assert_eq!((summary.startups, summary.shutdowns), (0, 0));
    }

    #[test]
    fn test_empty_channel_is_unknown() {
        let summary = count_start_stop(&[]);
        assert_eq!(
            summary,
            StartStopSummary {
                startups: 0,
                shutdowns: 0,
                initial: RunState::Unknown,
                last: RunState::Unknown,
            }
        );
    }
}
