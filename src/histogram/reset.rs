// Counter reset detection: what one cumulative series contributes over the window.

use serde::Deserialize;

/// How a series' samples are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    /// Increase over the window (last - first); a decrease means the counter was reset.
    #[default]
    Window,
    /// Point-in-time value: the first sample, no reset check.
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contribution {
    /// No samples; the series is dropped without host attribution.
    Empty,
    Valid(f64),
    /// First sample is above the last: the counter restarted inside the window.
    CounterReset { first: f64, last: f64 },
}

impl Contribution {
    pub fn of(samples: &[f64], mode: SampleMode) -> Self {
        let (Some(&first), Some(&last)) = (samples.first(), samples.last()) else {
            return Contribution::Empty;
        };
        match mode {
            SampleMode::Instant => Contribution::Valid(first),
            // A lone sample is the cumulative total at that point.
            SampleMode::Window if samples.len() == 1 => Contribution::Valid(first),
            // Only the endpoints are compared; intermediate dips are not checked.
            SampleMode::Window if first > last => Contribution::CounterReset { first, last },
            SampleMode::Window => Contribution::Valid(last - first),
        }
    }
}
