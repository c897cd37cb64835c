//! The energy score and its incremental accumulation.
//!
//! A score is a non-negative decimal persisted as a node label with
//! exactly two fractional digits. The monitor only ever adds deltas
//! derived from a cumulative usage counter, so under the monitor a
//! node's score is monotonically non-decreasing; the seeder overwrites
//! it wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;

use joulegrid_metrics::UsageSample;

use crate::error::{EnergyError, EnergyResult};

/// Factor converting raw cumulative counter units into score units.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.000_000_000_1;

/// Environment variable that overrides [`DEFAULT_SCALE_FACTOR`].
pub const SCALE_FACTOR_ENV: &str = "SCALE_FACTOR";

/// A node's energy score.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Parse a score from its label text.
    pub fn parse(text: &str) -> EnergyResult<Self> {
        text.trim()
            .parse::<f64>()
            .map(Self)
            .map_err(|source| EnergyError::InvalidScore {
                text: text.to_string(),
                source,
            })
    }

    /// Render for persistence: exactly two fractional digits.
    pub fn render(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Compute the new cumulative score from the previous label text and a
/// fresh usage sample.
///
/// The delta is the difference between the last two readings scaled by
/// `scale_factor`. The upstream counter is assumed monotone, not
/// enforced: a counter that moves backwards produces a negative delta
/// and the score follows it down.
pub fn accumulate(
    previous_label: &str,
    sample: &UsageSample,
    scale_factor: f64,
) -> EnergyResult<Score> {
    let previous = Score::parse(previous_label)?;

    let n = sample.readings.len();
    if n < 2 {
        return Err(EnergyError::InsufficientReadings(n));
    }

    let delta = (sample.readings[n - 1].value - sample.readings[n - 2].value) * scale_factor;
    Ok(Score::new(previous.value() + delta))
}
