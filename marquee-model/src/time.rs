use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Position on the main feature timeline, in seconds.
///
/// Manifest timecodes are fractional seconds; playback positions reported by
/// backends are of the same unit, so the two compare directly.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timecode(pub f64);

impl Timecode {
    pub const ZERO: Timecode = Timecode(0.0);

    pub fn from_secs(secs: f64) -> Self {
        Timecode(secs)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs_f64(self.0.max(0.0))
    }

    /// Total ordering for sorting; NaN sorts last.
    pub fn total_cmp(&self, other: &Timecode) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }

    /// Seconds between two positions, always non-negative.
    pub fn distance(&self, other: &Timecode) -> f64 {
        (self.0 - other.0).abs()
    }
}

impl Default for Timecode {
    fn default() -> Self {
        Timecode::ZERO
    }
}

impl From<f64> for Timecode {
    fn from(secs: f64) -> Self {
        Timecode(secs)
    }
}

impl std::fmt::Display for Timecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total = self.0.max(0.0) as u64;
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if hours > 0 {
            write!(f, "{hours}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{minutes}:{seconds:02}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_and_without_hours() {
        assert_eq!(Timecode(59.9).to_string(), "0:59");
        assert_eq!(Timecode(61.0).to_string(), "1:01");
        assert_eq!(Timecode(3723.0).to_string(), "1:02:03");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Timecode(10.0);
        let b = Timecode(12.5);
        assert_eq!(a.distance(&b), 2.5);
        assert_eq!(b.distance(&a), 2.5);
    }
}
