use dft_models::Micros;
use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// A half-open span `[start, start + duration)` in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Micros,
    pub duration: Micros,
}

impl TimeRange {
    pub fn new(start: Micros, duration: Micros) -> Self {
        Self { start, duration }
    }

    /// Range starting at zero.
    pub fn from_zero(duration: Micros) -> Self {
        Self::new(Micros::ZERO, duration)
    }

    /// Build from a start/end pair in seconds.
    ///
    /// The end must be strictly after the start.
    pub fn from_secs(start: f64, end: f64) -> TimelineResult<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
            return Err(TimelineError::invalid_range(start, end));
        }
        let start_us = Micros::from_secs_f64(start);
        let end_us = Micros::from_secs_f64(end);
        if end_us <= start_us {
            return Err(TimelineError::invalid_range(start, end));
        }
        Ok(Self::new(start_us, end_us.saturating_sub(start_us)))
    }

    pub fn end(&self) -> Micros {
        self.start + self.duration
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}
