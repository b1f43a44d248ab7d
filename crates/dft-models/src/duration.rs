//! Microsecond-resolution duration used on every timeline.
//!
//! Timeline positions and media lengths are integers in microseconds.
//! Overlay placements arrive in seconds; convert them with
//! [`Micros::from_secs_f64`] at the boundary and nowhere else.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Microseconds per second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// A non-negative span of time in microseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Micros(pub u64);

impl Micros {
    pub const ZERO: Micros = Micros(0);

    /// Create from a raw microsecond count.
    pub const fn from_micros(us: u64) -> Self {
        Self(us)
    }

    /// Create from whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * MICROS_PER_SEC)
    }

    /// Create from fractional seconds, rounding to the nearest microsecond.
    ///
    /// Negative, NaN and infinite inputs collapse to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * MICROS_PER_SEC as f64).round() as u64)
    }

    /// Raw microsecond count.
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Value in fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_SEC as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, other: Micros) -> Micros {
        Micros(self.0.saturating_sub(other.0))
    }

    /// Split this span into `parts` integer shares whose sum is exactly `self`.
    ///
    /// Every share is `self / parts`; the last one additionally carries the
    /// remainder. Returns an empty vector when `parts` is zero.
    pub fn split_evenly(self, parts: usize) -> Vec<Micros> {
        if parts == 0 {
            return Vec::new();
        }
        let n = parts as u64;
        let share = self.0 / n;
        let remainder = self.0 % n;

        let mut shares = vec![Micros(share); parts];
        if let Some(last) = shares.last_mut() {
            last.0 += remainder;
        }
        shares
    }
}

impl Add for Micros {
    type Output = Micros;

    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Micros {
    fn add_assign(&mut self, rhs: Micros) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Micros {
    fn sum<I: Iterator<Item = Micros>>(iter: I) -> Micros {
        iter.fold(Micros::ZERO, |acc, d| acc + d)
    }
}

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_conversion() {
        assert_eq!(Micros::from_secs(2).as_micros(), 2_000_000);
        assert_eq!(Micros::from_secs_f64(7.5).as_micros(), 7_500_000);
        assert_eq!(Micros::from_secs_f64(0.0000015).as_micros(), 2);
        assert!((Micros::from_micros(7_500_000).as_secs_f64() - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_secs_conversion_rejects_negative_and_nan() {
        assert_eq!(Micros::from_secs_f64(-1.0), Micros::ZERO);
        assert_eq!(Micros::from_secs_f64(f64::NAN), Micros::ZERO);
        assert_eq!(Micros::from_secs_f64(f64::INFINITY), Micros::ZERO);
    }

    #[test]
    fn test_split_evenly_exact() {
        let shares = Micros::from_micros(2_000_000).split_evenly(2);
        assert_eq!(shares, vec![Micros(1_000_000), Micros(1_000_000)]);
    }

    #[test]
    fn test_split_evenly_remainder_goes_last() {
        let shares = Micros::from_micros(2_500_001).split_evenly(2);
        assert_eq!(shares, vec![Micros(1_250_000), Micros(1_250_001)]);

        let shares = Micros::from_micros(10).split_evenly(3);
        assert_eq!(shares, vec![Micros(3), Micros(3), Micros(4)]);
        assert_eq!(shares.into_iter().sum::<Micros>(), Micros(10));
    }

    #[test]
    fn test_split_evenly_degenerate() {
        assert!(Micros::from_secs(1).split_evenly(0).is_empty());
        assert_eq!(Micros::from_micros(1).split_evenly(3), vec![Micros(0), Micros(0), Micros(1)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Micros::from_micros(1_500_000).to_string(), "1.500s");
    }
}
