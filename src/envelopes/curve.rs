//! Segment shapes for envelope stages.
//!
//! A curve describes how a segment travels from its start value to its end
//! value over a duration. Linear segments arrive exactly at the end of the
//! duration; exponential segments approach the target asymptotically and are
//! within `e^-6` (about 0.25%) of it when the duration has elapsed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;

/// Decay constant of exponential segments, in time constants per duration.
///
/// An exponential segment of duration `d` is scheduled with a time constant of
/// `d / EXP_FACTOR`.
pub const EXP_FACTOR: f64 = 6.0;

/// Shape of an attack, decay or release segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    /// Constant rate of change, reaching the target at the end of the segment
    #[default]
    Linear,

    /// Classic RC-style approach (fast start, slow finish)
    Exponential,
}

impl Curve {
    /// Value of a segment running from `start` to `end`, `elapsed` seconds in.
    ///
    /// A zero or negative `duration` means the segment is already complete and
    /// yields `end`. Otherwise a segment reads exactly `start` until time moves.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::Curve;
    ///
    /// assert_eq!(Curve::Linear.value(0.0, 1.0, 0.5, 2.0), 0.25);
    /// assert_eq!(Curve::Linear.value(0.0, 1.0, 3.0, 2.0), 1.0);
    ///
    /// let v = Curve::Exponential.value(0.0, 1.0, 1.0, 1.0);
    /// assert!((v - (1.0 - (-6.0f64).exp())).abs() < 1e-12);
    /// ```
    pub fn value(&self, start: f64, end: f64, elapsed: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return end;
        }
        if elapsed <= 0.0 {
            return start;
        }
        match self {
            Curve::Linear => start + (end - start) * (elapsed / duration).min(1.0),
            Curve::Exponential => end + (start - end) * (-elapsed * EXP_FACTOR / duration).exp(),
        }
    }

    /// The name used in options and serialized configs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::Linear => "linear",
            Curve::Exponential => "exponential",
        }
    }

    /// Parses a curve name, reporting failures against `field`.
    pub(crate) fn parse_field(s: &str, field: &'static str) -> Result<Self, EnvelopeError> {
        match s {
            "linear" => Ok(Curve::Linear),
            "exponential" => Ok(Curve::Exponential),
            other => Err(EnvelopeError::InvalidCurve {
                field,
                found: format!("{other:?}"),
            }),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Curve {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Curve::parse_field(s, "curve")
    }
}
