//! Error type shared by envelope construction, configuration and scheduling.

use thiserror::Error;

/// Errors reported by [`AdsrNode`](crate::AdsrNode) and [`EnvelopeConfig`](crate::EnvelopeConfig).
///
/// Every variant describes a caller mistake. The operation that returned it
/// left the envelope and its automation sink untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvelopeError {
    /// A required field was absent, or a numeric field held something else.
    #[error("expected `{0}` to be a number")]
    MissingField(&'static str),

    /// A curve field named something other than `linear` or `exponential`.
    #[error("expected `{field}` to be \"linear\" or \"exponential\", got {found}")]
    InvalidCurve { field: &'static str, found: String },

    /// A duration was negative, NaN or infinite.
    #[error("expected `{field}` to be a non-negative duration, got {value}")]
    NegativeDuration { field: &'static str, value: f64 },

    /// An event was scheduled before the trigger it has to follow.
    #[error("cannot {event} at {when}s, before the trigger at {previous}s")]
    Ordering {
        event: &'static str,
        when: f64,
        previous: f64,
    },

    /// `release` was called while no trigger was live.
    #[error("cannot release without a trigger")]
    NoActiveTrigger,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
