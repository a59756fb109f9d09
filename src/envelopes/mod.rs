//! Envelope curve math.
//!
//! This module holds the pure side of the engine: segment shapes and the
//! piecewise value of a triggered or released envelope over time.

mod curve;
mod timeline;

pub use curve::{Curve, EXP_FACTOR};
pub(crate) use timeline::rescale;
pub use timeline::{EnvelopeState, Phase, ReleaseRecord, TriggerRecord};
