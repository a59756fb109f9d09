//! adsrnode - Click-free ADSR envelopes on a parameter automation timeline
//!
//! This library computes attack-hold-decay-sustain-release envelopes and
//! schedules them onto a host parameter through the [`AutomationSink`] trait.
//! Triggers and releases may land at any point of an in-flight segment: the
//! node works out the envelope value at that instant and rescales the next
//! segment so the curve carries on without a jump.
//!
//! ```
//! use adsrnode::{AdsrNode, Curve, EnvelopeConfig, RecordingSink};
//!
//! let config = EnvelopeConfig::new(0.01, 0.2, 0.6, 0.5)
//!     .with_release_curve(Curve::Exponential);
//! let mut env = AdsrNode::new(RecordingSink::new(), config)?;
//!
//! env.trigger_at(0.0)?.release_at(1.0)?;
//! assert!(!env.sink().events().is_empty());
//! # Ok::<(), adsrnode::EnvelopeError>(())
//! ```

pub mod automation;
pub mod config;
pub mod envelopes;
pub mod error;
mod node;

// Re-export commonly used types at the crate root
pub use automation::{AutomationEvent, AutomationSink, RecordingSink};
pub use config::{EnvelopeConfig, EnvelopeOptions};
pub use envelopes::{Curve, EnvelopeState, Phase, ReleaseRecord, TriggerRecord};
pub use error::EnvelopeError;
pub use node::{AdsrNode, EmissionMode};
