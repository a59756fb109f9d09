//! The ADSR node: trigger, release and reset scheduling.

use log::{debug, warn};

use crate::automation::{self, AutomationSink};
use crate::config::{EnvelopeConfig, EnvelopeOptions};
use crate::envelopes::{EnvelopeState, Phase, ReleaseRecord, TriggerRecord, rescale};
use crate::error::{EnvelopeError, Result};

/// Most value-sets a stepped segment may write.
const MAX_STEPS: f64 = 1_000_000.0;

/// How an envelope describes its segments to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EmissionMode {
    /// Ramps and smoothing steps, one per segment
    #[default]
    Curves,

    /// The computed envelope written out as immediate value-sets every
    /// `interval` seconds.
    ///
    /// A trigger is written up to `horizon` seconds ahead; a release until its
    /// rescaled release time (bounded by `horizon`). Intended for hosts whose
    /// parameters cannot ramp, and for checking the computed curve against
    /// what a host realizes. Modes writing more than a million values per
    /// segment fall back to [`EmissionMode::stepped`].
    Stepped { interval: f64, horizon: f64 },
}

impl EmissionMode {
    /// Stepped emission at 10ms resolution over a 10 second horizon.
    pub fn stepped() -> Self {
        EmissionMode::Stepped {
            interval: 0.01,
            horizon: 10.0,
        }
    }

    fn sanitized(self) -> Self {
        match self {
            EmissionMode::Stepped { interval, horizon }
                if !(interval.is_finite()
                    && interval > 0.0
                    && horizon.is_finite()
                    && horizon / interval <= MAX_STEPS) =>
            {
                warn!("ignoring stepped emission with interval {interval}s over {horizon}s");
                EmissionMode::stepped()
            }
            mode => mode,
        }
    }
}

/// An ADSR envelope scheduled onto an [`AutomationSink`].
///
/// The node keeps the envelope's parameters and at most one live record: the
/// last trigger, or the last release. Every event computes the envelope value
/// at its moment from that record, rescales the next segment so it keeps the
/// slope of an uninterrupted one, and replaces whatever the sink had scheduled
/// from that moment on. Retriggering or releasing at any point is therefore
/// free of jumps.
///
/// Event times are absolute seconds on the sink's timeline. The `*_at` methods
/// take them explicitly; the plain forms use [`AutomationSink::current_time`].
///
/// # Examples
///
/// ```
/// use adsrnode::{AdsrNode, EnvelopeConfig, RecordingSink};
///
/// let config = EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0);
/// let mut env = AdsrNode::new(RecordingSink::new(), config)?;
///
/// env.trigger_at(0.0)?;
/// assert_eq!(env.value_at(1.0), 1.0);
/// assert_eq!(env.value_at(2.0), 0.5);
///
/// // Releasing half-way through the decay starts from 0.75 and stretches the
/// // release so it falls at the same rate as a release from sustain.
/// env.release_at(1.5)?;
/// assert!((env.value_at(1.5) - 0.75).abs() < 1e-9);
/// assert!((env.value_at(2.25) - 0.375).abs() < 1e-9);
/// assert_eq!(env.value_at(3.0), 0.0);
/// # Ok::<(), adsrnode::EnvelopeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AdsrNode<S: AutomationSink> {
    sink: S,
    config: EnvelopeConfig,
    state: EnvelopeState,
    mode: EmissionMode,
}

impl<S: AutomationSink> AdsrNode<S> {
    /// Creates an idle envelope.
    ///
    /// Fails if `config` holds a negative or non-finite duration.
    pub fn new(sink: S, config: EnvelopeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sink,
            config,
            state: EnvelopeState::Idle,
            mode: EmissionMode::Curves,
        })
    }

    /// Creates an idle envelope from options.
    ///
    /// `attack`, `decay`, `sustain` and `release` are required.
    pub fn from_options(sink: S, opts: &EnvelopeOptions) -> Result<Self> {
        Self::new(sink, EnvelopeConfig::from_options(opts)?)
    }

    /// Creates an idle envelope from a JSON options object.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::{AdsrNode, Curve, RecordingSink};
    /// use serde_json::json;
    ///
    /// let env = AdsrNode::from_json(
    ///     RecordingSink::new(),
    ///     &json!({
    ///         "attack": 0.01,
    ///         "decay": 0.2,
    ///         "sustain": 0.3,
    ///         "release": 0.4,
    ///         "releaseCurve": "exponential",
    ///     }),
    /// )?;
    /// assert_eq!(env.config().release_curve, Curve::Exponential);
    /// # Ok::<(), adsrnode::EnvelopeError>(())
    /// ```
    #[cfg(feature = "json")]
    pub fn from_json(sink: S, value: &serde_json::Value) -> Result<Self> {
        Self::new(sink, EnvelopeConfig::from_json(value)?)
    }

    /// Sets how segments are handed to the sink.
    pub fn with_emission_mode(mut self, mode: EmissionMode) -> Self {
        self.set_emission_mode(mode);
        self
    }

    /// Sets how segments are handed to the sink.
    ///
    /// A stepped mode with a non-positive or non-finite interval falls back to
    /// [`EmissionMode::stepped`].
    pub fn set_emission_mode(&mut self, mode: EmissionMode) {
        self.mode = mode.sanitized();
    }

    pub fn emission_mode(&self) -> EmissionMode {
        self.mode
    }

    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// The live trigger or release record, if any.
    pub fn state(&self) -> &EnvelopeState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Envelope value at absolute `time`, as currently scheduled.
    ///
    /// Reads `base` while idle. Times before the live event are evaluated as
    /// if that event's timeline extended backwards.
    pub fn value_at(&self, time: f64) -> f64 {
        self.state.value_at(&self.config, time)
    }

    /// Segment the envelope is in at absolute `time`.
    pub fn phase_at(&self, time: f64) -> Phase {
        self.state.phase_at(&self.config, time)
    }

    /// Returns true if the envelope is away from `base` at `time`, i.e.
    /// triggered, or released and still ramping down.
    pub fn is_active_at(&self, time: f64) -> bool {
        !matches!(self.phase_at(time), Phase::Idle | Phase::Finished)
    }

    /// Triggers the envelope now.
    pub fn trigger(&mut self) -> Result<&mut Self> {
        let now = self.sink.current_time();
        self.trigger_at(now)
    }

    /// Triggers the envelope (note-on) at `when`.
    ///
    /// A live trigger is released at `when` first. The attack starts from the
    /// envelope's value at `when`, and its duration is scaled by the distance
    /// left to `peak` so the ramp keeps its usual slope.
    ///
    /// Fails with [`EnvelopeError::Ordering`] if `when` precedes the live trigger.
    pub fn trigger_at(&mut self, when: f64) -> Result<&mut Self> {
        if let EnvelopeState::Triggered(previous) = self.state {
            if when < previous.when {
                warn!(
                    "rejected trigger at {when}s before pending trigger at {}s",
                    previous.when
                );
                return Err(EnvelopeError::Ordering {
                    event: "trigger",
                    when,
                    previous: previous.when,
                });
            }
            self.release_at(when)?;
        }

        let config = self.config;
        let (start_value, interrupted_linear) = match self.state {
            EnvelopeState::Released(release) => {
                let elapsed = when - release.when;
                (
                    release.value_at(&config, elapsed),
                    release.on_linear_segment(&config, elapsed),
                )
            }
            _ => (config.base, false),
        };

        let record = TriggerRecord {
            when,
            start_value,
            attack_time: rescale(config.attack, start_value, config.base, config.peak),
        };
        self.state = EnvelopeState::Triggered(record);
        debug!(
            "trigger at {when}s from {start_value}, attack {}s",
            record.attack_time
        );

        automation::cancel(&mut self.sink, when);
        match self.mode {
            EmissionMode::Curves => {
                let hold_end = when + record.attack_time + config.hold;
                automation::approach(&mut self.sink, start_value, when, interrupted_linear);
                automation::curve_to(
                    &mut self.sink,
                    config.attack_curve,
                    config.peak,
                    when,
                    record.attack_time,
                );
                if config.hold > 0.0 {
                    automation::approach(&mut self.sink, config.peak, hold_end, false);
                }
                automation::curve_to(
                    &mut self.sink,
                    config.decay_curve,
                    config.sustain,
                    hold_end,
                    config.decay,
                );
            }
            EmissionMode::Stepped { interval, horizon } => {
                automation::sample_until(
                    &mut self.sink,
                    when,
                    interval,
                    |t| record.value_at(&config, t),
                    |t| t + interval >= horizon,
                );
            }
        }
        Ok(self)
    }

    /// Releases the envelope now.
    pub fn release(&mut self) -> Result<&mut Self> {
        let now = self.sink.current_time();
        self.release_at(now)
    }

    /// Releases the envelope (note-off) at `when`.
    ///
    /// The release starts from the envelope's value at `when`, and its duration
    /// is scaled by the distance left to `base` so it falls at the same rate as
    /// a release from `sustain`.
    ///
    /// Fails with [`EnvelopeError::NoActiveTrigger`] unless a trigger is live,
    /// and with [`EnvelopeError::Ordering`] if `when` precedes it.
    pub fn release_at(&mut self, when: f64) -> Result<&mut Self> {
        let trigger = match self.state {
            EnvelopeState::Triggered(trigger) => trigger,
            _ => {
                warn!("rejected release at {when}s without a trigger");
                return Err(EnvelopeError::NoActiveTrigger);
            }
        };
        if when < trigger.when {
            warn!(
                "rejected release at {when}s before trigger at {}s",
                trigger.when
            );
            return Err(EnvelopeError::Ordering {
                event: "release",
                when,
                previous: trigger.when,
            });
        }

        let config = self.config;
        let elapsed = when - trigger.when;
        let start_value = trigger.value_at(&config, elapsed);
        let interrupted_linear = trigger.on_linear_segment(&config, elapsed);
        let record = ReleaseRecord {
            when,
            start_value,
            release_time: rescale(config.release, start_value, config.sustain, config.base),
        };
        self.state = EnvelopeState::Released(record);
        debug!(
            "release at {when}s from {start_value}, release {}s",
            record.release_time
        );

        automation::cancel(&mut self.sink, when);
        match self.mode {
            EmissionMode::Curves => {
                automation::approach(&mut self.sink, start_value, when, interrupted_linear);
                automation::curve_to(
                    &mut self.sink,
                    config.release_curve,
                    config.base,
                    when,
                    record.release_time,
                );
            }
            EmissionMode::Stepped { interval, horizon } => {
                automation::sample_until(
                    &mut self.sink,
                    when,
                    interval,
                    |t| record.value_at(&config, t),
                    |t| t >= record.release_time || t + interval >= horizon,
                );
            }
        }
        Ok(self)
    }

    /// Resets the envelope now.
    pub fn reset(&mut self) -> &mut Self {
        let now = self.sink.current_time();
        self.reset_at(now)
    }

    /// Drops any live trigger or release and jumps to `base` at `when`.
    pub fn reset_at(&mut self, when: f64) -> &mut Self {
        self.state = EnvelopeState::Idle;
        debug!("reset at {when}s");
        automation::cancel(&mut self.sink, when);
        automation::set_immediate(&mut self.sink, self.config.base, when);
        self
    }

    /// Overwrites the parameters present in `opts`.
    ///
    /// Only events scheduled after this call see the new values; automation
    /// already handed to the sink is left as it is. On error nothing changes.
    pub fn update(&mut self, opts: &EnvelopeOptions) -> Result<&mut Self> {
        self.config.apply(opts)?;
        debug!("updated envelope: {:?}", self.config);
        Ok(self)
    }

    /// Overwrites the parameters present in a JSON options object.
    #[cfg(feature = "json")]
    pub fn update_json(&mut self, value: &serde_json::Value) -> Result<&mut Self> {
        let opts = EnvelopeOptions::from_json(value)?;
        self.update(&opts)
    }
}
