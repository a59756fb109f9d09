//! Envelope values as a function of time since the last event.
//!
//! A trigger starts an attack → hold → decay → sustain timeline and a release
//! starts a release → base timeline. Each is described by a small record
//! holding where it started; the functions here evaluate either timeline at
//! an offset from its event without touching any state.

use crate::config::EnvelopeConfig;

/// Guard for the slope-preserving rescale of attack and release times.
pub(crate) const RESCALE_EPSILON: f64 = 1e-5;

/// An in-progress attack → hold → decay → sustain timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerRecord {
    /// Absolute time of the trigger
    pub when: f64,
    /// Envelope value at the moment of triggering
    pub start_value: f64,
    /// Attack duration rescaled for `start_value`
    pub attack_time: f64,
}

/// An in-progress release → base timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseRecord {
    /// Absolute time of the release
    pub when: f64,
    /// Envelope value at the moment of release
    pub start_value: f64,
    /// Release duration rescaled for `start_value`
    pub release_time: f64,
}

/// The live record of an envelope, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EnvelopeState {
    /// Never triggered, or reset
    #[default]
    Idle,
    /// Triggered and not yet released
    Triggered(TriggerRecord),
    /// Released and not yet retriggered
    Released(ReleaseRecord),
}

/// Which segment an envelope is in at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Sitting at `base` without a trigger
    Idle,
    /// Ramping towards `peak`
    Attack,
    /// Holding at `peak`
    Hold,
    /// Ramping from `peak` towards `sustain`
    Decay,
    /// Holding at `sustain` until released
    Sustain,
    /// Ramping towards `base`
    Release,
    /// Release complete, back at `base`
    Finished,
}

impl TriggerRecord {
    /// Envelope value `elapsed` seconds after this trigger, before any release.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::{EnvelopeConfig, TriggerRecord};
    ///
    /// let config = EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0);
    /// let record = TriggerRecord { when: 0.0, start_value: 0.0, attack_time: 1.0 };
    ///
    /// assert_eq!(record.value_at(&config, 0.5), 0.5);
    /// assert_eq!(record.value_at(&config, 1.0), 1.0);
    /// assert_eq!(record.value_at(&config, 2.0), 0.5);
    /// ```
    pub fn value_at(&self, config: &EnvelopeConfig, elapsed: f64) -> f64 {
        let attack = self.attack_time;
        let hold_end = attack + config.hold;
        if elapsed < attack {
            return config
                .attack_curve
                .value(self.start_value, config.peak, elapsed, attack);
        }
        if elapsed < hold_end {
            return config.peak;
        }
        if elapsed < hold_end + config.decay {
            return config
                .decay_curve
                .value(config.peak, config.sustain, elapsed - hold_end, config.decay);
        }
        config.sustain
    }

    /// Segment of the trigger timeline at `elapsed`.
    pub fn phase_at(&self, config: &EnvelopeConfig, elapsed: f64) -> Phase {
        let hold_end = self.attack_time + config.hold;
        if elapsed < self.attack_time {
            Phase::Attack
        } else if elapsed < hold_end {
            Phase::Hold
        } else if elapsed < hold_end + config.decay {
            Phase::Decay
        } else {
            Phase::Sustain
        }
    }

    /// True if `elapsed` lands on a linear attack or linear decay segment,
    /// boundaries included.
    pub(crate) fn on_linear_segment(&self, config: &EnvelopeConfig, elapsed: f64) -> bool {
        use crate::envelopes::Curve::Linear;

        let hold_end = self.attack_time + config.hold;
        let in_attack = elapsed >= 0.0 && elapsed <= self.attack_time;
        let in_decay = elapsed >= hold_end && elapsed <= hold_end + config.decay;
        (config.attack_curve == Linear && in_attack) || (config.decay_curve == Linear && in_decay)
    }
}

impl ReleaseRecord {
    /// Envelope value `elapsed` seconds after this release.
    ///
    /// Negative offsets read as `sustain`; offsets past the release time read
    /// as `base`.
    pub fn value_at(&self, config: &EnvelopeConfig, elapsed: f64) -> f64 {
        if elapsed < 0.0 {
            return config.sustain;
        }
        if elapsed > self.release_time {
            return config.base;
        }
        config
            .release_curve
            .value(self.start_value, config.base, elapsed, self.release_time)
    }

    /// Segment of the release timeline at `elapsed`.
    pub fn phase_at(&self, elapsed: f64) -> Phase {
        if elapsed > self.release_time {
            Phase::Finished
        } else {
            Phase::Release
        }
    }

    /// True if `elapsed` lands on a linear release segment, boundaries included.
    pub(crate) fn on_linear_segment(&self, config: &EnvelopeConfig, elapsed: f64) -> bool {
        config.release_curve == crate::envelopes::Curve::Linear
            && elapsed >= 0.0
            && elapsed <= self.release_time
    }
}

impl EnvelopeState {
    /// Envelope value at absolute `time` under this state.
    pub fn value_at(&self, config: &EnvelopeConfig, time: f64) -> f64 {
        match self {
            EnvelopeState::Idle => config.base,
            EnvelopeState::Triggered(t) => t.value_at(config, time - t.when),
            EnvelopeState::Released(r) => r.value_at(config, time - r.when),
        }
    }

    /// Segment at absolute `time` under this state.
    pub fn phase_at(&self, config: &EnvelopeConfig, time: f64) -> Phase {
        match self {
            EnvelopeState::Idle => Phase::Idle,
            EnvelopeState::Triggered(t) => t.phase_at(config, time - t.when),
            EnvelopeState::Released(r) => r.phase_at(time - r.when),
        }
    }
}

/// Scales `nominal` by how far `start` is from `target` relative to the full
/// `from → target` span, so a segment starting part-way keeps the slope of
/// the full one.
///
/// Falls back to `nominal` when the span is (nearly) zero.
pub(crate) fn rescale(nominal: f64, start: f64, from: f64, target: f64) -> f64 {
    if (from - target).abs() > RESCALE_EPSILON {
        nominal * (start - target) / (from - target)
    } else {
        nominal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelopes::Curve;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn config() -> EnvelopeConfig {
        EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0)
    }

    fn fresh(config: &EnvelopeConfig) -> TriggerRecord {
        TriggerRecord {
            when: 0.0,
            start_value: config.base,
            attack_time: config.attack,
        }
    }

    #[test]
    fn test_linear_trigger_timeline() {
        let config = config();
        let record = fresh(&config);
        assert_eq!(record.value_at(&config, 0.0), 0.0);
        assert!(approx_eq(record.value_at(&config, 0.25), 0.25));
        assert_eq!(record.value_at(&config, 1.0), 1.0);
        assert!(approx_eq(record.value_at(&config, 1.5), 0.75));
        assert_eq!(record.value_at(&config, 2.0), 0.5);
        assert_eq!(record.value_at(&config, 100.0), 0.5);
    }

    #[test]
    fn test_hold_sits_at_peak() {
        let config = config().with_hold(0.5);
        let record = fresh(&config);
        assert_eq!(record.value_at(&config, 1.0), 1.0);
        assert_eq!(record.value_at(&config, 1.25), 1.0);
        assert_eq!(record.phase_at(&config, 1.25), Phase::Hold);
        assert_eq!(record.value_at(&config, 1.5), 1.0);
        assert!(approx_eq(record.value_at(&config, 2.0), 0.75));
    }

    #[test]
    fn test_continuous_at_segment_boundaries() {
        for curve in [Curve::Linear, Curve::Exponential] {
            let config = config()
                .with_hold(0.3)
                .with_attack_curve(Curve::Linear)
                .with_decay_curve(curve);
            let record = fresh(&config);
            let attack_end = record.attack_time;
            let hold_end = attack_end + config.hold;
            let h = 1e-9;

            let before = record.value_at(&config, attack_end - h);
            let after = record.value_at(&config, attack_end);
            assert!((before - after).abs() < 1e-6);

            let before = record.value_at(&config, hold_end - h);
            let after = record.value_at(&config, hold_end);
            assert!((before - after).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_attack_starts_at_peak() {
        let config = EnvelopeConfig::new(0.0, 1.0, 0.5, 1.0);
        let record = fresh(&config);
        assert_eq!(record.value_at(&config, 0.0), 1.0);
        assert_eq!(record.phase_at(&config, 0.0), Phase::Decay);
    }

    #[test]
    fn test_release_timeline() {
        let config = config();
        let record = ReleaseRecord {
            when: 2.0,
            start_value: 0.5,
            release_time: 1.0,
        };
        assert_eq!(record.value_at(&config, -0.1), 0.5);
        assert_eq!(record.value_at(&config, 0.0), 0.5);
        assert!(approx_eq(record.value_at(&config, 0.5), 0.25));
        assert_eq!(record.value_at(&config, 1.0), 0.0);
        assert_eq!(record.value_at(&config, 1.1), 0.0);
        assert_eq!(record.phase_at(0.5), Phase::Release);
        assert_eq!(record.phase_at(1.1), Phase::Finished);
    }

    #[test]
    fn test_zero_release_time_reads_base() {
        let config = config();
        let record = ReleaseRecord {
            when: 0.0,
            start_value: 0.7,
            release_time: 0.0,
        };
        assert_eq!(record.value_at(&config, 0.0), 0.0);
    }

    #[test]
    fn test_linear_segment_detection() {
        let config = config().with_hold(0.5);
        let record = fresh(&config);
        assert!(record.on_linear_segment(&config, 0.0));
        assert!(record.on_linear_segment(&config, 1.0));
        assert!(!record.on_linear_segment(&config, 1.25));
        assert!(record.on_linear_segment(&config, 2.0));
        assert!(!record.on_linear_segment(&config, 2.6));

        let config = config.with_attack_curve(Curve::Exponential);
        assert!(!record.on_linear_segment(&config, 0.5));
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(2.0, 0.0, 0.0, 1.0), 2.0);
        assert!(approx_eq(rescale(2.0, 0.5, 0.0, 1.0), 1.0));
        assert_eq!(rescale(2.0, 1.0, 0.0, 1.0), 0.0);
        // degenerate span keeps the nominal duration
        assert_eq!(rescale(2.0, 0.3, 0.5, 0.5), 2.0);
    }

    #[test]
    fn test_state_dispatch() {
        let config = config();
        assert_eq!(EnvelopeState::Idle.value_at(&config, 3.0), 0.0);
        assert_eq!(EnvelopeState::Idle.phase_at(&config, 3.0), Phase::Idle);

        let state = EnvelopeState::Triggered(TriggerRecord {
            when: 10.0,
            start_value: 0.0,
            attack_time: 1.0,
        });
        assert!(approx_eq(state.value_at(&config, 10.5), 0.5));
        assert_eq!(state.phase_at(&config, 12.0), Phase::Sustain);
    }
}
