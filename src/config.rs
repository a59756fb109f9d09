//! Envelope parameters and partial updates.
//!
//! [`EnvelopeConfig`] is the complete, validated parameter set an
//! [`AdsrNode`](crate::AdsrNode) schedules from. [`EnvelopeOptions`] is the
//! loose form hosts build it from: every field optional, with the four timing
//! fields required at construction and everything optional on update.

use serde::{Deserialize, Serialize};

use crate::envelopes::Curve;
use crate::error::{EnvelopeError, Result};

/// The long-lived parameter set of an envelope.
///
/// Levels (`base`, `peak`, `sustain`) are unbounded output values. Durations
/// are seconds and must be non-negative.
///
/// # Examples
///
/// ```
/// use adsrnode::{Curve, EnvelopeConfig};
///
/// let config = EnvelopeConfig::new(0.01, 0.2, 0.6, 0.5)
///     .with_hold(0.05)
///     .with_release_curve(Curve::Exponential);
/// assert_eq!(config.peak, 1.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeConfig {
    pub base: f64,
    pub attack: f64,
    pub attack_curve: Curve,
    pub peak: f64,
    pub hold: f64,
    pub decay: f64,
    pub decay_curve: Curve,
    pub sustain: f64,
    pub release: f64,
    pub release_curve: Curve,
}

impl EnvelopeConfig {
    /// Creates a config from the required fields, with `base = 0`, `peak = 1`,
    /// no hold and linear curves.
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            base: 0.0,
            attack,
            attack_curve: Curve::Linear,
            peak: 1.0,
            hold: 0.0,
            decay,
            decay_curve: Curve::Linear,
            sustain,
            release,
            release_curve: Curve::Linear,
        }
    }

    /// Builds a config from options, failing if a required field is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::{EnvelopeConfig, EnvelopeError, EnvelopeOptions};
    ///
    /// let opts = EnvelopeOptions {
    ///     attack: Some(0.1),
    ///     decay: Some(0.1),
    ///     sustain: Some(0.5),
    ///     ..Default::default()
    /// };
    /// assert_eq!(
    ///     EnvelopeConfig::from_options(&opts),
    ///     Err(EnvelopeError::MissingField("release"))
    /// );
    /// ```
    pub fn from_options(opts: &EnvelopeOptions) -> Result<Self> {
        let attack = opts.attack.ok_or(EnvelopeError::MissingField("attack"))?;
        let decay = opts.decay.ok_or(EnvelopeError::MissingField("decay"))?;
        let sustain = opts.sustain.ok_or(EnvelopeError::MissingField("sustain"))?;
        let release = opts.release.ok_or(EnvelopeError::MissingField("release"))?;

        let mut config = Self::new(attack, decay, sustain, release);
        config.merge(opts);
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON options object into a config.
    ///
    /// Keys use the camelCase names (`attackCurve`, ...). Numbers must be JSON
    /// numbers and curves must be `"linear"` or `"exponential"`.
    #[cfg(feature = "json")]
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Self::from_options(&EnvelopeOptions::from_json(value)?)
    }

    /// Overwrites every field present in `opts`.
    ///
    /// The result is validated before anything is written, so on error `self`
    /// is unchanged.
    pub fn apply(&mut self, opts: &EnvelopeOptions) -> Result<()> {
        let mut next = *self;
        next.merge(opts);
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Checks that every duration is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("attack", self.attack),
            ("hold", self.hold),
            ("decay", self.decay),
            ("release", self.release),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EnvelopeError::NegativeDuration { field, value });
            }
        }
        Ok(())
    }

    /// Sets the resting level the envelope starts from and releases to.
    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    /// Sets the level reached at the end of the attack.
    pub fn with_peak(mut self, peak: f64) -> Self {
        self.peak = peak;
        self
    }

    /// Sets how long the envelope stays at `peak` before decaying.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::EnvelopeConfig;
    ///
    /// let config = EnvelopeConfig::new(0.1, 0.2, 0.5, 0.3)
    ///     .with_peak(0.8)
    ///     .with_hold(0.05);
    /// assert_eq!(config.hold, 0.05);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn with_hold(mut self, hold: f64) -> Self {
        self.hold = hold;
        self
    }

    /// Sets the curve for the attack phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::{Curve, EnvelopeConfig};
    ///
    /// let config = EnvelopeConfig::new(0.01, 0.1, 0.7, 0.2)
    ///     .with_attack_curve(Curve::Exponential);
    /// assert_eq!(config.attack_curve, Curve::Exponential);
    /// ```
    pub fn with_attack_curve(mut self, curve: Curve) -> Self {
        self.attack_curve = curve;
        self
    }

    /// Sets the curve for the decay phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::{Curve, EnvelopeConfig};
    ///
    /// let config = EnvelopeConfig::new(0.01, 0.1, 0.7, 0.2)
    ///     .with_decay_curve(Curve::Exponential);
    /// assert_eq!(config.decay_curve, Curve::Exponential);
    /// ```
    pub fn with_decay_curve(mut self, curve: Curve) -> Self {
        self.decay_curve = curve;
        self
    }

    /// Sets the curve for the release phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::{Curve, EnvelopeConfig};
    ///
    /// let config = EnvelopeConfig::new(0.01, 0.1, 0.7, 0.2)
    ///     .with_release_curve(Curve::Exponential);
    /// assert_eq!(config.release_curve, Curve::Exponential);
    /// ```
    pub fn with_release_curve(mut self, curve: Curve) -> Self {
        self.release_curve = curve;
        self
    }

    fn merge(&mut self, opts: &EnvelopeOptions) {
        let EnvelopeOptions {
            base,
            attack,
            attack_curve,
            peak,
            hold,
            decay,
            decay_curve,
            sustain,
            release,
            release_curve,
        } = *opts;

        self.base = base.unwrap_or(self.base);
        self.attack = attack.unwrap_or(self.attack);
        self.attack_curve = attack_curve.unwrap_or(self.attack_curve);
        self.peak = peak.unwrap_or(self.peak);
        self.hold = hold.unwrap_or(self.hold);
        self.decay = decay.unwrap_or(self.decay);
        self.decay_curve = decay_curve.unwrap_or(self.decay_curve);
        self.sustain = sustain.unwrap_or(self.sustain);
        self.release = release.unwrap_or(self.release);
        self.release_curve = release_curve.unwrap_or(self.release_curve);
    }
}

/// A partial envelope configuration.
///
/// Used both to construct an [`EnvelopeConfig`] and to update one in place;
/// absent fields keep their default or previous value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvelopeOptions {
    pub base: Option<f64>,
    pub attack: Option<f64>,
    pub attack_curve: Option<Curve>,
    pub peak: Option<f64>,
    pub hold: Option<f64>,
    pub decay: Option<f64>,
    pub decay_curve: Option<Curve>,
    pub sustain: Option<f64>,
    pub release: Option<f64>,
    pub release_curve: Option<Curve>,
}

impl EnvelopeOptions {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reads options from a JSON object, checking each present field's type.
    ///
    /// Unknown keys are ignored. A non-object value carries no fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use adsrnode::{Curve, EnvelopeError, EnvelopeOptions};
    /// use serde_json::json;
    ///
    /// let opts = EnvelopeOptions::from_json(&json!({
    ///     "peak": 0.8,
    ///     "releaseCurve": "exponential",
    /// }))?;
    /// assert_eq!(opts.peak, Some(0.8));
    /// assert_eq!(opts.release_curve, Some(Curve::Exponential));
    ///
    /// let err = EnvelopeOptions::from_json(&json!({ "hold": "long" })).unwrap_err();
    /// assert_eq!(err, EnvelopeError::MissingField("hold"));
    /// # Ok::<(), EnvelopeError>(())
    /// ```
    #[cfg(feature = "json")]
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        Ok(Self {
            base: json_number(value, "base")?,
            attack: json_number(value, "attack")?,
            attack_curve: json_curve(value, "attackCurve")?,
            peak: json_number(value, "peak")?,
            hold: json_number(value, "hold")?,
            decay: json_number(value, "decay")?,
            decay_curve: json_curve(value, "decayCurve")?,
            sustain: json_number(value, "sustain")?,
            release: json_number(value, "release")?,
            release_curve: json_curve(value, "releaseCurve")?,
        })
    }
}

#[cfg(feature = "json")]
fn json_number(value: &serde_json::Value, key: &'static str) -> Result<Option<f64>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or(EnvelopeError::MissingField(key)),
    }
}

#[cfg(feature = "json")]
fn json_curve(value: &serde_json::Value, key: &'static str) -> Result<Option<Curve>> {
    match value.get(key) {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Curve::parse_field(s, key).map(Some),
        Some(other) => Err(EnvelopeError::InvalidCurve {
            field: key,
            found: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> EnvelopeOptions {
        EnvelopeOptions {
            attack: Some(1.0),
            decay: Some(1.0),
            sustain: Some(0.5),
            release: Some(1.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = EnvelopeConfig::from_options(&required()).unwrap();
        assert_eq!(config.base, 0.0);
        assert_eq!(config.peak, 1.0);
        assert_eq!(config.hold, 0.0);
        assert_eq!(config.attack_curve, Curve::Linear);
        assert_eq!(config.decay_curve, Curve::Linear);
        assert_eq!(config.release_curve, Curve::Linear);
        assert_eq!(config, EnvelopeConfig::new(1.0, 1.0, 0.5, 1.0));
    }

    #[test]
    fn test_missing_required_fields() {
        for (field, strip) in [
            ("attack", EnvelopeOptions { attack: None, ..required() }),
            ("decay", EnvelopeOptions { decay: None, ..required() }),
            ("sustain", EnvelopeOptions { sustain: None, ..required() }),
            ("release", EnvelopeOptions { release: None, ..required() }),
        ] {
            assert_eq!(
                EnvelopeConfig::from_options(&strip),
                Err(EnvelopeError::MissingField(field))
            );
        }
    }

    #[test]
    fn test_optional_fields_override_defaults() {
        let opts = EnvelopeOptions {
            base: Some(0.1),
            peak: Some(0.9),
            hold: Some(0.25),
            decay_curve: Some(Curve::Exponential),
            ..required()
        };
        let config = EnvelopeConfig::from_options(&opts).unwrap();
        assert_eq!(config.base, 0.1);
        assert_eq!(config.peak, 0.9);
        assert_eq!(config.hold, 0.25);
        assert_eq!(config.decay_curve, Curve::Exponential);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let opts = EnvelopeOptions {
            hold: Some(-0.5),
            ..required()
        };
        assert_eq!(
            EnvelopeConfig::from_options(&opts),
            Err(EnvelopeError::NegativeDuration {
                field: "hold",
                value: -0.5
            })
        );
    }

    #[test]
    fn test_non_finite_duration_rejected() {
        let config = EnvelopeConfig::new(f64::INFINITY, 1.0, 0.5, 1.0);
        assert!(matches!(
            config.validate(),
            Err(EnvelopeError::NegativeDuration { field: "attack", .. })
        ));
    }

    #[test]
    fn test_empty_update_is_identity() {
        let mut config = EnvelopeConfig::new(0.3, 0.2, 0.4, 0.7)
            .with_peak(2.0)
            .with_attack_curve(Curve::Exponential);
        let before = config;
        config.apply(&EnvelopeOptions::default()).unwrap();
        assert_eq!(config, before);
        assert!(EnvelopeOptions::default().is_empty());
    }

    #[test]
    fn test_partial_update() {
        let mut config = EnvelopeConfig::new(0.3, 0.2, 0.4, 0.7);
        config
            .apply(&EnvelopeOptions {
                sustain: Some(0.8),
                release_curve: Some(Curve::Exponential),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.sustain, 0.8);
        assert_eq!(config.release_curve, Curve::Exponential);
        assert_eq!(config.attack, 0.3);
        assert_eq!(config.release, 0.7);
    }

    #[test]
    fn test_failed_update_leaves_config_untouched() {
        let mut config = EnvelopeConfig::new(0.3, 0.2, 0.4, 0.7);
        let before = config;
        let result = config.apply(&EnvelopeOptions {
            peak: Some(3.0),
            decay: Some(-1.0),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(config, before);
    }

    #[test]
    fn test_levels_may_coincide() {
        let config = EnvelopeConfig::new(0.1, 0.1, 0.0, 0.1).with_peak(0.0);
        assert!(config.validate().is_ok());
    }

    #[cfg(feature = "json")]
    mod json {
        use super::*;
        use serde_json::json;

        #[test]
        fn test_from_json() {
            let config = EnvelopeConfig::from_json(&json!({
                "attack": 0.01,
                "attackCurve": "exponential",
                "decay": 0.3,
                "sustain": 0.4,
                "release": 1,
            }))
            .unwrap();
            assert_eq!(config.attack, 0.01);
            assert_eq!(config.attack_curve, Curve::Exponential);
            assert_eq!(config.release, 1.0);
            assert_eq!(config.peak, 1.0);
        }

        #[test]
        fn test_wrong_type_is_reported_as_missing() {
            let err = EnvelopeConfig::from_json(&json!({
                "attack": "fast",
                "decay": 0.3,
                "sustain": 0.4,
                "release": 1,
            }))
            .unwrap_err();
            assert_eq!(err, EnvelopeError::MissingField("attack"));
        }

        #[test]
        fn test_null_is_not_absent() {
            let err = EnvelopeOptions::from_json(&json!({ "base": null })).unwrap_err();
            assert_eq!(err, EnvelopeError::MissingField("base"));
        }

        #[test]
        fn test_invalid_curve() {
            let err = EnvelopeOptions::from_json(&json!({ "decayCurve": "log" })).unwrap_err();
            assert_eq!(
                err,
                EnvelopeError::InvalidCurve {
                    field: "decayCurve",
                    found: "\"log\"".to_string()
                }
            );

            let err = EnvelopeOptions::from_json(&json!({ "releaseCurve": 2 })).unwrap_err();
            assert!(matches!(
                err,
                EnvelopeError::InvalidCurve { field: "releaseCurve", .. }
            ));
        }

        #[test]
        fn test_unknown_keys_ignored() {
            let opts = EnvelopeOptions::from_json(&json!({ "velocity": 0.3 })).unwrap();
            assert!(opts.is_empty());
        }

        #[test]
        fn test_serde_round_trip_uses_camel_case() {
            let config =
                EnvelopeConfig::new(0.1, 0.2, 0.3, 0.4).with_decay_curve(Curve::Exponential);
            let value = serde_json::to_value(config).unwrap();
            assert_eq!(value["decayCurve"], json!("exponential"));
            let back: EnvelopeConfig = serde_json::from_value(value).unwrap();
            assert_eq!(back, config);
        }
    }
}
