//! The automation timeline an envelope is scheduled onto.
//!
//! The envelope never produces samples itself. It describes its curve as a
//! short list of scheduling primitives on a host-owned parameter (an audio
//! gain, a filter cutoff, a UI tween) and leaves realizing them to the host.

mod emit;
mod recording;

pub use emit::SMOOTHING_TIME_CONSTANT;
pub(crate) use emit::{approach, cancel, curve_to, sample_until, set_immediate};
pub use recording::{AutomationEvent, RecordingSink};

/// A parameter timeline that accepts scheduled value changes.
///
/// Times are absolute seconds on the host's monotonic timeline. Calls arrive
/// in the order they should be applied; a ramp starts from whatever value the
/// previously scheduled event leaves the parameter at.
pub trait AutomationSink {
    /// Discards every scheduled event at or after `time`.
    fn cancel_from(&mut self, time: f64);

    /// Jumps to `value` exactly at `time`.
    fn set_immediate(&mut self, value: f64, time: f64);

    /// Interpolates linearly from the previous event, arriving at `value` at `end_time`.
    fn ramp_linear(&mut self, value: f64, end_time: f64);

    /// Approaches `value` exponentially from `start_time` with the given time constant.
    fn smooth_to(&mut self, value: f64, start_time: f64, time_constant: f64);

    /// The host's current time, used when an event is scheduled without an
    /// explicit time.
    fn current_time(&self) -> f64;
}

impl<S: AutomationSink + ?Sized> AutomationSink for &mut S {
    fn cancel_from(&mut self, time: f64) {
        (**self).cancel_from(time);
    }

    fn set_immediate(&mut self, value: f64, time: f64) {
        (**self).set_immediate(value, time);
    }

    fn ramp_linear(&mut self, value: f64, end_time: f64) {
        (**self).ramp_linear(value, end_time);
    }

    fn smooth_to(&mut self, value: f64, start_time: f64, time_constant: f64) {
        (**self).smooth_to(value, start_time, time_constant);
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }
}

impl<S: AutomationSink + ?Sized> AutomationSink for Box<S> {
    fn cancel_from(&mut self, time: f64) {
        (**self).cancel_from(time);
    }

    fn set_immediate(&mut self, value: f64, time: f64) {
        (**self).set_immediate(value, time);
    }

    fn ramp_linear(&mut self, value: f64, end_time: f64) {
        (**self).ramp_linear(value, end_time);
    }

    fn smooth_to(&mut self, value: f64, start_time: f64, time_constant: f64) {
        (**self).smooth_to(value, start_time, time_constant);
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }
}
