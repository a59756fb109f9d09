//! Translation of envelope segments into sink primitives.

use log::trace;

use super::AutomationSink;
use crate::envelopes::{Curve, EXP_FACTOR};

/// Time constant of the short smoothing step used to land on a new start
/// value without a click.
pub const SMOOTHING_TIME_CONSTANT: f64 = 0.001;

pub(crate) fn cancel<S: AutomationSink + ?Sized>(sink: &mut S, time: f64) {
    trace!("cancel_from({time})");
    sink.cancel_from(time);
}

pub(crate) fn set_immediate<S: AutomationSink + ?Sized>(sink: &mut S, value: f64, time: f64) {
    trace!("set_immediate({value}, {time})");
    sink.set_immediate(value, time);
}

/// Schedules a segment towards `value` that starts at `start` and lasts `duration`.
///
/// Linear curves, and any segment with no duration, become a linear ramp ending
/// at `start + duration`. Exponential curves become a smoothing step with a
/// time constant of `duration / EXP_FACTOR`.
pub(crate) fn curve_to<S: AutomationSink + ?Sized>(
    sink: &mut S,
    curve: Curve,
    value: f64,
    start: f64,
    duration: f64,
) {
    if curve == Curve::Linear || duration <= 0.0 {
        trace!("ramp_linear({value}, {})", start + duration);
        sink.ramp_linear(value, start + duration);
    } else {
        trace!("smooth_to({value}, {start}, {})", duration / EXP_FACTOR);
        sink.smooth_to(value, start, duration / EXP_FACTOR);
    }
}

/// Lands the parameter on `value` at `when` after earlier automation was cancelled.
///
/// When the interrupted segment was a linear ramp, the ramp is closed off at
/// exactly `value`; otherwise a very short smoothing step glides there.
pub(crate) fn approach<S: AutomationSink + ?Sized>(
    sink: &mut S,
    value: f64,
    when: f64,
    interrupted_linear: bool,
) {
    if interrupted_linear {
        trace!("ramp_linear({value}, {when})");
        sink.ramp_linear(value, when);
    } else {
        trace!("smooth_to({value}, {when}, {SMOOTHING_TIME_CONSTANT})");
        sink.smooth_to(value, when, SMOOTHING_TIME_CONSTANT);
    }
}

/// Writes `value_at(t)` as immediate value-sets at `when + t` for
/// `t = 0, interval, 2 * interval, ...`.
///
/// Stops after the first offset for which `done(t)` holds, that sample
/// included. `interval` must be positive.
pub(crate) fn sample_until<S, V, D>(
    sink: &mut S,
    when: f64,
    interval: f64,
    mut value_at: V,
    mut done: D,
) where
    S: AutomationSink + ?Sized,
    V: FnMut(f64) -> f64,
    D: FnMut(f64) -> bool,
{
    let mut step: u64 = 0;
    loop {
        let t = step as f64 * interval;
        set_immediate(sink, value_at(t), when + t);
        if done(t) {
            break;
        }
        step += 1;
    }
}
