//! An in-memory sink that records what an envelope schedules.

use serde::{Deserialize, Serialize};

use super::AutomationSink;

/// One scheduling primitive, as received by a sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AutomationEvent {
    #[serde(rename_all = "camelCase")]
    CancelFrom { time: f64 },
    #[serde(rename_all = "camelCase")]
    SetImmediate { value: f64, time: f64 },
    #[serde(rename_all = "camelCase")]
    RampLinear { value: f64, end_time: f64 },
    #[serde(rename_all = "camelCase")]
    SmoothTo {
        value: f64,
        start_time: f64,
        time_constant: f64,
    },
}

impl AutomationEvent {
    /// Replays this event onto another sink.
    pub fn apply<S: AutomationSink + ?Sized>(&self, sink: &mut S) {
        match *self {
            AutomationEvent::CancelFrom { time } => sink.cancel_from(time),
            AutomationEvent::SetImmediate { value, time } => sink.set_immediate(value, time),
            AutomationEvent::RampLinear { value, end_time } => sink.ramp_linear(value, end_time),
            AutomationEvent::SmoothTo {
                value,
                start_time,
                time_constant,
            } => sink.smooth_to(value, start_time, time_constant),
        }
    }
}

/// A sink that keeps every primitive it receives, in order.
///
/// Its clock is whatever was last passed to [`set_now`](Self::set_now), which
/// makes it suitable for offline scheduling and for inspecting what an
/// envelope emits.
///
/// # Examples
///
/// ```
/// use adsrnode::{AutomationEvent, AutomationSink, RecordingSink};
///
/// let mut sink = RecordingSink::new();
/// sink.set_immediate(0.0, 1.0);
/// sink.ramp_linear(1.0, 2.0);
/// assert_eq!(sink.events().len(), 2);
/// assert_eq!(sink.take()[1], AutomationEvent::RampLinear { value: 1.0, end_time: 2.0 });
/// assert!(sink.events().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<AutomationEvent>,
    now: f64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose clock reads `now`.
    pub fn at(now: f64) -> Self {
        Self {
            events: Vec::new(),
            now,
        }
    }

    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&mut self) -> Vec<AutomationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl AutomationSink for RecordingSink {
    fn cancel_from(&mut self, time: f64) {
        self.events.push(AutomationEvent::CancelFrom { time });
    }

    fn set_immediate(&mut self, value: f64, time: f64) {
        self.events.push(AutomationEvent::SetImmediate { value, time });
    }

    fn ramp_linear(&mut self, value: f64, end_time: f64) {
        self.events.push(AutomationEvent::RampLinear { value, end_time });
    }

    fn smooth_to(&mut self, value: f64, start_time: f64, time_constant: f64) {
        self.events.push(AutomationEvent::SmoothTo {
            value,
            start_time,
            time_constant,
        });
    }

    fn current_time(&self) -> f64 {
        self.now
    }
}
