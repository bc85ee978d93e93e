//! Input aggregation: the producer side of the meter.

use crate::event::{RawInputEvent, motion_distance};
use crate::state::{CounterSnapshot, CounterState};
use std::sync::Arc;

/// Trait for anything that absorbs batches of raw input events.
///
/// Called from the event source's context, which may preempt the tick at
/// any point. Implementations must not block.
pub trait InputSink: Send + Sync {
    /// Absorb one batch of events, in emission order.
    fn absorb(&self, events: &[RawInputEvent]);
}

/// Implement InputSink for closures.
impl<F> InputSink for F
where
    F: Fn(&[RawInputEvent]) + Send + Sync,
{
    fn absorb(&self, events: &[RawInputEvent]) {
        self(events);
    }
}

/// Folds raw input events into the shared [`CounterState`].
///
/// Cheap to clone; every clone writes the same counters.
#[derive(Debug, Clone)]
pub struct Aggregator {
    counters: Arc<CounterState>,
}

impl Aggregator {
    /// Create an aggregator writing into `counters`.
    pub fn new(counters: Arc<CounterState>) -> Self {
        Self { counters }
    }

    /// The counters this aggregator writes.
    pub fn counters(&self) -> &Arc<CounterState> {
        &self.counters
    }

    /// Copy the current counters out.
    pub fn snapshot(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    fn absorb_one(&self, event: &RawInputEvent) {
        match *event {
            RawInputEvent::PointerMotion { dx, dy, timestamp } => {
                self.counters.add_pixels(motion_distance(dx, dy));
                self.counters.touch(timestamp);
            }
            RawInputEvent::ButtonPress { button, .. } => {
                self.counters.add_button_press(button);
            }
            RawInputEvent::KeyDown { timestamp } => {
                self.counters.add_key_press();
                self.counters.touch(timestamp);
            }
            RawInputEvent::ButtonRelease { .. } | RawInputEvent::KeyUp { .. } => {}
        }
    }
}

impl InputSink for Aggregator {
    fn absorb(&self, events: &[RawInputEvent]) {
        if events.is_empty() {
            return;
        }

        self.counters.add_event_batch();

        for event in events {
            self.absorb_one(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Button;
    use std::sync::Mutex;

    fn aggregator() -> Aggregator {
        Aggregator::new(Arc::new(CounterState::new()))
    }

    #[test]
    fn test_button_press_counts_only_that_button() {
        let agg = aggregator();
        agg.absorb(&[
            RawInputEvent::button_press(Button::Middle, 10),
            RawInputEvent::button_release(Button::Middle, 10),
            RawInputEvent::button_press(Button::Middle, 11),
            RawInputEvent::button_press(Button::Fourth, 11),
        ]);

        let snap = agg.snapshot();
        assert_eq!(snap.clicks(Button::Middle), 2);
        assert_eq!(snap.clicks(Button::Fourth), 1);
        assert_eq!(snap.clicks(Button::Left), 0);
        assert_eq!(snap.clicks(Button::Right), 0);
        assert_eq!(snap.clicks(Button::Fifth), 0);
        // Button events are not idle-detection activity.
        assert_eq!(snap.last_event_time, 0);
    }

    #[test]
    fn test_pixels_accumulate_per_event() {
        let agg = aggregator();
        // Back and forth: net displacement is zero, travelled distance is not.
        agg.absorb(&[
            RawInputEvent::motion(3, 4, 1),
            RawInputEvent::motion(-3, -4, 1),
            RawInputEvent::motion(1, 1, 2),
            RawInputEvent::motion(1, 1, 2),
        ]);

        // 5 + 5 + round(1.414) + round(1.414)
        assert_eq!(agg.snapshot().pixels_traveled, 12);
    }

    #[test]
    fn test_key_down_counts_and_touches() {
        let agg = aggregator();
        agg.absorb(&[
            RawInputEvent::key_down(50),
            RawInputEvent::key_up(51),
            RawInputEvent::key_down(52),
        ]);

        let snap = agg.snapshot();
        assert_eq!(snap.key_presses, 2);
        assert_eq!(snap.last_event_time, 52);
    }

    #[test]
    fn test_events_handled_once_per_batch() {
        let agg = aggregator();
        agg.absorb(&[RawInputEvent::key_down(1), RawInputEvent::key_down(2)]);
        agg.absorb(&[RawInputEvent::key_up(3)]);
        assert_eq!(agg.snapshot().events_handled, 2);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let agg = aggregator();
        agg.absorb(&[]);
        assert_eq!(agg.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn test_stale_batch_keeps_latest_timestamp() {
        let agg = aggregator();
        agg.absorb(&[RawInputEvent::motion(1, 0, 200)]);
        agg.absorb(&[RawInputEvent::key_down(150)]);

        let snap = agg.snapshot();
        assert_eq!(snap.last_event_time, 200);
        assert_eq!(snap.key_presses, 1);
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(0usize);
        let sink = |events: &[RawInputEvent]| {
            *seen.lock().unwrap() += events.len();
        };
        sink.absorb(&[RawInputEvent::key_down(1), RawInputEvent::key_up(1)]);
        assert_eq!(*seen.lock().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_absorb_loses_nothing() {
        let agg = aggregator();
        let batch = [
            RawInputEvent::motion(3, 4, 10),
            RawInputEvent::button_press(Button::Left, 10),
            RawInputEvent::button_press(Button::Right, 10),
            RawInputEvent::key_down(11),
        ];

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        agg.absorb(&batch);
                    }
                });
            }
        });

        let snap = agg.snapshot();
        assert_eq!(snap.pixels_traveled, 8 * 1000 * 5);
        assert_eq!(snap.key_presses, 8 * 1000);
        assert_eq!(snap.clicks(Button::Left), 8 * 1000);
        assert_eq!(snap.clicks(Button::Right), 8 * 1000);
        assert_eq!(snap.events_handled, 8 * 1000);
        assert_eq!(snap.last_event_time, 11);
    }
}
