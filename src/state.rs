//! Shared counter state written by the input producer and read by the tick.
//!
//! Every field is its own atomic, so the producer can run between any two
//! instructions of the consumer without tearing a counter or losing an
//! increment. Fields are independent; no ordering is promised between, say,
//! `pixels_traveled` and a button count.

use crate::event::{Button, Seconds};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic input counters shared between the aggregator and the engine.
///
/// Allocated zeroed when the meter is built and never reset while running.
#[derive(Debug, Default)]
pub struct CounterState {
    button_counts: [AtomicU64; 5],
    pixels_traveled: AtomicU64,
    key_presses: AtomicU64,
    events_handled: AtomicU64,
    last_event_time: AtomicU64,
}

impl CounterState {
    /// Create a zeroed counter block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one press of `button`.
    #[inline]
    pub fn add_button_press(&self, button: Button) {
        self.button_counts[button.index()].fetch_add(1, Ordering::SeqCst);
    }

    /// Add travelled pixels.
    #[inline]
    pub fn add_pixels(&self, pixels: u64) {
        self.pixels_traveled.fetch_add(pixels, Ordering::SeqCst);
    }

    /// Count one key press.
    #[inline]
    pub fn add_key_press(&self) {
        self.key_presses.fetch_add(1, Ordering::SeqCst);
    }

    /// Count one aggregator invocation.
    #[inline]
    pub fn add_event_batch(&self) {
        self.events_handled.fetch_add(1, Ordering::SeqCst);
    }

    /// Record activity at `timestamp`.
    ///
    /// Batches carry no cross-batch ordering guarantee, so a stale timestamp
    /// never moves the value backwards.
    #[inline]
    pub fn touch(&self, timestamp: Seconds) {
        self.last_event_time.fetch_max(timestamp, Ordering::SeqCst);
    }

    /// Clicks counted for `button`.
    #[inline]
    pub fn button_count(&self, button: Button) -> u64 {
        self.button_counts[button.index()].load(Ordering::SeqCst)
    }

    /// Cumulative pointer distance.
    #[inline]
    pub fn pixels_traveled(&self) -> u64 {
        self.pixels_traveled.load(Ordering::SeqCst)
    }

    /// Key presses counted so far.
    #[inline]
    pub fn key_presses(&self) -> u64 {
        self.key_presses.load(Ordering::SeqCst)
    }

    /// Number of non-empty batches absorbed.
    #[inline]
    pub fn events_handled(&self) -> u64 {
        self.events_handled.load(Ordering::SeqCst)
    }

    /// Timestamp of the most recent activity, `0` if none yet.
    #[inline]
    pub fn last_event_time(&self) -> Seconds {
        self.last_event_time.load(Ordering::SeqCst)
    }

    /// Copy every counter out.
    ///
    /// Each field is read exactly once; fields are not mutually consistent.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            button_counts: Button::ALL.map(|b| self.button_count(b)),
            pixels_traveled: self.pixels_traveled(),
            key_presses: self.key_presses(),
            events_handled: self.events_handled(),
            last_event_time: self.last_event_time(),
        }
    }
}

/// Plain copy of [`CounterState`] at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Clicks per button, indexed by [`Button::index`].
    pub button_counts: [u64; 5],
    /// Cumulative pointer distance in pixels.
    pub pixels_traveled: u64,
    /// Key presses.
    pub key_presses: u64,
    /// Non-empty batches absorbed.
    pub events_handled: u64,
    /// Most recent activity timestamp, `0` if none.
    pub last_event_time: Seconds,
}

impl CounterSnapshot {
    /// Clicks for one button.
    pub fn clicks(&self, button: Button) -> u64 {
        self.button_counts[button.index()]
    }

    /// Clicks across all buttons.
    pub fn total_clicks(&self) -> u64 {
        self.button_counts.iter().sum()
    }

    /// One-line summary, printed when the meter shuts down.
    pub fn summary(&self) -> String {
        format!(
            "Stats: left {}, middle {}, right {}, 4th {}, 5th {}. Distance {} pixels, called {} times, keys {}",
            self.clicks(Button::Left),
            self.clicks(Button::Middle),
            self.clicks(Button::Right),
            self.clicks(Button::Fourth),
            self.clicks(Button::Fifth),
            self.pixels_traveled,
            self.events_handled,
            self.key_presses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_zeroed() {
        let state = CounterState::new();
        assert_eq!(state.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn test_button_counters_are_independent() {
        let state = CounterState::new();
        state.add_button_press(Button::Right);
        state.add_button_press(Button::Right);
        state.add_button_press(Button::Fifth);

        let snap = state.snapshot();
        assert_eq!(snap.clicks(Button::Right), 2);
        assert_eq!(snap.clicks(Button::Fifth), 1);
        assert_eq!(snap.clicks(Button::Left), 0);
        assert_eq!(snap.total_clicks(), 3);
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let state = CounterState::new();
        state.touch(100);
        state.touch(90);
        assert_eq!(state.last_event_time(), 100);
        state.touch(101);
        assert_eq!(state.last_event_time(), 101);
    }

    #[test]
    fn test_summary() {
        let state = CounterState::new();
        state.add_button_press(Button::Left);
        state.add_pixels(12);
        state.add_key_press();
        state.add_event_batch();

        assert_eq!(
            state.snapshot().summary(),
            "Stats: left 1, middle 0, right 0, 4th 0, 5th 0. Distance 12 pixels, called 1 times, keys 1"
        );
    }
}
