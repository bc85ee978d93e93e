//! Display formatting: turns a tick's figures into the six lines shown to the user.
//!
//! Everything here is pure. Each call returns freshly owned strings, so the
//! formatters are safe to call from any thread, any number of times.

use crate::event::{Button, Seconds};
use crate::state::CounterSnapshot;
use crate::statistics::Statistics;
use std::fmt;

/// Split seconds into whole minutes and remaining seconds.
pub fn minutes_seconds(secs: Seconds) -> (Seconds, Seconds) {
    (secs / 60, secs % 60)
}

/// Format seconds as `"M min S secs"`.
pub fn format_duration(secs: Seconds) -> String {
    let (minutes, seconds) = minutes_seconds(secs);
    format!("{} min {} secs", minutes, seconds)
}

/// `"Pixels travelled: N"`.
pub fn pixels_line(counters: &CounterSnapshot) -> String {
    format!("Pixels travelled: {}", counters.pixels_traveled)
}

/// `"Activity time: M min S secs"` for the current run.
pub fn current_activity_line(stats: &Statistics) -> String {
    format!("Activity time: {}", format_duration(stats.active_seconds_current))
}

/// `"Total activity: M min S secs"`.
pub fn total_activity_line(stats: &Statistics) -> String {
    format!("Total activity: {}", format_duration(stats.active_seconds_total))
}

/// `"Break time: M min S secs"` for the current idle run.
pub fn current_break_line(stats: &Statistics) -> String {
    format!("Break time: {}", format_duration(stats.break_seconds_current))
}

/// `"Total breaks: N"`.
pub fn breaks_line(stats: &Statistics) -> String {
    format!("Total breaks: {}", stats.break_count)
}

/// Per-button clicks followed by the key count.
pub fn input_counters_line(counters: &CounterSnapshot) -> String {
    let buttons = Button::ALL
        .iter()
        .map(|b| format!("{}: {}", b.label(), counters.clicks(*b)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}, Keys: {}", buttons, counters.key_presses)
}

/// The six strings refreshed on every tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayLines {
    /// Pointer distance.
    pub pixels: String,
    /// Current activity run.
    pub current_activity: String,
    /// Total activity.
    pub total_activity: String,
    /// Current break run.
    pub current_break: String,
    /// Number of breaks.
    pub breaks: String,
    /// Button and key counters.
    pub input_counters: String,
}

impl DisplayLines {
    /// Format one tick's worth of figures.
    pub fn new(stats: &Statistics, counters: &CounterSnapshot) -> Self {
        Self {
            pixels: pixels_line(counters),
            current_activity: current_activity_line(stats),
            total_activity: total_activity_line(stats),
            current_break: current_break_line(stats),
            breaks: breaks_line(stats),
            input_counters: input_counters_line(counters),
        }
    }

    /// The lines in display order.
    pub fn as_array(&self) -> [&str; 6] {
        [
            self.pixels.as_str(),
            self.current_activity.as_str(),
            self.total_activity.as_str(),
            self.current_break.as_str(),
            self.breaks.as_str(),
            self.input_counters.as_str(),
        ]
    }
}

impl fmt::Display for DisplayLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.as_array() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Consumer of the per-tick display lines.
///
/// Rendering has no effect on meter state.
pub trait DisplaySink: Send {
    /// Show the latest lines.
    fn render(&mut self, lines: &DisplayLines);
}

/// Implement DisplaySink for closures.
impl<F> DisplaySink for F
where
    F: FnMut(&DisplayLines) + Send,
{
    fn render(&mut self, lines: &DisplayLines) {
        self(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_seconds() {
        assert_eq!(minutes_seconds(0), (0, 0));
        assert_eq!(minutes_seconds(59), (0, 59));
        assert_eq!(minutes_seconds(60), (1, 0));
        assert_eq!(minutes_seconds(3_725), (62, 5));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(125), "2 min 5 secs");
    }

    #[test]
    fn test_display_lines() {
        let stats = Statistics {
            start_time: 1_000,
            active_seconds_total: 61,
            active_seconds_current: 0,
            break_seconds_current: 301,
            break_seconds_total: 400,
            break_count: 2,
            break_registered: true,
        };
        let counters = CounterSnapshot {
            button_counts: [3, 1, 4, 0, 2],
            pixels_traveled: 1_234,
            key_presses: 56,
            events_handled: 9,
            last_event_time: 1_061,
        };

        let lines = DisplayLines::new(&stats, &counters);
        assert_eq!(
            lines.as_array(),
            [
                "Pixels travelled: 1234",
                "Activity time: 0 min 0 secs",
                "Total activity: 1 min 1 secs",
                "Break time: 5 min 1 secs",
                "Total breaks: 2",
                "LMB: 3, MMB: 1, RMB: 4, 4th: 0, 5th: 2, Keys: 56",
            ]
        );
        assert_eq!(lines.to_string().lines().count(), 6);
    }

    #[test]
    fn test_formatters_return_independent_strings() {
        let mut stats = Statistics::default();
        let first = breaks_line(&stats);
        stats.break_count = 7;
        let second = breaks_line(&stats);
        assert_eq!(first, "Total breaks: 0");
        assert_eq!(second, "Total breaks: 7");
    }

    #[test]
    fn test_closure_sink() {
        let mut rendered = Vec::new();
        {
            let mut sink = |lines: &DisplayLines| rendered.push(lines.breaks.clone());
            sink.render(&DisplayLines::default());
        }
        assert_eq!(rendered, vec![String::new()]);
    }
}
