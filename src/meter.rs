//! The activity meter: single owner of the counters and the statistics engine.

use crate::aggregator::Aggregator;
use crate::clock::{Clock, SystemClock};
use crate::config::MeterConfig;
use crate::display::DisplayLines;
use crate::error::Result;
use crate::state::{CounterSnapshot, CounterState};
use crate::statistics::{Statistics, StatisticsEngine};
use std::sync::Arc;

/// Everything produced by one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Derived statistics.
    pub statistics: Statistics,
    /// Counters as read right after the tick.
    pub counters: CounterSnapshot,
    /// Formatted lines for the display sink.
    pub lines: DisplayLines,
}

impl Frame {
    /// Build a frame, formatting the display lines.
    pub fn new(statistics: Statistics, counters: CounterSnapshot) -> Self {
        Self {
            lines: DisplayLines::new(&statistics, &counters),
            statistics,
            counters,
        }
    }
}

/// Owns the shared counters and the engine that reads them.
///
/// Producers get [`Aggregator`] handles from [`aggregator`](Self::aggregator);
/// the meter itself is the only consumer.
pub struct ActivityMeter<C: Clock = SystemClock> {
    counters: Arc<CounterState>,
    engine: StatisticsEngine<C>,
}

impl ActivityMeter<SystemClock> {
    /// Create a meter on the system clock.
    pub fn new(config: MeterConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> ActivityMeter<C> {
    /// Create a meter on a custom clock.
    pub fn with_clock(config: MeterConfig, clock: C) -> Result<Self> {
        let counters = Arc::new(CounterState::new());
        let engine = StatisticsEngine::new(counters.clone(), clock, config)?;
        Ok(Self { counters, engine })
    }

    /// A producer handle writing into this meter's counters.
    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.counters.clone())
    }

    /// Current counters.
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Statistics as of the last tick.
    pub fn statistics(&self) -> Statistics {
        self.engine.statistics()
    }

    /// The active configuration.
    pub fn config(&self) -> &MeterConfig {
        self.engine.config()
    }

    /// Run one tick of the engine and format the result.
    pub fn tick(&mut self) -> Frame {
        let statistics = self.engine.tick();
        Frame::new(statistics, self.counters.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::InputSink;
    use crate::clock::ManualClock;
    use crate::error::Error;
    use crate::event::{Button, RawInputEvent};

    #[test]
    fn test_invalid_config_rejected() {
        let result = ActivityMeter::new(MeterConfig::new().with_tick_seconds(0));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_aggregators_share_counters() {
        let clock = ManualClock::new(100);
        let mut meter = ActivityMeter::with_clock(MeterConfig::default(), clock.clone()).unwrap();

        let a = meter.aggregator();
        let b = meter.aggregator();
        a.absorb(&[RawInputEvent::button_press(Button::Left, 100)]);
        b.absorb(&[RawInputEvent::motion(6, 8, 101)]);

        clock.set(102);
        let frame = meter.tick();
        assert_eq!(frame.counters.clicks(Button::Left), 1);
        assert_eq!(frame.counters.pixels_traveled, 10);
        assert_eq!(frame.lines.pixels, "Pixels travelled: 10");
        assert_eq!(frame.statistics, meter.statistics());
    }
}
