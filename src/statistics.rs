//! Activity statistics and break detection: the consumer side of the meter.
//!
//! Each [`StatisticsEngine::tick`] re-classifies the user from scratch as
//! active or passive using the last input timestamp and the wall clock, so a
//! producer update that lands between two ticks is simply picked up by the
//! next one.
//!
//! # Example
//!
//! ```
//! use actimeter::{Aggregator, CounterState, InputSink, ManualClock, MeterConfig, RawInputEvent};
//! use actimeter::statistics::StatisticsEngine;
//! use std::sync::Arc;
//!
//! let counters = Arc::new(CounterState::new());
//! let clock = ManualClock::new(1_000);
//! let mut engine = StatisticsEngine::new(counters.clone(), clock.clone(), MeterConfig::default()).unwrap();
//!
//! Aggregator::new(counters).absorb(&[RawInputEvent::key_down(1_000)]);
//! clock.advance(1);
//!
//! let stats = engine.tick();
//! assert_eq!(stats.active_seconds_current, 1);
//! assert_eq!(stats.break_count, 0);
//! ```

use crate::clock::Clock;
use crate::config::MeterConfig;
use crate::error::Result;
use crate::event::Seconds;
use crate::state::CounterState;
use std::sync::Arc;

/// Derived activity figures, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    /// Wall-clock time of the first tick; `0` until then.
    pub start_time: Seconds,
    /// Time between the start and the most recent input.
    pub active_seconds_total: Seconds,
    /// Length of the current unbroken activity run.
    pub active_seconds_current: Seconds,
    /// Length of the current unbroken idle run.
    pub break_seconds_current: Seconds,
    /// All seconds classified as idle so far.
    pub break_seconds_total: Seconds,
    /// Idle runs that reached the break length.
    pub break_count: u64,
    /// Whether the current idle run has already been counted.
    pub break_registered: bool,
}

impl Statistics {
    /// Whether the last tick classified the user as passive.
    pub fn is_on_break(&self) -> bool {
        self.break_seconds_current > 0
    }
}

/// Turns the shared counters and a clock into [`Statistics`].
///
/// Owned by a single consumer; only [`tick`](Self::tick) mutates it.
pub struct StatisticsEngine<C: Clock> {
    counters: Arc<CounterState>,
    clock: C,
    config: MeterConfig,
    stats: Statistics,
}

impl<C: Clock> StatisticsEngine<C> {
    /// Create an engine reading `counters`.
    ///
    /// Fails with [`Error::InvalidConfig`](crate::Error::InvalidConfig) if
    /// `config` does not validate.
    pub fn new(counters: Arc<CounterState>, clock: C, config: MeterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            counters,
            clock,
            config,
            stats: Statistics::default(),
        })
    }

    /// The counters this engine reads.
    pub fn counters(&self) -> &Arc<CounterState> {
        &self.counters
    }

    /// The active configuration.
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// The clock this engine reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Statistics as of the last tick.
    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Advance the state machine by one tick and return the new statistics.
    ///
    /// Never blocks and never fails.
    pub fn tick(&mut self) -> Statistics {
        let now = self.clock.now();
        // Read once: the producer may move it at any time.
        let observed = self.counters.last_event_time();

        if self.stats.start_time == 0 {
            self.stats.start_time = now;
            if now != 0 {
                log::info!("activity meter started at {}", now);
            }
        }
        let start = self.stats.start_time;

        // Until the first input arrives the start itself counts as the last
        // activity, so a fresh meter is active rather than measuring idleness
        // from the epoch.
        let last_event = if observed == 0 { start } else { observed };

        self.stats.active_seconds_total = match last_event.checked_sub(start) {
            Some(secs) => secs,
            None => {
                log::debug!(
                    "last event at {} precedes start at {}, total activity held at 0",
                    last_event,
                    start
                );
                0
            }
        };

        let passive = last_event == 0
            || match now.checked_sub(last_event) {
                Some(delta) => delta > self.config.idle_threshold,
                None => {
                    log::warn!("clock at {} is behind last event at {}", now, last_event);
                    false
                }
            };

        let step = self.config.tick_seconds;
        if passive {
            let stats = &mut self.stats;
            stats.break_seconds_current = stats.break_seconds_current.saturating_add(step);
            stats.break_seconds_total = stats.break_seconds_total.saturating_add(step);
            stats.active_seconds_current = 0;
        } else {
            let stats = &mut self.stats;
            stats.active_seconds_current = stats.active_seconds_current.saturating_add(step);
            self.stats.break_seconds_current = 0;
        }

        let break_length = self.config.break_length;
        if !self.stats.break_registered && self.stats.break_seconds_current >= break_length {
            self.stats.break_count += 1;
            self.stats.break_registered = true;
            log::debug!("break #{} registered", self.stats.break_count);
        } else if self.stats.break_registered && self.stats.break_seconds_current < break_length {
            self.stats.break_registered = false;
            log::debug!("activity resumed, break cleared");
        }

        self.stats
    }
}
