//! # actimeter
//!
//! An input activity meter: counts clicks, key presses and pointer travel,
//! and turns the time of the last input into "active time", "break time" and
//! "break count" figures refreshed once per tick.
//!
//! ## Features
//!
//! - Lock-free input counters safe to update from an interrupt-like producer
//! - A tick-driven break detector with a debounced break counter
//! - Independently configurable idle threshold and break length
//! - Blocking and (with `tokio`) async tick loops with prompt abort
//! - Non-blocking channel feed for event sources on other threads
//! - Batch recording and serial replay (with `recorder`)
//!
//! ## Quick Start
//!
//! ```
//! use actimeter::{ActivityMeter, InputSink, ManualClock, MeterConfig, RawInputEvent};
//!
//! let clock = ManualClock::new(1_000);
//! let mut meter = ActivityMeter::with_clock(MeterConfig::default(), clock.clone()).unwrap();
//!
//! // Producer side: any thread, any time.
//! let input = meter.aggregator();
//! input.absorb(&[RawInputEvent::motion(3, 4, 1_000), RawInputEvent::key_down(1_000)]);
//!
//! // Consumer side: once per tick.
//! clock.advance(1);
//! let frame = meter.tick();
//! assert_eq!(frame.lines.pixels, "Pixels travelled: 5");
//! assert_eq!(frame.statistics.break_count, 0);
//! ```
//!
//! ## Architecture
//!
//! The [`ActivityMeter`] owns one [`CounterState`] block (see [`state`]) and
//! the [`StatisticsEngine`] reading it. Producers hold cheap [`Aggregator`]
//! clones that write the counters through atomics, so no lock is shared with
//! the tick. The engine reads the last-activity timestamp once per tick and
//! re-derives its classification from scratch, which makes a producer update
//! landing mid-tick harmless.

pub mod aggregator;
pub mod channel;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod event;
pub mod meter;
#[cfg(feature = "recorder")]
pub mod recorder;
pub mod scheduler;
pub mod state;
pub mod statistics;

// Re-exports
pub use aggregator::{Aggregator, InputSink};
pub use channel::{EventSender, PumpHandle, event_channel};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MeterConfig;
pub use display::{DisplayLines, DisplaySink};
pub use error::{Error, Result};
pub use event::{Button, RawInputEvent, Seconds};
pub use meter::{ActivityMeter, Frame};
#[cfg(feature = "recorder")]
pub use recorder::{EventRecorder, RecordedBatch, Recording};
pub use scheduler::{Control, MeterHandle};
pub use state::{CounterSnapshot, CounterState};
pub use statistics::{Statistics, StatisticsEngine};
