//! Recording and serial replay of absorbed event batches.
//!
//! Wrap any [`InputSink`] in an [`EventRecorder`] to keep a copy of every
//! batch it absorbs. The resulting [`Recording`] can be saved as JSON and
//! replayed one batch at a time into a fresh aggregator, which gives the
//! reference counters a concurrent run must match.
//!
//! # Example
//!
//! ```
//! use actimeter::recorder::EventRecorder;
//! use actimeter::{Aggregator, CounterState, InputSink, RawInputEvent};
//! use std::sync::Arc;
//!
//! let live = Aggregator::new(Arc::new(CounterState::new()));
//! let recorder = EventRecorder::new(live.clone());
//! recorder.absorb(&[RawInputEvent::key_down(10), RawInputEvent::motion(3, 4, 10)]);
//!
//! let recording = recorder.into_recording().unwrap();
//! assert_eq!(recording.replay_serial(), live.snapshot());
//! ```

use crate::aggregator::{Aggregator, InputSink};
use crate::error::{Error, Result};
use crate::event::{RawInputEvent, Seconds};
use crate::state::{CounterSnapshot, CounterState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

/// One absorbed batch and its position in the recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedBatch {
    /// Order in which the recorder saw the batch.
    pub sequence: u64,
    /// The events, in emission order.
    pub events: Vec<RawInputEvent>,
}

/// A complete recording of absorbed batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    /// Recorded batches, in sequence order.
    pub batches: Vec<RecordedBatch>,
    /// When the recording was created.
    pub created_at: SystemTime,
    /// Optional description.
    pub description: Option<String>,
}

impl Default for Recording {
    fn default() -> Self {
        Self::new()
    }
}

impl Recording {
    /// Create a new empty recording.
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
            created_at: SystemTime::now(),
            description: None,
        }
    }

    /// Set a description for this recording.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Number of batches.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Number of events across all batches.
    pub fn event_count(&self) -> usize {
        self.batches.iter().map(|b| b.events.len()).sum()
    }

    /// Seconds between the earliest and latest event timestamps.
    pub fn span(&self) -> Seconds {
        let mut stamps = self
            .batches
            .iter()
            .flat_map(|b| b.events.iter().map(RawInputEvent::timestamp));
        let Some(first) = stamps.next() else {
            return 0;
        };
        let (min, max) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        max - min
    }

    /// Save the recording to a file (JSON format).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Other(format!("Failed to serialize recording: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| Error::Other(format!("Failed to write recording file: {}", e)))?;
        Ok(())
    }

    /// Load a recording from a file (JSON format).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Other(format!("Failed to read recording file: {}", e)))?;
        let recording: Recording = serde_json::from_str(&json)
            .map_err(|e| Error::Other(format!("Failed to deserialize recording: {}", e)))?;
        Ok(recording)
    }

    /// Feed every batch, in sequence order, into `sink`.
    pub fn replay_into(&self, sink: &dyn InputSink) {
        for batch in &self.batches {
            sink.absorb(&batch.events);
        }
    }

    /// Replay into fresh counters and return them.
    pub fn replay_serial(&self) -> CounterSnapshot {
        let aggregator = Aggregator::new(Arc::new(CounterState::new()));
        self.replay_into(&aggregator);
        aggregator.snapshot()
    }
}

/// An [`InputSink`] that records each batch before passing it on.
///
/// Recording takes a lock on the producer path; use it for diagnostics and
/// tests, not in a latency-sensitive input handler.
pub struct EventRecorder<S: InputSink> {
    inner: S,
    batches: Mutex<Vec<RecordedBatch>>,
}

impl<S: InputSink> EventRecorder<S> {
    /// Wrap `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Number of batches recorded so far.
    pub fn batch_count(&self) -> usize {
        self.lock_batches().len()
    }

    fn lock_batches(&self) -> MutexGuard<'_, Vec<RecordedBatch>> {
        self.batches.lock().unwrap_or_else(|poisoned| {
            log::warn!("recorder mutex poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Finish recording.
    pub fn into_recording(self) -> Result<Recording> {
        let batches = self.batches.into_inner().unwrap_or_else(|poisoned| {
            log::warn!("recorder mutex poisoned, recovering");
            poisoned.into_inner()
        });
        Ok(Recording {
            batches,
            ..Recording::new()
        })
    }
}

impl<S: InputSink> InputSink for EventRecorder<S> {
    fn absorb(&self, events: &[RawInputEvent]) {
        if events.is_empty() {
            return;
        }

        {
            let mut batches = self.lock_batches();
            let sequence = batches.len() as u64;
            batches.push(RecordedBatch {
                sequence,
                events: events.to_vec(),
            });
        }

        self.inner.absorb(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Button;

    fn sample_batches() -> Vec<Vec<RawInputEvent>> {
        (0..50u64)
            .map(|i| {
                vec![
                    RawInputEvent::motion(i as i32, 1, 100 + i),
                    RawInputEvent::button_press(Button::Right, 100 + i),
                    RawInputEvent::key_down(100 + i),
                ]
            })
            .collect()
    }

    #[test]
    fn test_recording_counts() {
        let recorder = EventRecorder::new(|_: &[RawInputEvent]| {});
        recorder.absorb(&[]);
        for batch in sample_batches() {
            recorder.absorb(&batch);
        }
        assert_eq!(recorder.batch_count(), 50);

        let recording = recorder.into_recording().unwrap().with_description("sample");
        assert_eq!(recording.batch_count(), 50);
        assert_eq!(recording.event_count(), 150);
        assert_eq!(recording.span(), 49);
        assert_eq!(recording.description.as_deref(), Some("sample"));
        assert_eq!(Recording::new().span(), 0);
    }

    #[test]
    fn test_concurrent_run_matches_serial_replay() {
        let live = Aggregator::new(Arc::new(CounterState::new()));
        let recorder = EventRecorder::new(live.clone());
        let batches = sample_batches();

        std::thread::scope(|s| {
            for chunk in batches.chunks(10) {
                let recorder = &recorder;
                s.spawn(move || {
                    for batch in chunk {
                        recorder.absorb(batch);
                    }
                });
            }
        });

        let recording = recorder.into_recording().unwrap();
        let sequences: Vec<u64> = recording.batches.iter().map(|b| b.sequence).collect();
        assert_eq!(sequences, (0..50).collect::<Vec<_>>());
        assert_eq!(recording.replay_serial(), live.snapshot());
    }

    #[test]
    fn test_poisoned_recorder_keeps_recording() {
        let counters = Arc::new(CounterState::new());
        let recorder = EventRecorder::new(Aggregator::new(counters.clone()));

        std::thread::scope(|s| {
            let result = s
                .spawn(|| {
                    let _guard = recorder.batches.lock().unwrap();
                    panic!("sink failed while holding the lock");
                })
                .join();
            assert!(result.is_err());
        });
        assert!(recorder.batches.is_poisoned());

        recorder.absorb(&[RawInputEvent::key_down(100)]);
        assert_eq!(recorder.batch_count(), 1);
        assert_eq!(counters.snapshot().key_presses, 1);

        let recording = recorder.into_recording().unwrap();
        assert_eq!(recording.batch_count(), 1);
        assert_eq!(recording.replay_serial(), counters.snapshot());
    }

    #[test]
    fn test_save_and_load() {
        let recorder = EventRecorder::new(|_: &[RawInputEvent]| {});
        recorder.absorb(&[RawInputEvent::key_down(7), RawInputEvent::key_up(8)]);
        let recording = recorder.into_recording().unwrap();

        let path = std::env::temp_dir().join(format!("actimeter-recording-{}.json", std::process::id()));
        recording.save(&path).unwrap();
        let loaded = Recording::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.batches, recording.batches);
        assert!(Recording::load(path).is_err());
    }
}
