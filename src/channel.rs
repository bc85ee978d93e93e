//! Channel-based event feed for producers that cannot call the aggregator directly.
//!
//! The producer pushes whole batches into a bounded channel without ever
//! blocking; a pump thread drains the channel into an [`InputSink`]. When the
//! channel is full the batch is dropped and counted, so a slow consumer can
//! never stall input delivery.
//!
//! # Example
//!
//! ```no_run
//! use actimeter::channel::event_channel;
//! use actimeter::{ActivityMeter, MeterConfig, RawInputEvent};
//!
//! let meter = ActivityMeter::new(MeterConfig::default()).unwrap();
//! let (pump, tx) = event_channel(100, meter.aggregator()).expect("Failed to start pump");
//!
//! tx.send(vec![RawInputEvent::key_down(1_700_000_000)]);
//!
//! // Stop when done
//! pump.stop().unwrap();
//! ```

use crate::aggregator::InputSink;
use crate::error::{Error, Result};
use crate::event::RawInputEvent;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often an idle pump re-checks its stop flag.
const PUMP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Write side of the event feed.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: SyncSender<Vec<RawInputEvent>>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Queue a batch without blocking.
    ///
    /// Returns `false` if the batch was dropped because the channel is full
    /// or the pump has stopped.
    pub fn send(&self, batch: Vec<RawInputEvent>) -> bool {
        match self.sender.try_send(batch) {
            Ok(()) => true,
            Err(TrySendError::Full(batch)) => {
                self.dropped.fetch_add(1, Ordering::SeqCst);
                log::warn!("event channel full, dropped batch of {} events", batch.len());
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Batches dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// Handle to control the pump thread.
///
/// The pump also stops when this handle is dropped.
pub struct PumpHandle {
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl PumpHandle {
    /// Stop the pump and wait for it to drain what is already queued.
    pub fn stop(mut self) -> Result<()> {
        self.stop_inner()
    }

    /// Check if the pump is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn stop_inner(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            handle
                .join()
                .map_err(|_| Error::ThreadError("failed to join pump thread".into()))?;
        }

        Ok(())
    }
}

impl Drop for PumpHandle {
    fn drop(&mut self) {
        let _ = self.stop_inner();
    }
}

fn pump<S: InputSink>(receiver: Receiver<Vec<RawInputEvent>>, sink: S, running: &AtomicBool) {
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(PUMP_POLL_INTERVAL) {
            Ok(batch) => sink.absorb(&batch),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Whatever was accepted before the stop still counts.
    while let Ok(batch) = receiver.try_recv() {
        sink.absorb(&batch);
    }
}

/// Start a pump that feeds batches from a bounded channel into `sink`.
///
/// # Arguments
///
/// * `capacity` - Maximum number of batches to buffer. If the buffer is full,
///   new batches are dropped to keep the producer from blocking.
pub fn event_channel<S>(capacity: usize, sink: S) -> Result<(PumpHandle, EventSender)>
where
    S: InputSink + 'static,
{
    let (sender, receiver) = mpsc::sync_channel(capacity);
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    let thread_handle = thread::Builder::new()
        .name("actimeter-pump".into())
        .spawn(move || {
            pump(receiver, sink, &running_clone);
            running_clone.store(false, Ordering::SeqCst);
        })
        .map_err(|e| Error::ResourceUnavailable(format!("pump thread: {}", e)))?;

    let handle = PumpHandle {
        running,
        thread_handle: Some(thread_handle),
    };
    let sender = EventSender {
        sender,
        dropped: Arc::new(AtomicU64::new(0)),
    };

    Ok((handle, sender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::event::Button;
    use crate::state::CounterState;
    use std::sync::Mutex;

    #[test]
    fn test_pump_feeds_aggregator() {
        let agg = Aggregator::new(Arc::new(CounterState::new()));
        let (pump, tx) = event_channel(16, agg.clone()).unwrap();

        for t in 0..10 {
            assert!(tx.send(vec![
                RawInputEvent::key_down(t),
                RawInputEvent::button_press(Button::Left, t),
            ]));
        }
        pump.stop().unwrap();

        let snap = agg.snapshot();
        assert_eq!(snap.key_presses, 10);
        assert_eq!(snap.clicks(Button::Left), 10);
        assert_eq!(snap.events_handled, 10);
        assert_eq!(tx.dropped(), 0);
    }

    #[test]
    fn test_full_channel_drops_batch() {
        let (entered_tx, entered_rx) = mpsc::channel::<()>();
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let entered_tx = Mutex::new(entered_tx);
        let gate_rx = Mutex::new(gate_rx);
        let absorbed = Arc::new(AtomicU64::new(0));
        let counted = absorbed.clone();

        let sink = move |_: &[RawInputEvent]| {
            let _ = entered_tx.lock().unwrap().send(());
            let _ = gate_rx.lock().unwrap().recv();
            counted.fetch_add(1, Ordering::SeqCst);
        };
        let (pump, tx) = event_channel(1, sink).unwrap();

        // First batch is taken by the pump, which then blocks in the sink.
        assert!(tx.send(vec![RawInputEvent::key_down(1)]));
        entered_rx.recv().unwrap();

        assert!(tx.send(vec![RawInputEvent::key_down(2)]));
        assert!(!tx.send(vec![RawInputEvent::key_down(3)]));
        assert_eq!(tx.dropped(), 1);

        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();
        pump.stop().unwrap();

        assert_eq!(absorbed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_send_after_stop() {
        let agg = Aggregator::new(Arc::new(CounterState::new()));
        let (pump, tx) = event_channel(4, agg).unwrap();
        pump.stop().unwrap();
        assert!(!tx.send(vec![RawInputEvent::key_down(1)]));
        assert_eq!(tx.dropped(), 0);
    }
}
