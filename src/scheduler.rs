//! Periodic tick loop with abort and redraw signals.
//!
//! The loop multiplexes three wake-ups: the ticker, an abort request and a
//! redraw request. Abort wins over a tick that is due at the same moment, and
//! stops the loop within one wait cycle.
//!
//! # Example
//!
//! ```no_run
//! use actimeter::{ActivityMeter, DisplayLines, InputSink, MeterConfig, RawInputEvent};
//!
//! let meter = ActivityMeter::new(MeterConfig::default()).unwrap();
//! let handle = meter
//!     .spawn(|lines: &DisplayLines| print!("{}", lines))
//!     .expect("Failed to start meter");
//!
//! handle.aggregator().absorb(&[RawInputEvent::key_down(0)]);
//!
//! // Stop when done
//! let last = handle.stop().unwrap();
//! ```

use crate::aggregator::Aggregator;
use crate::clock::Clock;
use crate::display::DisplaySink;
use crate::error::{Error, Result};
use crate::meter::{ActivityMeter, Frame};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Out-of-band requests for a running loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Stop the loop.
    Abort,
    /// Render the last frame again without ticking.
    Redraw,
}

/// The pending timer request: when the next tick is due.
struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// First tick is due immediately, so the display starts populated.
    fn start(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    fn remaining(&self) -> Duration {
        self.next.saturating_duration_since(Instant::now())
    }

    /// Schedule the next tick, skipping any that were missed.
    fn rearm(&mut self) {
        let now = Instant::now();
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        log::debug!("ticker cancelled with {:?} remaining", self.remaining());
    }
}

impl<C: Clock> ActivityMeter<C> {
    /// Run the tick loop on the current thread until aborted.
    ///
    /// Returns the last frame rendered, if any. A closed control channel is
    /// treated as an abort.
    pub fn run_blocking<S: DisplaySink>(
        &mut self,
        sink: &mut S,
        control: &Receiver<Control>,
    ) -> Option<Frame> {
        let ticker = Ticker::start(self.config().tick_interval());
        let last = self.drive(sink, control, ticker);
        log::info!("{}", self.counters().summary());
        last
    }

    fn drive<S: DisplaySink>(
        &mut self,
        sink: &mut S,
        control: &Receiver<Control>,
        mut ticker: Ticker,
    ) -> Option<Frame> {
        let mut last: Option<Frame> = None;

        loop {
            match control.recv_timeout(ticker.remaining()) {
                Ok(Control::Abort) => {
                    log::info!("*** Break ***");
                    break;
                }
                Ok(Control::Redraw) => {
                    if let Some(frame) = &last {
                        sink.render(&frame.lines);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let frame = self.tick();
                    sink.render(&frame.lines);
                    last = Some(frame);
                    ticker.rearm();
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log::debug!("control channel closed, stopping");
                    break;
                }
            }
        }

        last
    }
}

impl<C: Clock + 'static> ActivityMeter<C> {
    /// Move the meter onto a background thread and start ticking.
    ///
    /// Fails with [`Error::ResourceUnavailable`] if the thread cannot be
    /// created; the meter then never ticks.
    pub fn spawn<S: DisplaySink + 'static>(mut self, mut sink: S) -> Result<MeterHandle> {
        let (control, rx) = mpsc::channel();
        let aggregator = self.aggregator();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let thread_handle = thread::Builder::new()
            .name("actimeter-tick".into())
            .spawn(move || {
                let last = self.run_blocking(&mut sink, &rx);
                running_clone.store(false, Ordering::SeqCst);
                last
            })
            .map_err(|e| Error::ResourceUnavailable(format!("tick thread: {}", e)))?;

        Ok(MeterHandle {
            control,
            aggregator,
            running,
            thread_handle: Some(thread_handle),
        })
    }
}

/// Handle to a meter ticking on a background thread.
///
/// The loop also stops when this handle is dropped.
pub struct MeterHandle {
    control: Sender<Control>,
    aggregator: Aggregator,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<Option<Frame>>>,
}

impl MeterHandle {
    /// A producer handle for the running meter.
    pub fn aggregator(&self) -> Aggregator {
        self.aggregator.clone()
    }

    /// Ask the loop to render its last frame again.
    pub fn redraw(&self) -> Result<()> {
        self.control
            .send(Control::Redraw)
            .map_err(|_| Error::NotRunning)
    }

    /// Check if the loop is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Abort the loop, wait for it to finish and return its last frame.
    pub fn stop(mut self) -> Result<Option<Frame>> {
        self.stop_inner()
    }

    fn stop_inner(&mut self) -> Result<Option<Frame>> {
        let Some(handle) = self.thread_handle.take() else {
            return Ok(None); // Already stopped
        };

        // The loop may have exited on its own; a failed send is fine then.
        let _ = self.control.send(Control::Abort);

        handle
            .join()
            .map_err(|_| Error::ThreadError("failed to join tick thread".into()))
    }
}

impl Drop for MeterHandle {
    fn drop(&mut self) {
        let _ = self.stop_inner();
    }
}

// ============================================================================
// Tokio async support (behind feature flag)
// ============================================================================

#[cfg(feature = "tokio")]
mod tokio_scheduler {
    use super::*;
    use std::future::Future;
    use tokio::time::{MissedTickBehavior, interval};

    impl<C: Clock> ActivityMeter<C> {
        /// Tick on a tokio interval until `shutdown` completes.
        ///
        /// Shutdown is polled first, so it wins over a tick due at the same
        /// time. Returns the last frame rendered, if any.
        ///
        /// ```ignore
        /// use actimeter::{ActivityMeter, DisplayLines, MeterConfig};
        ///
        /// #[tokio::main]
        /// async fn main() {
        ///     let mut meter = ActivityMeter::new(MeterConfig::default()).unwrap();
        ///     let mut sink = |lines: &DisplayLines| print!("{}", lines);
        ///     meter.run_until(&mut sink, tokio::time::sleep(std::time::Duration::from_secs(10))).await;
        /// }
        /// ```
        pub async fn run_until<S, F>(&mut self, sink: &mut S, shutdown: F) -> Option<Frame>
        where
            S: DisplaySink,
            F: Future<Output = ()>,
        {
            let mut ticker = interval(self.config().tick_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tokio::pin!(shutdown);

            let mut last = None;
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        log::info!("*** Break ***");
                        break;
                    }
                    _ = ticker.tick() => {
                        let frame = self.tick();
                        sink.render(&frame.lines);
                        last = Some(frame);
                    }
                }
            }

            log::info!("{}", self.counters().summary());
            last
        }
    }
}
