//! Simulated input - feed synthetic mouse and keyboard activity into a meter.
//!
//! Usage:
//!   RUST_LOG=debug cargo run --example simulated
//!
//! The fake user works for a while, then wanders off. Tune the thresholds with
//! ACTIMETER_IDLE_THRESHOLD / ACTIMETER_BREAK_LENGTH. Press Ctrl+C to stop.

use actimeter::{ActivityMeter, Button, Clock, DisplayLines, MeterConfig, RawInputEvent, SystemClock, event_channel};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Tiny linear congruential generator, enough to make the fake user jittery.
struct Jitter(u64);

impl Jitter {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn main() -> actimeter::Result<()> {
    env_logger::init();

    let config = MeterConfig::new()
        .with_break_length(15)
        .with_env_overrides()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    // Handle Ctrl+C
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        println!("\nStopping...");
    })
    .expect("Error setting Ctrl-C handler");

    let meter = ActivityMeter::new(config)?;
    let (pump, tx) = event_channel(64, meter.aggregator())?;
    let handle = meter.spawn(|lines: &DisplayLines| {
        println!("----------------");
        print!("{}", lines);
    })?;

    println!("Simulating a user: 10s of work, then 20s away, repeated.");
    println!("Press Ctrl+C to stop.\n");

    let mut jitter = Jitter(0x5eed);
    let mut elapsed = 0u64;
    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(250));
        elapsed += 250;

        let working = (elapsed / 1_000) % 30 < 10;
        if !working {
            continue;
        }

        let now = SystemClock.now();
        let mut batch = vec![RawInputEvent::motion(
            jitter.next(40) as i32 - 20,
            jitter.next(40) as i32 - 20,
            now,
        )];
        if jitter.next(4) == 0 {
            batch.push(RawInputEvent::key_down(now));
            batch.push(RawInputEvent::key_up(now));
        }
        if jitter.next(10) == 0 {
            let button = Button::from_number(jitter.next(5) as u8 + 1).unwrap_or(Button::Left);
            batch.push(RawInputEvent::button_press(button, now));
            batch.push(RawInputEvent::button_release(button, now));
        }
        tx.send(batch);
    }

    pump.stop()?;
    if let Some(frame) = handle.stop()? {
        println!("\nFinal:\n{}", frame.lines);
        println!("{}", frame.counters.summary());
    }

    Ok(())
}
