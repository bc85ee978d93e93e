//! Replay example - run a recorded session through a meter on a manual clock.
//!
//! Usage:
//!   cargo run --example replay --features recorder -- [recording.json]
//!
//! Without an argument a short synthetic session is recorded, saved to the
//! temp directory and replayed from there.

use actimeter::recorder::{EventRecorder, Recording};
use actimeter::{ActivityMeter, InputSink, ManualClock, MeterConfig, RawInputEvent};
use std::collections::BTreeMap;

fn synthetic_session() -> actimeter::Result<Recording> {
    let recorder = EventRecorder::new(|_: &[RawInputEvent]| {});

    // Two bursts of work with a 40 second gap between them.
    for t in (1_000..1_030).chain(1_070..1_090) {
        recorder.absorb(&[RawInputEvent::motion(12, -5, t), RawInputEvent::key_down(t)]);
    }

    Ok(recorder.into_recording()?.with_description("two bursts"))
}

fn main() -> actimeter::Result<()> {
    env_logger::init();

    let recording = match std::env::args().nth(1) {
        Some(path) => Recording::load(path)?,
        None => {
            let path = std::env::temp_dir().join("actimeter-replay.json");
            synthetic_session()?.save(&path)?;
            println!("Saved synthetic session to {}", path.display());
            Recording::load(path)?
        }
    };

    println!(
        "Replaying {} batches ({} events over {} seconds)",
        recording.batch_count(),
        recording.event_count(),
        recording.span()
    );

    // Group batches by the second they belong to.
    let mut by_second: BTreeMap<u64, Vec<&[RawInputEvent]>> = BTreeMap::new();
    for batch in &recording.batches {
        let second = batch.events.iter().map(RawInputEvent::timestamp).max().unwrap_or(0);
        by_second.entry(second).or_default().push(&batch.events);
    }
    let (Some(&first), Some(&last)) = (by_second.keys().next(), by_second.keys().next_back()) else {
        println!("Recording is empty");
        return Ok(());
    };

    let clock = ManualClock::new(first);
    let config = MeterConfig::new().with_break_length(30).with_env_overrides()?;
    let mut meter = ActivityMeter::with_clock(config, clock.clone())?;
    let input = meter.aggregator();

    for now in first..=last + 60 {
        clock.set(now);
        for events in by_second.get(&now).into_iter().flatten() {
            input.absorb(events);
        }
        let frame = meter.tick();
        if now % 10 == 0 {
            println!("t={} | {} | {} | {}", now, frame.lines.current_activity, frame.lines.current_break, frame.lines.breaks);
        }
    }

    let serial = recording.replay_serial();
    assert_eq!(serial, meter.counters());
    println!("\n{}", serial.summary());

    Ok(())
}
