//! Async meter example - tick on a tokio interval until Ctrl+C.
//!
//! Usage:
//!   cargo run --example async_meter --features tokio
//!
//! Nothing feeds input here, so after the idle threshold the meter counts
//! break time. Press Ctrl+C to stop.

use actimeter::{ActivityMeter, DisplayLines, MeterConfig};
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> actimeter::Result<()> {
    env_logger::init();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut stop_tx = Some(stop_tx);

    // Handle Ctrl+C
    ctrlc::set_handler(move || {
        if let Some(tx) = stop_tx.take() {
            let _ = tx.send(());
        }
    })
    .expect("Error setting Ctrl-C handler");

    let mut meter = ActivityMeter::new(MeterConfig::default().with_env_overrides()?)?;
    let mut sink = |lines: &DisplayLines| {
        println!("{} | {} | {}", lines.current_activity, lines.current_break, lines.breaks);
    };

    let shutdown = async {
        let _ = stop_rx.await;
    };
    if let Some(frame) = meter.run_until(&mut sink, shutdown).await {
        println!("\nFinal:\n{}", frame.lines);
    }

    Ok(())
}
