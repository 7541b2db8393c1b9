use embassy_time::Ticker;
use esp_println::println;

use camx_pipeline::{PipelineState, PipelineStats};

use crate::config::DIAGNOSTICS_INTERVAL;

/// Print pipeline counters and the frame rate over the last interval
#[embassy_executor::task]
pub async fn diagnostics_task(stats: &'static PipelineStats) {
    let mut ticker = Ticker::every(DIAGNOSTICS_INTERVAL);
    let mut last_frames = 0;

    loop {
        ticker.next().await;
        let snapshot = stats.snapshot();
        let rendered = snapshot.frames.wrapping_sub(last_frames);
        last_frames = snapshot.frames;

        let fps_x10 = u64::from(rendered) * 10_000 / DIAGNOSTICS_INTERVAL.as_millis().max(1);
        println!(
            "diag: {}.{} fps, frames={} rows={} aborted={} dropped={} bus_errors={}",
            fps_x10 / 10,
            fps_x10 % 10,
            snapshot.frames,
            snapshot.transfers,
            snapshot.aborted,
            snapshot.dropped,
            snapshot.transfer_errors,
        );
        if stats.state() == PipelineState::Uninitialized {
            println!("diag: pipeline is down");
        }
    }
}
