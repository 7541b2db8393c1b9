use embassy_time::{Delay, Ticker, Timer};
use esp_println::println;
use log::{error, warn};

use camx_pipeline::{FilterParams, FilterSelect, presets};

use crate::config::{FRAME_INTERVAL, RESTART_DELAY};
use crate::infrastructure::types::PreviewPipeline;

/// Camera-to-display preview loop
///
/// Registers the retro look tuned by `params`, then renders one frame per
/// tick. A pipeline that keeps failing is torn down and brought up again.
#[embassy_executor::task]
pub async fn preview_task(mut pipeline: PreviewPipeline, params: &'static FilterParams) {
    let chain = pipeline.renderer_mut().chain_mut();
    if let Err(e) = presets::register_retro(chain, params) {
        warn!("preview: filters not registered: {}", e);
    }

    if let Err(e) = pipeline.init(&mut Delay).await {
        error!("preview: init failed: {}", e);
        return;
    }
    println!("preview: running");

    let mut ticker = Ticker::every(FRAME_INTERVAL);
    loop {
        ticker.next().await;
        if pipeline.process_camera_frame(FilterSelect::Chain).await.is_ok() {
            continue;
        }
        if !pipeline.renderer().is_degraded() {
            continue;
        }

        println!("preview: restarting degraded pipeline");
        pipeline.deinit();
        Timer::after(RESTART_DELAY).await;
        if let Err(e) = pipeline.init(&mut Delay).await {
            error!("preview: restart failed: {}", e);
            Timer::after(RESTART_DELAY).await;
        }
    }
}
