#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use esp_println::println;

use camx_pipeline::{FilterParams, Pipeline, PipelineStats, ScanlineRenderer};
use camx_preview::config::{BUILD_VERSION, PIPELINE};
use camx_preview::infrastructure::drivers::{DvpCamera, init_panel_bus};
use camx_preview::infrastructure::tasks::{diagnostics_task, preview_task};
use camx_preview::{camera_ctrl_pins, camera_data_pins, mk_static, sccb_pins, tft_pins};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    println!("camx-preview {}", BUILD_VERSION);

    // Initialize hardware
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Display on SPI2
    let (sclk, mosi, cs, dc) = tft_pins!(peripherals);
    let bus = match init_panel_bus(peripherals.SPI2, peripherals.DMA_CH1, sclk, mosi, cs, dc) {
        Ok(bus) => bus,
        Err(e) => halt("display", e).await,
    };

    // Camera on LCD_CAM, sensor on I2C0
    let camera = match DvpCamera::new(
        peripherals.LCD_CAM,
        peripherals.DMA_CH0,
        peripherals.I2C0,
        sccb_pins!(peripherals),
        camera_ctrl_pins!(peripherals),
        camera_data_pins!(peripherals),
    ) {
        Ok(camera) => camera,
        Err(e) => halt("camera", e).await,
    };

    // Counters and filter tuning outlive every task
    let stats: &'static PipelineStats = mk_static!(PipelineStats, PipelineStats::new());
    let params: &'static FilterParams = mk_static!(FilterParams, FilterParams::new());

    let renderer = ScanlineRenderer::new(bus, PIPELINE, stats);
    spawner
        .spawn(preview_task(Pipeline::new(camera, renderer), params))
        .ok();
    spawner.spawn(diagnostics_task(stats)).ok();

    loop {
        Timer::after(Duration::from_secs(5)).await;
    }
}

/// Park the main task after a failed bring-up
async fn halt(what: &str, error: impl core::fmt::Debug) -> ! {
    println!("{} init failed: {:?}", what, error);
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}
