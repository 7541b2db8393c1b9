//! Board configuration
//!
//! Pin assignment keeps the camera's parallel bus clear of the strapping
//! pins (0, 45, 46) and the octal PSRAM pins (35-37). Display and SD card
//! share one SPI bus.

use camx_pipeline::{DisplayGeometry, PipelineConfig, Resolution, TransferPolicy};
use embassy_time::Duration;

pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Panel SPI clock
pub const SPI_FREQUENCY_MHZ: u32 = 40;

/// Sensor master clock
pub const CAMERA_XCLK_MHZ: u32 = 20;
/// SCCB clock
pub const SCCB_FREQUENCY_KHZ: u32 = 100;
/// 7-bit SCCB address of the OV2640
pub const SENSOR_ADDRESS: u8 = 0x30;

pub const CAMERA_RESOLUTION: Resolution = Resolution::Qqvga;
/// RGB565 frame size for [`CAMERA_RESOLUTION`]
pub const FRAME_BYTES: usize = CAMERA_RESOLUTION.width() * CAMERA_RESOLUTION.height() * 2;

/// Widest row the preview can stage
pub const PREVIEW_WIDTH: usize = 160;

/// Preview frame pacing
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);
/// Statistics print interval
pub const DIAGNOSTICS_INTERVAL: Duration = Duration::from_secs(5);
/// Pause before bringing a degraded pipeline back up
pub const RESTART_DELAY: Duration = Duration::from_millis(500);

#[cfg(feature = "panel-redtab")]
pub const DISPLAY_GEOMETRY: DisplayGeometry = DisplayGeometry::ST7735_160X128;

#[cfg(not(feature = "panel-redtab"))]
pub const DISPLAY_GEOMETRY: DisplayGeometry = DisplayGeometry::ST7735_160X128
    .with_offsets(1, 2)
    .with_madctl(0x68);

pub const PIPELINE: PipelineConfig =
    PipelineConfig::new(DISPLAY_GEOMETRY).with_policy(TransferPolicy::Overlapped);

/// Display pins: `(sclk, mosi, cs, dc)`
#[macro_export]
macro_rules! tft_pins {
    ($p:expr) => {
        ($p.GPIO40, $p.GPIO39, $p.GPIO42, $p.GPIO2)
    };
}

/// Camera control pins: `(xclk, pclk, vsync, href)`
#[macro_export]
macro_rules! camera_ctrl_pins {
    ($p:expr) => {
        ($p.GPIO14, $p.GPIO21, $p.GPIO47, $p.GPIO48)
    };
}

/// Camera data pins D0..D7
#[macro_export]
macro_rules! camera_data_pins {
    ($p:expr) => {
        (
            $p.GPIO1, $p.GPIO6, $p.GPIO8, $p.GPIO9, $p.GPIO10, $p.GPIO11, $p.GPIO12, $p.GPIO13,
        )
    };
}

/// SCCB pins: `(sda, scl)`
#[macro_export]
macro_rules! sccb_pins {
    ($p:expr) => {
        ($p.GPIO4, $p.GPIO5)
    };
}
