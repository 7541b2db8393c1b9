//! DVP camera on the LCD_CAM peripheral
//!
//! The OV2640 is configured over SCCB for RGB565 at the preview resolution
//! and streams frames into one DMA buffer. [`DvpCamera`] implements
//! [`FrameSource`]: a frame is handed out once its DMA transfer is done and
//! the next capture starts when that frame is released.

use esp_hal::Blocking;
use esp_hal::delay::Delay;
use esp_hal::dma::DmaRxBuf;
use esp_hal::dma_buffers;
use esp_hal::gpio::interconnect::{PeripheralInput, PeripheralOutput};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::lcd_cam::LcdCam;
use esp_hal::lcd_cam::cam::{Camera, CameraTransfer, Config as CamConfig};
use esp_hal::peripherals::{DMA_CH0, I2C0, LCD_CAM};
use esp_hal::time::Rate;
use log::{info, warn};

use camx_pipeline::{Frame, FrameError, FrameSource, PixelFormat};

use crate::config::{
    CAMERA_RESOLUTION, CAMERA_XCLK_MHZ, FRAME_BYTES, SCCB_FREQUENCY_KHZ, SENSOR_ADDRESS,
};

/// Register bank select
const REG_BANK_SEL: u8 = 0xFF;
const BANK_DSP: u8 = 0x00;
const BANK_SENSOR: u8 = 0x01;

/// Sensor bank: COM7, bit 7 is system reset
const REG_COM7: u8 = 0x12;
const COM7_SRST: u8 = 0x80;

/// Sensor-side setup: CIF window with the clock divider for 20 MHz XCLK
const SENSOR_SETUP: &[(u8, u8)] = &[
    (REG_BANK_SEL, BANK_SENSOR),
    (0x11, 0x01), // CLKRC
    (0x12, 0x20), // COM7: CIF
    (0x17, 0x11), // HREFST
    (0x18, 0x43), // HREFEND
    (0x19, 0x00), // VSTRT
    (0x1A, 0x25), // VEND
    (0x32, 0x09), // REG32
];

/// DSP-side setup: RGB565 output scaled to 160x120
const DSP_SETUP: &[(u8, u8)] = &[
    (REG_BANK_SEL, BANK_DSP),
    (0xE0, 0x04), // RESET: DVP
    (0xDA, 0x08), // IMAGE_MODE: RGB565
    (0xD7, 0x03), // auto mode
    (0xC0, 0x2C), // HSIZE8
    (0xC1, 0x24), // VSIZE8
    (0x5A, 0x28), // ZMOW: 160 / 4
    (0x5B, 0x1E), // ZMOH: 120 / 4
    (0x5C, 0x00), // ZMHH
    (0xE0, 0x00), // RESET: release
];

#[derive(Debug)]
pub enum CameraError {
    /// SCCB write rejected by the sensor
    Sccb,
    /// LCD_CAM configuration rejected
    Config,
    /// DMA buffer could not be built or filled
    Dma,
}

/// Token for the frame currently held by the pipeline
pub struct FrameToken(());

enum Capture {
    Idle(Camera<'static>, DmaRxBuf),
    Running(CameraTransfer<'static, DmaRxBuf>),
    Ready(Camera<'static>, DmaRxBuf),
    /// Transient while a state transition moves its parts
    Empty,
}

pub struct DvpCamera {
    capture: Capture,
}

impl DvpCamera {
    /// Configure the sensor and the DVP receiver
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lcd_cam: LCD_CAM<'static>,
        dma: DMA_CH0<'static>,
        i2c: I2C0<'static>,
        sccb: (impl PeripheralOutput<'static>, impl PeripheralOutput<'static>),
        ctrl: (
            impl PeripheralOutput<'static>,
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
        ),
        data: (
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
            impl PeripheralInput<'static>,
        ),
    ) -> Result<Self, CameraError> {
        let (xclk, pclk, vsync, href) = ctrl;
        let lcd_cam = LcdCam::new(lcd_cam);
        let config = CamConfig::default().with_frequency(Rate::from_mhz(CAMERA_XCLK_MHZ));
        let camera = Camera::new(lcd_cam.cam, dma, config)
            .map_err(|_| CameraError::Config)?
            .with_master_clock(xclk)
            .with_pixel_clock(pclk)
            .with_ctrl_pins(vsync, href)
            .with_data0(data.0)
            .with_data1(data.1)
            .with_data2(data.2)
            .with_data3(data.3)
            .with_data4(data.4)
            .with_data5(data.5)
            .with_data6(data.6)
            .with_data7(data.7);

        // The sensor only answers SCCB once XCLK is running
        let (sda, scl) = sccb;
        let i2c_config = I2cConfig::default().with_frequency(Rate::from_khz(SCCB_FREQUENCY_KHZ));
        let mut sccb = I2c::new(i2c, i2c_config)
            .map_err(|_| CameraError::Sccb)?
            .with_sda(sda)
            .with_scl(scl);
        configure_sensor(&mut sccb)?;

        let (rx_buffer, rx_descriptors, _, _) = dma_buffers!(FRAME_BYTES, 0);
        let buffer = DmaRxBuf::new(rx_descriptors, rx_buffer).map_err(|_| CameraError::Dma)?;

        info!(
            "camera ready: {}x{} RGB565",
            CAMERA_RESOLUTION.width(),
            CAMERA_RESOLUTION.height()
        );
        let mut driver = Self {
            capture: Capture::Idle(camera, buffer),
        };
        driver.start();
        Ok(driver)
    }

    fn start(&mut self) {
        self.capture = match core::mem::replace(&mut self.capture, Capture::Empty) {
            Capture::Idle(camera, buffer) | Capture::Ready(camera, buffer) => {
                match camera.receive(buffer) {
                    Ok(transfer) => Capture::Running(transfer),
                    Err((e, camera, buffer)) => {
                        warn!("camera: capture not started: {:?}", e);
                        Capture::Idle(camera, buffer)
                    }
                }
            }
            other => other,
        };
    }
}

fn configure_sensor(sccb: &mut I2c<'static, Blocking>) -> Result<(), CameraError> {
    write_register(sccb, REG_BANK_SEL, BANK_SENSOR)?;
    write_register(sccb, REG_COM7, COM7_SRST)?;
    // Reset completes within 1 ms
    Delay::new().delay_millis(2);

    for &(reg, value) in SENSOR_SETUP.iter().chain(DSP_SETUP) {
        write_register(sccb, reg, value)?;
    }
    Ok(())
}

fn write_register(
    sccb: &mut I2c<'static, Blocking>,
    reg: u8,
    value: u8,
) -> Result<(), CameraError> {
    sccb.write(SENSOR_ADDRESS, &[reg, value])
        .map_err(|_| CameraError::Sccb)
}

impl FrameSource for DvpCamera {
    type Handle = FrameToken;

    fn acquire(&mut self) -> Option<FrameToken> {
        match core::mem::replace(&mut self.capture, Capture::Empty) {
            Capture::Running(transfer) if transfer.is_done() => {
                let (result, camera, buffer) = transfer.wait();
                self.capture = Capture::Ready(camera, buffer);
                match result {
                    Ok(()) => Some(FrameToken(())),
                    Err(e) => {
                        warn!("camera: frame lost: {:?}", e);
                        self.start();
                        None
                    }
                }
            }
            Capture::Idle(camera, buffer) => {
                self.capture = Capture::Idle(camera, buffer);
                self.start();
                None
            }
            other => {
                self.capture = other;
                None
            }
        }
    }

    fn frame<'a>(&'a self, _token: &'a FrameToken) -> Result<Frame<'a>, FrameError> {
        match &self.capture {
            Capture::Ready(_, buffer) => Frame::new(
                buffer.as_slice(),
                CAMERA_RESOLUTION.width(),
                CAMERA_RESOLUTION.height(),
                PixelFormat::Rgb565Be,
            ),
            _ => Err(FrameError::Empty),
        }
    }

    fn release(&mut self, _token: FrameToken) {
        self.start();
    }
}
