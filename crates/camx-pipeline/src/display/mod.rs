//! Display transfer engine
//!
//! [`DisplayTransfer`] speaks the ST7735 command set over any
//! [`DisplayBus`]. The bus decides how bytes reach the panel; with a DMA
//! backed bus the future returned by [`DisplayTransfer::send_buffer`] stays
//! pending while the hardware reads the buffer, and the borrow it holds
//! keeps the caller from touching that buffer until the transfer completes.

mod spi;

pub use spi::SpiDisplayBus;

use embedded_hal_async::delay::DelayNs;
use log::info;

use crate::config::DisplayGeometry;
use crate::pixel::Pixel;

/// ST7735 commands
pub mod command {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
    pub const FRMCTR1: u8 = 0xB1;
    pub const FRMCTR2: u8 = 0xB2;
    pub const FRMCTR3: u8 = 0xB3;
    pub const INVCTR: u8 = 0xB4;
    pub const PWCTR1: u8 = 0xC0;
    pub const PWCTR2: u8 = 0xC1;
    pub const PWCTR3: u8 = 0xC2;
    pub const PWCTR4: u8 = 0xC3;
    pub const PWCTR5: u8 = 0xC4;
    pub const VMCTR1: u8 = 0xC5;
    pub const GMCTRP1: u8 = 0xE0;
    pub const GMCTRN1: u8 = 0xE1;
}

/// 16 bits per pixel
const COLMOD_RGB565: u8 = 0x05;

/// Panel bring-up: command, parameters, delay after in ms
const INIT_SEQUENCE: &[(u8, &[u8], u32)] = &[
    (command::SWRESET, &[], 150),
    (command::SLPOUT, &[], 500),
    (command::FRMCTR1, &[0x01, 0x2C, 0x2D], 0),
    (command::FRMCTR2, &[0x01, 0x2C, 0x2D], 0),
    (command::FRMCTR3, &[0x01, 0x2C, 0x2D, 0x01, 0x2C, 0x2D], 0),
    (command::INVCTR, &[0x07], 0),
    (command::PWCTR1, &[0xA2, 0x02, 0x84], 0),
    (command::PWCTR2, &[0xC5], 0),
    (command::PWCTR3, &[0x0A, 0x00], 0),
    (command::PWCTR4, &[0x8A, 0x2A], 0),
    (command::PWCTR5, &[0x8A, 0xEE], 0),
    (command::VMCTR1, &[0x0E], 0),
    (command::INVOFF, &[], 0),
];

const GAMMA_POSITIVE: [u8; 16] = [
    0x02, 0x1C, 0x07, 0x12, 0x37, 0x32, 0x29, 0x2D, 0x29, 0x25, 0x2B, 0x39, 0x00, 0x01, 0x03, 0x10,
];
const GAMMA_NEGATIVE: [u8; 16] = [
    0x03, 0x1D, 0x07, 0x06, 0x2E, 0x2C, 0x29, 0x2D, 0x2E, 0x2E, 0x37, 0x3F, 0x00, 0x00, 0x02, 0x10,
];

/// Pixels per bus write in [`DisplayTransfer::fill`]
const FILL_CHUNK: usize = 32;

/// Byte link to the panel
///
/// Implementations frame each call as a command or a data phase (the D/C
/// line on SPI panels). A returned future completes once the bytes are on
/// the wire.
#[allow(async_fn_in_trait)]
pub trait DisplayBus {
    type Error: core::fmt::Debug;

    /// Send one command byte
    async fn write_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Send parameter or pixel bytes
    async fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// ST7735 display engine
pub struct DisplayTransfer<B> {
    bus: B,
    geometry: DisplayGeometry,
}

impl<B: DisplayBus> DisplayTransfer<B> {
    pub fn new(bus: B, geometry: DisplayGeometry) -> Self {
        Self { bus, geometry }
    }

    pub fn geometry(&self) -> &DisplayGeometry {
        &self.geometry
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// Run the panel initialization sequence
    pub async fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), B::Error> {
        for &(cmd, params, delay_ms) in INIT_SEQUENCE {
            self.write(cmd, params).await?;
            if delay_ms > 0 {
                delay.delay_ms(delay_ms).await;
            }
        }
        self.write(command::MADCTL, &[self.geometry.madctl]).await?;
        self.write(command::COLMOD, &[COLMOD_RGB565]).await?;
        self.write(command::GMCTRP1, &GAMMA_POSITIVE).await?;
        self.write(command::GMCTRN1, &GAMMA_NEGATIVE).await?;
        self.send_command(command::NORON).await?;
        delay.delay_ms(10).await;
        self.send_command(command::DISPON).await?;
        delay.delay_ms(100).await;

        info!(
            "display ready: {}x{}",
            self.geometry.width, self.geometry.height
        );
        Ok(())
    }

    pub async fn send_command(&mut self, command: u8) -> Result<(), B::Error> {
        self.bus.write_command(command).await
    }

    pub async fn send_data(&mut self, data: &[u8]) -> Result<(), B::Error> {
        self.bus.write_data(data).await
    }

    async fn write(&mut self, command: u8, params: &[u8]) -> Result<(), B::Error> {
        self.send_command(command).await?;
        if !params.is_empty() {
            self.send_data(params).await?;
        }
        Ok(())
    }

    /// Address the inclusive rectangle `(x0, y0)..=(x1, y1)` and start a
    /// memory write
    ///
    /// Coordinates are in output space; the panel offsets are added here.
    pub async fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), B::Error> {
        let (dx, dy) = (self.geometry.x_offset, self.geometry.y_offset);
        let columns = span(x0.saturating_add(dx), x1.saturating_add(dx));
        let rows = span(y0.saturating_add(dy), y1.saturating_add(dy));
        self.write(command::CASET, &columns).await?;
        self.write(command::RASET, &rows).await?;
        self.send_command(command::RAMWR).await
    }

    /// Address the whole output area
    pub async fn set_full_window(&mut self) -> Result<(), B::Error> {
        let (w, h) = (self.geometry.width, self.geometry.height);
        self.set_window(0, 0, w.saturating_sub(1), h.saturating_sub(1))
            .await
    }

    /// Stream pixels into the current window
    ///
    /// Pixels must already be in wire order (see [`Pixel::to_wire`]).
    /// The transfer is complete when the returned future resolves.
    pub async fn send_buffer(&mut self, pixels: &[Pixel]) -> Result<(), B::Error> {
        self.bus.write_data(bytemuck::cast_slice(pixels)).await
    }

    /// Fill the inclusive rectangle with a single colour
    pub async fn fill(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Pixel,
    ) -> Result<(), B::Error> {
        self.set_window(x0, y0, x1, y1).await?;
        let width = usize::from(x1.saturating_sub(x0)) + 1;
        let height = usize::from(y1.saturating_sub(y0)) + 1;
        let mut remaining = width * height;
        let chunk = [color.to_wire(); FILL_CHUNK];
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK);
            self.send_buffer(&chunk[..n]).await?;
            remaining -= n;
        }
        Ok(())
    }

    /// Clear the whole output area
    pub async fn clear(&mut self, color: Pixel) -> Result<(), B::Error> {
        let (w, h) = (self.geometry.width, self.geometry.height);
        self.fill(0, 0, w.saturating_sub(1), h.saturating_sub(1), color)
            .await
    }
}

/// Big-endian start/end pair for CASET/RASET
const fn span(start: u16, end: u16) -> [u8; 4] {
    let [s0, s1] = start.to_be_bytes();
    let [e0, e1] = end.to_be_bytes();
    [s0, s1, e0, e1]
}
