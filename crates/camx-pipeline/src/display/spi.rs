use embedded_hal::digital::OutputPin;
use embedded_hal_async::spi::SpiBus;

use super::DisplayBus;
use crate::error::BusError;

/// Four-wire SPI panel link: SPI bus plus a data/command select pin
///
/// Chip select is expected to be handled by the bus (or tied low). Every
/// write is flushed before returning so the D/C line never changes while
/// bytes are still shifting out.
pub struct SpiDisplayBus<SPI, DC> {
    spi: SPI,
    dc: DC,
}

impl<SPI, DC> SpiDisplayBus<SPI, DC>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
{
    pub fn new(spi: SPI, dc: DC) -> Self {
        Self { spi, dc }
    }

    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), BusError<SPI::Error, DC::Error>> {
        self.spi.write(bytes).await.map_err(BusError::Spi)?;
        self.spi.flush().await.map_err(BusError::Spi)
    }
}

impl<SPI, DC> DisplayBus for SpiDisplayBus<SPI, DC>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
{
    type Error = BusError<SPI::Error, DC::Error>;

    async fn write_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(BusError::Pin)?;
        self.write(&[command]).await
    }

    async fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(BusError::Pin)?;
        self.write(data).await
    }
}
