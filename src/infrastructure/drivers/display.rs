use esp_hal::Async;
use esp_hal::dma::{DmaBufError, DmaRxBuf, DmaTxBuf};
use esp_hal::dma_buffers;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::gpio::{Level, Output, OutputConfig, OutputPin};
use esp_hal::peripherals::{DMA_CH1, SPI2};
use esp_hal::spi::Mode;
use esp_hal::spi::master::{Config, ConfigError, Spi, SpiDmaBus};
use esp_hal::time::Rate;

use camx_pipeline::SpiDisplayBus;

use crate::config::SPI_FREQUENCY_MHZ;

/// DMA staging size; one preview row is 320 bytes
const DMA_BUFFER_SIZE: usize = 4096;

pub type PanelSpi = SpiDmaBus<'static, Async>;
pub type PanelBus = SpiDisplayBus<PanelSpi, Output<'static>>;

#[derive(Debug)]
pub enum PanelBusError {
    Dma(DmaBufError),
    Spi(ConfigError),
}

/// Build the panel link on SPI2 with DMA
///
/// Chip select is driven by the SPI peripheral; D/C is a plain output that
/// starts high (data).
pub fn init_panel_bus(
    spi: SPI2<'static>,
    dma: DMA_CH1<'static>,
    sclk: impl PeripheralOutput<'static>,
    mosi: impl PeripheralOutput<'static>,
    cs: impl PeripheralOutput<'static>,
    dc: impl OutputPin + 'static,
) -> Result<PanelBus, PanelBusError> {
    let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(32, DMA_BUFFER_SIZE);
    let dma_rx = DmaRxBuf::new(rx_descriptors, rx_buffer).map_err(PanelBusError::Dma)?;
    let dma_tx = DmaTxBuf::new(tx_descriptors, tx_buffer).map_err(PanelBusError::Dma)?;

    let config = Config::default()
        .with_frequency(Rate::from_mhz(SPI_FREQUENCY_MHZ))
        .with_mode(Mode::_0);
    let spi = Spi::new(spi, config)
        .map_err(PanelBusError::Spi)?
        .with_sck(sclk)
        .with_mosi(mosi)
        .with_cs(cs)
        .with_dma(dma)
        .with_buffers(dma_rx, dma_tx)
        .into_async();

    let dc = Output::new(dc, Level::High, OutputConfig::default());
    Ok(SpiDisplayBus::new(spi, dc))
}
