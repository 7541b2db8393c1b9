//! Pipeline configuration, fixed when the pipeline is built

/// Output area of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    /// Output width in pixels
    pub width: u16,
    /// Output height in pixels
    pub height: u16,
    /// Column of the first visible pixel in controller memory
    pub x_offset: u16,
    /// Row of the first visible pixel in controller memory
    pub y_offset: u16,
    /// MADCTL byte (rotation, mirroring, RGB/BGR order)
    pub madctl: u8,
}

impl DisplayGeometry {
    /// 160x128 ST7735 in landscape
    pub const ST7735_160X128: DisplayGeometry = DisplayGeometry {
        width: 160,
        height: 128,
        x_offset: 0,
        y_offset: 0,
        madctl: 0x60,
    };

    pub const fn with_offsets(mut self, x_offset: u16, y_offset: u16) -> Self {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        self
    }

    pub const fn with_madctl(mut self, madctl: u8) -> Self {
        self.madctl = madctl;
        self
    }

    pub const fn width(&self) -> usize {
        self.width as usize
    }

    pub const fn height(&self) -> usize {
        self.height as usize
    }
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self::ST7735_160X128
    }
}

/// How a row transfer is ordered against preparing the next row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferPolicy {
    /// Prepare row `y + 1` while row `y` is on the bus
    #[default]
    Overlapped,
    /// Prepare, send and wait, one row at a time
    Synchronous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    pub geometry: DisplayGeometry,
    pub policy: TransferPolicy,
}

impl PipelineConfig {
    pub const fn new(geometry: DisplayGeometry) -> Self {
        Self {
            geometry,
            policy: TransferPolicy::Overlapped,
        }
    }

    pub const fn with_policy(mut self, policy: TransferPolicy) -> Self {
        self.policy = policy;
        self
    }
}
