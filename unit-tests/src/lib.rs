//! Host-side doubles for the pipeline's hardware boundaries

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::Mutex;

use camx_pipeline::display::command;
use camx_pipeline::{DisplayBus, Frame, FrameError, FrameSource, Pixel, PixelFormat};
use embassy_futures::yield_now;

// -----------------------------------------------------------------------------
// Event log shared between a bus and a filter
// -----------------------------------------------------------------------------

/// Buffer lifecycle event, keyed by the buffer's address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Submit(usize),
    Complete(usize),
    Process(usize),
}

pub struct EventLog(Mutex<Vec<Event>>);

impl EventLog {
    pub const fn new() -> Self {
        Self(Mutex::new(Vec::new()))
    }

    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Display bus
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Command(u8),
    Data(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

/// Display bus that records traffic and completes data writes after
/// `latency` executor polls
#[derive(Default)]
pub struct MockBus {
    pub events: Vec<BusEvent>,
    pub latency: usize,
    /// Fail the data write with this index (0-based)
    pub fail_data_write: Option<usize>,
    /// Fail every command write
    pub fail_commands: bool,
    /// Data writes whose bytes changed while in flight
    pub corrupted: usize,
    pub log: Option<&'static EventLog>,
    data_writes: usize,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: usize) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn with_log(mut self, log: &'static EventLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn commands(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BusEvent::Command(c) => Some(*c),
                BusEvent::Data(_) => None,
            })
            .collect()
    }

    /// Parameter bytes written right after the last `command`
    pub fn params_of(&self, command: u8) -> Option<Vec<u8>> {
        let at = self
            .events
            .iter()
            .rposition(|e| *e == BusEvent::Command(command))?;
        match self.events.get(at + 1) {
            Some(BusEvent::Data(d)) => Some(d.clone()),
            _ => None,
        }
    }

    /// Every data write that followed a RAMWR, one entry per write
    pub fn pixel_writes(&self) -> Vec<Vec<Pixel>> {
        let mut writes = Vec::new();
        let mut in_ram = false;
        for event in &self.events {
            match event {
                BusEvent::Command(c) => in_ram = *c == command::RAMWR,
                BusEvent::Data(d) if in_ram => writes.push(
                    d.chunks_exact(2)
                        .map(|b| Pixel(u16::from_be_bytes([b[0], b[1]])))
                        .collect(),
                ),
                BusEvent::Data(_) => {}
            }
        }
        writes
    }

    /// Fail the data write `after` writes from now
    pub fn fail_next_data_write(&mut self, after: usize) {
        self.fail_data_write = Some(self.data_writes + after);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DisplayBus for MockBus {
    type Error = MockBusError;

    async fn write_command(&mut self, command: u8) -> Result<(), Self::Error> {
        if self.fail_commands {
            return Err(MockBusError);
        }
        self.events.push(BusEvent::Command(command));
        Ok(())
    }

    async fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let index = self.data_writes;
        self.data_writes += 1;
        if self.fail_data_write == Some(index) {
            return Err(MockBusError);
        }

        let addr = data.as_ptr() as usize;
        if let Some(log) = self.log {
            log.push(Event::Submit(addr));
        }
        let snapshot = data.to_vec();
        for _ in 0..self.latency {
            yield_now().await;
        }
        if data != snapshot.as_slice() {
            self.corrupted += 1;
        }
        if let Some(log) = self.log {
            log.push(Event::Complete(addr));
        }
        self.events.push(BusEvent::Data(snapshot));
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Frame source
// -----------------------------------------------------------------------------

/// Token for a frame handed out by [`MockSource`]
#[derive(Debug)]
pub struct MockHandle(pub u32);

/// Camera double serving the same frame every cycle
pub struct MockSource {
    data: Vec<u8>,
    width: usize,
    height: usize,
    format: PixelFormat,
    /// Cycles that report the driver busy before a frame is served
    pub busy: usize,
    pub acquired: u32,
    pub released: u32,
    live: bool,
    /// Set when a frame was acquired while another was still live
    pub overlapped: bool,
}

impl MockSource {
    pub fn new(data: Vec<u8>, width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
            busy: 0,
            acquired: 0,
            released: 0,
            live: false,
            overlapped: false,
        }
    }

    /// Serve `pixels` as a big-endian RGB565 frame, as sensors emit it
    pub fn from_pixels(pixels: &[Pixel], width: usize, height: usize) -> Self {
        let data = pixels.iter().flat_map(|p| p.0.to_be_bytes()).collect();
        Self::new(data, width, height, PixelFormat::Rgb565Be)
    }

    pub fn is_live(&self) -> bool {
        self.live
    }
}

impl FrameSource for MockSource {
    type Handle = MockHandle;

    fn acquire(&mut self) -> Option<MockHandle> {
        if self.busy > 0 {
            self.busy -= 1;
            return None;
        }
        if self.live {
            self.overlapped = true;
        }
        self.live = true;
        self.acquired += 1;
        Some(MockHandle(self.acquired))
    }

    fn frame<'a>(&'a self, _handle: &'a MockHandle) -> Result<Frame<'a>, FrameError> {
        Frame::new(&self.data, self.width, self.height, self.format)
    }

    fn release(&mut self, _handle: MockHandle) {
        self.live = false;
        self.released += 1;
    }
}

// -----------------------------------------------------------------------------
// SPI bus and data/command pin
// -----------------------------------------------------------------------------

/// SPI writes tagged with the D/C level at the time of the write
#[derive(Clone, Default)]
pub struct SpiRecord {
    pub writes: Rc<RefCell<Vec<(bool, Vec<u8>)>>>,
    pub flushes: Rc<Cell<usize>>,
    pub dc: Rc<Cell<bool>>,
}

impl SpiRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bus(&self) -> MockSpi {
        MockSpi {
            record: self.clone(),
        }
    }

    pub fn pin(&self) -> MockPin {
        MockPin {
            level: self.dc.clone(),
        }
    }

    pub fn writes(&self) -> Vec<(bool, Vec<u8>)> {
        self.writes.borrow().clone()
    }
}

pub struct MockSpi {
    record: SpiRecord,
}

impl embedded_hal_async::spi::ErrorType for MockSpi {
    type Error = Infallible;
}

impl embedded_hal_async::spi::SpiBus<u8> for MockSpi {
    async fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    async fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let dc = self.record.dc.get();
        self.record.writes.borrow_mut().push((dc, words.to_vec()));
        Ok(())
    }

    async fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        read.fill(0);
        self.write(write).await
    }

    async fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let out = words.to_vec();
        words.fill(0);
        self.write(&out).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.record.flushes.set(self.record.flushes.get() + 1);
        Ok(())
    }
}

pub struct MockPin {
    level: Rc<Cell<bool>>,
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.set(true);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Delay
// -----------------------------------------------------------------------------

/// Delay that returns at once and adds up what was requested
#[derive(Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl embedded_hal_async::delay::DelayNs for NoDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

// -----------------------------------------------------------------------------
// Test images
// -----------------------------------------------------------------------------

/// Horizontal red ramp over a vertical green ramp
pub fn gradient(width: usize, height: usize) -> Vec<Pixel> {
    (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let r = x * 255 / width.saturating_sub(1).max(1);
                let g = y * 255 / height.saturating_sub(1).max(1);
                Pixel::pack(r as u8, g as u8, 0x80)
            })
        })
        .collect()
}

/// Alternating white/black in `block x block` cells
pub fn checkerboard(width: usize, height: usize, block: usize) -> Vec<Pixel> {
    (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                if ((x / block) + (y / block)) % 2 == 0 {
                    Pixel::WHITE
                } else {
                    Pixel::BLACK
                }
            })
        })
        .collect()
}
