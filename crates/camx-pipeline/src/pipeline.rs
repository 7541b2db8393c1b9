//! Scanline pipeline orchestrator
//!
//! For every output row the renderer picks a source row, resamples it into
//! a chunk slot, filters the slot in place, converts it to wire order and
//! streams it to the display:
//!
//! ```text
//! Idle -> FrameReady -> RowLoop -> FrameDone -> Idle
//! ```
//!
//! With [`TransferPolicy::Overlapped`] row `y` is on the bus while row
//! `y + 1` is prepared in the other slot. Both slots come from
//! [`ChunkBuffer::split`] as disjoint borrows and the transfer future holds
//! one of them, so the slot in flight cannot be written until its transfer
//! has completed.

use embassy_futures::join::join;
use embedded_hal_async::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::chain::{FilterChain, MAX_FILTERS};
use crate::chunk::ChunkBuffer;
use crate::config::{PipelineConfig, TransferPolicy};
use crate::display::{DisplayBus, DisplayTransfer};
use crate::downscale::{downscale_row, source_row, vertical_scale};
use crate::error::{ChainError, FrameError, InitError, RenderError};
use crate::filter::{Band, Filter};
use crate::frame::{Frame, FrameSource};
use crate::pixel::{self, Pixel};
use crate::state::{PipelineState, PipelineStats, StatsSnapshot};

/// Consecutive aborted frames after which the renderer reports itself degraded
pub const DEGRADED_AFTER: u32 = 5;

/// Which filters run on each row
#[derive(Debug, Clone, Copy)]
pub enum FilterSelect<'f> {
    /// Send rows unfiltered
    None,
    /// Run the renderer's filter chain
    Chain,
    /// Run one filter instead of the chain
    Single(Filter<'f>),
}

/// Result of one camera cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was rendered and released
    Rendered,
    /// The camera had nothing ready; try again next tick
    NoFrame,
}

/// Row renderer - owns the chunk buffer, filter chain and display engine
pub struct ScanlineRenderer<'a, B, const W: usize, const N: usize = MAX_FILTERS> {
    chunk: ChunkBuffer<W>,
    chain: FilterChain<'a, W, N>,
    display: DisplayTransfer<B>,
    config: PipelineConfig,
    stats: &'a PipelineStats,
    consecutive_errors: u32,
}

impl<'a, B, const W: usize, const N: usize> ScanlineRenderer<'a, B, W, N>
where
    B: DisplayBus,
{
    pub fn new(bus: B, config: PipelineConfig, stats: &'a PipelineStats) -> Self {
        Self {
            chunk: ChunkBuffer::new(),
            chain: FilterChain::new(),
            display: DisplayTransfer::new(bus, config.geometry),
            config,
            stats,
            consecutive_errors: 0,
        }
    }

    /// Reserve the chunk buffer and bring up the panel
    ///
    /// Nothing is rendered until this succeeds. A failed panel bring-up
    /// releases the chunk reservation again.
    pub async fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), InitError<B::Error>> {
        let width = self.config.geometry.width();
        if let Err(e) = self.chunk.init(width) {
            error!("pipeline init failed: {}", e);
            return Err(InitError::Chunk(e));
        }
        if let Err(e) = self.display.init(delay).await {
            self.chunk.deinit();
            error!("pipeline init failed: display {:?}", e);
            return Err(InitError::Display(e));
        }

        self.stats.reset();
        self.consecutive_errors = 0;
        self.stats.set_state(PipelineState::Idle);
        info!(
            "pipeline ready: {}x{}, {:?} transfers",
            width, self.config.geometry.height, self.config.policy
        );
        Ok(())
    }

    /// Release the chunk buffer
    ///
    /// Transfers never outlive [`process_frame`](Self::process_frame), so no
    /// DMA can still be reading the slots at this point.
    pub fn deinit(&mut self) {
        self.chunk.deinit();
        self.stats.set_state(PipelineState::Uninitialized);
        info!("pipeline stopped");
    }

    pub fn is_initialized(&self) -> bool {
        self.chunk.is_reserved()
    }

    /// Check if enough frames in a row failed that the application should
    /// consider restarting the pipeline
    pub fn is_degraded(&self) -> bool {
        self.consecutive_errors >= DEGRADED_AFTER
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn state(&self) -> PipelineState {
        self.stats.state()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn chain(&self) -> &FilterChain<'a, W, N> {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut FilterChain<'a, W, N> {
        &mut self.chain
    }

    pub fn display_mut(&mut self) -> &mut DisplayTransfer<B> {
        &mut self.display
    }

    /// Render `frame` to the full output area
    ///
    /// A failure aborts this frame only; it is counted and logged and the
    /// renderer stays usable. Returns in the `Idle` state either way.
    pub async fn process_frame(
        &mut self,
        frame: &Frame<'_>,
        select: FilterSelect<'_>,
    ) -> Result<(), RenderError<B::Error>> {
        let result = self.render_frame(frame, select).await;
        if self.chunk.is_reserved() {
            self.stats.set_state(PipelineState::Idle);
        }
        result
    }

    /// Render and stop in `FrameDone`; the caller releases the frame
    async fn render_frame(
        &mut self,
        frame: &Frame<'_>,
        select: FilterSelect<'_>,
    ) -> Result<(), RenderError<B::Error>> {
        if !self.chunk.is_reserved() {
            return Err(RenderError::NotInitialized);
        }
        self.stats.set_state(PipelineState::FrameReady);
        let result = self.render(frame, &select).await;
        self.finish(result)
    }

    fn finish(
        &mut self,
        result: Result<(), RenderError<B::Error>>,
    ) -> Result<(), RenderError<B::Error>> {
        match &result {
            Ok(()) => {
                self.stats.record_frame();
                self.stats.set_state(PipelineState::FrameDone);
                self.consecutive_errors = 0;
            }
            Err(e) => {
                if matches!(e, RenderError::Transfer(_)) {
                    self.stats.record_transfer_error();
                }
                self.stats.record_abort();
                self.stats.set_state(PipelineState::Idle);
                self.consecutive_errors = self.consecutive_errors.saturating_add(1);
                warn!("frame aborted: {}", e);
                if self.consecutive_errors == DEGRADED_AFTER {
                    error!("pipeline degraded: {} frames failed in a row", DEGRADED_AFTER);
                }
            }
        }
        result
    }

    async fn render(
        &mut self,
        frame: &Frame<'_>,
        select: &FilterSelect<'_>,
    ) -> Result<(), RenderError<B::Error>> {
        if frame.format().is_compressed() {
            return Err(FrameError::Compressed.into());
        }
        let Self {
            chunk,
            chain,
            display,
            config,
            stats,
            ..
        } = self;
        let height = config.geometry.height();
        if height == 0 {
            return Ok(());
        }
        let rows = RowPlan {
            frame,
            y_scale: vertical_scale(frame.height(), height),
            height,
            select,
        };

        display
            .set_full_window()
            .await
            .map_err(RenderError::Transfer)?;
        stats.set_state(PipelineState::RowLoop);

        match config.policy {
            TransferPolicy::Synchronous => {
                for y in 0..height {
                    let slot = chunk.process_buffer()?;
                    rows.prepare(y, chain, slot)?;
                    display
                        .send_buffer(slot)
                        .await
                        .map_err(RenderError::Transfer)?;
                    stats.record_transfer();
                }
            }
            TransferPolicy::Overlapped => {
                let (mut front, mut back) = chunk.split()?;
                rows.prepare(0, chain, front)?;
                for y in 1..height {
                    let in_flight: &[Pixel] = front;
                    let filling: &mut [Pixel] = back;
                    let (sent, prepared) = join(
                        display.send_buffer(in_flight),
                        async { rows.prepare(y, chain, filling) },
                    )
                    .await;
                    sent.map_err(RenderError::Transfer)?;
                    stats.record_transfer();
                    prepared?;
                    core::mem::swap(&mut front, &mut back);
                }
                display
                    .send_buffer(front)
                    .await
                    .map_err(RenderError::Transfer)?;
                stats.record_transfer();
            }
        }
        debug!("frame sent: {} rows", height);
        Ok(())
    }
}

/// Per-frame row mapping
struct RowPlan<'r, 'f> {
    frame: &'r Frame<'f>,
    y_scale: u32,
    height: usize,
    select: &'r FilterSelect<'r>,
}

impl RowPlan<'_, '_> {
    /// Fill `slot` with output row `y`, filtered and in wire order
    fn prepare<const W: usize, const N: usize>(
        &self,
        y: usize,
        chain: &mut FilterChain<'_, W, N>,
        slot: &mut [Pixel],
    ) -> Result<(), RowError> {
        let sy = source_row(y, self.y_scale, self.frame.height());
        let row = self
            .frame
            .row(sy)
            .ok_or(RowError::Frame(FrameError::Compressed))?;
        downscale_row(&row, slot);

        let band = Band::row(y, self.height);
        let width = slot.len();
        match self.select {
            FilterSelect::None => Ok(()),
            FilterSelect::Chain => chain.process_band(slot, width, 1, band),
            FilterSelect::Single(filter) => chain.apply_single(filter, slot, width, 1, band),
        }
        .map_err(RowError::Chain)?;

        pixel::to_wire(slot);
        Ok(())
    }
}

/// Failure while preparing a row, before anything reaches the bus
enum RowError {
    Frame(FrameError),
    Chain(ChainError),
}

impl<E> From<RowError> for RenderError<E> {
    fn from(e: RowError) -> Self {
        match e {
            RowError::Frame(e) => Self::Frame(e),
            RowError::Chain(e) => Self::Chain(e),
        }
    }
}

/// Camera-fed pipeline: acquire, render, release
pub struct Pipeline<'a, S, B, const W: usize, const N: usize = MAX_FILTERS> {
    source: S,
    renderer: ScanlineRenderer<'a, B, W, N>,
}

impl<'a, S, B, const W: usize, const N: usize> Pipeline<'a, S, B, W, N>
where
    S: FrameSource,
    B: DisplayBus,
{
    pub fn new(source: S, renderer: ScanlineRenderer<'a, B, W, N>) -> Self {
        Self { source, renderer }
    }

    pub async fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), InitError<B::Error>> {
        self.renderer.init(delay).await
    }

    pub fn deinit(&mut self) {
        self.renderer.deinit();
    }

    /// Run one camera cycle
    ///
    /// No frame ready is not an error. An acquired frame is always released,
    /// whether or not it rendered.
    pub async fn process_camera_frame(
        &mut self,
        select: FilterSelect<'_>,
    ) -> Result<FrameOutcome, RenderError<B::Error>> {
        if !self.renderer.is_initialized() {
            return Err(RenderError::NotInitialized);
        }
        let Some(handle) = self.source.acquire() else {
            self.renderer.stats.record_dropped();
            return Ok(FrameOutcome::NoFrame);
        };

        let result = match self.source.frame(&handle) {
            Ok(frame) => self.renderer.render_frame(&frame, select).await,
            Err(e) => self.renderer.finish(Err(e.into())),
        };

        self.source.release(handle);
        self.renderer.stats.set_state(PipelineState::Idle);
        result.map(|()| FrameOutcome::Rendered)
    }

    pub fn renderer(&self) -> &ScanlineRenderer<'a, B, W, N> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut ScanlineRenderer<'a, B, W, N> {
        &mut self.renderer
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.renderer.stats()
    }

    /// Split back into the frame source and the renderer
    pub fn release(self) -> (S, ScanlineRenderer<'a, B, W, N>) {
        (self.source, self.renderer)
    }
}
