//! Pipeline statistics for external observation
//!
//! The renderer updates these counters; a diagnostics task can read them
//! through a shared reference without touching the renderer.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// Per-frame state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelineState {
    Uninitialized = 0,
    /// Waiting for a frame
    Idle = 1,
    /// Frame acquired, window not yet set
    FrameReady = 2,
    /// Streaming rows
    RowLoop = 3,
    /// All rows sent, frame not yet released
    FrameDone = 4,
}

impl From<u8> for PipelineState {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Idle,
            2 => Self::FrameReady,
            3 => Self::RowLoop,
            4 => Self::FrameDone,
            _ => Self::Uninitialized,
        }
    }
}

/// Lock-free pipeline counters
pub struct PipelineStats {
    /// Frames fully sent to the display
    frames: AtomicU32,
    /// Completed row transfers
    transfers: AtomicU32,
    /// Frames given up part-way
    aborted: AtomicU32,
    /// Cycles that found no frame ready
    dropped: AtomicU32,
    /// Failed display transfers
    transfer_errors: AtomicU32,
    state: AtomicU8,
}

impl PipelineStats {
    pub const fn new() -> Self {
        Self {
            frames: AtomicU32::new(0),
            transfers: AtomicU32::new(0),
            aborted: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            transfer_errors: AtomicU32::new(0),
            state: AtomicU8::new(PipelineState::Uninitialized as u8),
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn transfers(&self) -> u32 {
        self.transfers.load(Ordering::Relaxed)
    }

    pub fn aborted(&self) -> u32 {
        self.aborted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn transfer_errors(&self) -> u32 {
        self.transfer_errors.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> PipelineState {
        self.state.load(Ordering::Relaxed).into()
    }

    // === Write methods (for the renderer) ===

    pub(crate) fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transfer(&self) {
        self.transfers.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abort(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transfer_error(&self) {
        self.transfer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_state(&self, state: PipelineState) {
        self.state.store(state as u8, Ordering::Relaxed);
    }

    /// Zero all counters
    pub fn reset(&self) {
        self.frames.store(0, Ordering::Relaxed);
        self.transfers.store(0, Ordering::Relaxed);
        self.aborted.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.transfer_errors.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::from_stats(self)
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames: u32,
    pub transfers: u32,
    pub aborted: u32,
    pub dropped: u32,
    pub transfer_errors: u32,
}

impl StatsSnapshot {
    pub fn from_stats(stats: &PipelineStats) -> Self {
        Self {
            frames: stats.frames(),
            transfers: stats.transfers(),
            aborted: stats.aborted(),
            dropped: stats.dropped(),
            transfer_errors: stats.transfer_errors(),
        }
    }
}
