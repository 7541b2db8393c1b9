//! Error types for the preview pipeline
//!
//! The enum a failure arrives in tells the caller how to react:
//! [`InitError`] is fatal and keeps the pipeline from starting,
//! [`RenderError`] costs one frame, and [`ChainError`] reports a
//! rejected call on the filter chain.

use core::fmt;

/// Chunk buffer reservation and access errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkError {
    /// Requested row width is zero
    ZeroWidth,
    /// Requested row width exceeds the compile-time capacity
    TooWide { requested: usize, capacity: usize },
    /// Buffer used before `init` or after `deinit`
    NotReserved,
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkError::ZeroWidth => write!(f, "Chunk width is zero"),
            ChunkError::TooWide {
                requested,
                capacity,
            } => write!(
                f,
                "Chunk width {} exceeds capacity {}",
                requested, capacity
            ),
            ChunkError::NotReserved => write!(f, "Chunk buffer not reserved"),
        }
    }
}

/// Frame descriptor validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Width or height is zero
    Empty,
    /// Byte length cannot hold `width * height` pixels
    TooShort { needed: usize, len: usize },
    /// Frame is encoded and has no pixel layout
    Compressed,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Empty => write!(f, "Frame has no pixels"),
            FrameError::TooShort { needed, len } => {
                write!(f, "Frame needs {} bytes, got {}", needed, len)
            }
            FrameError::Compressed => write!(f, "Frame is compressed"),
        }
    }
}

/// Filter chain errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// Chain is at capacity
    Full,
    /// A filter with this name is already registered
    Duplicate,
    /// Buffer is shorter than `width * height` or the geometry is empty
    BufferTooSmall,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Full => write!(f, "Filter chain is full"),
            ChainError::Duplicate => write!(f, "Filter name already registered"),
            ChainError::BufferTooSmall => write!(f, "Buffer too small"),
        }
    }
}

/// Fatal pipeline start-up errors
#[derive(Debug)]
pub enum InitError<E> {
    /// Working memory could not be reserved
    Chunk(ChunkError),
    /// Display bus failed during panel bring-up
    Display(E),
}

impl<E: fmt::Debug> fmt::Display for InitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Chunk(e) => write!(f, "Chunk buffer error: {}", e),
            InitError::Display(e) => write!(f, "Display init error: {:?}", e),
        }
    }
}

impl<E> From<ChunkError> for InitError<E> {
    fn from(e: ChunkError) -> Self {
        InitError::Chunk(e)
    }
}

/// Per-frame errors; the frame is dropped and the loop continues
#[derive(Debug)]
pub enum RenderError<E> {
    /// Pipeline not initialized
    NotInitialized,
    /// Frame cannot be rendered
    Frame(FrameError),
    /// Chunk buffer unavailable
    Chunk(ChunkError),
    /// Filter chain rejected the row
    Chain(ChainError),
    /// Display transfer failed
    Transfer(E),
}

impl<E: fmt::Debug> fmt::Display for RenderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => write!(f, "Pipeline not initialized"),
            RenderError::Frame(e) => write!(f, "Frame error: {}", e),
            RenderError::Chunk(e) => write!(f, "Chunk buffer error: {}", e),
            RenderError::Chain(e) => write!(f, "Filter chain error: {}", e),
            RenderError::Transfer(e) => write!(f, "Transfer error: {:?}", e),
        }
    }
}

impl<E> From<FrameError> for RenderError<E> {
    fn from(e: FrameError) -> Self {
        RenderError::Frame(e)
    }
}

impl<E> From<ChunkError> for RenderError<E> {
    fn from(e: ChunkError) -> Self {
        RenderError::Chunk(e)
    }
}

impl<E> From<ChainError> for RenderError<E> {
    fn from(e: ChainError) -> Self {
        RenderError::Chain(e)
    }
}

/// SPI display bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError<S, P> {
    /// SPI transfer failed
    Spi(S),
    /// Data/command pin could not be driven
    Pin(P),
}

impl<S: fmt::Debug, P: fmt::Debug> fmt::Display for BusError<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::Spi(e) => write!(f, "SPI error: {:?}", e),
            BusError::Pin(e) => write!(f, "DC pin error: {:?}", e),
        }
    }
}
