#![no_std]

//! Camera preview pipeline
//!
//! Architecture layers:
//! - `pixel` - RGB565 codec ([`Pixel`])
//! - `filter` - Fixed-point filters and the [`Filter`] enum
//! - `chain` - Ordered, bounded [`FilterChain`]
//! - `chunk` - Double-buffered scanline [`ChunkBuffer`]
//! - `frame` - Frame descriptors and the [`FrameSource`] trait
//! - `display` - ST7735 [`DisplayTransfer`] over a [`DisplayBus`]
//! - `pipeline` - Scanline orchestrator ([`ScanlineRenderer`], [`Pipeline`])
//! - `state` - Counters for external observation
//!
//! The pipeline is generic over `DisplayBus` and `FrameSource`, so the same
//! code drives the ESP32-S3 peripherals and host-side mocks.

pub mod chain;
pub mod chunk;
pub mod config;
pub mod display;
pub mod downscale;
pub mod error;
pub mod filter;
pub mod frame;
pub mod math8;
pub mod pipeline;
pub mod pixel;
pub mod presets;
pub mod state;

// Codec exports
pub use pixel::{Pixel, Rgb};

// Filter exports
pub use chain::{FilterChain, FilterMode, MAX_FILTERS};
pub use filter::{Filter, FilterId, FilterParams, Surface};

// Pipeline exports
pub use chunk::ChunkBuffer;
pub use config::{DisplayGeometry, PipelineConfig, TransferPolicy};
pub use display::{DisplayBus, DisplayTransfer, SpiDisplayBus};
pub use frame::{Frame, FrameSource, PixelFormat, Resolution};
pub use pipeline::{FilterSelect, FrameOutcome, Pipeline, ScanlineRenderer};

// Error exports
pub use error::{BusError, ChainError, ChunkError, FrameError, InitError, RenderError};

// State exports
pub use state::{PipelineState, PipelineStats, StatsSnapshot};
