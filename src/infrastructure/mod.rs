//! Infrastructure layer - board drivers and executor tasks
//!
//! Drivers adapt the ESP32-S3 peripherals to the pipeline's `DisplayBus` and
//! `FrameSource` seams; tasks run the pipeline and report on it.

pub mod drivers;
pub mod tasks;
pub mod types;
