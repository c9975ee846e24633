//! Fork-join per-pixel mapping over strided BGRA8 buffers.
//!
//! This crate applies an independent per-pixel transform to an in-memory
//! image across a pool of workers:
//!
//! - [`ParallelPixelMapper`]: partitions rows, runs one worker per chunk,
//!   joins, and returns a fully written output or an error
//! - [`PixelBuffer`] / [`PixelSlice`] / [`PixelSliceMut`]: owned and borrowed
//!   BGRA8 storage with a row stride, validated once at construction
//! - [`partition()`] / [`Chunk`]: the row partitioning the mapper uses
//! - [`MapConfig`] / [`Parallelism`] / [`ResourceLimits`]: worker count,
//!   thread pool, and size caps
//! - [`MapError`]: buffer, limit, and worker failures
//!
//! Decoding, encoding and pixel-format conversion happen outside this crate.

#![forbid(unsafe_code)]

mod buffer;
mod config;
mod error;
mod limits;
mod mapper;
mod partition;
mod pixel;

pub use buffer::{BufferError, PixelBuffer, PixelSlice, PixelSliceMut};
pub use config::{MapConfig, Parallelism};
pub use error::{BoxError, MapError, WorkerFault};
pub use limits::{LimitExceeded, ResourceLimits};
pub use mapper::ParallelPixelMapper;
pub use partition::{Chunk, effective_workers, partition};
pub use pixel::{BYTES_PER_PIXEL, Bgra8, Pixel, identity, invert};

// Re-export for callers building pixels.
pub use rgb;
