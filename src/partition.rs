//! Row partitioning for fork-join dispatch.
//!
//! [`partition()`] splits `[0, height)` into contiguous, disjoint [`Chunk`]s,
//! one per worker. Every chunk but the last holds `height / workers` rows;
//! the last also takes the `height % workers` remainder rows.

use core::fmt;
use core::ops::Range;

/// A contiguous range of rows `[start_y, end_y)` handled by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Worker index, `0..chunk_count`.
    pub index: usize,
    /// First row (inclusive).
    pub start_y: u32,
    /// Last row (exclusive).
    pub end_y: u32,
}

impl Chunk {
    /// Number of rows in this chunk.
    #[inline]
    pub const fn rows(&self) -> u32 {
        self.end_y - self.start_y
    }

    /// Whether row `y` belongs to this chunk.
    #[inline]
    pub const fn contains(&self, y: u32) -> bool {
        y >= self.start_y && y < self.end_y
    }

    /// Row range as a `Range<u32>`.
    #[inline]
    pub fn row_range(&self) -> Range<u32> {
        self.start_y..self.end_y
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunk {} (rows {}..{})",
            self.index, self.start_y, self.end_y
        )
    }
}

/// Number of workers that will actually receive rows: `min(workers, height)`,
/// bounded below at 1 for non-empty images.
#[inline]
pub fn effective_workers(height: u32, workers: usize) -> usize {
    if height == 0 {
        return 0;
    }
    workers.clamp(1, height as usize)
}

/// Partition `[0, height)` into at most `workers` contiguous chunks.
///
/// `workers` of 0 is treated as 1. When `height < workers` the worker count
/// is clamped to `height` so every chunk holds at least one row. An empty
/// image yields no chunks.
pub fn partition(height: u32, workers: usize) -> Vec<Chunk> {
    let count = effective_workers(height, workers);
    if count == 0 {
        return Vec::new();
    }
    // count <= height, so it fits in u32.
    let count_u32 = count as u32;
    let rows_per_worker = height / count_u32;
    (0..count_u32)
        .map(|i| {
            let start_y = i * rows_per_worker;
            let end_y = if i + 1 == count_u32 {
                height
            } else {
                start_y + rows_per_worker
            };
            Chunk {
                index: i as usize,
                start_y,
                end_y,
            }
        })
        .collect()
}
