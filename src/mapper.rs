//! Fork-join per-pixel mapping.
//!
//! A map call validates its buffers and limits, partitions the rows with
//! [`partition()`](crate::partition), hands each worker a disjoint mutable
//! band of the output, and joins every worker before returning. Workers
//! share the input read-only and never touch each other's rows, so no
//! locking is involved.

use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::MapConfig;
use crate::buffer::{BufferError, PixelBuffer, PixelSlice, PixelSliceMut};
use crate::error::{BoxError, MapError, WorkerFault};
use crate::partition::{Chunk, partition};
use crate::pixel::Pixel;

/// Applies a per-pixel transform to a BGRA8 image across a pool of workers.
///
/// # Example
///
/// ```
/// use zenmap::{MapConfig, ParallelPixelMapper, PixelBuffer, invert};
/// use zenmap::rgb::Rgba;
///
/// let input = PixelBuffer::filled(2, 2, Rgba::new(100, 150, 200, 255)).unwrap();
/// let mapper = ParallelPixelMapper::new(MapConfig::new().with_workers(2));
/// let output = mapper.map(&input.as_slice(), invert).unwrap();
/// assert_eq!(output.pixel(1, 1), Some(Rgba::new(155, 105, 55, 255)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ParallelPixelMapper {
    config: MapConfig,
}

impl ParallelPixelMapper {
    /// Create a mapper with the given configuration.
    pub fn new(config: MapConfig) -> Self {
        Self { config }
    }

    /// The mapper's configuration.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Worker count requested per call, before clamping to the image height.
    pub fn parallelism(&self) -> usize {
        self.config
            .parallelism()
            .resolve(self.config.thread_pool())
    }

    /// Map every pixel of `input` into a newly allocated buffer with the
    /// same width, height and stride. Row padding in the output is zeroed.
    ///
    /// # Errors
    ///
    /// [`MapError::Limit`] if the image exceeds the configured limits, and
    /// [`MapError::WorkerFailure`] if `transform` panics.
    pub fn map<F>(&self, input: &PixelSlice<'_>, transform: F) -> Result<PixelBuffer, MapError>
    where
        F: Fn(Pixel) -> Pixel + Sync,
    {
        self.try_map(input, |p| Ok::<_, Infallible>(transform(p)))
    }

    /// Like [`map`](Self::map), with a transform that can fail.
    ///
    /// The first error inside a chunk stops that chunk; the other workers
    /// still run to completion. The first failure in row order is returned
    /// and the partially written output is dropped.
    ///
    /// # Errors
    ///
    /// As for [`map`](Self::map), plus [`MapError::WorkerFailure`] carrying
    /// [`WorkerFault::Transform`] when `transform` returns an error.
    pub fn try_map<F, E>(
        &self,
        input: &PixelSlice<'_>,
        transform: F,
    ) -> Result<PixelBuffer, MapError>
    where
        F: Fn(Pixel) -> Result<Pixel, E> + Sync,
        E: Into<BoxError>,
    {
        self.config
            .limits()
            .check_map(input.width(), input.rows(), input.stride())?;

        let mut output = PixelBuffer::with_stride(input.width(), input.rows(), input.stride())?;
        self.dispatch(input, &mut output.as_slice_mut(), &transform)?;
        Ok(output)
    }

    /// Map every pixel of `input` into caller-provided storage.
    ///
    /// `output` must have the same width and height as `input`; its stride
    /// may differ. Row padding in `output` is left untouched. On error the
    /// pixel contents of `output` are unspecified.
    ///
    /// Limits are checked against `output`, so the output-bytes cap counts
    /// the caller's stride.
    ///
    /// # Errors
    ///
    /// [`BufferError::DimensionMismatch`] (as [`MapError::Buffer`]) when the
    /// dimensions differ, otherwise as for [`map`](Self::map).
    pub fn map_into<F>(
        &self,
        input: &PixelSlice<'_>,
        output: &mut PixelSliceMut<'_>,
        transform: F,
    ) -> Result<(), MapError>
    where
        F: Fn(Pixel) -> Pixel + Sync,
    {
        let expected = (input.width(), input.rows());
        let actual = (output.width(), output.rows());
        if expected != actual {
            return Err(BufferError::DimensionMismatch { expected, actual }.into());
        }
        self.config
            .limits()
            .check_map(output.width(), output.rows(), output.stride())?;
        self.dispatch(input, output, &|p| Ok::<_, Infallible>(transform(p)))
    }

    /// Map a raw BGRA8 region of `stride * height` bytes.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidDimensions`] for a zero width or height,
    /// [`BufferError::StrideTooSmall`] or [`BufferError::BufferTooSmall`]
    /// for a short region, otherwise as for [`map`](Self::map).
    pub fn map_bytes<F>(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        stride: usize,
        transform: F,
    ) -> Result<PixelBuffer, MapError>
    where
        F: Fn(Pixel) -> Pixel + Sync,
    {
        let input = PixelSlice::new(data, width, height, stride)?;
        self.map(&input, transform)
    }

    /// Fork one worker per chunk, join them all, then report the first
    /// failure in chunk order.
    fn dispatch<F, E>(
        &self,
        input: &PixelSlice<'_>,
        output: &mut PixelSliceMut<'_>,
        transform: &F,
    ) -> Result<(), MapError>
    where
        F: Fn(Pixel) -> Result<Pixel, E> + Sync,
        E: Into<BoxError>,
    {
        let chunks = partition(input.rows(), self.parallelism());
        debug!(
            width = input.width(),
            height = input.rows(),
            stride = input.stride(),
            workers = chunks.len(),
            "dispatching row chunks"
        );

        let bands = output.split_rows_mut(&chunks);
        let jobs: Vec<(Chunk, PixelSliceMut<'_>)> = chunks.iter().copied().zip(bands).collect();

        let run = || {
            jobs.into_par_iter()
                .map(|(chunk, mut dst)| {
                    let src = input.chunk(&chunk);
                    let result =
                        panic::catch_unwind(AssertUnwindSafe(|| map_rows(&src, &mut dst, transform)))
                            .unwrap_or_else(|payload| Err(WorkerFault::from_panic(payload)));
                    (chunk, result)
                })
                .collect::<Vec<_>>()
        };
        let results = match self.config.thread_pool() {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let mut first = None;
        for (chunk, result) in results {
            match result {
                Ok(()) => trace!(%chunk, "chunk done"),
                Err(fault) => {
                    warn!(%chunk, %fault, "worker failed");
                    if first.is_none() {
                        first = Some(MapError::WorkerFailure { chunk, fault });
                    }
                }
            }
        }
        first.map_or(Ok(()), Err)
    }
}

/// Transform every pixel of `src` into the same position of `dst`.
fn map_rows<F, E>(
    src: &PixelSlice<'_>,
    dst: &mut PixelSliceMut<'_>,
    transform: &F,
) -> Result<(), WorkerFault>
where
    F: Fn(Pixel) -> Result<Pixel, E>,
    E: Into<BoxError>,
{
    for y in 0..src.rows() {
        for (s, d) in src.pixels(y).iter().zip(dst.pixels_mut(y)) {
            let out = transform(Pixel::from(*s)).map_err(|e| WorkerFault::Transform(e.into()))?;
            *d = out.into();
        }
    }
    Ok(())
}
