//! Map operation errors.

use std::any::Any;
use std::error::Error;

use crate::{BufferError, Chunk, LimitExceeded};

/// Boxed error returned by a fallible transform.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Errors from [`ParallelPixelMapper`](crate::ParallelPixelMapper) operations.
///
/// Buffer and limit errors are reported before any worker is dispatched.
/// A [`WorkerFailure`](MapError::WorkerFailure) is reported after every
/// worker has been joined; the output is discarded in that case.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MapError {
    /// Input or output buffer description is invalid.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// The image exceeds the configured [`ResourceLimits`](crate::ResourceLimits).
    #[error(transparent)]
    Limit(#[from] LimitExceeded),
    /// A worker failed while transforming its chunk.
    #[error("{chunk} failed: {fault}")]
    WorkerFailure {
        /// The chunk the failing worker owned.
        chunk: Chunk,
        /// What went wrong.
        #[source]
        fault: WorkerFault,
    },
}

impl MapError {
    /// Width or height was zero, or the byte size overflowed.
    pub fn is_invalid_dimensions(&self) -> bool {
        matches!(self, Self::Buffer(BufferError::InvalidDimensions { .. }))
    }

    /// A buffer region was smaller than `stride * height`.
    pub fn is_buffer_too_small(&self) -> bool {
        matches!(self, Self::Buffer(BufferError::BufferTooSmall { .. }))
    }

    /// A worker failed.
    pub fn is_worker_failure(&self) -> bool {
        matches!(self, Self::WorkerFailure { .. })
    }
}

/// Why a worker failed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WorkerFault {
    /// The transform returned an error.
    #[error("transform error: {0}")]
    Transform(#[source] BoxError),
    /// The transform panicked.
    #[error("transform panicked: {0}")]
    Panicked(String),
}

impl WorkerFault {
    /// Build a fault from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::Panicked(message)
    }
}
