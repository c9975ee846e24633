//! Mapper configuration.

use std::num::NonZeroUsize;
use std::sync::Arc;

use rayon::ThreadPool;

use crate::ResourceLimits;

/// How many workers a map operation partitions rows across.
///
/// The count is resolved on every call, then clamped to the image height
/// so no worker gets an empty chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Parallelism {
    /// One worker per available hardware thread, queried at call time.
    ///
    /// When a thread pool is configured, its thread count is used instead.
    #[default]
    Available,
    /// A fixed worker count.
    Fixed(NonZeroUsize),
}

impl Parallelism {
    /// Fixed worker count, with 0 treated as 1.
    pub fn fixed(workers: usize) -> Self {
        Self::Fixed(NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN))
    }

    /// Resolve to a concrete worker count (always at least 1).
    pub fn resolve(self, pool: Option<&ThreadPool>) -> usize {
        match self {
            Self::Fixed(n) => n.get(),
            Self::Available => match pool {
                Some(pool) => pool.current_num_threads().max(1),
                None => match std::thread::available_parallelism() {
                    Ok(n) => n.get(),
                    Err(err) => {
                        tracing::debug!(%err, "hardware parallelism unavailable, using one worker");
                        1
                    }
                },
            },
        }
    }
}

/// Configuration for a [`ParallelPixelMapper`](crate::ParallelPixelMapper).
///
/// # Example
///
/// ```
/// use zenmap::{MapConfig, ResourceLimits};
///
/// let config = MapConfig::new()
///     .with_workers(4)
///     .with_limits(ResourceLimits::unlimited().limit_pixels(50_000_000));
/// assert_eq!(config.parallelism().resolve(None), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MapConfig {
    parallelism: Parallelism,
    limits: ResourceLimits,
    pool: Option<Arc<ThreadPool>>,
}

impl MapConfig {
    /// Available parallelism, no limits, rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker policy.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Force a fixed worker count (0 is treated as 1).
    pub fn with_workers(self, workers: usize) -> Self {
        self.with_parallelism(Parallelism::fixed(workers))
    }

    /// Set the caps every map call checks against its output before
    /// starting any worker.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Run workers on a dedicated rayon pool instead of the global one.
    pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Worker policy.
    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Resource limits.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Dedicated thread pool, if any.
    pub fn thread_pool(&self) -> Option<&ThreadPool> {
        self.pool.as_deref()
    }
}
