//! Size caps a mapper enforces before it touches any pixel.
//!
//! A map call passes the output it is about to write (width, height, and
//! stride) to [`ResourceLimits::check_map`]. The first cap that is exceeded
//! comes back as a [`LimitExceeded`], and no worker is started.

/// Optional caps on the images a mapper accepts. `None` disables a cap.
///
/// # Example
///
/// ```
/// use zenmap::ResourceLimits;
///
/// let limits = ResourceLimits::unlimited()
///     .limit_size(8192, 8192)
///     .limit_output_bytes(256 * 1024 * 1024);
/// assert!(limits.check_map(1920, 1080, 1920 * 4).is_ok());
/// assert!(limits.check_map(9000, 10, 9000 * 4).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Widest image accepted, in pixels.
    pub max_width: Option<u32>,
    /// Tallest image accepted, in pixels.
    pub max_height: Option<u32>,
    /// Largest `width * height` accepted.
    pub max_pixels: Option<u64>,
    /// Largest output region, `stride * height` bytes, padding included.
    pub max_output_bytes: Option<u64>,
}

impl ResourceLimits {
    /// Accept any image.
    pub const fn unlimited() -> Self {
        Self {
            max_width: None,
            max_height: None,
            max_pixels: None,
            max_output_bytes: None,
        }
    }

    /// Cap width and height independently.
    pub const fn limit_size(mut self, max_width: u32, max_height: u32) -> Self {
        self.max_width = Some(max_width);
        self.max_height = Some(max_height);
        self
    }

    /// Cap the pixel count.
    pub const fn limit_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Cap the bytes of the output region a call writes.
    pub const fn limit_output_bytes(mut self, max: u64) -> Self {
        self.max_output_bytes = Some(max);
        self
    }

    /// True when no cap is set.
    pub fn is_unlimited(&self) -> bool {
        *self == Self::unlimited()
    }

    /// Check a map whose output is `height` rows of `width` pixels spaced
    /// `stride` bytes apart.
    ///
    /// Caps are checked as width, height, pixel count, then output bytes;
    /// the first one exceeded is returned.
    pub fn check_map(&self, width: u32, height: u32, stride: usize) -> Result<(), LimitExceeded> {
        let pixels = u64::from(width) * u64::from(height);
        let output_bytes = (stride as u64).saturating_mul(u64::from(height));
        match *self {
            Self {
                max_width: Some(max),
                ..
            } if width > max => Err(LimitExceeded::Width { actual: width, max }),
            Self {
                max_height: Some(max),
                ..
            } if height > max => Err(LimitExceeded::Height {
                actual: height,
                max,
            }),
            Self {
                max_pixels: Some(max),
                ..
            } if pixels > max => Err(LimitExceeded::Pixels {
                actual: pixels,
                max,
            }),
            Self {
                max_output_bytes: Some(max),
                ..
            } if output_bytes > max => Err(LimitExceeded::OutputBytes {
                actual: output_bytes,
                max,
            }),
            _ => Ok(()),
        }
    }
}

/// The cap a map call ran into, with the value that was over it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LimitExceeded {
    /// See [`ResourceLimits::max_width`].
    #[error("image width {actual} is over the limit of {max}")]
    Width {
        /// Requested width.
        actual: u32,
        /// Cap.
        max: u32,
    },
    /// See [`ResourceLimits::max_height`].
    #[error("image height {actual} is over the limit of {max}")]
    Height {
        /// Requested height.
        actual: u32,
        /// Cap.
        max: u32,
    },
    /// See [`ResourceLimits::max_pixels`].
    #[error("{actual} pixels is over the limit of {max}")]
    Pixels {
        /// Requested `width * height`.
        actual: u64,
        /// Cap.
        max: u64,
    },
    /// See [`ResourceLimits::max_output_bytes`].
    #[error("output of {actual} bytes is over the limit of {max}")]
    OutputBytes {
        /// Requested `stride * height`.
        actual: u64,
        /// Cap.
        max: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_accepts_huge_maps() {
        let limits = ResourceLimits::unlimited();
        assert!(limits.is_unlimited());
        assert!(limits.check_map(u32::MAX, u32::MAX, usize::MAX).is_ok());
    }

    #[test]
    fn width_is_reported_before_output_bytes() {
        let limits = ResourceLimits::unlimited()
            .limit_size(4, 100)
            .limit_output_bytes(1);
        assert!(!limits.is_unlimited());
        assert_eq!(
            limits.check_map(5, 1, 20),
            Err(LimitExceeded::Width { actual: 5, max: 4 })
        );
    }
}
