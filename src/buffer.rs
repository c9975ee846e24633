//! Strided BGRA8 pixel storage.
//!
//! [`PixelBuffer`] owns its bytes; [`PixelSlice`] and [`PixelSliceMut`]
//! borrow caller memory. All three share one invariant, checked once at
//! construction: `width > 0`, `height > 0`, `stride >= width * 4`, and the
//! byte region holds exactly `stride * height` bytes. Row accessors slice
//! into that region and never recompute bounds per pixel.

use core::fmt;

use crate::partition::Chunk;
use rgb::FromSlice;

use crate::pixel::{BYTES_PER_PIXEL, Bgra8, Pixel};

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from pixel buffer construction and validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BufferError {
    /// Width or height is zero, or `stride * height` overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// Stride is smaller than `width * 4`.
    #[error("stride {stride} is smaller than the {min} bytes a row needs")]
    StrideTooSmall {
        /// Requested stride.
        stride: usize,
        /// Minimum stride for the width.
        min: usize,
    },
    /// The byte region is smaller than `stride * height`.
    #[error("buffer holds {actual} bytes but {required} are required")]
    BufferTooSmall {
        /// `stride * height`.
        required: usize,
        /// Bytes actually available.
        actual: usize,
    },
    /// Input and output dimensions differ.
    #[error("output is {}x{} but input is {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    DimensionMismatch {
        /// Input `(width, height)`.
        expected: (u32, u32),
        /// Output `(width, height)`.
        actual: (u32, u32),
    },
}

/// Validate a buffer description and return the region size `stride * height`.
fn checked_region(
    len: usize,
    width: u32,
    height: u32,
    stride: usize,
) -> Result<usize, BufferError> {
    if width == 0 || height == 0 {
        return Err(BufferError::InvalidDimensions { width, height });
    }
    let min = min_stride(width).ok_or(BufferError::InvalidDimensions { width, height })?;
    if stride < min {
        return Err(BufferError::StrideTooSmall { stride, min });
    }
    let required = stride
        .checked_mul(height as usize)
        .ok_or(BufferError::InvalidDimensions { width, height })?;
    if len < required {
        return Err(BufferError::BufferTooSmall {
            required,
            actual: len,
        });
    }
    Ok(required)
}

/// `width * 4`, or `None` on overflow.
#[inline]
fn min_stride(width: u32) -> Option<usize> {
    (width as usize).checked_mul(BYTES_PER_PIXEL)
}

/// Pixel bytes of row `y` in a validated region (padding excluded).
#[inline]
fn row_bytes(data: &[u8], width: u32, stride: usize, y: u32) -> &[u8] {
    let start = y as usize * stride;
    &data[start..start + width as usize * BYTES_PER_PIXEL]
}

#[inline]
fn row_bytes_mut(data: &mut [u8], width: u32, stride: usize, y: u32) -> &mut [u8] {
    let start = y as usize * stride;
    &mut data[start..start + width as usize * BYTES_PER_PIXEL]
}

#[inline]
fn read_pixel(data: &[u8], width: u32, height: u32, stride: usize, x: u32, y: u32) -> Option<Pixel> {
    if x >= width || y >= height {
        return None;
    }
    let stored = row_bytes(data, width, stride, y).as_bgra()[x as usize];
    Some(Pixel::from(stored))
}

// ---------------------------------------------------------------------------
// PixelSlice (borrowed, immutable)
// ---------------------------------------------------------------------------

/// Borrowed, read-only view of BGRA8 rows.
#[derive(Clone, Copy)]
pub struct PixelSlice<'a> {
    data: &'a [u8],
    width: u32,
    rows: u32,
    stride: usize,
}

impl<'a> PixelSlice<'a> {
    /// Create a validated view over caller-owned bytes.
    ///
    /// Only the first `stride * rows` bytes are used.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidDimensions`] for a zero width or height,
    /// [`BufferError::StrideTooSmall`] if `stride < width * 4`, and
    /// [`BufferError::BufferTooSmall`] if `data` is shorter than `stride * rows`.
    pub fn new(data: &'a [u8], width: u32, rows: u32, stride: usize) -> Result<Self, BufferError> {
        let len = checked_region(data.len(), width, rows, stride)?;
        Ok(Self {
            data: &data[..len],
            width,
            rows,
            stride,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in this view.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The whole `stride * rows` byte region, padding included.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel bytes for row `y` (no padding, exactly `width * 4` bytes).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        row_bytes(self.data, self.width, self.stride, y)
    }

    /// Row `y` as stored BGRA pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn pixels(&self, y: u32) -> &'a [Bgra8] {
        self.row(y).as_bgra()
    }

    /// Read the pixel at `(x, y)`, or `None` if out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        read_pixel(self.data, self.width, self.rows, self.stride, x, y)
    }

    /// Borrow rows `y..y + count`.
    ///
    /// # Panics
    ///
    /// Panics if `count == 0` or `y + count > rows`.
    pub fn sub_rows(&self, y: u32, count: u32) -> PixelSlice<'a> {
        assert!(
            count > 0 && y.checked_add(count).is_some_and(|end| end <= self.rows),
            "sub_rows({y}, {count}) out of bounds (rows: {})",
            self.rows
        );
        let start = y as usize * self.stride;
        let end = start + count as usize * self.stride;
        PixelSlice {
            data: &self.data[start..end],
            width: self.width,
            rows: count,
            stride: self.stride,
        }
    }

    /// Borrow the rows covered by `chunk`.
    ///
    /// # Panics
    ///
    /// Panics if the chunk is empty or extends past `rows`.
    #[inline]
    pub fn chunk(&self, chunk: &Chunk) -> PixelSlice<'a> {
        self.sub_rows(chunk.start_y, chunk.rows())
    }
}

impl fmt::Debug for PixelSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelSlice({}x{}, stride {})",
            self.width, self.rows, self.stride
        )
    }
}

// ---------------------------------------------------------------------------
// PixelSliceMut (borrowed, mutable)
// ---------------------------------------------------------------------------

/// Mutable borrowed view of BGRA8 rows.
///
/// Same semantics as [`PixelSlice`] but allows writing rows.
pub struct PixelSliceMut<'a> {
    data: &'a mut [u8],
    width: u32,
    rows: u32,
    stride: usize,
}

impl<'a> PixelSliceMut<'a> {
    /// Create a validated mutable view over caller-owned bytes.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PixelSlice::new`].
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        rows: u32,
        stride: usize,
    ) -> Result<Self, BufferError> {
        let len = checked_region(data.len(), width, rows, stride)?;
        Ok(Self {
            data: &mut data[..len],
            width,
            rows,
            stride,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in this view.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Reborrow as an immutable [`PixelSlice`].
    pub fn as_slice(&self) -> PixelSlice<'_> {
        PixelSlice {
            data: &*self.data,
            width: self.width,
            rows: self.rows,
            stride: self.stride,
        }
    }

    /// Pixel bytes for row `y` (immutable, no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        row_bytes(&*self.data, self.width, self.stride, y)
    }

    /// Mutable pixel bytes for row `y` (no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        row_bytes_mut(self.data, self.width, self.stride, y)
    }

    /// Row `y` as mutable stored BGRA pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn pixels_mut(&mut self, y: u32) -> &mut [Bgra8] {
        self.row_mut(y).as_bgra_mut()
    }

    /// Read the pixel at `(x, y)`, or `None` if out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        read_pixel(&*self.data, self.width, self.rows, self.stride, x, y)
    }

    /// Write the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= rows`.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: Pixel) {
        assert!(
            x < self.width && y < self.rows,
            "pixel ({x}, {y}) out of bounds ({}x{})",
            self.width,
            self.rows
        );
        self.pixels_mut(y)[x as usize] = value.into();
    }

    /// Split into one disjoint mutable band per chunk.
    ///
    /// `chunks` must be contiguous, in order, and start at row 0, as
    /// produced by [`partition()`](crate::partition). Rows after the last
    /// chunk are not handed out.
    ///
    /// # Panics
    ///
    /// Panics if the chunks are not contiguous from row 0 or extend past
    /// `rows`.
    pub fn split_rows_mut(&mut self, chunks: &[Chunk]) -> Vec<PixelSliceMut<'_>> {
        let mut bands = Vec::with_capacity(chunks.len());
        let mut rest: &mut [u8] = &mut *self.data;
        let mut next_y = 0u32;
        for chunk in chunks {
            assert!(
                chunk.start_y == next_y && chunk.end_y <= self.rows && chunk.rows() > 0,
                "{chunk} does not continue from row {next_y} within {} rows",
                self.rows
            );
            let (band, tail) =
                core::mem::take(&mut rest).split_at_mut(chunk.rows() as usize * self.stride);
            bands.push(PixelSliceMut {
                data: band,
                width: self.width,
                rows: chunk.rows(),
                stride: self.stride,
            });
            rest = tail;
            next_y = chunk.end_y;
        }
        bands
    }
}

impl fmt::Debug for PixelSliceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelSliceMut({}x{}, stride {})",
            self.width, self.rows, self.stride
        )
    }
}

// ---------------------------------------------------------------------------
// PixelBuffer (owned)
// ---------------------------------------------------------------------------

/// Owned BGRA8 pixel buffer.
///
/// Wraps a `Vec<u8>` of exactly `stride * height` bytes. The backing vec
/// can be recovered with [`into_vec`](Self::into_vec).
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
}

impl PixelBuffer {
    /// Allocate a zero-filled, tightly packed buffer.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidDimensions`] for a zero width or height, or if
    /// the byte size overflows.
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        let stride = min_stride(width).ok_or(BufferError::InvalidDimensions { width, height })?;
        Self::with_stride(width, height, stride)
    }

    /// Allocate a zero-filled buffer with an explicit row stride.
    ///
    /// Padding bytes past `width * 4` in each row are zero.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidDimensions`] or [`BufferError::StrideTooSmall`].
    pub fn with_stride(width: u32, height: u32, stride: usize) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions { width, height });
        }
        let total = stride
            .checked_mul(height as usize)
            .ok_or(BufferError::InvalidDimensions { width, height })?;
        checked_region(total, width, height, stride)?;
        Ok(Self {
            data: vec![0u8; total],
            width,
            height,
            stride,
        })
    }

    /// Wrap an existing `Vec<u8>` holding rows of `stride` bytes.
    ///
    /// A vec longer than `stride * height` is truncated to that length.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PixelSlice::new`].
    pub fn from_vec(
        mut data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, BufferError> {
        let len = checked_region(data.len(), width, height, stride)?;
        data.truncate(len);
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Allocate a tightly packed buffer with every pixel set to `value`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PixelBuffer::new`].
    pub fn filled(width: u32, height: u32, value: Pixel) -> Result<Self, BufferError> {
        let mut buf = Self::new(width, height)?;
        buf.data.as_bgra_mut().fill(value.into());
        Ok(buf)
    }

    /// Consume the buffer and return the backing `Vec<u8>`.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The whole `stride * height` byte region, padding included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Borrow the full buffer as a [`PixelSlice`].
    pub fn as_slice(&self) -> PixelSlice<'_> {
        PixelSlice {
            data: &self.data,
            width: self.width,
            rows: self.height,
            stride: self.stride,
        }
    }

    /// Borrow the full buffer as a [`PixelSliceMut`].
    pub fn as_slice_mut(&mut self) -> PixelSliceMut<'_> {
        PixelSliceMut {
            data: &mut self.data,
            width: self.width,
            rows: self.height,
            stride: self.stride,
        }
    }

    /// Read the pixel at `(x, y)`, or `None` if out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        read_pixel(&self.data, self.width, self.height, self.stride, x, y)
    }

    /// Write the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: Pixel) {
        self.as_slice_mut().set_pixel(x, y, value);
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, stride {})",
            self.width, self.height, self.stride
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition;
    use rgb::Rgba;

    // --- construction ---

    #[test]
    fn new_is_tightly_packed_and_zeroed() {
        let buf = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.stride(), 12);
        assert_eq!(buf.as_bytes().len(), 24);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            PixelBuffer::new(0, 4).unwrap_err(),
            BufferError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
        assert_eq!(
            PixelBuffer::new(4, 0).unwrap_err(),
            BufferError::InvalidDimensions {
                width: 4,
                height: 0
            }
        );
        assert!(matches!(
            PixelSlice::new(&[], 0, 0, 0),
            Err(BufferError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn stride_too_small_rejected() {
        let err = PixelBuffer::with_stride(4, 2, 15).unwrap_err();
        assert_eq!(err, BufferError::StrideTooSmall { stride: 15, min: 16 });
    }

    #[test]
    fn short_region_rejected() {
        let data = vec![0u8; 31];
        let err = PixelSlice::new(&data, 2, 2, 16).unwrap_err();
        assert_eq!(
            err,
            BufferError::BufferTooSmall {
                required: 32,
                actual: 31
            }
        );

        let mut data = vec![0u8; 7];
        assert!(matches!(
            PixelSliceMut::new(&mut data, 2, 1, 8),
            Err(BufferError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn overflowing_region_rejected() {
        let err = PixelSlice::new(&[], 1, u32::MAX, usize::MAX / 2).unwrap_err();
        assert!(matches!(err, BufferError::InvalidDimensions { .. }));
    }

    #[test]
    fn from_vec_truncates_to_region() {
        let buf = PixelBuffer::from_vec(vec![7u8; 100], 2, 3, 10).unwrap();
        assert_eq!(buf.as_bytes().len(), 30);
        assert_eq!(buf.into_vec().len(), 30);
    }

    #[test]
    fn filled_sets_every_pixel() {
        let p = Rgba::new(1, 2, 3, 4);
        let buf = PixelBuffer::filled(3, 3, p).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(buf.pixel(x, y), Some(p));
            }
        }
        assert_eq!(&buf.as_bytes()[..4], &[3, 2, 1, 4]);
    }

    // --- access ---

    #[test]
    fn pixel_addressing_uses_stride() {
        // 2x2 with 12-byte stride: 4 bytes of padding per row.
        let mut buf = PixelBuffer::with_stride(2, 2, 12).unwrap();
        buf.set_pixel(1, 1, Rgba::new(10, 20, 30, 40));
        // offset = 1 * 12 + 1 * 4 = 16, stored as B, G, R, A
        assert_eq!(&buf.as_bytes()[16..20], &[30, 20, 10, 40]);
        assert_eq!(buf.pixel(1, 1), Some(Rgba::new(10, 20, 30, 40)));
        assert_eq!(buf.pixel(2, 1), None);
        assert_eq!(buf.pixel(0, 2), None);
        // padding untouched
        assert_eq!(&buf.as_bytes()[20..24], &[0, 0, 0, 0]);
    }

    #[test]
    fn row_excludes_padding() {
        let data: Vec<u8> = (0..24).collect();
        let slice = PixelSlice::new(&data, 2, 2, 12).unwrap();
        assert_eq!(slice.row(0), &data[0..8]);
        assert_eq!(slice.row(1), &data[12..20]);
    }

    #[test]
    fn typed_rows_follow_stored_order() {
        let mut buf = PixelBuffer::with_stride(2, 2, 12).unwrap();
        {
            let mut view = buf.as_slice_mut();
            view.pixels_mut(1)[0] = Rgba::new(10, 20, 30, 40).into();
        }
        let view = buf.as_slice();
        assert_eq!(view.pixels(1).len(), 2);
        let stored = view.pixels(1)[0];
        assert_eq!((stored.b, stored.g, stored.r, stored.a), (30, 20, 10, 40));
        assert_eq!(&buf.as_bytes()[12..16], &[30, 20, 10, 40]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn row_out_of_bounds_panics() {
        let buf = PixelBuffer::new(1, 1).unwrap();
        let _ = buf.as_slice().row(1);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn set_pixel_out_of_bounds_panics() {
        let mut buf = PixelBuffer::new(2, 2).unwrap();
        buf.set_pixel(2, 0, Rgba::new(0, 0, 0, 0));
    }

    #[test]
    fn sub_rows_and_chunk_views() {
        let data: Vec<u8> = (0..48).collect();
        let slice = PixelSlice::new(&data, 1, 4, 12).unwrap();
        let mid = slice.sub_rows(1, 2);
        assert_eq!(mid.rows(), 2);
        assert_eq!(mid.row(0), &data[12..16]);
        assert_eq!(mid.row(1), &data[24..28]);

        let chunks = partition(4, 2);
        let second = slice.chunk(&chunks[1]);
        assert_eq!(second.row(0), &data[24..28]);
    }

    #[test]
    fn split_rows_mut_hands_out_disjoint_bands() {
        let mut buf = PixelBuffer::new(2, 5).unwrap();
        let chunks = partition(5, 2);
        {
            let mut slice = buf.as_slice_mut();
            let mut bands = slice.split_rows_mut(&chunks);
            assert_eq!(bands.len(), 2);
            assert_eq!(bands[0].rows(), 2);
            assert_eq!(bands[1].rows(), 3);
            for (i, band) in bands.iter_mut().enumerate() {
                for y in 0..band.rows() {
                    band.row_mut(y).fill(i as u8 + 1);
                }
            }
        }
        let bytes = buf.as_bytes();
        assert!(bytes[..16].iter().all(|&b| b == 1));
        assert!(bytes[16..].iter().all(|&b| b == 2));
    }

    #[test]
    #[should_panic(expected = "does not continue")]
    fn split_rows_mut_rejects_gaps() {
        let mut buf = PixelBuffer::new(1, 4).unwrap();
        let chunks = [
            Chunk {
                index: 0,
                start_y: 0,
                end_y: 1,
            },
            Chunk {
                index: 1,
                start_y: 2,
                end_y: 4,
            },
        ];
        let _ = buf.as_slice_mut().split_rows_mut(&chunks);
    }

    #[test]
    fn debug_format() {
        let buf = PixelBuffer::with_stride(3, 2, 16).unwrap();
        assert_eq!(format!("{buf:?}"), "PixelBuffer(3x2, stride 16)");
        assert_eq!(format!("{:?}", buf.as_slice()), "PixelSlice(3x2, stride 16)");
    }

    #[test]
    fn error_display() {
        let err = BufferError::BufferTooSmall {
            required: 32,
            actual: 31,
        };
        assert_eq!(err.to_string(), "buffer holds 31 bytes but 32 are required");
        let err = BufferError::DimensionMismatch {
            expected: (4, 4),
            actual: (4, 3),
        };
        assert_eq!(err.to_string(), "output is 4x3 but input is 4x4");
    }
}
