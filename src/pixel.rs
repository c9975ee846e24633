//! Pixel value type and the fixed BGRA8 byte layout.
//!
//! Buffers in this crate always store 4 bytes per pixel in blue, green,
//! red, alpha order (Windows/DirectX surface order). Transforms see a
//! [`Pixel`] with named channels and never touch the byte order.

use rgb::Rgba;

/// An 8-bit RGBA pixel, passed to and returned from transforms by value.
pub type Pixel = Rgba<u8>;

/// A pixel as it sits in a buffer row. Row bytes are viewed as `[Bgra8]`
/// with [`rgb::FromSlice::as_bgra`], and `From` converts to and from
/// [`Pixel`].
pub type Bgra8 = rgb::alt::BGRA<u8>;

/// Bytes per pixel in the stored layout.
pub const BYTES_PER_PIXEL: usize = size_of::<Bgra8>();

/// Invert the color channels, passing alpha through unchanged.
#[inline]
pub fn invert(pixel: Pixel) -> Pixel {
    Rgba::new(255 - pixel.r, 255 - pixel.g, 255 - pixel.b, pixel.a)
}

/// Return the pixel unchanged.
#[inline]
pub fn identity(pixel: Pixel) -> Pixel {
    pixel
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bgra_byte_order() {
        use rgb::{ComponentBytes, FromSlice};

        let bytes = [1u8, 2, 3, 4];
        let stored = bytes.as_bgra()[0];
        assert_eq!(Pixel::from(stored), Rgba::new(3, 2, 1, 4));

        let back = [Bgra8::from(Rgba::new(3, 2, 1, 4))];
        assert_eq!(back.as_bytes(), &bytes);
        assert_eq!(BYTES_PER_PIXEL, 4);
    }

    #[test]
    fn invert_keeps_alpha() {
        let p = invert(Rgba::new(100, 150, 200, 255));
        assert_eq!(p, Rgba::new(155, 105, 55, 255));

        let p = invert(Rgba::new(0, 255, 1, 7));
        assert_eq!(p, Rgba::new(255, 0, 254, 7));
    }

    #[test]
    fn identity_is_identity() {
        let p = Rgba::new(9, 8, 7, 6);
        assert_eq!(identity(p), p);
    }

    #[test]
    fn invert_twice_every_channel_value() {
        for v in 0..=255u8 {
            let p = Rgba::new(v, 255 - v, v / 2, v);
            assert_eq!(invert(invert(p)), p);
        }
    }

    proptest! {
        #[test]
        fn invert_is_involution(r: u8, g: u8, b: u8, a: u8) {
            let p = Rgba::new(r, g, b, a);
            prop_assert_eq!(invert(invert(p)), p);
        }
    }
}
