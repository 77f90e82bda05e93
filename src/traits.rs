use image::{imageops, DynamicImage, GenericImageView, GrayImage, ImageBuffer, Pixel};

use std::borrow::Cow;
use std::ops;

/// Interface for types used for storing hash data.
///
/// This is implemented for `Vec<u8>`, `Box<[u8]>` and arrays of any size.
pub trait HashBytes {
    /// Construct this type from an iterator of bytes.
    ///
    /// If this type has a finite capacity (i.e. an array) then it can ignore extra data
    /// (the hash API will not create a hash larger than this type can contain). Unused capacity
    /// **must** be zeroed.
    fn from_iter<I: Iterator<Item = u8>>(iter: I) -> Self
    where
        Self: Sized;

    /// Return the maximum capacity of this type, in bits.
    ///
    /// If this type has an arbitrary/theoretically infinite capacity, return `usize::MAX`.
    fn max_bits() -> usize;

    /// Get the hash bytes as a slice.
    fn as_slice(&self) -> &[u8];
}

impl HashBytes for Box<[u8]> {
    fn from_iter<I: Iterator<Item = u8>>(iter: I) -> Self {
        iter.collect()
    }

    fn max_bits() -> usize {
        usize::MAX
    }

    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl HashBytes for Vec<u8> {
    fn from_iter<I: Iterator<Item = u8>>(iter: I) -> Self {
        iter.collect()
    }

    fn max_bits() -> usize {
        usize::MAX
    }

    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> HashBytes for [u8; N] {
    fn from_iter<I: Iterator<Item = u8>>(mut iter: I) -> Self {
        let mut out = [0; N];

        for (src, dest) in iter.by_ref().zip(out.as_mut()) {
            *dest = src;
        }

        out
    }

    fn max_bits() -> usize {
        N * 8
    }

    fn as_slice(&self) -> &[u8] {
        self
    }
}

struct BoolsToBytes<I> {
    iter: I,
}

impl<I> Iterator for BoolsToBytes<I>
where
    I: Iterator<Item = bool>,
{
    type Item = u8;

    fn next(&mut self) -> Option<<Self as Iterator>::Item> {
        // the first bit lands in the *most* significant position so the packed bytes
        // read in emission order; a partial trailing byte is zero-padded at the low end
        self.iter.by_ref().take(8).enumerate().fold(None, |accum, (n, val)| {
            accum.or(Some(0)).map(|accum| accum | ((val as u8) << (7 - n)))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.iter.size_hint();
        (
            lower / 8,
            // if the upper bound doesn't evenly divide by `8` then we will yield an extra item
            upper.map(|upper| if upper % 8 == 0 { upper / 8 } else { upper / 8 + 1 }),
        )
    }
}

pub(crate) trait BitSet: HashBytes {
    fn from_bools<I: Iterator<Item = bool>>(iter: I) -> Self
    where
        Self: Sized,
    {
        Self::from_iter(BoolsToBytes { iter })
    }
}

impl<T: HashBytes> BitSet for T {}

/// Shorthand trait bound for image types this crate can hash directly.
///
/// Currently only implemented for the types provided by `image` with 8-bit channels.
pub trait Image: GenericImageView + 'static {
    /// Grayscale the image, reducing to 8 bit depth and dropping the alpha channel.
    fn to_grayscale(&self) -> Cow<GrayImage>;
}

impl<P: 'static, C: 'static> Image for ImageBuffer<P, C>
where
    P: Pixel<Subpixel = u8>,
    C: ops::Deref<Target = [u8]>,
{
    fn to_grayscale(&self) -> Cow<GrayImage> {
        Cow::Owned(imageops::grayscale(self))
    }
}

impl Image for DynamicImage {
    fn to_grayscale(&self) -> Cow<GrayImage> {
        self.as_luma8()
            .map_or_else(|| Cow::Owned(self.to_luma8()), Cow::Borrowed)
    }
}

#[test]
fn test_bools_to_bytes() {
    let bools = (0..16).map(|x| x & 1 == 0);
    let bytes = Vec::from_bools(bools.clone());
    assert_eq!(*bytes, [0b1010_1010; 2]);

    let bools_to_bytes = BoolsToBytes { iter: bools };
    assert_eq!(bools_to_bytes.size_hint(), (2, Some(2)));
}

#[test]
fn test_partial_byte_is_low_padded() {
    let bytes = Vec::from_bools([true, false, true].into_iter());
    assert_eq!(*bytes, [0b1010_0000]);
}
