//! A crate that provides gradient-based perceptual hashing for images.
//! Supports images opened with the [image] crate.
//!
//! A fingerprint is computed by shrinking the image to a small luma-only
//! sampling grid and recording, for each pair of adjacent samples, whether
//! luminance strictly drops between them. Visually similar images end up
//! within a small Hamming distance of each other while unrelated images
//! differ in roughly half their bits. The hash is cheap to compute and
//! robust against resizing, recompression and color shifts.
//!
//! This is not a cryptographic hash: nothing here resists deliberately
//! constructed collisions.
//!
//! ```rust,no_run
//! use gradient_hash::{HasherConfig, Precision};
//!
//! let image1 = image::open("image1.png").unwrap();
//! let image2 = image::open("image2.png").unwrap();
//!
//! let hasher = HasherConfig::new()
//!     .bit_resolution(64)
//!     .precision(Precision::Double)
//!     .to_hasher()
//!     .unwrap();
//!
//! let hash1 = hasher.hash_image(&image1);
//! let hash2 = hasher.hash_image(&image2);
//!
//! assert_eq!(hash1.algorithm_id(), hash2.algorithm_id());
//! ```
//!
//! Hamming distance, persistence and nearest-neighbor search are external
//! concerns; [`ImageHash`] exposes its raw bytes, bit length and per-bit
//! access for downstream code to build on.
//!
//! [image]: https://github.com/image-rs/image
#![deny(missing_docs)]

use std::fmt;
use std::marker::PhantomData;

pub use image::imageops::FilterType;
use image::{imageops, GrayImage};
use serde::{Deserialize, Serialize};

pub use alg::Precision;
pub use traits::{HashBytes, Image};

mod alg;
mod columns;
mod traits;

/// **Start here**. Configuration builder for [`Hasher`].
///
/// Sane defaults are provided by [`new()`](Self::new): a 64-bit hash at
/// [`Precision::Simple`]. If you just want to start hashing images:
///
/// ```rust
/// use gradient_hash::HasherConfig;
///
/// let hasher = HasherConfig::new().to_hasher().unwrap();
/// // hasher.hash_image(&image);
/// ```
///
/// # Configuration Options
///
/// ### Bit Resolution
/// Setter: [`.bit_resolution()`](Self::bit_resolution)
///
/// The *requested* hash length in bits. Hash length grows quadratically with
/// the sampling-grid side, so most requests are not achievable exactly; the
/// nearest achievable length is selected, preferring the slightly longer one
/// when the request falls between two grids. [`Hasher::hash_bits`] reports
/// the exact resolved length. Higher resolutions track finer image detail at
/// a higher compute and storage cost; longer is not always better for
/// matching.
///
/// ### Precision
/// Setter: [`.precision()`](Self::precision)
/// Definition: [`Precision`]
///
/// How many gradient directions contribute bits. Each additional direction
/// re-scans the same grid, multiplying the hash length accordingly.
///
/// ### Resize Filter
/// Setter: [`.resize_filter()`](Self::resize_filter)
///
/// The filter used to scale images down to the sampling grid. Note that
/// images are almost always *reduced* in size here.
///
/// ### Hash Bytes Container / `B` Type Param
/// Use [`with_bytes_type::<B>()`](Self::with_bytes_type) instead of `new()`
/// to customize.
///
/// The default `Box<[u8]>` accommodates any hash size but heap-allocates.
/// An array type (`[u8; N]`) stores the hash inline; pick one large enough
/// for the configured resolution and precision.
#[derive(Serialize, Deserialize)]
pub struct HasherConfig<B = Box<[u8]>> {
    bit_resolution: u32,
    precision: Precision,
    #[serde(with = "SerdeFilterType")]
    resize_filter: FilterType,
    _bytes_type: PhantomData<B>,
}

impl HasherConfig<Box<[u8]>> {
    /// Construct a new hasher config with sane defaults.
    ///
    /// The default hash container type is guaranteed to fit any hash size.
    pub fn new() -> Self {
        Self::with_bytes_type()
    }

    /// Construct a new config with the selected [`HashBytes`] impl.
    ///
    /// You may opt for an array type which allows inline allocation of hash data.
    ///
    /// ### Note
    /// The default configuration resolves to a 64-bit hash, requiring 8 bytes
    /// of storage; [`.bit_resolution()`](Self::bit_resolution) and
    /// [`.precision()`](Self::precision) change the requirement.
    pub fn with_bytes_type<B_: HashBytes>() -> HasherConfig<B_> {
        HasherConfig {
            bit_resolution: 64,
            precision: Precision::Simple,
            resize_filter: FilterType::Lanczos3,
            _bytes_type: PhantomData,
        }
    }
}

impl Default for HasherConfig<Box<[u8]>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: HashBytes> HasherConfig<B> {
    /// Set the requested hash length, in bits; must be at least 3.
    ///
    /// This is an approximation of the final length; see the
    /// [type-level docs](Self#bit-resolution).
    #[must_use]
    pub fn bit_resolution(self, bit_resolution: u32) -> Self {
        Self {
            bit_resolution,
            ..self
        }
    }

    /// Set how many gradient directions contribute bits to the hash.
    #[must_use]
    pub fn precision(self, precision: Precision) -> Self {
        Self { precision, ..self }
    }

    /// Set the filter used to resize images during hashing.
    #[must_use]
    pub fn resize_filter(self, resize_filter: FilterType) -> Self {
        Self {
            resize_filter,
            ..self
        }
    }

    /// Resolve the sampling grid and create a [`Hasher`] from this config.
    ///
    /// The grid dimensions, hash length and algorithm identity are all fixed
    /// here, once; the hasher applies them to every image it is given.
    ///
    /// ### Errors
    /// [`InvalidConfigError`] if `bit_resolution` is zero or resolves to a
    /// sampling grid with a side below 2 (no gradient could be sampled).
    /// Out-of-range requests are never clamped.
    ///
    /// ### Panics
    /// If the resolved hash is too large for the chosen container type
    /// (`B::max_bits()`).
    pub fn to_hasher(&self) -> Result<Hasher<B>, InvalidConfigError> {
        let Self {
            bit_resolution,
            precision,
            resize_filter,
            ..
        } = *self;

        if bit_resolution == 0 {
            return Err(InvalidConfigError::ZeroBitResolution);
        }

        let (width, height) = alg::dims::resolve(bit_resolution);
        if width < 2 || height < 2 {
            return Err(InvalidConfigError::GridTooSmall {
                bit_resolution,
                width,
                height,
            });
        }

        let hash_bits = 1 + precision.bit_count(width, height) as usize;
        assert!(
            hash_bits <= B::max_bits(),
            "hash size too large for container: {hash_bits} bits",
        );

        Ok(Hasher {
            width,
            height,
            precision,
            resize_filter,
            algorithm_id: alg::algorithm_id(width, height, precision),
            bytes_type: PhantomData,
        })
    }
}

// cannot be derived because of `FilterType`
impl<B> fmt::Debug for HasherConfig<B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HasherConfig")
            .field("bit_resolution", &self.bit_resolution)
            .field("precision", &self.precision)
            .field("resize_filter", &debug_filter_type(&self.resize_filter))
            .finish()
    }
}

/// Produces fingerprints for images with a fixed, pre-resolved configuration.
///
/// Constructed via [`HasherConfig::to_hasher()`].
///
/// Hashing is a pure function of the image: the hasher holds no mutable
/// state, so a single instance can be shared across threads and used
/// concurrently without synchronization.
pub struct Hasher<B = Box<[u8]>> {
    width: u32,
    height: u32,
    precision: Precision,
    resize_filter: FilterType,
    algorithm_id: u64,
    bytes_type: PhantomData<B>,
}

impl<B> Hasher<B>
where
    B: HashBytes,
{
    /// Calculate a fingerprint for the given image.
    ///
    /// The image is grayscaled and scaled down to the sampling grid with the
    /// configured filter, then the gradient bits are extracted.
    pub fn hash_image<I: Image>(&self, image: &I) -> ImageHash<B> {
        let gray = image.to_grayscale();
        let lum = imageops::resize(&*gray, self.width, self.height, self.resize_filter);
        self.hash_prepared(&lum)
    }

    /// Calculate a fingerprint from a caller-prepared luma grid.
    ///
    /// For callers that own the scaling pipeline. Any luma formula works as
    /// long as it is monotonic with perceived brightness and applied
    /// consistently across the images being compared.
    ///
    /// ### Errors
    /// [`GridSizeError`] if the grid's dimensions are not exactly
    /// [`grid_dimensions()`](Self::grid_dimensions). A mismatched grid is
    /// never truncated or padded.
    pub fn hash_luma_grid(&self, lum: &GrayImage) -> Result<ImageHash<B>, GridSizeError> {
        if lum.dimensions() != (self.width, self.height) {
            return Err(GridSizeError {
                expected: (self.width, self.height),
                found: lum.dimensions(),
            });
        }

        Ok(self.hash_prepared(lum))
    }

    fn hash_prepared(&self, lum: &GrayImage) -> ImageHash<B> {
        ImageHash {
            hash: alg::difference_hash(lum, self.precision),
            bit_len: self.hash_bits(),
            algorithm_id: self.algorithm_id,
        }
    }

    /// Dimensions of the luma sampling grid resolved from the requested
    /// bit resolution, as `(width, height)`.
    pub fn grid_dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Exact length of the hashes this hasher produces, in bits,
    /// sentinel included.
    pub fn hash_bits(&self) -> u32 {
        1 + self.precision.bit_count(self.width, self.height)
    }

    /// The configured precision.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Identity tag stamped on every fingerprint this hasher produces.
    ///
    /// See [`ImageHash::algorithm_id()`].
    pub fn algorithm_id(&self) -> u64 {
        self.algorithm_id
    }
}

/// A fingerprint: the hash bit sequence paired with the identity of the
/// configuration that produced it.
///
/// Created fresh by each hash call and immutable afterwards. For efficiency,
/// does not retain a copy of the image data.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct ImageHash<B = Box<[u8]>> {
    hash: B,
    bit_len: u32,
    algorithm_id: u64,
}

impl<B: HashBytes> ImageHash<B> {
    /// Get the bytes of this hash, most significant first.
    ///
    /// Bit 0 is the high bit of byte 0; when the bit length is not a
    /// multiple of 8 the final byte is zero-padded at the low end.
    pub fn as_bytes(&self) -> &[u8] {
        self.hash.as_slice()
    }

    /// Number of significant bits in this hash, sentinel included.
    pub fn bit_len(&self) -> u32 {
        self.bit_len
    }

    /// Get the bit at `index`, counting from the most significant.
    ///
    /// Index 0 is the sentinel, which is always 1. Returns `None` past the
    /// end of the hash.
    pub fn bit(&self, index: u32) -> Option<bool> {
        if index >= self.bit_len {
            return None;
        }

        let byte = self.hash.as_slice()[(index / 8) as usize];
        Some(byte & (0x80 >> (index % 8)) != 0)
    }

    /// Identity of the configuration that produced this fingerprint.
    ///
    /// Stable across process runs for a fixed configuration. Two
    /// fingerprints should only ever be compared when their identities are
    /// equal; differing identities mean different grid dimensions, precision
    /// or bit layout, and any distance between their bits is meaningless.
    pub fn algorithm_id(&self) -> u64 {
        self.algorithm_id
    }

    /// Consume this fingerprint, returning the hash container.
    pub fn into_inner(self) -> B {
        self.hash
    }
}

/// Error from [`HasherConfig::to_hasher()`]: the configuration cannot
/// produce a usable sampling grid.
#[derive(Debug, PartialEq, Eq)]
pub enum InvalidConfigError {
    /// The requested bit resolution was zero.
    ZeroBitResolution,
    /// The bit resolution resolved to a grid with a side below 2, which
    /// could not yield a single gradient bit.
    GridTooSmall {
        /// The requested bit resolution.
        bit_resolution: u32,
        /// Resolved grid width.
        width: u32,
        /// Resolved grid height.
        height: u32,
    },
}

impl fmt::Display for InvalidConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InvalidConfigError::ZeroBitResolution => {
                f.write_str("bit resolution must be at least 1")
            }
            InvalidConfigError::GridTooSmall {
                bit_resolution,
                width,
                height,
            } => write!(
                f,
                "bit resolution {bit_resolution} resolves to a {width} x {height} sampling grid; \
                 both sides must be at least 2",
            ),
        }
    }
}

impl std::error::Error for InvalidConfigError {}

/// Error from [`Hasher::hash_luma_grid()`]: the supplied grid does not match
/// the hasher's resolved sampling grid.
#[derive(Debug, PartialEq, Eq)]
pub struct GridSizeError {
    /// Dimensions the hasher was configured for.
    pub expected: (u32, u32),
    /// Dimensions of the grid actually supplied.
    pub found: (u32, u32),
}

impl fmt::Display for GridSizeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "luma grid is {} x {} but the hasher samples {} x {}",
            self.found.0, self.found.1, self.expected.0, self.expected.1,
        )
    }
}

impl std::error::Error for GridSizeError {}

/// Provide Serde a typedef for `image::FilterType`: <https://serde.rs/remote-derive.html>
/// This is automatically checked, if Serde complains then double-check with the original definition
#[derive(Serialize, Deserialize)]
#[serde(remote = "FilterType")]
enum SerdeFilterType {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

fn debug_filter_type(ft: &FilterType) -> &'static str {
    use FilterType::{CatmullRom, Gaussian, Lanczos3, Nearest, Triangle};

    match *ft {
        Triangle => "Triangle",
        Nearest => "Nearest",
        CatmullRom => "CatmullRom",
        Lanczos3 => "Lanczos3",
        Gaussian => "Gaussian",
    }
}
