//! The gradient hash itself: precision levels, bit extraction and the
//! algorithm identity tag.
//!
//! A hash records, for pairs of adjacent samples in a small luma grid,
//! whether luminance strictly drops between them. Up to three scan
//! directions contribute bits; all of them encode "no strict decrease" as 0.

pub(crate) mod dims;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::columns::Columns;
use crate::traits::BitSet;

/// Tag mixed into every algorithm identity.
///
/// The trailing number is the bit-layout revision. Any change to the phase
/// order, the per-phase comparison directions or the sentinel must bump it so
/// hashes produced by earlier layouts are flagged as incompatible.
const KIND_TAG: &str = "gradient-hash/difference/1";

/// Selects which gradient directions contribute bits to the hash.
///
/// Each additional direction re-scans the same sampling grid, so `Double`
/// roughly doubles and `Triple` roughly triples the `Simple` hash length,
/// and with it the comparison cost downstream.
///
/// The variant names feed the algorithm identity; renaming one invalidates
/// every stored hash produced under it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// Horizontal (left to right) gradient only.
    Simple,
    /// Additionally the vertical (top to bottom) gradient.
    Double,
    /// Additionally the diagonal (top-left to bottom-right) gradient.
    Triple,
}

impl Precision {
    /// Number of gradient bits (sentinel excluded) produced for a
    /// `width` x `height` sampling grid.
    pub fn bit_count(self, width: u32, height: u32) -> u32 {
        let horizontal = (width - 1) * height;
        let vertical = width * (height - 1);
        let diagonal = (width - 1) * (height - 1);

        match self {
            Precision::Simple => horizontal,
            Precision::Double => horizontal + vertical,
            Precision::Triple => horizontal + vertical + diagonal,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Precision::Simple => "Simple",
            Precision::Double => "Double",
            Precision::Triple => "Triple",
        }
    }
}

/// Derive the identity tag for a hasher configuration.
///
/// FNV-1a over the kind tag, the grid dimensions and the precision name.
/// Deliberately not the standard library hasher: the identity must come out
/// identical across platforms, processes and releases.
pub(crate) fn algorithm_id(width: u32, height: u32, precision: Precision) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut id = FNV_OFFSET;
    let mut mix = |bytes: &[u8]| {
        for &byte in bytes {
            id = (id ^ u64::from(byte)).wrapping_mul(FNV_PRIME);
        }
    };

    mix(KIND_TAG.as_bytes());
    mix(&width.to_le_bytes());
    mix(&height.to_le_bytes());
    mix(precision.name().as_bytes());

    id
}

/// Extract the ordered bit sequence for `lum` into a packed container.
///
/// The order is part of the hash format: a constant 1 sentinel first (so
/// gradient bits that happen to lead with zeroes survive integer
/// representations), then the horizontal phase, then the vertical and
/// diagonal phases when the precision enables them.
pub(crate) fn difference_hash<B: BitSet>(lum: &GrayImage, precision: Precision) -> B {
    let (width, height) = lum.dimensions();

    let mut bits = Vec::with_capacity(1 + precision.bit_count(width, height) as usize);
    bits.push(true);

    horizontal_gradient(lum, &mut bits);
    if precision != Precision::Simple {
        vertical_gradient(lum, &mut bits);
    }
    if precision == Precision::Triple {
        diagonal_gradient(lum, &mut bits);
    }

    B::from_bools(bits.into_iter())
}

/// Columns `1..width`, rows top to bottom within each column.
/// Luminance flat or rising left to right emits 0.
fn horizontal_gradient(lum: &GrayImage, bits: &mut Vec<bool>) {
    let mut cols = Columns::from_slice(lum.as_raw(), lum.width() as usize);
    let Some(mut prev) = cols.next() else { return };

    for curr in cols {
        for y in 0..curr.len() {
            bits.push(curr[y] < prev[y]);
        }
        prev = curr;
    }
}

/// Columns `0..width`, rows `1..height`.
/// Luminance strictly falling top to bottom emits 1.
fn vertical_gradient(lum: &GrayImage, bits: &mut Vec<bool>) {
    for col in Columns::from_slice(lum.as_raw(), lum.width() as usize) {
        for y in 1..col.len() {
            bits.push(col[y] < col[y - 1]);
        }
    }
}

/// Columns `1..width`, rows `1..height`, each sample against its upper-left
/// neighbor. Strictly falling along the diagonal emits 1.
fn diagonal_gradient(lum: &GrayImage, bits: &mut Vec<bool>) {
    let mut cols = Columns::from_slice(lum.as_raw(), lum.width() as usize);
    let Some(mut prev) = cols.next() else { return };

    for curr in cols {
        for y in 1..curr.len() {
            bits.push(curr[y] < prev[y - 1]);
        }
        prev = curr;
    }
}

#[cfg(test)]
mod test {
    use image::GrayImage;

    use super::{algorithm_id, difference_hash, Precision};

    fn grid(width: u32, height: u32, lum: &[u8]) -> GrayImage {
        GrayImage::from_raw(width, height, lum.to_vec()).unwrap()
    }

    #[test]
    fn bit_counts_per_precision() {
        assert_eq!(Precision::Simple.bit_count(8, 9), 63);
        assert_eq!(Precision::Double.bit_count(8, 9), 63 + 64);
        assert_eq!(Precision::Triple.bit_count(8, 9), 63 + 64 + 56);
    }

    #[test]
    fn known_two_by_two_grid() {
        // both columns rise left to right, so both gradient bits are 0
        let lum = grid(2, 2, &[10, 20, 10, 20]);

        let hash: Vec<u8> = difference_hash(&lum, Precision::Simple);
        assert_eq!(hash, [0b1000_0000]);
    }

    #[test]
    fn phase_layout_on_two_by_two_grid() {
        // lum[x][y]: [0][0]=10 [1][0]=20 [0][1]=30 [1][1]=5
        let lum = grid(2, 2, &[10, 20, 30, 5]);

        // horizontal: 20 >= 10 -> 0, 5 < 30 -> 1
        let simple: Vec<u8> = difference_hash(&lum, Precision::Simple);
        assert_eq!(simple, [0b1010_0000]);

        // vertical appends: 30 >= 10 -> 0, 5 < 20 -> 1
        let double: Vec<u8> = difference_hash(&lum, Precision::Double);
        assert_eq!(double, [0b1010_1000]);

        // diagonal appends: 5 < 10 -> 1
        let triple: Vec<u8> = difference_hash(&lum, Precision::Triple);
        assert_eq!(triple, [0b1010_1100]);
    }

    #[test]
    fn horizontal_phase_emits_column_major() {
        // 3 x 2, lum[x][y]: x0 = [10, 7], x1 = [5, 7], x2 = [20, 3]
        let lum = grid(3, 2, &[10, 5, 20, 7, 7, 3]);

        // x=1: 5 < 10 -> 1, 7 >= 7 -> 0; x=2: 20 >= 5 -> 0, 3 < 7 -> 1
        let hash: Vec<u8> = difference_hash(&lum, Precision::Simple);
        assert_eq!(hash, [0b1100_1000]);
    }

    #[test]
    fn flat_grid_is_all_zero_after_sentinel() {
        let lum = grid(4, 4, &[128; 16]);

        let hash: Vec<u8> = difference_hash(&lum, Precision::Triple);
        // 1 + 12 + 12 + 9 bits = 34 bits in 5 bytes
        assert_eq!(hash, [0x80, 0, 0, 0, 0]);
    }

    #[test]
    fn identity_is_deterministic() {
        assert_eq!(
            algorithm_id(8, 9, Precision::Double),
            algorithm_id(8, 9, Precision::Double)
        );
    }

    #[test]
    fn identity_separates_configurations() {
        let ids = [
            algorithm_id(8, 9, Precision::Simple),
            algorithm_id(8, 9, Precision::Double),
            algorithm_id(8, 9, Precision::Triple),
            algorithm_id(9, 8, Precision::Simple),
            algorithm_id(8, 8, Precision::Simple),
            algorithm_id(16, 17, Precision::Simple),
        ];

        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
