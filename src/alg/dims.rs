//! Sampling-grid dimension selection.
//!
//! Hash length grows quadratically with the grid side, so a requested bit
//! count is generally not achievable exactly. The resolver picks the grid
//! whose single-direction bit count (sentinel included) lands nearest the
//! request, keeping width and height within one of each other.

/// Resolve a requested bit count to `(width, height)` of the sampling grid.
///
/// Ties and undershoots are broken toward the larger grid, so the hash comes
/// out slightly longer rather than slightly shorter when the request falls
/// between two achievable lengths.
///
/// Pure; validation of the result happens at hasher construction.
pub(crate) fn resolve(bit_resolution: u32) -> (u32, u32) {
    let b = bit_resolution;
    let d = (f64::from(b) + 1.0).sqrt().round() as u32;

    // Bit counts (sentinel included) of the candidate grids:
    // (d, d-1), (d, d) and (d, d+1).
    let lower = (d - 1) * (d - 1) + 1;
    let normal = (d - 1) * d + 1;
    let higher = (d - 1) * (d + 1) + 1;

    if lower >= b {
        (d, d - 1)
    } else if higher < b {
        (d + 1, d + 1)
    } else if normal < b || normal - b > higher - b {
        (d, d + 1)
    } else {
        (d, d)
    }
}

#[cfg(test)]
mod test {
    use super::resolve;

    #[test]
    fn documented_boundary_case() {
        // d = 3; lower = 5, normal = 7, higher = 9; 5 < 8 and 7 < 8 picks the taller grid
        assert_eq!(resolve(8), (3, 4));
    }

    #[test]
    fn common_resolutions() {
        // a 64-bit request lands exactly on 7 * 9 gradient bits + sentinel
        assert_eq!(resolve(64), (8, 9));
        assert_eq!(resolve(256), (16, 17));
        assert_eq!(resolve(3), (2, 2));
    }

    #[test]
    fn degenerate_requests_resolve_below_minimum() {
        // rejected later at hasher construction, never clamped here
        assert_eq!(resolve(1), (1, 0));
        assert_eq!(resolve(2), (2, 1));
    }

    #[test]
    fn grids_stay_near_square() {
        for b in 3..2000 {
            let (w, h) = resolve(b);
            assert!(w.abs_diff(h) <= 1, "resolve({b}) = ({w}, {h})");
            assert!(w >= 2 && h >= 2, "resolve({b}) = ({w}, {h})");
        }
    }

    #[test]
    fn achieved_length_tracks_the_request() {
        for b in 8..2000 {
            let (w, h) = resolve(b);
            let achieved = (w - 1) * h + 1;
            // the nearest achievable count is never further than one full row
            assert!(
                achieved.abs_diff(b) <= w,
                "resolve({b}) = ({w}, {h}), achieved {achieved}"
            );
        }
    }
}
