#[cfg(feature = "simd")]
use archmage::prelude::*;

use crate::{RleMaskBlock, SCANLINE_PIXELS, SENTINEL};

// ===========================================================================
// Scalar reference encoder
// ===========================================================================

/// One pass with a running left neighbor. Only writes `out[..kept]`.
pub(super) fn encode_row_reference(
    scanline: &[u32; SCANLINE_PIXELS],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
) -> usize {
    let mut words = [0u64; 4];
    let mut prev = SENTINEL;
    let mut kept = 0;
    for (p, &px) in scanline.iter().enumerate() {
        if px == prev {
            words[p / 64] |= 1 << (p % 64);
        } else {
            out[kept] = px;
            kept += 1;
        }
        prev = px;
    }
    *rle = RleMaskBlock(words);
    kept
}

// ===========================================================================
// Scalar dispatch target (incant!)
// ===========================================================================

/// No vector tier on this host: leave everything untouched.
#[cfg(feature = "simd")]
pub(super) fn encode_row_impl_scalar(
    _token: ScalarToken,
    _scanline: &[u32; SCANLINE_PIXELS],
    _out: &mut [u32],
    _rle: &mut RleMaskBlock,
) -> Option<usize> {
    None
}
