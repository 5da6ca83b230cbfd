use archmage::prelude::*;
use safe_unaligned_simd::x86_64::{_mm256_loadu_si256, _mm256_storeu_si256};

use crate::lut::{self, PermutationTable};
use crate::{GROUP_PIXELS, RleMaskBlock, SCANLINE_PIXELS, SENTINEL};

// ===========================================================================
// x86-64 AVX2: rite row implementation
// ===========================================================================

/// Compacts one scanline 8 lanes at a time with `vpermd`.
///
/// Each group is stored whole at `out[kept..kept + 8]`. `kept` never exceeds
/// the group's start index, so the store stays inside `out[..256]`; lanes past
/// the survivors are overwritten by the next group or left as garbage.
#[rite]
pub(super) fn encode_row_v3(
    _token: X64V3Token,
    scanline: &[u32; SCANLINE_PIXELS],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
    lut: &PermutationTable,
) -> usize {
    // The first group has no pixel to its left: shift in the sentinel.
    let mut head_prev = [SENTINEL; GROUP_PIXELS];
    head_prev[1..].copy_from_slice(&scanline[..GROUP_PIXELS - 1]);

    let (groups, _) = scanline.as_chunks::<GROUP_PIXELS>();
    let mut words = [0u64; 4];
    let mut kept = 0;
    for (g, group) in groups.iter().enumerate() {
        let start = g * GROUP_PIXELS;
        let prev = if g == 0 {
            _mm256_loadu_si256(&head_prev)
        } else {
            let p: &[u32; GROUP_PIXELS] = scanline[start - 1..start + 7].try_into().unwrap();
            _mm256_loadu_si256(p)
        };
        let curr = _mm256_loadu_si256(group);

        // lane i of the mask = pixel i equals its left neighbor
        let eq = _mm256_cmpeq_epi32(prev, curr);
        let mask = _mm256_movemask_ps(_mm256_castsi256_ps(eq)) as u8;

        let control = _mm256_loadu_si256(lut.row(mask));
        let packed = _mm256_permutevar8x32_epi32(curr, control);
        let dst: &mut [u32; GROUP_PIXELS] = (&mut out[kept..kept + 8]).try_into().unwrap();
        _mm256_storeu_si256(dst, packed);

        kept += PermutationTable::kept_count(mask);
        words[g / 8] |= u64::from(mask) << (8 * (g % 8));
    }
    *rle = RleMaskBlock(words);
    kept
}

// ===========================================================================
// x86-64 arcane dispatch target
// ===========================================================================

#[arcane]
pub(super) fn encode_row_impl_v3(
    t: X64V3Token,
    scanline: &[u32; SCANLINE_PIXELS],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
) -> Option<usize> {
    Some(encode_row_v3(t, scanline, out, rle, lut::table()))
}
