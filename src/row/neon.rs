use core::arch::aarch64::{
    uint8x16x2_t, vaddq_u32, vaddvq_u32, vandq_u32, vceqq_u32, vdupq_n_u32, vmulq_n_u32,
    vqtbl2q_u8, vreinterpretq_u8_u32, vreinterpretq_u32_u8,
};

use archmage::prelude::*;
use safe_unaligned_simd::aarch64::{vld1q_u32, vst1q_u32};

use crate::lut::{self, PermutationTable};
use crate::{GROUP_PIXELS, RleMaskBlock, SCANLINE_PIXELS, SENTINEL};

// Weight of each lane in a 4-lane compare result.
const LANE_BITS: [u32; 4] = [1, 2, 4, 8];

// Lane index l -> bytes 4l, 4l+1, 4l+2, 4l+3 (little-endian u32).
const LANE_TO_BYTES_MUL: u32 = 0x0404_0404;
const LANE_TO_BYTES_ADD: u32 = 0x0302_0100;

#[inline(always)]
fn halves(v: &[u32; GROUP_PIXELS]) -> (&[u32; 4], &[u32; 4]) {
    let (lo, hi) = v.split_at(4);
    (lo.try_into().unwrap(), hi.try_into().unwrap())
}

// ===========================================================================
// ARM NEON: rite row implementation
// ===========================================================================

/// Compacts one scanline 8 lanes at a time: two 4-lane compares, and the LUT
/// row widened to byte indices for a 32-byte `tbl` gather.
///
/// Stores whole groups at `out[kept..kept + 8]`, same bound as the AVX2 tier.
#[rite]
pub(super) fn encode_row_arm_v2(
    _token: Arm64V2Token,
    scanline: &[u32; SCANLINE_PIXELS],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
    lut: &PermutationTable,
) -> usize {
    let lane_bits = vld1q_u32(&LANE_BITS);
    let byte_offsets = vdupq_n_u32(LANE_TO_BYTES_ADD);

    let mut head_prev = [SENTINEL; GROUP_PIXELS];
    head_prev[1..].copy_from_slice(&scanline[..GROUP_PIXELS - 1]);

    let (groups, _) = scanline.as_chunks::<GROUP_PIXELS>();
    let mut words = [0u64; 4];
    let mut kept = 0;
    for (g, group) in groups.iter().enumerate() {
        let start = g * GROUP_PIXELS;
        let prev: &[u32; GROUP_PIXELS] = if g == 0 {
            &head_prev
        } else {
            scanline[start - 1..start + 7].try_into().unwrap()
        };
        let (curr_lo, curr_hi) = halves(group);
        let (prev_lo, prev_hi) = halves(prev);
        let curr_lo = vld1q_u32(curr_lo);
        let curr_hi = vld1q_u32(curr_hi);

        let eq_lo = vceqq_u32(curr_lo, vld1q_u32(prev_lo));
        let eq_hi = vceqq_u32(curr_hi, vld1q_u32(prev_hi));
        let mask = (vaddvq_u32(vandq_u32(eq_lo, lane_bits))
            | (vaddvq_u32(vandq_u32(eq_hi, lane_bits)) << 4)) as u8;

        let (lanes_lo, lanes_hi) = halves(lut.row(mask));
        let idx_lo = vaddq_u32(vmulq_n_u32(vld1q_u32(lanes_lo), LANE_TO_BYTES_MUL), byte_offsets);
        let idx_hi = vaddq_u32(vmulq_n_u32(vld1q_u32(lanes_hi), LANE_TO_BYTES_MUL), byte_offsets);

        let table = uint8x16x2_t(vreinterpretq_u8_u32(curr_lo), vreinterpretq_u8_u32(curr_hi));
        let packed_lo = vreinterpretq_u32_u8(vqtbl2q_u8(table, vreinterpretq_u8_u32(idx_lo)));
        let packed_hi = vreinterpretq_u32_u8(vqtbl2q_u8(table, vreinterpretq_u8_u32(idx_hi)));

        let (dst_lo, dst_hi) = out[kept..kept + 8].split_at_mut(4);
        vst1q_u32(dst_lo.try_into().unwrap(), packed_lo);
        vst1q_u32(dst_hi.try_into().unwrap(), packed_hi);

        kept += PermutationTable::kept_count(mask);
        words[g / 8] |= u64::from(mask) << (8 * (g % 8));
    }
    *rle = RleMaskBlock(words);
    kept
}

// ===========================================================================
// ARM NEON arcane dispatch target
// ===========================================================================

#[arcane]
pub(super) fn encode_row_impl_arm_v2(
    t: Arm64V2Token,
    scanline: &[u32; SCANLINE_PIXELS],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
) -> Option<usize> {
    Some(encode_row_arm_v2(t, scanline, out, rle, lut::table()))
}
