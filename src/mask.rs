use bytemuck::{Pod, Zeroable};

use crate::{GROUP_PIXELS, SCANLINE_GROUPS, SCANLINE_PIXELS};

const GROUPS_PER_WORD: usize = 64 / GROUP_PIXELS;

/// Per-pixel duplicate flags for one scanline.
///
/// Pixel `p` is flag bit `p % 64` of word `p / 64`. A set bit means the pixel
/// equals its left neighbor and was dropped from the compacted sequence.
/// Each 8-pixel group therefore owns one byte: group `g` is byte `g % 8` of
/// word `g / 8`, lowest pixel in the lowest bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct RleMaskBlock(pub [u64; 4]);

impl RleMaskBlock {
    /// Every pixel duplicates its neighbor (e.g. an all-zero row).
    pub const ALL_DUPLICATE: Self = Self([u64::MAX; 4]);

    /// No pixel duplicates its neighbor.
    pub const NONE_DUPLICATE: Self = Self([0; 4]);

    /// Whether `pixel` was dropped as a duplicate of its left neighbor.
    ///
    /// # Panics
    ///
    /// If `pixel >= 256`.
    #[inline]
    pub fn is_duplicate(&self, pixel: usize) -> bool {
        assert!(pixel < SCANLINE_PIXELS, "pixel {pixel} out of range");
        (self.0[pixel / 64] >> (pixel % 64)) & 1 == 1
    }

    /// Duplicate mask of 8-pixel group `group`.
    #[inline]
    pub fn group_mask(&self, group: usize) -> u8 {
        assert!(group < SCANLINE_GROUPS, "group {group} out of range");
        (self.0[group / GROUPS_PER_WORD] >> (8 * (group % GROUPS_PER_WORD))) as u8
    }

    /// Overwrite the duplicate mask of 8-pixel group `group`.
    #[inline]
    pub fn set_group_mask(&mut self, group: usize, mask: u8) {
        assert!(group < SCANLINE_GROUPS, "group {group} out of range");
        let shift = 8 * (group % GROUPS_PER_WORD);
        let word = &mut self.0[group / GROUPS_PER_WORD];
        *word = (*word & !(0xFFu64 << shift)) | (u64::from(mask) << shift);
    }

    /// Pixels kept in the compacted sequence (clear bits).
    #[inline]
    pub fn kept_count(&self) -> usize {
        self.0.iter().map(|w| (!w).count_ones() as usize).sum()
    }

    #[inline]
    pub fn as_words(&self) -> &[u64; 4] {
        &self.0
    }

    /// Flags in pixel order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..SCANLINE_PIXELS).map(|p| self.is_duplicate(p))
    }
}

impl From<[u64; 4]> for RleMaskBlock {
    fn from(words: [u64; 4]) -> Self {
        Self(words)
    }
}

impl From<RleMaskBlock> for [u64; 4] {
    fn from(block: RleMaskBlock) -> Self {
        block.0
    }
}
