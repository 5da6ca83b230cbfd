//! Lane-compaction permutation table.
//!
//! Row `m` lists, in ascending order, the lanes of an 8-lane group whose bit
//! is clear in duplicate mask `m`; those are the lanes that survive. The rest
//! of the row is padded with lane 0. The encoder only ever copies out the
//! first [`PermutationTable::kept_count`] gathered lanes, so the padding
//! value is never observed; lane 0 is used because it is a valid index for
//! every permute instruction.
//!
//! Entries are stored as `u32`, the control format `vpermd` consumes as-is.

use std::sync::OnceLock;

use crate::GROUP_PIXELS;

/// Number of distinct 8-bit duplicate masks.
pub const MASK_COUNT: usize = 256;

/// Maps a duplicate mask to the lane order that moves survivors to the front.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    rows: [[u32; GROUP_PIXELS]; MASK_COUNT],
}

impl PermutationTable {
    /// Full 8-entry row for `mask`, padding included.
    #[inline(always)]
    pub fn row(&self, mask: u8) -> &[u32; GROUP_PIXELS] {
        &self.rows[mask as usize]
    }

    /// Source lanes of the survivors for `mask`, without padding.
    #[inline]
    pub fn kept_lanes(&self, mask: u8) -> &[u32] {
        &self.rows[mask as usize][..Self::kept_count(mask)]
    }

    /// Lanes kept under `mask`: the number of clear bits.
    #[inline(always)]
    pub const fn kept_count(mask: u8) -> usize {
        (mask ^ 0xFF).count_ones() as usize
    }
}

impl core::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("rows", &MASK_COUNT)
            .finish_non_exhaustive()
    }
}

/// Build a fresh table.
///
/// Deterministic and side-effect free; most callers want [`table`] instead.
pub fn build() -> PermutationTable {
    let mut rows = [[0u32; GROUP_PIXELS]; MASK_COUNT];
    for (pattern, row) in rows.iter_mut().enumerate() {
        let mut kept = 0;
        for lane in 0..GROUP_PIXELS {
            // set bit = duplicate, skip it
            if pattern & (1 << lane) == 0 {
                row[kept] = lane as u32;
                kept += 1;
            }
        }
        // row[kept..] keeps its 0 padding
        log::trace!("lut mask {pattern:#04x} -> {row:?}");
    }
    PermutationTable { rows }
}

/// The process-wide table, built on first use.
///
/// Concurrent first callers block until the single build finishes.
pub fn table() -> &'static PermutationTable {
    static LUT: OnceLock<PermutationTable> = OnceLock::new();
    LUT.get_or_init(|| {
        let lut = build();
        log::debug!("built {MASK_COUNT}-entry lane permutation table");
        lut
    })
}

/// Force-build the shared table so the first row doesn't pay for it.
///
/// Safe to call any number of times; only the first call does work.
pub fn warmup() {
    let _ = table();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_and_empty_rows() {
        let lut = build();
        assert_eq!(lut.row(0x00), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(lut.row(0xFF), &[0; 8]);
        assert!(lut.kept_lanes(0xFF).is_empty());
    }

    #[test]
    fn rows_list_clear_bits_then_zero_padding() {
        let lut = build();
        for m in 0..=255u8 {
            let expected: Vec<u32> = (0..8).filter(|&b| m & (1 << b) == 0).collect();
            let kept = PermutationTable::kept_count(m);
            assert_eq!(kept, expected.len(), "mask={m:#04x}");
            assert_eq!(lut.kept_lanes(m), expected.as_slice(), "mask={m:#04x}");
            assert!(
                lut.row(m)[kept..].iter().all(|&lane| lane == 0),
                "padding mask={m:#04x}"
            );
        }
    }

    #[test]
    fn sample_rows() {
        let lut = build();
        // lanes 1 and 2 duplicate
        assert_eq!(lut.row(0b0000_0110), &[0, 3, 4, 5, 6, 7, 0, 0]);
        // only lane 7 kept
        assert_eq!(lut.row(0b0111_1111), &[7, 0, 0, 0, 0, 0, 0, 0]);
        // alternating
        assert_eq!(lut.row(0b1010_1010), &[0, 2, 4, 6, 0, 0, 0, 0]);
        // first and last lanes duplicate
        assert_eq!(lut.row(0b1000_0001), &[1, 2, 3, 4, 5, 6, 0, 0]);
        assert_eq!(PermutationTable::kept_count(0b1000_0001), 6);
    }

    #[test]
    fn repeated_builds_match() {
        let first = build();
        for _ in 0..4 {
            assert_eq!(build(), first);
        }
    }

    #[test]
    fn concurrent_first_use_builds_once() {
        let reference = build();
        let ptrs: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| table() as *const PermutationTable as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(ptrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(table(), &reference);
    }

    #[test]
    fn concurrent_builds_match() {
        let reference = build();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(build)).collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), reference);
            }
        });
    }
}
