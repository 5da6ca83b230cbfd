// ---------------------------------------------------------------------------
// Scanline delta encoding with SIMD dispatch.
//
// Architecture: #[rite] row functions contain the vector loops.
// #[arcane] wrappers are the incant! targets. The scalar incant! target
// reports "no vector tier"; the scalar reference encoder is separate and
// only runs when the caller asks for it (or through encode_row).
// ---------------------------------------------------------------------------

#[cfg(feature = "simd")]
use archmage::incant;

use crate::{RleMaskBlock, RowError, SCANLINE_PIXELS, SENTINEL};

mod scalar;
use scalar::*;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod avx2;
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
use avx2::*;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
mod neon;
#[cfg(all(feature = "simd", target_arch = "aarch64"))]
use neon::*;


// ===========================================================================
// Validation helpers
// ===========================================================================

#[inline]
fn check_scanline(scanline: &[u32]) -> Result<&[u32; SCANLINE_PIXELS], RowError> {
    scanline.try_into().map_err(|_| RowError::ScanlineLength {
        len: scanline.len(),
    })
}

#[inline]
fn check_output(len: usize) -> Result<(), RowError> {
    if len < SCANLINE_PIXELS {
        Err(RowError::OutputTooSmall { len })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Capability
// ===========================================================================

/// Whether [`encode_row_simd`] would run a vector tier right now.
///
/// False when the `simd` feature is off, when the host lacks AVX2 (x86-64)
/// or NEON (AArch64), or when `ROWDELTA_FORCE_SCALAR` is set.
pub fn accelerated() -> bool {
    #[cfg(feature = "simd")]
    {
        if crate::env_config::force_scalar() {
            return false;
        }
        #[cfg(target_arch = "x86_64")]
        {
            use archmage::SimdToken;
            archmage::X64V3Token::summon().is_some()
        }
        #[cfg(target_arch = "aarch64")]
        {
            use archmage::SimdToken;
            archmage::Arm64V2Token::summon().is_some()
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            false
        }
    }
    #[cfg(not(feature = "simd"))]
    {
        false
    }
}

// ===========================================================================
// Public API
// ===========================================================================

/// Encode one scanline on a vector tier.
///
/// Writes the kept pixels to the front of `out` and the duplicate flags to
/// `rle`, returning `Some(kept)`. Entries of `out` past `kept` are
/// unspecified: the vector tiers store whole 8-lane groups.
///
/// Returns `Ok(None)` without touching `out`, `rle` or the permutation table
/// when no vector tier is available (see [`accelerated`]). The caller then
/// runs [`encode_row_scalar`], which produces the same `rle` and the same
/// first `kept` values. [`encode_row`] does that for you.
pub fn encode_row_simd(
    scanline: &[u32],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
) -> Result<Option<usize>, RowError> {
    let scanline = check_scanline(scanline)?;
    check_output(out.len())?;
    #[cfg(feature = "simd")]
    {
        if crate::env_config::force_scalar() {
            return Ok(None);
        }
        Ok(incant!(
            encode_row_impl(scanline, out, rle),
            [v3, arm_v2, scalar]
        ))
    }
    #[cfg(not(feature = "simd"))]
    {
        let _ = (scanline, rle);
        Ok(None)
    }
}

/// Encode one scanline with the scalar reference loop.
///
/// Same contract as [`encode_row_simd`], always available, never touches
/// `out` past the returned length.
pub fn encode_row_scalar(
    scanline: &[u32],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
) -> Result<usize, RowError> {
    let scanline = check_scanline(scanline)?;
    check_output(out.len())?;
    Ok(encode_row_reference(scanline, out, rle))
}

/// Encode one scanline on the best available tier.
pub fn encode_row(
    scanline: &[u32],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
) -> Result<usize, RowError> {
    match encode_row_simd(scanline, out, rle)? {
        Some(kept) => Ok(kept),
        None => encode_row_scalar(scanline, out, rle),
    }
}

/// [`encode_row`] for a scanline held as native-endian bytes (4 per pixel).
///
/// `scanline` must be exactly 1024 bytes and 4-byte aligned.
/// [`RowError::ScanlineLength`] reports the length in whole pixels.
pub fn encode_row_bytes(
    scanline: &[u8],
    out: &mut [u32],
    rle: &mut RleMaskBlock,
) -> Result<usize, RowError> {
    if scanline.len() != SCANLINE_PIXELS * 4 {
        return Err(RowError::ScanlineLength {
            len: scanline.len() / 4,
        });
    }
    let pixels: &[u32] = bytemuck::try_cast_slice(scanline).map_err(|_| RowError::Misaligned)?;
    encode_row(pixels, out, rle)
}

/// Rebuild a scanline from its compacted values and duplicate flags.
///
/// A pixel flagged as duplicate repeats the pixel to its left ([`SENTINEL`]
/// for pixel 0); every other pixel takes the next unread compacted value.
/// Returns how many compacted values were consumed, so rows stored back to
/// back can be walked. Extra trailing values are left unread.
pub fn decode_row(
    compacted: &[u32],
    rle: &RleMaskBlock,
    out: &mut [u32],
) -> Result<usize, RowError> {
    check_output(out.len())?;
    let needed = rle.kept_count();
    if compacted.len() < needed {
        return Err(RowError::Truncated {
            needed,
            available: compacted.len(),
        });
    }

    // one kept flag per entry: `read` stays below `needed`
    let compacted = &compacted[..needed];
    let mut read = 0;
    let mut prev = SENTINEL;
    for (&word, pixels) in rle.as_words().iter().zip(out.chunks_exact_mut(64)) {
        for (bit, px) in pixels.iter_mut().enumerate() {
            if (word >> bit) & 1 == 0 {
                prev = compacted[read];
                read += 1;
            }
            *px = prev;
        }
    }
    debug_assert_eq!(read, needed);
    Ok(needed)
}
