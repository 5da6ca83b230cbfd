//! # rowdelta
//!
//! Left-neighbor delta encoding for fixed 256-pixel scanlines.
//!
//! Each pixel that equals the pixel to its left is flagged as a duplicate and
//! dropped; the survivors are packed, in order, into a compacted sequence. The
//! flags travel separately as an [`RleMaskBlock`] of four 64-bit words. The
//! first pixel of a row is compared against [`SENTINEL`] (0, transparent).
//!
//! The vector path compacts 8 lanes at a time with a precomputed permutation
//! table ([`lut`]) standing in for a hardware "compress" instruction. Supports
//! x86-64 AVX2 and ARM NEON with an output-identical scalar fallback.
//!
//! ## Core operations
//!
//! - [`encode_row`]: best available tier, falls back to scalar on its own.
//! - [`encode_row_simd`]: vector tier only; `Ok(None)` when there is none.
//! - [`encode_row_scalar`]: the scalar reference.
//! - [`decode_row`]: rebuilds the scanline from the compacted values and mask.
//!
//! ## Feature flags
//!
//! - **`simd`** (default): vector tiers. Without it [`encode_row_simd`]
//!   always returns `Ok(None)` and the permutation table is never built.
//!
//! Setting `ROWDELTA_FORCE_SCALAR=1` in the environment disables the vector
//! tiers at runtime.

#![forbid(unsafe_code)]

#[cfg_attr(not(feature = "simd"), allow(dead_code))]
mod env_config;
pub mod lut;
mod mask;
mod row;

pub use lut::PermutationTable;
pub use mask::RleMaskBlock;
pub use row::*;

/// Pixels per scanline.
pub const SCANLINE_PIXELS: usize = 256;

/// Pixels per vector group.
pub const GROUP_PIXELS: usize = 8;

/// Groups per scanline.
pub const SCANLINE_GROUPS: usize = SCANLINE_PIXELS / GROUP_PIXELS;

/// Implicit left neighbor of the first pixel in a scanline.
pub const SENTINEL: u32 = 0;

/// Caller contract violations.
///
/// Nothing is written to any output buffer when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// Scanline is not exactly [`SCANLINE_PIXELS`] pixels long.
    #[error("scanline must be 256 pixels, got {len}")]
    ScanlineLength { len: usize },

    /// Output buffer cannot hold a full scanline.
    #[error("output buffer must hold 256 pixels, got {len}")]
    OutputTooSmall { len: usize },

    /// Byte scanline is not aligned for `u32` access.
    #[error("byte scanline is not 4-byte aligned")]
    Misaligned,

    /// Compacted sequence ran out before every kept pixel was restored.
    #[error("compacted sequence has {available} values, mask needs {needed}")]
    Truncated { needed: usize, available: usize },
}
