//! Inverse square root strategies.
//!
//! Four interchangeable ways of computing `1/sqrt(x)` for a single `f32`,
//! each with its own accuracy/latency tradeoff:
//!
//! | strategy            | accuracy                    | domain                        |
//! |---------------------|-----------------------------|-------------------------------|
//! | [`LookupTable`]     | quantized, clamped to [0,1] | any input, silently clamped   |
//! | [`inv_sqrt_quake`]  | ~0.17% after one NR step    | positive normal floats        |
//! | [`inv_sqrt_hardware`] | ~12-bit estimate          | positive floats               |
//! | [`inv_sqrt_exact`]  | IEEE `1/sqrt(x)`            | `x >= 0`, `0` yields `inf`    |
//!
//! None of them signal errors. Out-of-domain input produces a type-valid but
//! numerically meaningless result, which is what callers measuring these
//! strategies want to observe.

use std::sync::OnceLock;

/// Number of slots in the precomputed table.
pub const TABLE_SIZE: usize = 10_000;

/// Magic seed constant for the bit-level approximation.
pub const QUAKE_MAGIC: u32 = 0x5f37_59df;

/// Precomputed `1/sqrt(i / TABLE_SIZE)` for `i` in `[1, TABLE_SIZE)`.
///
/// Lookups clamp their input to `[0.0, 1.0]` and quantize it with
/// `floor(x * (TABLE_SIZE - 1))`. Sums of squares above `1.0` therefore all
/// map to the top slot; this is the accuracy cost of a fixed-domain table and
/// widening it means rebuilding the table over a different range.
///
/// Slot 0 has no meaningful value (`1/sqrt(0)`), so it mirrors slot 1: inputs
/// that quantize to zero resolve to the lowest valid entry and stay finite.
#[derive(Debug, Clone)]
pub struct LookupTable {
    values: Box<[f32]>,
}

impl LookupTable {
    /// Build a fresh table.
    pub fn new() -> Self {
        let mut values = vec![0.0f32; TABLE_SIZE].into_boxed_slice();
        for (i, slot) in values.iter_mut().enumerate().skip(1) {
            *slot = 1.0 / (i as f32 / TABLE_SIZE as f32).sqrt();
        }
        values[0] = values[1];
        tracing::debug!(slots = TABLE_SIZE, "built inverse sqrt lookup table");
        Self { values }
    }

    /// Process-wide table, built on first use.
    pub fn shared() -> &'static LookupTable {
        static TABLE: OnceLock<LookupTable> = OnceLock::new();
        TABLE.get_or_init(LookupTable::new)
    }

    /// Clamp, quantize, load.
    #[inline]
    pub fn inv_sqrt(&self, x: f32) -> f32 {
        self.values[Self::index_of(x)]
    }

    /// Slot an input resolves to. NaN clamps to slot 0.
    #[inline]
    pub fn index_of(x: f32) -> usize {
        let clamped = if x > 1.0 {
            1.0
        } else if x >= 0.0 {
            x
        } else {
            0.0
        };
        (clamped * (TABLE_SIZE - 1) as f32) as usize
    }

    /// Raw table contents.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Table lookup against the shared table.
#[inline]
pub fn inv_sqrt_lookup(x: f32) -> f32 {
    LookupTable::shared().inv_sqrt(x)
}

/// Bit-level seed plus one Newton-Raphson step.
///
/// The float's bits are reinterpreted as an integer, halved, and subtracted
/// from [`QUAKE_MAGIC`]; the result is reinterpreted back and refined once
/// with `y * (1.5 - 0.5 * x * y * y)`. Relative error stays under ~0.175%
/// for positive normal inputs. Zero yields a huge but finite value;
/// negative, subnormal or NaN inputs yield garbage.
#[inline]
pub fn inv_sqrt_quake(x: f32) -> f32 {
    let half_x = 0.5 * x;
    let y = quake_seed(x);
    y * (1.5 - half_x * y * y)
}

/// Unrefined bit-level estimate.
#[inline]
fn quake_seed(x: f32) -> f32 {
    f32::from_bits(QUAKE_MAGIC.wrapping_sub(x.to_bits() >> 1))
}

/// Single-lane hardware reciprocal square root estimate.
///
/// Uses `rsqrtss` on x86 and `frsqrte` on aarch64, with no refinement step.
/// Targets without either fall back to [`inv_sqrt_exact`]; see
/// [`hardware_rsqrt_available`].
///
/// Zero and subnormal inputs, which both instructions map to `inf`, take the
/// unrefined bit-level seed instead so the scale factor stays finite.
#[inline]
pub fn inv_sqrt_hardware(x: f32) -> f32 {
    if x.abs() < f32::MIN_POSITIVE {
        return quake_seed(x);
    }
    rsqrt_native(x)
}

#[inline]
fn rsqrt_native(x: f32) -> f32 {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        // SAFETY: SSE and NEON are part of the x86_64 and aarch64 baselines.
        unsafe { rsqrt_estimate(x) }
    }

    #[cfg(target_arch = "x86")]
    {
        if std::is_x86_feature_detected!("sse") {
            // SAFETY: the `sse` feature was just detected.
            unsafe { rsqrt_estimate(x) }
        } else {
            inv_sqrt_exact(x)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
    {
        inv_sqrt_exact(x)
    }
}

#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
#[target_feature(enable = "sse")]
unsafe fn rsqrt_estimate(x: f32) -> f32 {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::{_mm_cvtss_f32, _mm_rsqrt_ss, _mm_set_ss};
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::{_mm_cvtss_f32, _mm_rsqrt_ss, _mm_set_ss};

    _mm_cvtss_f32(_mm_rsqrt_ss(_mm_set_ss(x)))
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn rsqrt_estimate(x: f32) -> f32 {
    use std::arch::aarch64::{vdup_n_f32, vget_lane_f32, vrsqrte_f32};

    vget_lane_f32::<0>(vrsqrte_f32(vdup_n_f32(x)))
}

/// Whether [`inv_sqrt_hardware`] runs a native estimate instruction on this
/// machine rather than the portable fallback.
pub fn hardware_rsqrt_available() -> bool {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        true
    }
    #[cfg(target_arch = "x86")]
    {
        std::is_x86_feature_detected!("sse")
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
    {
        false
    }
}

/// `1/sqrt(x)` with standard IEEE semantics; `0.0` yields `+inf`.
///
/// The root and the division run in `f64` and round to `f32` once.
#[inline]
pub fn inv_sqrt_exact(x: f32) -> f32 {
    (1.0 / f64::from(x).sqrt()) as f32
}
