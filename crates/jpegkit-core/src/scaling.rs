//! Decode-time scaling factors.
//!
//! JPEG decoders can scale during the inverse DCT for a handful of fixed
//! ratios. A [`TransformEngine`](crate::engine::TransformEngine) advertises the
//! ratios it supports and the decompressor picks the largest one whose output
//! fits inside the caller's desired dimensions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A `num / denom` scaling ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalingFactor {
    num: u32,
    denom: u32,
}

impl ScalingFactor {
    pub const ONE: ScalingFactor = ScalingFactor::new(1, 1);
    pub const HALF: ScalingFactor = ScalingFactor::new(1, 2);
    pub const QUARTER: ScalingFactor = ScalingFactor::new(1, 4);
    pub const EIGHTH: ScalingFactor = ScalingFactor::new(1, 8);

    /// Create a factor. A zero denominator is treated as 1.
    pub const fn new(num: u32, denom: u32) -> Self {
        let denom = if denom == 0 { 1 } else { denom };
        Self { num, denom }
    }

    #[inline]
    pub const fn num(self) -> u32 {
        self.num
    }

    #[inline]
    pub const fn denom(self) -> u32 {
        self.denom
    }

    /// Scale a dimension, rounding up so a non-empty image stays non-empty.
    pub fn scale(self, dimension: u32) -> u32 {
        // Deserialized factors skip `new`
        let denom = u64::from(self.denom.max(1));
        let scaled = (u64::from(dimension) * u64::from(self.num)).div_ceil(denom);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }

    /// Compare two factors by the ratio they represent.
    pub fn cmp_ratio(self, other: ScalingFactor) -> Ordering {
        let lhs = u64::from(self.num) * u64::from(other.denom);
        let rhs = u64::from(other.num) * u64::from(self.denom);
        lhs.cmp(&rhs)
    }
}

/// Pick the largest factor whose scaled image fits within the desired size.
///
/// A desired dimension of 0 means "use the source dimension", so passing
/// `(0, 0)` selects the largest factor that does not enlarge the image.
pub fn select_scaling_factor(
    width: u32,
    height: u32,
    desired_width: u32,
    desired_height: u32,
    factors: &[ScalingFactor],
) -> Option<ScalingFactor> {
    let max_width = if desired_width == 0 { width } else { desired_width };
    let max_height = if desired_height == 0 { height } else { desired_height };

    factors
        .iter()
        .copied()
        .filter(|factor| factor.scale(width) <= max_width && factor.scale(height) <= max_height)
        .max_by(|a, b| a.cmp_ratio(*b))
}
