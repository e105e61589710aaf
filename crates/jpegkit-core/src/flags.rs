//! Per-call option flags for compress and decompress operations.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;

/// Bitwise OR of option flags.
///
/// Bit values are compatible with TurboJPEG's `TJFLAG_*` constants, so codes
/// coming from other bindings can be passed through [`Flags::from_bits`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(u32);

impl Flags {
    /// No flags.
    pub const NONE: Flags = Flags(0);
    /// Scanlines are stored bottom-up instead of top-down.
    pub const BOTTOM_UP: Flags = Flags(2);
    /// Prefer fast chroma upsampling when decoding.
    pub const FAST_UPSAMPLE: Flags = Flags(256);
    /// The engine must fail rather than grow the destination buffer.
    pub const NO_REALLOC: Flags = Flags(1024);
    /// Prefer the fastest DCT/IDCT.
    pub const FAST_DCT: Flags = Flags(2048);
    /// Prefer the most accurate DCT/IDCT.
    pub const ACCURATE_DCT: Flags = Flags(4096);
    /// Treat recoverable warnings as errors.
    pub const STOP_ON_WARNING: Flags = Flags(8192);
    /// Produce a progressive JPEG.
    pub const PROGRESSIVE: Flags = Flags(16384);

    const KNOWN: u32 = Self::BOTTOM_UP.0
        | Self::FAST_UPSAMPLE.0
        | Self::NO_REALLOC.0
        | Self::FAST_DCT.0
        | Self::ACCURATE_DCT.0
        | Self::STOP_ON_WARNING.0
        | Self::PROGRESSIVE.0;

    /// Build flags from raw bits, rejecting bits with no meaning.
    pub fn from_bits(bits: u32) -> Result<Flags, ArgumentError> {
        if bits & !Self::KNOWN != 0 {
            return Err(ArgumentError::UnknownFlags(bits & !Self::KNOWN));
        }
        Ok(Flags(bits))
    }

    /// Raw bit value.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Re-check flags that may have been deserialized with stray bits.
    pub(crate) fn validate(self) -> Result<Flags, ArgumentError> {
        Flags::from_bits(self.0)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flags, &str); 7] = [
            (Flags::BOTTOM_UP, "BOTTOM_UP"),
            (Flags::FAST_UPSAMPLE, "FAST_UPSAMPLE"),
            (Flags::NO_REALLOC, "NO_REALLOC"),
            (Flags::FAST_DCT, "FAST_DCT"),
            (Flags::ACCURATE_DCT, "ACCURATE_DCT"),
            (Flags::STOP_ON_WARNING, "STOP_ON_WARNING"),
            (Flags::PROGRESSIVE, "PROGRESSIVE"),
        ];

        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        let unknown = self.0 & !Self::KNOWN;
        if unknown != 0 {
            set.entry(&format_args!("{unknown:#x}"));
        }
        set.finish()
    }
}
