//! Session configuration.
//!
//! Both configs are plain serde structs with defaults for every field, so they
//! can be loaded from any serde format with only the fields that matter set:
//!
//! ```json
//! { "quality": 85, "flags": 16384 }
//! ```
//!
//! Values are checked when a session is built from them, the same way the
//! matching setters check them.

use serde::{Deserialize, Serialize};

use crate::flags::Flags;

/// Presets applied by [`CompressorSession::with_config`](crate::CompressorSession::with_config).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CompressorConfig {
    /// Initial JPEG quality (1..=100). `None` leaves quality unset until
    /// `set_quality` is called.
    pub quality: Option<u8>,
    /// Flags OR-ed into every `compress` call.
    pub flags: Flags,
    /// Bytes to reserve for the destination up front.
    pub initial_capacity: usize,
}

/// Presets applied by [`DecompressorSession::with_config`](crate::DecompressorSession::with_config).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DecompressorConfig {
    /// Flags OR-ed into every `decompress` call.
    pub flags: Flags,
    /// Bytes to reserve for the destination up front.
    pub initial_capacity: usize,
}
