//! jpegkit Core - JPEG compressor and decompressor sessions
//!
//! This crate wraps a bit-level JPEG codec in two stateful sessions that own
//! their output buffers:
//!
//! - [`CompressorSession`] binds borrowed raw pixels, reserves the worst-case
//!   encoded size once, and encodes into that buffer without reallocating.
//! - [`DecompressorSession`] binds a borrowed JPEG stream, parses its header,
//!   and decodes (optionally scaled, optionally into a sub-region) into a
//!   buffer sized for the full image.
//!
//! The codec itself sits behind the [`TransformEngine`] trait. [`JpegEngine`]
//! is the default, pure-Rust implementation.

pub mod buffer;
pub mod config;
pub mod decode;
pub mod encode;
pub mod engine;
pub mod error;
pub mod flags;
pub mod scaling;
pub mod tables;
pub mod types;

#[cfg(test)]
mod test_prelude;

pub use config::{CompressorConfig, DecompressorConfig};
pub use decode::{DecompressRegion, DecompressorSession};
pub use encode::CompressorSession;
pub use engine::{JpegEngine, TransformEngine};
pub use error::{
    AllocationError, ArgumentError, CompressionError, DecompressionError, EngineError, InitError, SourceError,
};
pub use flags::Flags;
pub use scaling::ScalingFactor;
pub use tables::worst_case_size;
pub use types::{Colorspace, HeaderInfo, ImageGeometry, PixelFormat, Subsampling};
