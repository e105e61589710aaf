//! Error types for compressor and decompressor sessions.
//!
//! Every fallible session operation returns one of the enums below. Argument
//! checks always run before the transform engine is touched, so an
//! `ArgumentError` never leaves a session partially updated.

use thiserror::Error;

use crate::engine::HandleError;

/// Invalid parameters supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The source buffer holds no bytes.
    #[error("Source buffer is empty")]
    EmptyBuffer,

    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pitch is smaller than the bytes needed by one scanline.
    #[error("Invalid pitch: {pitch} bytes is less than the {minimum} bytes required per scanline")]
    InvalidPitch { pitch: usize, minimum: usize },

    /// The source buffer ends before the last scanline described by the geometry.
    #[error("Source buffer too small: geometry requires {required} bytes, got {actual}")]
    SourceTooSmall { required: usize, actual: usize },

    /// JPEG quality outside 1..=100.
    #[error("Invalid quality {0}: must be between 1 and 100")]
    QualityOutOfRange(u8),

    /// Numeric pixel format code with no matching format.
    #[error("Unknown pixel format code {0}")]
    UnknownPixelFormat(i32),

    /// Numeric subsampling code with no matching mode.
    #[error("Unknown subsampling code {0}")]
    UnknownSubsampling(i32),

    /// Numeric colorspace code with no matching colorspace.
    #[error("Unknown colorspace code {0}")]
    UnknownColorspace(i32),

    /// Flag bits outside the recognised set.
    #[error("Unknown flag bits {0:#x}")]
    UnknownFlags(u32),

    /// Buffer sizes derived from the geometry do not fit in memory.
    #[error("Image of {width}x{height} is too large to buffer")]
    ImageTooLarge { width: u32, height: u32 },

    /// No supported scaling factor fits the desired output size.
    #[error("Cannot scale a {width}x{height} image to fit within {desired_width}x{desired_height}")]
    CannotScale {
        width: u32,
        height: u32,
        desired_width: u32,
        desired_height: u32,
    },

    /// The requested output region extends past the committed destination capacity.
    #[error("Output region needs {required} bytes but the destination holds {capacity}")]
    RegionOutOfBounds { required: usize, capacity: usize },
}

/// The destination buffer could not be grown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not allocate a destination buffer of {requested} bytes")]
pub struct AllocationError {
    pub requested: usize,
}

/// Diagnostic reported by a transform engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from binding a source image to a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The source bytes do not start with a parseable JPEG header.
    #[error("Invalid JPEG header: {0}")]
    Format(String),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// The session's engine handle has already been released.
    #[error("Session has been closed")]
    Released,
}

/// Errors from [`CompressorSession::compress`](crate::CompressorSession::compress).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error("No source image is associated with this compressor")]
    NoSourceBound,

    #[error("JPEG quality has not been set")]
    QualityNotSet,

    #[error("JPEG compression failed: {0}")]
    Engine(String),

    #[error("Session has been closed")]
    Released,
}

/// Errors from [`DecompressorSession::decompress`](crate::DecompressorSession::decompress).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecompressionError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error("No JPEG image is associated with this decompressor")]
    NoSourceBound,

    #[error("JPEG decompression failed: {0}")]
    Engine(String),

    #[error("Session has been closed")]
    Released,
}

/// A session could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("Could not initialize transform engine: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid session configuration: {0}")]
    Config(#[from] ArgumentError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

impl From<HandleError> for CompressionError {
    fn from(err: HandleError) -> Self {
        match err {
            HandleError::Released => CompressionError::Released,
            HandleError::Engine(e) => CompressionError::Engine(e.message),
        }
    }
}

impl From<HandleError> for DecompressionError {
    fn from(err: HandleError) -> Self {
        match err {
            HandleError::Released => DecompressionError::Released,
            HandleError::Engine(e) => DecompressionError::Engine(e.message),
        }
    }
}

impl From<HandleError> for SourceError {
    fn from(err: HandleError) -> Self {
        match err {
            HandleError::Released => SourceError::Released,
            HandleError::Engine(e) => SourceError::Format(e.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_error_display() {
        let err = ArgumentError::QualityOutOfRange(101);
        assert_eq!(err.to_string(), "Invalid quality 101: must be between 1 and 100");

        let err = ArgumentError::InvalidPitch {
            pitch: 10,
            minimum: 12,
        };
        assert_eq!(
            err.to_string(),
            "Invalid pitch: 10 bytes is less than the 12 bytes required per scanline"
        );
    }

    #[test]
    fn test_engine_failure_maps_to_session_errors() {
        let failure = || HandleError::Engine(EngineError::new("Bogus marker length"));

        assert_eq!(
            CompressionError::from(failure()),
            CompressionError::Engine("Bogus marker length".to_string())
        );
        assert_eq!(
            DecompressionError::from(failure()),
            DecompressionError::Engine("Bogus marker length".to_string())
        );
        assert_eq!(
            SourceError::from(failure()),
            SourceError::Format("Bogus marker length".to_string())
        );
    }

    #[test]
    fn test_released_handle_maps_to_released() {
        assert_eq!(
            CompressionError::from(HandleError::Released),
            CompressionError::Released
        );
        assert_eq!(
            SourceError::from(HandleError::Released),
            SourceError::Released
        );
    }

    #[test]
    fn test_argument_error_is_transparent() {
        let err = CompressionError::from(ArgumentError::UnknownFlags(0x1));
        assert_eq!(err.to_string(), "Unknown flag bits 0x1");
    }
}
