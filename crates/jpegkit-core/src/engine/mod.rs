//! Transform engine interface and handle ownership.
//!
//! Sessions never touch JPEG bitstreams themselves. They validate arguments,
//! size buffers, and hand fully specified requests to a [`TransformEngine`].
//!
//! # Handle lifetime
//!
//! An engine hands out one opaque handle per session. [`EngineHandle`] owns
//! that handle: it is acquired when the session is built and released exactly
//! once, either by an explicit `close()` or when the session is dropped.
//! Every engine call after release fails with [`HandleError::Released`].
//!
//! # Destination buffers
//!
//! Engines write into fixed-size `&mut [u8]` slices. They must report an error
//! when output does not fit; growing the destination is the session's job.

mod convert;
mod header;
mod jpeg;

use std::fmt;

use log::{debug, warn};

use crate::error::{EngineError, InitError};
use crate::flags::Flags;
use crate::scaling::ScalingFactor;
use crate::tables;
use crate::types::{HeaderInfo, PixelFormat, Subsampling};

pub use header::read_header;
pub use jpeg::{JpegEngine, JpegHandle};

/// A raw image as handed to [`TransformEngine::compress`].
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    /// Pixel rows. Holds at least `(height - 1) * pitch + width * bpp` bytes.
    pub pixels: &'a [u8],
    pub width: u32,
    /// Bytes between scanline starts, already resolved (never 0).
    pub pitch: usize,
    pub height: u32,
    pub format: PixelFormat,
}

/// Encoding parameters for one compress call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressParams {
    pub subsampling: Subsampling,
    pub quality: u8,
    pub flags: Flags,
}

/// Output layout for one decompress call.
///
/// `width` and `height` are the already-scaled output dimensions; they match
/// the source scaled by one of the engine's [`scaling_factors`](TransformEngine::scaling_factors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTarget {
    pub width: u32,
    /// Bytes between scanline starts, already resolved (never 0).
    pub pitch: usize,
    pub height: u32,
    pub format: PixelFormat,
}

/// Which session a handle was initialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Compressor,
    Decompressor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Compressor => f.write_str("compressor"),
            Role::Decompressor => f.write_str("decompressor"),
        }
    }
}

/// The bit-level JPEG codec a session drives.
pub trait TransformEngine {
    /// Per-session state, created by `init_*` and consumed by [`destroy`](Self::destroy).
    type Handle;

    fn init_compressor(&self) -> Result<Self::Handle, EngineError>;

    fn init_decompressor(&self) -> Result<Self::Handle, EngineError>;

    /// Release a handle. Called exactly once per handle.
    fn destroy(&self, handle: Self::Handle);

    /// Encode `source` into `dst`, returning the encoded length.
    ///
    /// `dst` has a fixed size; output that does not fit is an error.
    fn compress(
        &self,
        handle: &mut Self::Handle,
        source: &SourceImage<'_>,
        dst: &mut [u8],
        params: CompressParams,
    ) -> Result<usize, EngineError>;

    /// Parse the header of a JPEG stream.
    fn decompress_header(&self, handle: &mut Self::Handle, jpeg: &[u8]) -> Result<HeaderInfo, EngineError>;

    /// Decode `jpeg` into `dst` laid out as `target` describes.
    ///
    /// Row `r` starts at `dst[r * target.pitch]`; `dst` is at least
    /// `(target.height - 1) * target.pitch + target.width * bpp` bytes long.
    fn decompress(
        &self,
        handle: &mut Self::Handle,
        jpeg: &[u8],
        dst: &mut [u8],
        target: &DecodeTarget,
        flags: Flags,
    ) -> Result<(), EngineError>;

    /// Scaling ratios supported by [`decompress`](Self::decompress).
    fn scaling_factors(&self) -> &[ScalingFactor];

    /// Upper bound on the encoded size of an image.
    fn worst_case_size(&self, width: u32, height: u32, subsampling: Subsampling) -> Option<usize> {
        tables::worst_case_size(width, height, subsampling)
    }

    /// [`worst_case_size`](Self::worst_case_size) plus room for any
    /// component `format` adds beyond luma and two chroma planes.
    fn worst_case_size_for(
        &self,
        width: u32,
        height: u32,
        subsampling: Subsampling,
        format: PixelFormat,
    ) -> Option<usize> {
        self.worst_case_size(width, height, subsampling)?
            .checked_add(tables::extra_component_size(width, height, subsampling, format)?)
    }
}

/// Failure of a call routed through an [`EngineHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The handle was already released.
    Released,
    /// The engine reported an error.
    Engine(EngineError),
}

/// Owns an engine together with the one handle a session uses.
pub struct EngineHandle<E: TransformEngine> {
    engine: E,
    handle: Option<E::Handle>,
    role: Role,
    last_error: Option<String>,
}

impl<E: TransformEngine> EngineHandle<E> {
    /// Initialize a handle for `role`.
    pub fn acquire(engine: E, role: Role) -> Result<Self, InitError> {
        let handle = match role {
            Role::Compressor => engine.init_compressor()?,
            Role::Decompressor => engine.init_decompressor()?,
        };
        debug!("Acquired {} handle", role);
        Ok(Self {
            engine,
            handle: Some(handle),
            role,
            last_error: None,
        })
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    /// Diagnostic from the most recent failed engine call.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run an engine operation against the live handle.
    pub fn run<R>(
        &mut self,
        op: impl FnOnce(&E, &mut E::Handle) -> Result<R, EngineError>,
    ) -> Result<R, HandleError> {
        let handle = self.handle.as_mut().ok_or(HandleError::Released)?;
        match op(&self.engine, handle) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("{} engine call failed: {}", self.role, err);
                self.last_error = Some(err.message.clone());
                Err(HandleError::Engine(err))
            }
        }
    }

    /// Release the handle. Later calls are no-ops.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.engine.destroy(handle);
            debug!("Released {} handle", self.role);
        }
    }
}

impl<E: TransformEngine> Drop for EngineHandle<E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E: TransformEngine> fmt::Debug for EngineHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("role", &self.role)
            .field("released", &self.is_released())
            .field("last_error", &self.last_error)
            .finish()
    }
}
