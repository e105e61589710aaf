use log::{debug, trace};

use super::region::DecompressRegion;
use crate::buffer::DestinationBuffer;
use crate::config::DecompressorConfig;
use crate::engine::{DecodeTarget, EngineHandle, JpegEngine, Role, TransformEngine};
use crate::error::{AllocationError, ArgumentError, DecompressionError, InitError, SourceError};
use crate::flags::Flags;
use crate::scaling::ScalingFactor;
use crate::tables;
use crate::types::{Colorspace, HeaderInfo, PixelFormat, Subsampling};

/// The stream currently bound to a decompressor.
#[derive(Debug, Clone, Copy)]
struct BoundJpeg<'src> {
    bytes: &'src [u8],
    header: HeaderInfo,
    format: PixelFormat,
}

/// Reusable JPEG decompressor with an owned destination.
///
/// Binding parses the header once and sizes the destination for a
/// full-resolution decode in the requested pixel format. Calls to
/// [`decompress`](Self::decompress) then decode into that buffer without
/// reallocating.
#[derive(Debug)]
pub struct DecompressorSession<'src, E: TransformEngine = JpegEngine> {
    handle: EngineHandle<E>,
    source: Option<BoundJpeg<'src>>,
    default_flags: Flags,
    destination: DestinationBuffer,
}

impl<'src> DecompressorSession<'src, JpegEngine> {
    /// Create a session backed by the default [`JpegEngine`].
    pub fn new() -> Result<Self, InitError> {
        Self::with_engine(JpegEngine)
    }
}

impl<'src, E: TransformEngine> DecompressorSession<'src, E> {
    pub fn with_engine(engine: E) -> Result<Self, InitError> {
        Self::with_config(engine, &DecompressorConfig::default())
    }

    /// Create a session backed by `engine`, applying `config`.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::Config`] for unknown flag bits,
    /// [`InitError::Allocation`] if the initial capacity cannot be reserved,
    /// and [`InitError::Engine`] if handle creation fails.
    pub fn with_config(engine: E, config: &DecompressorConfig) -> Result<Self, InitError> {
        let default_flags = config.flags.validate()?;

        let mut destination = DestinationBuffer::new();
        destination.ensure_capacity(config.initial_capacity)?;

        let handle = EngineHandle::acquire(engine, Role::Decompressor)?;

        Ok(Self {
            handle,
            source: None,
            default_flags,
            destination,
        })
    }

    /// Bind a JPEG stream and choose the pixel format to decode into.
    ///
    /// # Arguments
    ///
    /// * `jpeg` - Complete JPEG stream, borrowed until the next bind
    /// * `format` - Pixel format of the decoded output
    ///
    /// # Errors
    ///
    /// * [`SourceError::Argument`] - `jpeg` is empty, or the decoded image
    ///   would not fit in memory
    /// * [`SourceError::Format`] - the header cannot be parsed
    /// * [`SourceError::Allocation`] - the destination cannot grow
    /// * [`SourceError::Released`] - the session has been closed
    ///
    /// On error the previous binding, if any, stays in effect.
    pub fn set_source_image(&mut self, jpeg: &'src [u8], format: PixelFormat) -> Result<(), SourceError> {
        if self.handle.is_released() {
            return Err(SourceError::Released);
        }
        if jpeg.is_empty() {
            return Err(ArgumentError::EmptyBuffer.into());
        }

        let header = self
            .handle
            .run(|engine, handle| engine.decompress_header(handle, jpeg))?;
        let required = tables::decoded_size(header.width, header.height, format).ok_or(
            ArgumentError::ImageTooLarge {
                width: header.width,
                height: header.height,
            },
        )?;

        self.destination.ensure_capacity(required)?;
        self.destination.reset();
        self.source = Some(BoundJpeg {
            bytes: jpeg,
            header,
            format,
        });

        debug!(
            "Bound {}x{} {:?}/{:?} JPEG ({} bytes) for {:?} output, destination capacity {}",
            header.width,
            header.height,
            header.colorspace,
            header.subsampling,
            jpeg.len(),
            format,
            self.destination.capacity()
        );
        Ok(())
    }

    /// Decode the bound stream at full size into the start of the destination.
    ///
    /// # Returns
    ///
    /// `width * height * bytes_per_pixel` decoded bytes, borrowed from the
    /// session's destination.
    pub fn decompress(&mut self, flags: Flags) -> Result<&[u8], DecompressionError> {
        self.decompress_region(&DecompressRegion::default(), flags)
    }

    /// Decode the bound stream into a region of the destination.
    ///
    /// The output is scaled by the largest supported factor that fits
    /// `region.desired_width` x `region.desired_height`, and row `r` starts at
    /// byte `(region.y + r) * pitch + region.x * bytes_per_pixel`. The region
    /// only applies to this call.
    ///
    /// # Returns
    ///
    /// The destination up to the end of the last written row.
    ///
    /// # Errors
    ///
    /// * [`DecompressionError::Argument`] - unknown flags, no factor fits the
    ///   desired size, the pitch is too short for the offset row, or the region
    ///   ends past the destination capacity
    /// * [`DecompressionError::NoSourceBound`] - no stream has been bound
    /// * [`DecompressionError::Engine`] - the engine failed; the destination
    ///   is cleared, since the engine may already have overwritten the
    ///   previous result
    /// * [`DecompressionError::Released`] - the session has been closed
    pub fn decompress_region(
        &mut self,
        region: &DecompressRegion,
        flags: Flags,
    ) -> Result<&[u8], DecompressionError> {
        if self.handle.is_released() {
            return Err(DecompressionError::Released);
        }
        let flags = flags.validate()? | self.default_flags;
        let source = self.source.ok_or(DecompressionError::NoSourceBound)?;

        let layout = region.resolve(
            source.header.width,
            source.header.height,
            source.format,
            self.handle.engine().scaling_factors(),
        )?;
        let capacity = self.destination.capacity();
        if layout.end > capacity {
            return Err(ArgumentError::RegionOutOfBounds {
                required: layout.end,
                capacity,
            }
            .into());
        }

        let target = DecodeTarget {
            width: layout.width,
            pitch: layout.pitch,
            height: layout.height,
            format: source.format,
        };
        let dst = &mut self.destination.as_mut_slice()[layout.offset..layout.end];
        self.handle
            .run(|engine, handle| engine.decompress(handle, source.bytes, dst, &target, flags))?;

        self.destination.commit(layout.end);
        trace!(
            "Decompressed {}x{} at scale {}/{} into bytes {}..{}",
            layout.width,
            layout.height,
            layout.factor.num(),
            layout.factor.denom(),
            layout.offset,
            layout.end
        );
        Ok(self.destination.as_slice())
    }

    /// Scaling factors the engine can apply during decompression.
    pub fn scaling_factors(&self) -> &[ScalingFactor] {
        self.handle.engine().scaling_factors()
    }

    /// Output dimensions a decode constrained to the desired size would produce.
    ///
    /// A desired dimension of 0 leaves that axis unconstrained.
    pub fn scaled_dimensions(
        &self,
        desired_width: u32,
        desired_height: u32,
    ) -> Result<(u32, u32), DecompressionError> {
        let source = self.source.ok_or(DecompressionError::NoSourceBound)?;
        let region = DecompressRegion {
            desired_width,
            desired_height,
            ..Default::default()
        };
        let layout = region.resolve(
            source.header.width,
            source.header.height,
            source.format,
            self.scaling_factors(),
        )?;
        Ok((layout.width, layout.height))
    }

    pub fn scaled_width(&self, desired_width: u32, desired_height: u32) -> Result<u32, DecompressionError> {
        self.scaled_dimensions(desired_width, desired_height).map(|(w, _)| w)
    }

    pub fn scaled_height(&self, desired_width: u32, desired_height: u32) -> Result<u32, DecompressionError> {
        self.scaled_dimensions(desired_width, desired_height).map(|(_, h)| h)
    }

    /// Grow the destination so region decodes can target a larger canvas.
    ///
    /// Capacity never shrinks, and the last result stays valid.
    pub fn reserve_destination(&mut self, bytes: usize) -> Result<(), AllocationError> {
        self.destination.ensure_capacity(bytes).map(|_| ())
    }

    /// Width of the bound image, or 0 when nothing is bound.
    pub fn width(&self) -> u32 {
        self.source.map_or(0, |s| s.header.width)
    }

    /// Height of the bound image, or 0 when nothing is bound.
    pub fn height(&self) -> u32 {
        self.source.map_or(0, |s| s.header.height)
    }

    pub fn subsampling(&self) -> Option<Subsampling> {
        self.source.map(|s| s.header.subsampling)
    }

    pub fn colorspace(&self) -> Option<Colorspace> {
        self.source.map(|s| s.header.colorspace)
    }

    pub fn header(&self) -> Option<HeaderInfo> {
        self.source.map(|s| s.header)
    }

    /// Pixel format decoded output is written in.
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.source.map(|s| s.format)
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    /// The last successful result, empty after a new stream is bound.
    pub fn destination(&self) -> &[u8] {
        self.destination.as_slice()
    }

    pub fn capacity(&self) -> usize {
        self.destination.capacity()
    }

    /// Diagnostic from the most recent engine failure.
    pub fn last_error(&self) -> Option<&str> {
        self.handle.last_error()
    }

    /// Release the engine handle. Calling this more than once is harmless.
    pub fn close(&mut self) {
        self.handle.release();
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_released()
    }
}
