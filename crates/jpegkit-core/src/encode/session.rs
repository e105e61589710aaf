use log::{debug, trace};

use crate::buffer::DestinationBuffer;
use crate::config::CompressorConfig;
use crate::engine::{CompressParams, EngineHandle, JpegEngine, Role, SourceImage, TransformEngine};
use crate::error::{ArgumentError, CompressionError, EngineError, InitError, SourceError};
use crate::flags::Flags;
use crate::tables;
use crate::types::{ImageGeometry, PixelFormat, Subsampling};

/// The image currently bound to a compressor.
#[derive(Debug, Clone, Copy)]
struct BoundSource<'src> {
    image: SourceImage<'src>,
    subsampling: Subsampling,
}

/// Reusable JPEG compressor with an owned, pre-sized destination.
///
/// The session borrows the source pixels for as long as they stay bound, so
/// the borrow checker rules out freeing or mutating them mid-session. The
/// destination is sized for the worst case when a source is bound; encoding
/// never reallocates.
///
/// The engine handle is released by [`close`](Self::close) or on drop,
/// whichever comes first.
#[derive(Debug)]
pub struct CompressorSession<'src, E: TransformEngine = JpegEngine> {
    handle: EngineHandle<E>,
    source: Option<BoundSource<'src>>,
    quality: Option<u8>,
    default_flags: Flags,
    destination: DestinationBuffer,
    compressed_size: usize,
}

impl<'src> CompressorSession<'src, JpegEngine> {
    /// Create a session backed by the default [`JpegEngine`].
    ///
    /// # Errors
    ///
    /// Returns [`InitError`] if the engine cannot allocate a compressor handle.
    pub fn new() -> Result<Self, InitError> {
        Self::with_engine(JpegEngine)
    }
}

impl<'src, E: TransformEngine> CompressorSession<'src, E> {
    /// Create a session backed by `engine` with default configuration.
    pub fn with_engine(engine: E) -> Result<Self, InitError> {
        Self::with_config(engine, &CompressorConfig::default())
    }

    /// Create a session backed by `engine`, applying `config`.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::Config`] for an out-of-range preset quality or
    /// unknown flag bits, [`InitError::Allocation`] if the initial capacity
    /// cannot be reserved, and [`InitError::Engine`] if handle creation fails.
    pub fn with_config(engine: E, config: &CompressorConfig) -> Result<Self, InitError> {
        let quality = config.quality.map(validate_quality).transpose()?;
        let default_flags = config.flags.validate()?;

        let mut destination = DestinationBuffer::new();
        destination.ensure_capacity(config.initial_capacity)?;

        let handle = EngineHandle::acquire(engine, Role::Compressor)?;

        Ok(Self {
            handle,
            source: None,
            quality,
            default_flags,
            destination,
            compressed_size: 0,
        })
    }

    /// Bind a raw image to compress.
    ///
    /// # Arguments
    ///
    /// * `pixels` - Scanlines of the source image, borrowed until the next bind
    /// * `width` - Image width in pixels
    /// * `pitch` - Bytes between scanline starts, or 0 for `width * bytes_per_pixel`
    /// * `height` - Image height in pixels
    /// * `format` - Channel layout of `pixels`
    /// * `subsampling` - Chroma subsampling of the JPEG to produce
    ///
    /// The destination is grown to the worst-case encoded size if it is too
    /// small and otherwise reused. The last result is discarded either way.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Argument`] for an empty buffer, a zero dimension,
    /// a pitch shorter than one scanline, or a buffer that ends before the last
    /// scanline. Returns [`SourceError::Allocation`] if the destination cannot
    /// grow. On error the previous binding is left in place.
    pub fn set_source_image(
        &mut self,
        pixels: &'src [u8],
        width: u32,
        pitch: usize,
        height: u32,
        format: PixelFormat,
        subsampling: Subsampling,
    ) -> Result<(), SourceError> {
        if self.handle.is_released() {
            return Err(SourceError::Released);
        }

        let geometry = validate_geometry(pixels, width, pitch, height, format)?;
        let required = self
            .handle
            .engine()
            .worst_case_size_for(width, height, subsampling, format)
            .ok_or(ArgumentError::ImageTooLarge { width, height })?;

        self.destination.ensure_capacity(required)?;
        self.destination.reset();
        self.source = Some(BoundSource {
            image: SourceImage {
                pixels,
                width,
                pitch: geometry.pitch,
                height,
                format,
            },
            subsampling,
        });

        debug!(
            "Bound {}x{} {:?} source (pitch {}) for {:?}, destination capacity {}",
            width,
            height,
            format,
            geometry.pitch,
            subsampling,
            self.destination.capacity()
        );
        Ok(())
    }

    /// Set the JPEG quality used by later [`compress`](Self::compress) calls.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::QualityOutOfRange`] unless `quality` is in
    /// 1..=100. The previous quality is kept.
    pub fn set_quality(&mut self, quality: u8) -> Result<(), ArgumentError> {
        self.quality = Some(validate_quality(quality)?);
        Ok(())
    }

    /// Encode the bound image into the destination.
    ///
    /// `flags` are combined with the configured defaults. The engine is always
    /// told not to reallocate, so the output must fit the capacity reserved at
    /// bind time.
    ///
    /// # Returns
    ///
    /// The encoded JPEG, borrowed from the session's destination.
    ///
    /// # Errors
    ///
    /// * [`CompressionError::Argument`] - unknown flag bits
    /// * [`CompressionError::NoSourceBound`] - no image has been bound
    /// * [`CompressionError::QualityNotSet`] - quality has not been set
    /// * [`CompressionError::Engine`] - the engine failed; the destination
    ///   and [`compressed_size`](Self::compressed_size) are cleared, since the
    ///   engine may already have overwritten the previous result
    /// * [`CompressionError::Released`] - the session has been closed
    pub fn compress(&mut self, flags: Flags) -> Result<&[u8], CompressionError> {
        if self.handle.is_released() {
            return Err(CompressionError::Released);
        }
        let flags = flags.validate()?;
        let source = self.source.ok_or(CompressionError::NoSourceBound)?;
        let quality = self.quality.ok_or(CompressionError::QualityNotSet)?;

        let params = CompressParams {
            subsampling: source.subsampling,
            quality,
            flags: flags | self.default_flags | Flags::NO_REALLOC,
        };
        self.compressed_size = 0;
        let dst = self.destination.as_mut_slice();
        let capacity = dst.len();

        let len = self.handle.run(|engine, handle| {
            let len = engine.compress(handle, &source.image, dst, params)?;
            if len > capacity {
                return Err(EngineError::new(format!(
                    "Engine reported {} bytes for a {} byte destination",
                    len, capacity
                )));
            }
            Ok(len)
        })?;

        self.destination.commit(len);
        self.compressed_size = len;
        trace!("Compressed into {} of {} bytes", len, capacity);
        Ok(self.destination.as_slice())
    }

    /// Length of the last successful compression, or 0 if there was none.
    ///
    /// Binding a new source does not clear this value; a failed compression
    /// does.
    pub fn compressed_size(&self) -> usize {
        self.compressed_size
    }

    /// The last successful result, empty after a new source is bound.
    pub fn destination(&self) -> &[u8] {
        self.destination.as_slice()
    }

    /// Committed destination capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.destination.capacity()
    }

    pub fn geometry(&self) -> Option<ImageGeometry> {
        self.source.map(|s| ImageGeometry {
            width: s.image.width,
            height: s.image.height,
            pitch: s.image.pitch,
        })
    }

    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.source.map(|s| s.image.format)
    }

    pub fn subsampling(&self) -> Option<Subsampling> {
        self.source.map(|s| s.subsampling)
    }

    pub fn quality(&self) -> Option<u8> {
        self.quality
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some()
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

fn validate_quality(quality: u8) -> Result<u8, ArgumentError> {
    if (1..=100).contains(&quality) {
        Ok(quality)
    } else {
        Err(ArgumentError::QualityOutOfRange(quality))
    }
}

/// Check a raw image against its declared geometry and resolve the pitch.
fn validate_geometry(
    pixels: &[u8],
    width: u32,
    pitch: usize,
    height: u32,
    format: PixelFormat,
) -> Result<ImageGeometry, ArgumentError> {
    if pixels.is_empty() {
        return Err(ArgumentError::EmptyBuffer);
    }
    if width == 0 || height == 0 {
        return Err(ArgumentError::InvalidDimensions { width, height });
    }

    let row_bytes = usize::try_from(width)
        .ok()
        .and_then(|w| w.checked_mul(format.bytes_per_pixel()))
        .ok_or(ArgumentError::ImageTooLarge { width, height })?;
    let pitch = if pitch == 0 { row_bytes } else { pitch };
    if pitch < row_bytes {
        return Err(ArgumentError::InvalidPitch {
            pitch,
            minimum: row_bytes,
        });
    }

    let required =
        tables::image_extent(row_bytes, pitch, height).ok_or(ArgumentError::ImageTooLarge { width, height })?;
    if pixels.len() < required {
        return Err(ArgumentError::SourceTooSmall {
            required,
            actual: pixels.len(),
        });
    }

    Ok(ImageGeometry { width, height, pitch })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::{gradient, init_logging, mean_abs_diff, noise, MockEngine};

    fn rgb_session(pixels: &[u8], width: u32, height: u32) -> CompressorSession<'_> {
        let mut session = CompressorSession::new().unwrap();
        session
            .set_source_image(pixels, width, 0, height, PixelFormat::Rgb, Subsampling::S420)
            .unwrap();
        session
    }

    #[test]
    fn test_quality_boundaries() {
        let mut session = CompressorSession::new().unwrap();
        assert_eq!(session.set_quality(0), Err(ArgumentError::QualityOutOfRange(0)));
        assert_eq!(session.set_quality(101), Err(ArgumentError::QualityOutOfRange(101)));
        assert_eq!(session.quality(), None);

        assert!(session.set_quality(1).is_ok());
        assert!(session.set_quality(100).is_ok());
        assert_eq!(session.quality(), Some(100));

        // A rejected value keeps the previous one
        assert!(session.set_quality(200).is_err());
        assert_eq!(session.quality(), Some(100));
    }

    #[test]
    fn test_compress_without_source() {
        let mut session = CompressorSession::new().unwrap();
        session.set_quality(90).unwrap();
        assert_eq!(session.compress(Flags::NONE), Err(CompressionError::NoSourceBound));
    }

    #[test]
    fn test_compress_without_quality() {
        let pixels = gradient(16, 16, PixelFormat::Rgb);
        let mut session = rgb_session(&pixels, 16, 16);
        assert_eq!(session.compress(Flags::NONE), Err(CompressionError::QualityNotSet));
    }

    #[test]
    fn test_rejects_invalid_sources() {
        let pixels = gradient(16, 16, PixelFormat::Rgb);
        let mut session = CompressorSession::new().unwrap();

        let empty = session.set_source_image(&[], 16, 0, 16, PixelFormat::Rgb, Subsampling::S444);
        assert_eq!(empty, Err(SourceError::Argument(ArgumentError::EmptyBuffer)));

        let zero = session.set_source_image(&pixels, 0, 0, 16, PixelFormat::Rgb, Subsampling::S444);
        assert!(matches!(
            zero,
            Err(SourceError::Argument(ArgumentError::InvalidDimensions { .. }))
        ));

        let narrow = session.set_source_image(&pixels, 16, 47, 16, PixelFormat::Rgb, Subsampling::S444);
        assert_eq!(
            narrow,
            Err(SourceError::Argument(ArgumentError::InvalidPitch {
                pitch: 47,
                minimum: 48
            }))
        );

        let short = session.set_source_image(&pixels, 16, 0, 17, PixelFormat::Rgb, Subsampling::S444);
        assert!(matches!(
            short,
            Err(SourceError::Argument(ArgumentError::SourceTooSmall { .. }))
        ));

        assert!(!session.is_bound());
        assert_eq!(session.capacity(), 0);
    }

    #[test]
    fn test_failed_bind_keeps_previous_source() {
        let pixels = gradient(16, 16, PixelFormat::Rgb);
        let mut session = rgb_session(&pixels, 16, 16);

        assert!(session
            .set_source_image(&pixels, 16, 10, 16, PixelFormat::Rgb, Subsampling::S444)
            .is_err());
        assert_eq!(session.subsampling(), Some(Subsampling::S420));
        assert_eq!(
            session.geometry(),
            Some(ImageGeometry {
                width: 16,
                height: 16,
                pitch: 48
            })
        );
    }

    #[test]
    fn test_capacity_covers_worst_case() {
        let pixels = gradient(33, 17, PixelFormat::Rgb);
        let session = rgb_session(&pixels, 33, 17);
        let bound = tables::worst_case_size(33, 17, Subsampling::S420).unwrap();
        assert!(session.capacity() >= bound);
    }

    #[test]
    fn test_cmyk_noise_fits_subsampled_capacity() {
        init_logging();
        let pixels = noise(128, 128, PixelFormat::Cmyk, 7);
        let mut session = CompressorSession::new().unwrap();
        session.set_quality(100).unwrap();

        for subsampling in [Subsampling::S444, Subsampling::S420, Subsampling::S411, Subsampling::S441] {
            session
                .set_source_image(&pixels, 128, 0, 128, PixelFormat::Cmyk, subsampling)
                .unwrap();
            let capacity = session.capacity();
            for flags in [Flags::NONE, Flags::PROGRESSIVE] {
                let len = session.compress(flags).unwrap().len();
                assert!(len <= capacity, "{:?} {:?}: {} > {}", subsampling, flags, len, capacity);
            }
        }
    }

    #[test]
    fn test_cmyk_capacity_includes_black_plane() {
        let pixels = gradient(16, 16, PixelFormat::Cmyk);
        let mut session = CompressorSession::new().unwrap();
        session
            .set_source_image(&pixels, 16, 0, 16, PixelFormat::Cmyk, Subsampling::S420)
            .unwrap();
        let bound = tables::worst_case_size(16, 16, Subsampling::S420).unwrap();
        assert_eq!(session.capacity(), bound + 16 * 16 * 2);
    }

    #[test]
    fn test_rebind_same_geometry_reuses_capacity() {
        let pixels = gradient(32, 32, PixelFormat::Rgb);
        let mut session = rgb_session(&pixels, 32, 32);
        session.set_quality(75).unwrap();
        session.compress(Flags::NONE).unwrap();
        let capacity = session.capacity();
        let size = session.compressed_size();

        session
            .set_source_image(&pixels, 32, 0, 32, PixelFormat::Rgb, Subsampling::S420)
            .unwrap();
        assert_eq!(session.capacity(), capacity);
        assert!(session.destination().is_empty());
        // The recorded size survives until the next successful compress
        assert_eq!(session.compressed_size(), size);
    }

    #[test]
    fn test_zero_pitch_matches_explicit_pitch() {
        let pixels = gradient(40, 24, PixelFormat::Bgrx);

        let mut derived = CompressorSession::new().unwrap();
        derived
            .set_source_image(&pixels, 40, 0, 24, PixelFormat::Bgrx, Subsampling::S422)
            .unwrap();
        derived.set_quality(85).unwrap();

        let mut explicit = CompressorSession::new().unwrap();
        explicit
            .set_source_image(&pixels, 40, 40 * 4, 24, PixelFormat::Bgrx, Subsampling::S422)
            .unwrap();
        explicit.set_quality(85).unwrap();

        assert_eq!(derived.geometry(), explicit.geometry());
        assert_eq!(
            derived.compress(Flags::NONE).unwrap(),
            explicit.compress(Flags::NONE).unwrap()
        );
    }

    #[test]
    fn test_padded_pitch_matches_packed() {
        let packed = gradient(20, 10, PixelFormat::Rgb);
        let mut padded = vec![0u8; 64 * 10];
        for (row, chunk) in packed.chunks_exact(60).enumerate() {
            padded[row * 64..row * 64 + 60].copy_from_slice(chunk);
        }

        let mut a = CompressorSession::new().unwrap();
        a.set_source_image(&packed, 20, 0, 10, PixelFormat::Rgb, Subsampling::S444)
            .unwrap();
        a.set_quality(90).unwrap();

        let mut b = CompressorSession::new().unwrap();
        b.set_source_image(&padded, 20, 64, 10, PixelFormat::Rgb, Subsampling::S444)
            .unwrap();
        b.set_quality(90).unwrap();

        assert_eq!(a.compress(Flags::NONE).unwrap(), b.compress(Flags::NONE).unwrap());
    }

    #[test]
    fn test_quality_50_420_fits_worst_case() {
        init_logging();
        let pixels = gradient(123, 77, PixelFormat::Rgb);
        let mut session = rgb_session(&pixels, 123, 77);
        session.set_quality(50).unwrap();

        let jpeg = session.compress(Flags::NONE).unwrap();
        assert!(!jpeg.is_empty());
        assert!(jpeg.len() <= tables::worst_case_size(123, 77, Subsampling::S420).unwrap());
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_compress_is_deterministic() {
        let pixels = gradient(48, 48, PixelFormat::Rgb);
        let mut session = rgb_session(&pixels, 48, 48);
        session.set_quality(80).unwrap();

        let first = session.compress(Flags::NONE).unwrap().to_vec();
        let second = session.compress(Flags::NONE).unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(session.compressed_size(), first.len());
        assert_eq!(session.destination(), first.as_slice());
    }

    #[test]
    fn test_output_decodes_with_independent_decoder() {
        let pixels = gradient(64, 40, PixelFormat::Rgb);
        let mut session = CompressorSession::new().unwrap();
        session
            .set_source_image(&pixels, 64, 0, 40, PixelFormat::Rgb, Subsampling::S444)
            .unwrap();
        session.set_quality(100).unwrap();
        let jpeg = session.compress(Flags::NONE).unwrap();

        let decoded = image::load_from_memory_with_format(jpeg, image::ImageFormat::Jpeg)
            .unwrap()
            .to_rgb8();
        assert_eq!(decoded.dimensions(), (64, 40));
        assert!(mean_abs_diff(decoded.as_raw(), &pixels) < 3.0);
    }

    #[test]
    fn test_progressive_output_decodes() {
        let pixels = gradient(32, 32, PixelFormat::Rgb);
        let mut session = rgb_session(&pixels, 32, 32);
        session.set_quality(90).unwrap();

        let baseline = session.compress(Flags::NONE).unwrap().to_vec();
        let progressive = session.compress(Flags::PROGRESSIVE).unwrap().to_vec();
        assert_ne!(baseline, progressive);

        let decoded = image::load_from_memory_with_format(&progressive, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn test_bottom_up_matches_flipped_rows() {
        let pixels = gradient(24, 16, PixelFormat::Rgb);
        let flipped: Vec<u8> = pixels.chunks_exact(24 * 3).rev().flatten().copied().collect();

        let mut a = CompressorSession::new().unwrap();
        a.set_source_image(&pixels, 24, 0, 16, PixelFormat::Rgb, Subsampling::S444)
            .unwrap();
        a.set_quality(90).unwrap();

        let mut b = CompressorSession::new().unwrap();
        b.set_source_image(&flipped, 24, 0, 16, PixelFormat::Rgb, Subsampling::S444)
            .unwrap();
        b.set_quality(90).unwrap();

        assert_eq!(a.compress(Flags::BOTTOM_UP).unwrap(), b.compress(Flags::NONE).unwrap());
    }

    #[test]
    fn test_unknown_flags_rejected() {
        let pixels = gradient(8, 8, PixelFormat::Rgb);
        let mut session = rgb_session(&pixels, 8, 8);
        session.set_quality(90).unwrap();
        let flags = serde_json::from_str::<Flags>("1").unwrap();
        assert_eq!(
            session.compress(flags),
            Err(CompressionError::Argument(ArgumentError::UnknownFlags(1)))
        );
    }

    #[test]
    fn test_every_format_compresses() {
        for format in PixelFormat::ALL {
            let subsampling = if format == PixelFormat::Cmyk {
                Subsampling::S444
            } else {
                Subsampling::S420
            };
            let pixels = gradient(20, 12, format);
            let mut session = CompressorSession::new().unwrap();
            session
                .set_source_image(&pixels, 20, 0, 12, format, subsampling)
                .unwrap();
            session.set_quality(75).unwrap();
            let jpeg = session.compress(Flags::NONE).unwrap();
            assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "{:?}", format);
        }
    }

    #[test]
    fn test_cmyk_cannot_be_gray() {
        let pixels = gradient(8, 8, PixelFormat::Cmyk);
        let mut session = CompressorSession::new().unwrap();
        session
            .set_source_image(&pixels, 8, 0, 8, PixelFormat::Cmyk, Subsampling::Gray)
            .unwrap();
        session.set_quality(75).unwrap();
        assert!(matches!(session.compress(Flags::NONE), Err(CompressionError::Engine(_))));
        assert!(session.last_error().is_some());
    }

    #[test]
    fn test_engine_failure_clears_result() {
        let engine = MockEngine::default();
        let fail = engine.fail_calls.clone();
        let pixels = gradient(8, 8, PixelFormat::Rgb);

        let mut session = CompressorSession::with_engine(engine).unwrap();
        session
            .set_source_image(&pixels, 8, 0, 8, PixelFormat::Rgb, Subsampling::S444)
            .unwrap();
        session.set_quality(90).unwrap();
        let size = session.compress(Flags::NONE).unwrap().len();

        fail.set(true);
        let err = session.compress(Flags::NONE).unwrap_err();
        assert_eq!(err, CompressionError::Engine("Simulated engine failure".to_string()));
        assert!(size > 0);
        assert_eq!(session.compressed_size(), 0);
        assert!(session.destination().is_empty());
        assert_eq!(session.last_error(), Some("Simulated engine failure"));

        fail.set(false);
        assert_eq!(session.compress(Flags::NONE).unwrap().len(), size);
        assert_eq!(session.compressed_size(), size);
    }

    #[test]
    fn test_jpeg_engine_failure_clears_result() {
        let small = gradient(8, 8, PixelFormat::Gray);
        let wide = vec![0x80u8; 70_000];
        let mut session = CompressorSession::new().unwrap();
        session.set_quality(80).unwrap();
        session
            .set_source_image(&small, 8, 0, 8, PixelFormat::Gray, Subsampling::Gray)
            .unwrap();
        let size = session.compress(Flags::NONE).unwrap().len();
        assert_eq!(session.compressed_size(), size);

        // Binds fine, but JPEG frames cannot hold a 70000 pixel width
        session
            .set_source_image(&wide, 70_000, 0, 1, PixelFormat::Gray, Subsampling::Gray)
            .unwrap();
        assert_eq!(session.compressed_size(), size);
        assert!(matches!(session.compress(Flags::NONE), Err(CompressionError::Engine(_))));
        assert_eq!(session.compressed_size(), 0);
        assert!(session.destination().is_empty());
        assert!(session.last_error().is_some_and(|msg| msg.contains("65535")));
    }

    #[test]
    fn test_close_is_idempotent() {
        let engine = MockEngine::default();
        let destroyed = engine.destroyed.clone();
        let pixels = gradient(8, 8, PixelFormat::Rgb);

        let mut session = CompressorSession::with_engine(engine).unwrap();
        session.set_quality(90).unwrap();
        session.close();
        session.close();
        assert!(session.is_closed());
        assert_eq!(
            session.set_source_image(&pixels, 8, 0, 8, PixelFormat::Rgb, Subsampling::S444),
            Err(SourceError::Released)
        );
        assert_eq!(session.compress(Flags::NONE), Err(CompressionError::Released));
        drop(session);

        assert_eq!(destroyed.get(), 1);
    }

    #[test]
    fn test_config_presets() {
        let config = CompressorConfig {
            quality: Some(70),
            flags: Flags::PROGRESSIVE,
            initial_capacity: 4096,
        };
        let pixels = gradient(16, 16, PixelFormat::Gray);
        let mut session = CompressorSession::with_config(JpegEngine, &config).unwrap();
        assert_eq!(session.quality(), Some(70));
        assert_eq!(session.capacity(), 4096);

        session
            .set_source_image(&pixels, 16, 0, 16, PixelFormat::Gray, Subsampling::Gray)
            .unwrap();
        assert!(session.compress(Flags::NONE).is_ok());
    }

    #[test]
    fn test_config_rejects_bad_quality() {
        let config = CompressorConfig {
            quality: Some(0),
            ..Default::default()
        };
        let result = CompressorSession::with_config(JpegEngine, &config);
        assert!(matches!(
            result,
            Err(InitError::Config(ArgumentError::QualityOutOfRange(0)))
        ));
    }
}
