//! Shared helpers for unit tests: synthetic images, a logger, and a scripted
//! engine for lifecycle and failure tests.

use std::cell::Cell;
use std::rc::Rc;

use crate::encode::CompressorSession;
use crate::engine::{CompressParams, DecodeTarget, SourceImage, TransformEngine};
use crate::error::EngineError;
use crate::flags::Flags;
use crate::scaling::ScalingFactor;
use crate::tables::pixel_layout;
use crate::types::{Colorspace, HeaderInfo, PixelFormat, Subsampling};

/// Route `log` output through the test harness. Safe to call repeatedly.
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Smooth horizontal/vertical gradient, tightly packed in `format`.
///
/// Red ramps across, green ramps down, blue is constant, and padding or alpha
/// bytes are 0xFF. Gray uses the mean of red and green; CMYK stores the ramps in
/// C and M.
pub(crate) fn gradient(width: u32, height: u32, format: PixelFormat) -> Vec<u8> {
    let layout = pixel_layout(format);
    let mut pixels = Vec::with_capacity(width as usize * height as usize * layout.bytes_per_pixel);

    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / width.saturating_sub(1).max(1)) as u8;
            let g = (y * 255 / height.saturating_sub(1).max(1)) as u8;
            let b = 128u8;

            let mut px = [0xFFu8; 4];
            match (format, layout.rgb) {
                (PixelFormat::Cmyk, _) => px = [r, g, 64, 32],
                (_, Some([ri, gi, bi])) => {
                    px[ri] = r;
                    px[gi] = g;
                    px[bi] = b;
                }
                (_, None) => px[0] = ((u16::from(r) + u16::from(g)) / 2) as u8,
            }
            pixels.extend_from_slice(&px[..layout.bytes_per_pixel]);
        }
    }
    pixels
}

/// Deterministic pseudo-random bytes for `width` x `height` pixels of `format`.
///
/// Noise defeats DCT compaction, so it pushes encoded sizes towards the bound.
pub(crate) fn noise(width: u32, height: u32, format: PixelFormat, seed: u32) -> Vec<u8> {
    let len = width as usize * height as usize * pixel_layout(format).bytes_per_pixel;
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Encode with a fresh session, returning an owned JPEG.
pub(crate) fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
    subsampling: Subsampling,
    quality: u8,
) -> Vec<u8> {
    let mut session = CompressorSession::new().unwrap();
    session
        .set_source_image(pixels, width, 0, height, format, subsampling)
        .unwrap();
    session.set_quality(quality).unwrap();
    session.compress(Flags::NONE).unwrap().to_vec()
}

/// Mean absolute per-byte difference of two equally sized buffers.
pub(crate) fn mean_abs_diff(a: &[u8], b: &[u8]) -> f64 {
    assert_eq!(a.len(), b.len());
    let total: u64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| u64::from(x.abs_diff(*y)))
        .sum();
    total as f64 / a.len() as f64
}

const MOCK_FACTORS: [ScalingFactor; 2] = [ScalingFactor::ONE, ScalingFactor::HALF];

/// Scripted engine that counts handle releases and fails on demand.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockEngine {
    /// Number of `destroy` calls seen.
    pub destroyed: Rc<Cell<usize>>,
    /// Fail handle creation.
    pub fail_init: bool,
    /// Fail every compress, header and decompress call while set.
    pub fail_calls: Rc<Cell<bool>>,
}

impl MockEngine {
    fn check(&self) -> Result<(), EngineError> {
        if self.fail_calls.get() {
            Err(EngineError::new("Simulated engine failure"))
        } else {
            Ok(())
        }
    }
}

impl TransformEngine for MockEngine {
    type Handle = ();

    fn init_compressor(&self) -> Result<(), EngineError> {
        if self.fail_init {
            return Err(EngineError::new("Simulated allocation failure"));
        }
        Ok(())
    }

    fn init_decompressor(&self) -> Result<(), EngineError> {
        self.init_compressor()
    }

    fn destroy(&self, _handle: ()) {
        self.destroyed.set(self.destroyed.get() + 1);
    }

    fn compress(
        &self,
        _handle: &mut (),
        _source: &SourceImage<'_>,
        dst: &mut [u8],
        _params: CompressParams,
    ) -> Result<usize, EngineError> {
        self.check()?;
        let marker = [0xFF, 0xD8, 0xFF, 0xD9];
        dst.get_mut(..marker.len())
            .ok_or_else(|| EngineError::new("Destination too small"))?
            .copy_from_slice(&marker);
        Ok(marker.len())
    }

    fn decompress_header(&self, _handle: &mut (), jpeg: &[u8]) -> Result<HeaderInfo, EngineError> {
        self.check()?;
        if !jpeg.starts_with(&[0xFF, 0xD8]) {
            return Err(EngineError::new("Not a JPEG file"));
        }
        Ok(HeaderInfo {
            width: 16,
            height: 8,
            subsampling: Subsampling::S420,
            colorspace: Colorspace::YCbCr,
        })
    }

    fn decompress(
        &self,
        _handle: &mut (),
        _jpeg: &[u8],
        dst: &mut [u8],
        _target: &DecodeTarget,
        _flags: Flags,
    ) -> Result<(), EngineError> {
        self.check()?;
        dst.fill(0x7F);
        Ok(())
    }

    fn scaling_factors(&self) -> &[ScalingFactor] {
        &MOCK_FACTORS
    }
}
