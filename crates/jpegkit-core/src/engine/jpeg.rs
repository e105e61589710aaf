//! Pure-Rust transform engine backed by `jpeg-encoder` and `jpeg-decoder`.
//!
//! Flags that select a DCT or upsampling implementation are accepted and
//! ignored; neither codec exposes such a choice. `PROGRESSIVE` and
//! `BOTTOM_UP` are honoured.

use std::io::Cursor;

use jpeg_decoder::PixelFormat as DecodedFormat;
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};
use log::{debug, trace};

use super::convert::{self, Native};
use super::{header, CompressParams, DecodeTarget, Role, SourceImage, TransformEngine};
use crate::error::EngineError;
use crate::flags::Flags;
use crate::scaling::ScalingFactor;
use crate::tables;
use crate::types::{HeaderInfo, PixelFormat, Subsampling};

const SCALING_FACTORS: [ScalingFactor; 4] = [
    ScalingFactor::ONE,
    ScalingFactor::HALF,
    ScalingFactor::QUARTER,
    ScalingFactor::EIGHTH,
];

/// The default engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegEngine;

/// Per-session state: a scratch buffer reused for repacked scanlines.
#[derive(Debug)]
pub struct JpegHandle {
    role: Role,
    scratch: Vec<u8>,
}

impl JpegHandle {
    fn new(role: Role) -> Self {
        Self {
            role,
            scratch: Vec::new(),
        }
    }
}

/// How source pixels reach the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputPlan {
    /// Hand the scanlines over as-is (packing away pitch or flip if needed).
    Copy(ColorType),
    /// Convert to packed RGB first.
    Rgb,
    /// Convert to packed luminance first.
    Luma,
}

fn input_plan(format: PixelFormat, subsampling: Subsampling) -> Result<InputPlan, EngineError> {
    let plan = match (format, subsampling) {
        (PixelFormat::Cmyk, Subsampling::Gray) => {
            return Err(EngineError::new("Cannot encode a CMYK image as grayscale"))
        }
        (PixelFormat::Cmyk, _) => InputPlan::Copy(ColorType::CmykAsYcck),
        (PixelFormat::Gray, Subsampling::Gray) => InputPlan::Copy(ColorType::Luma),
        (_, Subsampling::Gray) => InputPlan::Luma,
        (PixelFormat::Gray, _) => InputPlan::Rgb,
        (PixelFormat::Rgb, _) => InputPlan::Copy(ColorType::Rgb),
        (PixelFormat::Bgr, _) => InputPlan::Copy(ColorType::Bgr),
        (PixelFormat::Rgba | PixelFormat::Rgbx, _) => InputPlan::Copy(ColorType::Rgba),
        (PixelFormat::Bgra | PixelFormat::Bgrx, _) => InputPlan::Copy(ColorType::Bgra),
        (PixelFormat::Xbgr | PixelFormat::Xrgb | PixelFormat::Abgr | PixelFormat::Argb, _) => InputPlan::Rgb,
    };
    Ok(plan)
}

fn sampling_factor(subsampling: Subsampling) -> SamplingFactor {
    match subsampling {
        Subsampling::S444 | Subsampling::Gray => SamplingFactor::F_1_1,
        Subsampling::S422 => SamplingFactor::F_2_1,
        Subsampling::S420 => SamplingFactor::F_2_2,
        Subsampling::S440 => SamplingFactor::F_1_2,
        Subsampling::S411 => SamplingFactor::F_4_1,
        Subsampling::S441 => SamplingFactor::F_1_4,
    }
}

fn to_u16(width: u32, height: u32) -> Result<(u16, u16), EngineError> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(EngineError::new(format!(
            "Image dimensions {}x{} exceed the JPEG limit of 65535",
            width, height
        ))),
    }
}

impl TransformEngine for JpegEngine {
    type Handle = JpegHandle;

    fn init_compressor(&self) -> Result<JpegHandle, EngineError> {
        Ok(JpegHandle::new(Role::Compressor))
    }

    fn init_decompressor(&self) -> Result<JpegHandle, EngineError> {
        Ok(JpegHandle::new(Role::Decompressor))
    }

    fn destroy(&self, handle: JpegHandle) {
        trace!(
            "Destroying {} handle with {} bytes of scratch",
            handle.role,
            handle.scratch.capacity()
        );
    }

    fn compress(
        &self,
        handle: &mut JpegHandle,
        source: &SourceImage<'_>,
        dst: &mut [u8],
        params: CompressParams,
    ) -> Result<usize, EngineError> {
        let (width, height) = to_u16(source.width, source.height)?;
        let plan = input_plan(source.format, params.subsampling)?;
        let flip = params.flags.contains(Flags::BOTTOM_UP);
        let row_bytes = source.width as usize * source.format.bytes_per_pixel();

        let (data, color_type): (&[u8], ColorType) = match plan {
            InputPlan::Copy(color_type) if !flip && source.pitch == row_bytes => {
                (&source.pixels[..row_bytes * source.height as usize], color_type)
            }
            InputPlan::Copy(color_type) => {
                convert::pack_rows(*source, flip, &mut handle.scratch);
                (handle.scratch.as_slice(), color_type)
            }
            InputPlan::Rgb => {
                convert::pack_rgb(*source, flip, &mut handle.scratch);
                (handle.scratch.as_slice(), ColorType::Rgb)
            }
            InputPlan::Luma => {
                convert::pack_luma(*source, flip, &mut handle.scratch);
                (handle.scratch.as_slice(), ColorType::Luma)
            }
        };

        let capacity = dst.len();
        let mut out = Cursor::new(dst);
        let mut encoder = Encoder::new(&mut out, params.quality);
        if !matches!(color_type, ColorType::Luma) {
            encoder.set_sampling_factor(sampling_factor(params.subsampling));
        }
        encoder.set_progressive(params.flags.contains(Flags::PROGRESSIVE));

        let result = encoder.encode(data, width, height, color_type);
        let written = usize::try_from(out.position()).unwrap_or(usize::MAX);

        match result {
            Ok(()) => {
                debug!(
                    "Encoded {}x{} {:?} as {:?} at quality {}: {} bytes",
                    width, height, source.format, params.subsampling, params.quality, written
                );
                Ok(written)
            }
            Err(_) if written >= capacity => Err(EngineError::new(format!(
                "Destination buffer of {} bytes is too small",
                capacity
            ))),
            Err(e) => Err(EngineError::new(format!("Encoding failed: {}", e))),
        }
    }

    fn decompress_header(&self, _handle: &mut JpegHandle, jpeg: &[u8]) -> Result<HeaderInfo, EngineError> {
        header::read_header(jpeg)
    }

    fn decompress(
        &self,
        _handle: &mut JpegHandle,
        jpeg: &[u8],
        dst: &mut [u8],
        target: &DecodeTarget,
        flags: Flags,
    ) -> Result<(), EngineError> {
        let colorspace = header::read_header(jpeg)?.colorspace;
        if colorspace.is_cmyk() != (target.format == PixelFormat::Cmyk) {
            return Err(EngineError::new(format!(
                "Cannot decode a {:?} image to {:?}",
                colorspace, target.format
            )));
        }

        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(jpeg));
        decoder
            .read_info()
            .map_err(|e| EngineError::new(format!("Invalid JPEG header: {}", e)))?;
        let info = decoder
            .info()
            .ok_or_else(|| EngineError::new("JPEG header is missing"))?;

        let full = (u32::from(info.width), u32::from(info.height));
        if full != (target.width, target.height) {
            let (requested_width, requested_height) = to_u16(target.width, target.height)?;
            // The decoder settles on the first scale reaching either requested
            // dimension, so only the longer axis is constrained
            let request = if info.width >= info.height {
                (requested_width, u16::MAX)
            } else {
                (u16::MAX, requested_height)
            };
            let scaled = decoder
                .scale(request.0, request.1)
                .map_err(|e| EngineError::new(format!("Scaling failed: {}", e)))?;
            if (u32::from(scaled.0), u32::from(scaled.1)) != (target.width, target.height) {
                return Err(EngineError::new(format!(
                    "Cannot scale {}x{} to {}x{}",
                    info.width, info.height, target.width, target.height
                )));
            }
        }

        let samples = decoder
            .decode()
            .map_err(|e| EngineError::new(format!("Decoding failed: {}", e)))?;
        let info = decoder
            .info()
            .ok_or_else(|| EngineError::new("JPEG header is missing"))?;

        let native = match info.pixel_format {
            DecodedFormat::L8 => Native::Luma,
            DecodedFormat::RGB24 => Native::Rgb,
            DecodedFormat::CMYK32 => Native::Cmyk,
            other => {
                return Err(EngineError::new(format!(
                    "Unsupported decoded sample format {:?}",
                    other
                )))
            }
        };

        let row_bytes = target.width as usize * target.format.bytes_per_pixel();
        let extent = tables::image_extent(row_bytes, target.pitch, target.height)
            .ok_or_else(|| EngineError::new("Empty decode target"))?;
        if dst.len() < extent {
            return Err(EngineError::new(format!(
                "Destination buffer of {} bytes is too small, {} required",
                dst.len(),
                extent
            )));
        }

        convert::unpack_rows(&samples, native, dst, target, flags.contains(Flags::BOTTOM_UP))?;
        debug!(
            "Decoded {}x{} into {:?} at pitch {}",
            target.width, target.height, target.format, target.pitch
        );
        Ok(())
    }

    fn scaling_factors(&self) -> &[ScalingFactor] {
        &SCALING_FACTORS
    }
}
