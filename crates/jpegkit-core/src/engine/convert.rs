//! Pixel repacking between caller layouts and codec-native layouts.
//!
//! The codec only understands tightly packed, top-down scanlines in a few
//! channel orders. Everything else (padded pitch, bottom-up storage, X/A-first
//! layouts, gray expansion) is handled here.

use crate::error::EngineError;
use crate::tables::pixel_layout;
use crate::types::PixelFormat;

use super::{DecodeTarget, SourceImage};

/// Sample layouts the decoder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Native {
    Luma,
    Rgb,
    Cmyk,
}

impl Native {
    fn channels(self) -> usize {
        match self {
            Native::Luma => 1,
            Native::Rgb => 3,
            Native::Cmyk => 4,
        }
    }
}

/// BT.601 luminance in 16-bit fixed point.
#[inline]
pub(super) fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 19595 * u32::from(r) + 38470 * u32::from(g) + 7471 * u32::from(b) + 32768;
    (y >> 16) as u8
}

/// Scanlines of a source image in top-down order.
fn source_rows(source: SourceImage<'_>, flip: bool) -> impl Iterator<Item = &[u8]> {
    let row_bytes = source.width as usize * source.format.bytes_per_pixel();
    let height = source.height as usize;
    (0..height).map(move |i| {
        let row = if flip { height - 1 - i } else { i };
        let start = row * source.pitch;
        &source.pixels[start..start + row_bytes]
    })
}

/// Copy scanlines into `out` without padding.
pub(super) fn pack_rows(source: SourceImage<'_>, flip: bool, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(source.width as usize * source.height as usize * source.format.bytes_per_pixel());
    for row in source_rows(source, flip) {
        out.extend_from_slice(row);
    }
}

/// Repack any RGB-family or gray source as packed RGB.
pub(super) fn pack_rgb(source: SourceImage<'_>, flip: bool, out: &mut Vec<u8>) {
    let layout = pixel_layout(source.format);
    debug_assert!(source.format != PixelFormat::Cmyk);

    out.clear();
    out.reserve(source.width as usize * source.height as usize * 3);
    for row in source_rows(source, flip) {
        match layout.rgb {
            Some([r, g, b]) => {
                for px in row.chunks_exact(layout.bytes_per_pixel) {
                    out.extend_from_slice(&[px[r], px[g], px[b]]);
                }
            }
            None => {
                for &v in row {
                    out.extend_from_slice(&[v, v, v]);
                }
            }
        }
    }
}

/// Repack any RGB-family or gray source as packed luminance.
pub(super) fn pack_luma(source: SourceImage<'_>, flip: bool, out: &mut Vec<u8>) {
    let layout = pixel_layout(source.format);
    debug_assert!(source.format != PixelFormat::Cmyk);

    out.clear();
    out.reserve(source.width as usize * source.height as usize);
    for row in source_rows(source, flip) {
        match layout.rgb {
            Some([r, g, b]) => {
                out.extend(
                    row.chunks_exact(layout.bytes_per_pixel)
                        .map(|px| luma(px[r], px[g], px[b])),
                );
            }
            None => out.extend_from_slice(row),
        }
    }
}

/// Write decoded samples into `dst` using the target layout.
///
/// `samples` holds `target.height` tightly packed rows of `native` pixels.
pub(super) fn unpack_rows(
    samples: &[u8],
    native: Native,
    dst: &mut [u8],
    target: &DecodeTarget,
    flip: bool,
) -> Result<(), EngineError> {
    let layout = pixel_layout(target.format);
    let width = target.width as usize;
    let height = target.height as usize;
    let src_stride = width * native.channels();
    let dst_row_bytes = width * layout.bytes_per_pixel;

    if samples.len() < src_stride * height {
        return Err(EngineError::new(format!(
            "Decoder produced {} bytes, expected {}",
            samples.len(),
            src_stride * height
        )));
    }
    match (native, target.format) {
        (Native::Cmyk, PixelFormat::Cmyk) => {}
        (Native::Cmyk, format) => {
            return Err(EngineError::new(format!(
                "Cannot convert a CMYK image to {:?}",
                format
            )))
        }
        (_, PixelFormat::Cmyk) => {
            return Err(EngineError::new("CMYK output requires a CMYK or YCCK image"))
        }
        _ => {}
    }

    for (i, src) in samples.chunks_exact(src_stride).take(height).enumerate() {
        let row = if flip { height - 1 - i } else { i };
        let start = row * target.pitch;
        let out = &mut dst[start..start + dst_row_bytes];

        match (native, layout.rgb) {
            (Native::Rgb, Some([0, 1, 2])) if layout.filler.is_none() => out.copy_from_slice(src),
            (Native::Luma, Some([r, g, b])) => {
                for (px, &v) in out.chunks_exact_mut(layout.bytes_per_pixel).zip(src) {
                    px[r] = v;
                    px[g] = v;
                    px[b] = v;
                    if let Some(x) = layout.filler {
                        px[x] = 0xFF;
                    }
                }
            }
            (Native::Rgb, Some([r, g, b])) => {
                for (px, rgb) in out.chunks_exact_mut(layout.bytes_per_pixel).zip(src.chunks_exact(3)) {
                    px[r] = rgb[0];
                    px[g] = rgb[1];
                    px[b] = rgb[2];
                    if let Some(x) = layout.filler {
                        px[x] = 0xFF;
                    }
                }
            }
            (Native::Rgb, None) => {
                for (px, rgb) in out.iter_mut().zip(src.chunks_exact(3)) {
                    *px = luma(rgb[0], rgb[1], rgb[2]);
                }
            }
            // Only Gray and CMYK targets get here, both already native
            (Native::Luma, None) | (Native::Cmyk, _) => out.copy_from_slice(src),
        }
    }

    Ok(())
}
