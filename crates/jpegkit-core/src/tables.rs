//! Pixel format and subsampling lookup tables.
//!
//! These are the only places buffer sizes are derived from image geometry:
//! bytes per pixel and channel order per [`PixelFormat`], MCU dimensions per
//! [`Subsampling`], and the closed-form worst-case JPEG size used to pre-size
//! compressor destinations.

use crate::types::{PixelFormat, Subsampling};

/// Channel positions inside one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    /// Bytes occupied by one pixel.
    pub bytes_per_pixel: usize,
    /// Offsets of the red, green and blue channels, `None` for gray and CMYK.
    pub rgb: Option<[usize; 3]>,
    /// Offset of the alpha or padding channel, filled with 0xFF on output.
    pub filler: Option<usize>,
}

const fn layout(bytes_per_pixel: usize, rgb: Option<[usize; 3]>, filler: Option<usize>) -> PixelLayout {
    PixelLayout {
        bytes_per_pixel,
        rgb,
        filler,
    }
}

// Indexed by PixelFormat code.
const PIXEL_LAYOUTS: [PixelLayout; 12] = [
    layout(3, Some([0, 1, 2]), None),    // RGB
    layout(3, Some([2, 1, 0]), None),    // BGR
    layout(4, Some([0, 1, 2]), Some(3)), // RGBX
    layout(4, Some([2, 1, 0]), Some(3)), // BGRX
    layout(4, Some([3, 2, 1]), Some(0)), // XBGR
    layout(4, Some([1, 2, 3]), Some(0)), // XRGB
    layout(1, None, None),               // GRAY
    layout(4, Some([0, 1, 2]), Some(3)), // RGBA
    layout(4, Some([2, 1, 0]), Some(3)), // BGRA
    layout(4, Some([3, 2, 1]), Some(0)), // ABGR
    layout(4, Some([1, 2, 3]), Some(0)), // ARGB
    layout(4, None, None),               // CMYK
];

/// Look up the channel layout of a pixel format.
#[inline]
pub fn pixel_layout(format: PixelFormat) -> PixelLayout {
    PIXEL_LAYOUTS[format as usize]
}

/// Bytes occupied by one pixel of `format`.
#[inline]
pub fn bytes_per_pixel(format: PixelFormat) -> usize {
    pixel_layout(format).bytes_per_pixel
}

/// MCU block size in pixels `(width, height)` for a subsampling mode.
pub fn mcu_size(subsampling: Subsampling) -> (u32, u32) {
    let (h, v) = subsampling.chroma_ratio();
    (8 * u32::from(h), 8 * u32::from(v))
}

/// Upper bound on the encoded size of a `width` x `height` JPEG.
///
/// The bound depends only on geometry and subsampling, never on content:
/// every MCU-padded pixel is budgeted 2 bytes of luma plus its share of the
/// chroma blocks, with 2048 bytes of headroom for markers and tables.
/// Returns `None` when the bound does not fit in `usize`.
pub fn worst_case_size(width: u32, height: u32, subsampling: Subsampling) -> Option<usize> {
    let (mcu_width, mcu_height) = mcu_size(subsampling);
    let chroma_factor = match subsampling {
        Subsampling::Gray => 0,
        _ => 4 * 64 / u64::from(mcu_width * mcu_height),
    };

    let padded_width = u64::from(width).div_ceil(u64::from(mcu_width)) * u64::from(mcu_width);
    let padded_height = u64::from(height).div_ceil(u64::from(mcu_height)) * u64::from(mcu_height);

    padded_width
        .checked_mul(padded_height)?
        .checked_mul(2 + chroma_factor)?
        .checked_add(2048)
        .and_then(|size| usize::try_from(size).ok())
}

/// Worst-case bytes for components beyond luma and two chroma planes.
///
/// CMYK is encoded with a fourth component sampled like luma, so it gets the
/// same 2 bytes per MCU-padded pixel. Every other format needs nothing extra.
pub fn extra_component_size(width: u32, height: u32, subsampling: Subsampling, format: PixelFormat) -> Option<usize> {
    if format != PixelFormat::Cmyk {
        return Some(0);
    }
    let (mcu_width, mcu_height) = mcu_size(subsampling);
    let padded_width = u64::from(width).div_ceil(u64::from(mcu_width)) * u64::from(mcu_width);
    let padded_height = u64::from(height).div_ceil(u64::from(mcu_height)) * u64::from(mcu_height);

    padded_width
        .checked_mul(padded_height)?
        .checked_mul(2)
        .and_then(|size| usize::try_from(size).ok())
}

/// Bytes spanned by `height` scanlines of `row_bytes` each, `pitch` apart.
///
/// The last scanline only needs `row_bytes`, so padding after it is not
/// required.
pub fn image_extent(row_bytes: usize, pitch: usize, height: u32) -> Option<usize> {
    let rows_before_last = usize::try_from(height.checked_sub(1)?).ok()?;
    rows_before_last.checked_mul(pitch)?.checked_add(row_bytes)
}

/// Bytes needed for an unpadded `width` x `height` image in `format`.
pub fn decoded_size(width: u32, height: u32, format: PixelFormat) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(bytes_per_pixel(format))
}
