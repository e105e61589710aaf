//! Core types shared by compressor and decompressor sessions.

use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;
use crate::tables;

/// Byte-level channel layout of a raw pixel.
///
/// Discriminants match the numeric codes used by TurboJPEG-compatible callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PixelFormat {
    /// Red, green, blue (3 bytes).
    Rgb = 0,
    /// Blue, green, red (3 bytes).
    Bgr = 1,
    /// Red, green, blue, padding (4 bytes).
    Rgbx = 2,
    /// Blue, green, red, padding (4 bytes).
    Bgrx = 3,
    /// Padding, blue, green, red (4 bytes).
    Xbgr = 4,
    /// Padding, red, green, blue (4 bytes).
    Xrgb = 5,
    /// Single luminance channel (1 byte).
    Gray = 6,
    /// Red, green, blue, alpha (4 bytes).
    Rgba = 7,
    /// Blue, green, red, alpha (4 bytes).
    Bgra = 8,
    /// Alpha, blue, green, red (4 bytes).
    Abgr = 9,
    /// Alpha, red, green, blue (4 bytes).
    Argb = 10,
    /// Cyan, magenta, yellow, key (4 bytes).
    Cmyk = 11,
}

impl PixelFormat {
    /// Every pixel format, in code order.
    pub const ALL: [PixelFormat; 12] = [
        PixelFormat::Rgb,
        PixelFormat::Bgr,
        PixelFormat::Rgbx,
        PixelFormat::Bgrx,
        PixelFormat::Xbgr,
        PixelFormat::Xrgb,
        PixelFormat::Gray,
        PixelFormat::Rgba,
        PixelFormat::Bgra,
        PixelFormat::Abgr,
        PixelFormat::Argb,
        PixelFormat::Cmyk,
    ];

    /// Numeric code of this format.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Bytes occupied by one pixel (1 to 4).
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        tables::pixel_layout(self).bytes_per_pixel
    }
}

impl TryFrom<i32> for PixelFormat {
    type Error = ArgumentError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|index| PixelFormat::ALL.get(index).copied())
            .ok_or(ArgumentError::UnknownPixelFormat(code))
    }
}

/// Chrominance subsampling of a JPEG image.
///
/// The name gives the J:a:b ratio; `Gray` means no chroma components at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Subsampling {
    /// 4:4:4, no chroma subsampling.
    #[default]
    S444 = 0,
    /// 4:2:2, chroma halved horizontally.
    S422 = 1,
    /// 4:2:0, chroma halved in both directions.
    S420 = 2,
    /// Grayscale, luminance only.
    Gray = 3,
    /// 4:4:0, chroma halved vertically.
    S440 = 4,
    /// 4:1:1, chroma quartered horizontally.
    S411 = 5,
    /// 4:4:1, chroma quartered vertically.
    S441 = 6,
}

impl Subsampling {
    /// Every subsampling mode, in code order.
    pub const ALL: [Subsampling; 7] = [
        Subsampling::S444,
        Subsampling::S422,
        Subsampling::S420,
        Subsampling::Gray,
        Subsampling::S440,
        Subsampling::S411,
        Subsampling::S441,
    ];

    /// Numeric code of this mode.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Luma-to-chroma sampling ratio `(horizontal, vertical)`.
    ///
    /// `Gray` reports `(1, 1)` since there is no chroma plane to subsample.
    pub fn chroma_ratio(self) -> (u8, u8) {
        match self {
            Subsampling::S444 | Subsampling::Gray => (1, 1),
            Subsampling::S422 => (2, 1),
            Subsampling::S420 => (2, 2),
            Subsampling::S440 => (1, 2),
            Subsampling::S411 => (4, 1),
            Subsampling::S441 => (1, 4),
        }
    }

    /// Find the color subsampling mode with the given luma-to-chroma ratio.
    pub fn from_chroma_ratio(horizontal: u8, vertical: u8) -> Option<Subsampling> {
        match (horizontal, vertical) {
            (1, 1) => Some(Subsampling::S444),
            (2, 1) => Some(Subsampling::S422),
            (2, 2) => Some(Subsampling::S420),
            (1, 2) => Some(Subsampling::S440),
            (4, 1) => Some(Subsampling::S411),
            (1, 4) => Some(Subsampling::S441),
            _ => None,
        }
    }
}

impl TryFrom<i32> for Subsampling {
    type Error = ArgumentError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Subsampling::ALL.get(index).copied())
            .ok_or(ArgumentError::UnknownSubsampling(code))
    }
}

/// Color model of the data stored in a JPEG stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Colorspace {
    Rgb = 0,
    YCbCr = 1,
    Gray = 2,
    Cmyk = 3,
    Ycck = 4,
}

impl Colorspace {
    /// Every colorspace, in code order.
    pub const ALL: [Colorspace; 5] = [
        Colorspace::Rgb,
        Colorspace::YCbCr,
        Colorspace::Gray,
        Colorspace::Cmyk,
        Colorspace::Ycck,
    ];

    /// Numeric code of this colorspace.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns true for the four-component colorspaces.
    #[inline]
    pub fn is_cmyk(self) -> bool {
        matches!(self, Colorspace::Cmyk | Colorspace::Ycck)
    }
}

impl TryFrom<i32> for Colorspace {
    type Error = ArgumentError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Colorspace::ALL.get(index).copied())
            .ok_or(ArgumentError::UnknownColorspace(code))
    }
}

/// Dimensions and scanline stride of a bound raw image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes between the starts of consecutive scanlines.
    pub pitch: usize,
}

/// Everything recovered from a JPEG header in one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub width: u32,
    pub height: u32,
    pub subsampling: Subsampling,
    pub colorspace: Colorspace,
}
