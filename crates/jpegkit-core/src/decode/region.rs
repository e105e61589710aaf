use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;
use crate::scaling::{select_scaling_factor, ScalingFactor};
use crate::tables;
use crate::types::PixelFormat;

/// Where and how large a single decompress call writes.
///
/// The default region decodes at full size to the start of the destination
/// with tightly packed rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompressRegion {
    /// Horizontal offset, in pixels, of the first output column.
    pub x: u32,
    /// Vertical offset, in rows, of the first output row.
    pub y: u32,
    /// Maximum output width, or 0 for the source width.
    pub desired_width: u32,
    /// Maximum output height, or 0 for the source height.
    pub desired_height: u32,
    /// Bytes between destination row starts, or 0 for the scaled row size.
    pub pitch: usize,
}

/// Byte layout of a resolved region inside the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegionLayout {
    pub factor: ScalingFactor,
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
    /// First byte written.
    pub offset: usize,
    /// One past the last byte written.
    pub end: usize,
}

impl DecompressRegion {
    /// Resolve the region against a source image and the engine's factors.
    pub(crate) fn resolve(
        &self,
        width: u32,
        height: u32,
        format: PixelFormat,
        factors: &[ScalingFactor],
    ) -> Result<RegionLayout, ArgumentError> {
        let factor = select_scaling_factor(width, height, self.desired_width, self.desired_height, factors)
            .ok_or(ArgumentError::CannotScale {
                width,
                height,
                desired_width: self.desired_width,
                desired_height: self.desired_height,
            })?;
        let scaled_width = factor.scale(width);
        let scaled_height = factor.scale(height);

        let too_large = ArgumentError::ImageTooLarge {
            width: scaled_width,
            height: scaled_height,
        };
        let bpp = format.bytes_per_pixel();
        let row_bytes = (scaled_width as usize).checked_mul(bpp).ok_or(too_large.clone())?;
        let minimum = (self.x as usize)
            .checked_add(scaled_width as usize)
            .and_then(|columns| columns.checked_mul(bpp))
            .ok_or(too_large.clone())?;

        let pitch = if self.pitch == 0 { row_bytes } else { self.pitch };
        if pitch < minimum {
            return Err(ArgumentError::InvalidPitch { pitch, minimum });
        }

        let offset = (self.y as usize)
            .checked_mul(pitch)
            .and_then(|rows| rows.checked_add(self.x as usize * bpp))
            .ok_or(too_large.clone())?;
        let end = tables::image_extent(row_bytes, pitch, scaled_height)
            .and_then(|extent| extent.checked_add(offset))
            .ok_or(too_large)?;

        Ok(RegionLayout {
            factor,
            width: scaled_width,
            height: scaled_height,
            pitch,
            offset,
            end,
        })
    }
}
