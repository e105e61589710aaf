//! JPEG marker walker that recovers image geometry without decoding.
//!
//! Only the segments needed for [`HeaderInfo`] are interpreted: the start of
//! frame for dimensions and sampling factors, and the JFIF / Adobe application
//! segments that decide how three- and four-component data is coloured.

use crate::error::EngineError;
use crate::types::{Colorspace, HeaderInfo, Subsampling};

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP0: u8 = 0xE0;
const APP14: u8 = 0xEE;
const TEM: u8 = 0x01;
const DHT: u8 = 0xC4;
const JPG: u8 = 0xC8;
const DAC: u8 = 0xCC;

#[derive(Debug, Clone, Copy)]
struct Component {
    id: u8,
    horizontal: u8,
    vertical: u8,
}

#[derive(Debug)]
struct Frame {
    width: u16,
    height: u16,
    components: Vec<Component>,
}

#[derive(Debug, Default)]
struct Markers {
    frame: Option<Frame>,
    jfif: bool,
    adobe_transform: Option<u8>,
}

fn is_sof(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, DHT | JPG | DAC)
}

fn is_standalone(marker: u8) -> bool {
    matches!(marker, TEM | 0xD0..=0xD7)
}

/// Parse the header of a JPEG stream.
///
/// # Errors
///
/// Returns an error if the data does not start with an SOI marker, ends before
/// a start-of-frame segment, or describes a frame this crate cannot represent.
pub fn read_header(data: &[u8]) -> Result<HeaderInfo, EngineError> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != SOI {
        return Err(EngineError::new("Not a JPEG file: starts with no SOI marker"));
    }

    let markers = walk_markers(data)?;
    let frame = markers
        .frame
        .as_ref()
        .ok_or_else(|| EngineError::new("No start-of-frame marker before image data"))?;

    if frame.width == 0 || frame.height == 0 {
        return Err(EngineError::new(format!(
            "Unsupported frame dimensions {}x{}",
            frame.width, frame.height
        )));
    }

    Ok(HeaderInfo {
        width: u32::from(frame.width),
        height: u32::from(frame.height),
        subsampling: subsampling_of(frame)?,
        colorspace: colorspace_of(frame, &markers)?,
    })
}

fn walk_markers(data: &[u8]) -> Result<Markers, EngineError> {
    let mut markers = Markers::default();
    let mut pos = 2;

    loop {
        // Skip anything up to the next 0xFF, then any fill bytes
        while pos < data.len() && data[pos] != 0xFF {
            pos += 1;
        }
        while pos < data.len() && data[pos] == 0xFF {
            pos += 1;
        }
        let Some(&marker) = data.get(pos) else {
            break;
        };
        pos += 1;

        if marker == 0x00 || is_standalone(marker) {
            continue;
        }
        if marker == SOS || marker == EOI {
            break;
        }

        let length = match data.get(pos..pos + 2) {
            Some(bytes) => usize::from(u16::from_be_bytes([bytes[0], bytes[1]])),
            None => break,
        };
        if length < 2 {
            return Err(EngineError::new(format!(
                "Bogus marker length {} for marker 0x{:02X}",
                length, marker
            )));
        }
        let segment = data
            .get(pos + 2..pos + length)
            .ok_or_else(|| EngineError::new(format!("Truncated segment for marker 0x{:02X}", marker)))?;

        match marker {
            m if is_sof(m) => {
                if markers.frame.is_some() {
                    return Err(EngineError::new("Multiple start-of-frame markers"));
                }
                markers.frame = Some(parse_frame(segment)?);
            }
            APP0 if segment.starts_with(b"JFIF\0") => markers.jfif = true,
            APP14 if segment.len() >= 12 && segment.starts_with(b"Adobe") => {
                markers.adobe_transform = Some(segment[11]);
            }
            _ => {}
        }

        pos += length;
    }

    Ok(markers)
}

fn parse_frame(segment: &[u8]) -> Result<Frame, EngineError> {
    if segment.len() < 6 {
        return Err(EngineError::new("Start-of-frame segment is too short"));
    }

    let precision = segment[0];
    if precision != 8 && precision != 12 {
        return Err(EngineError::new(format!("Unsupported sample precision {}", precision)));
    }

    let height = u16::from_be_bytes([segment[1], segment[2]]);
    let width = u16::from_be_bytes([segment[3], segment[4]]);
    let count = usize::from(segment[5]);

    if !matches!(count, 1 | 3 | 4) {
        return Err(EngineError::new(format!("Unsupported component count {}", count)));
    }

    let entries = segment
        .get(6..6 + count * 3)
        .ok_or_else(|| EngineError::new("Start-of-frame segment is too short"))?;

    let components = entries
        .chunks_exact(3)
        .map(|entry| Component {
            id: entry[0],
            horizontal: entry[1] >> 4,
            vertical: entry[1] & 0x0F,
        })
        .collect::<Vec<_>>();

    if components
        .iter()
        .any(|c| !(1..=4).contains(&c.horizontal) || !(1..=4).contains(&c.vertical))
    {
        return Err(EngineError::new("Invalid component sampling factors"));
    }

    Ok(Frame {
        width,
        height,
        components,
    })
}

fn subsampling_of(frame: &Frame) -> Result<Subsampling, EngineError> {
    let [luma, chroma @ ..] = frame.components.as_slice() else {
        return Err(EngineError::new("Frame has no components"));
    };
    if chroma.is_empty() {
        return Ok(Subsampling::Gray);
    }

    let unsupported = || {
        EngineError::new(format!(
            "Unsupported sampling factors {}",
            frame
                .components
                .iter()
                .map(|c| format!("{}x{}", c.horizontal, c.vertical))
                .collect::<Vec<_>>()
                .join(",")
        ))
    };

    // Both chroma planes share one sampling; a fourth (K) plane follows luma
    let (cb, cr) = (chroma[0], chroma[1]);
    if cb.horizontal != cr.horizontal || cb.vertical != cr.vertical {
        return Err(unsupported());
    }
    if let Some(k) = chroma.get(2) {
        if k.horizontal != luma.horizontal || k.vertical != luma.vertical {
            return Err(unsupported());
        }
    }
    if luma.horizontal % cb.horizontal != 0 || luma.vertical % cb.vertical != 0 {
        return Err(unsupported());
    }

    Subsampling::from_chroma_ratio(luma.horizontal / cb.horizontal, luma.vertical / cb.vertical)
        .ok_or_else(unsupported)
}

fn colorspace_of(frame: &Frame, markers: &Markers) -> Result<Colorspace, EngineError> {
    match frame.components.len() {
        1 => Ok(Colorspace::Gray),
        3 => {
            if markers.jfif {
                return Ok(Colorspace::YCbCr);
            }
            if let Some(transform) = markers.adobe_transform {
                return Ok(if transform == 0 {
                    Colorspace::Rgb
                } else {
                    Colorspace::YCbCr
                });
            }
            let ids: Vec<u8> = frame.components.iter().map(|c| c.id).collect();
            if ids == b"RGB" {
                Ok(Colorspace::Rgb)
            } else {
                Ok(Colorspace::YCbCr)
            }
        }
        4 => match markers.adobe_transform {
            Some(2) => Ok(Colorspace::Ycck),
            _ => Ok(Colorspace::Cmyk),
        },
        n => Err(EngineError::new(format!("Unsupported component count {}", n))),
    }
}
