//! JPEG decompression sessions.
//!
//! A [`DecompressorSession`] binds a borrowed JPEG stream, parses its header
//! once, and decodes into an owned destination sized for the full image.
//! Individual calls can scale the output down by one of the engine's factors
//! and place it anywhere inside a larger canvas via [`DecompressRegion`].
//!
//! # Examples
//!
//! ```ignore
//! use jpegkit_core::{DecompressorSession, Flags, PixelFormat};
//!
//! let mut session = DecompressorSession::new()?;
//! session.set_source_image(&jpeg_bytes, PixelFormat::Rgb)?;
//! let pixels = session.decompress(Flags::NONE)?;
//! assert_eq!(pixels.len(), session.width() as usize * session.height() as usize * 3);
//! ```

mod region;
mod session;

pub use region::DecompressRegion;
pub use session::DecompressorSession;
