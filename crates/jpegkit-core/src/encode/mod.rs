//! JPEG compression sessions.
//!
//! A [`CompressorSession`] binds a borrowed raw image, sizes its owned
//! destination for the worst case once, and then encodes into that buffer as
//! many times as needed without reallocating.
//!
//! # Examples
//!
//! ```ignore
//! use jpegkit_core::{CompressorSession, Flags, PixelFormat, Subsampling};
//!
//! let pixels = vec![128u8; 64 * 48 * 3];
//! let mut session = CompressorSession::new()?;
//! session.set_source_image(&pixels, 64, 0, 48, PixelFormat::Rgb, Subsampling::S420)?;
//! session.set_quality(85)?;
//! let jpeg = session.compress(Flags::NONE)?;
//! assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
//! ```

mod session;

pub use session::CompressorSession;
