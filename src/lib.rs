//! # zenjxr
//!
//! JPEG XR to 32bpp BGRA bitmap bridge for image-viewer plugin hosts.
//!
//! The crate drives an external JPEG XR decoding engine and reshapes its
//! output. It does not parse bitstreams, entropy-decode, or run inverse
//! transforms; those stay behind the [`CodecFactory`] / [`ImageDecoder`]
//! traits.
//!
//! ## Pipeline
//!
//! 1. [`MemoryStream`] exposes the caller's bytes to the engine as a
//!    read-only seekable [`ByteStream`].
//! 2. [`DecodeSession::open`] resolves a decoder, configures it for a
//!    full-image spatial decode and queries geometry and the native pixel
//!    format.
//! 3. [`normalize`] pulls the decoded rows at the native stride and rewrites
//!    them as canonical `[B, G, R, A]` pixels ([`CanonicalImage`]).
//! 4. [`CanonicalBitmap`] adds `BITMAPFILEHEADER` / `BITMAPINFOHEADER`.
//!
//! Only 24bpp RGB and 32bpp RGBA native formats are transcoded; anything
//! else fails with [`JxrError::UnsupportedPixelFormat`].
//!
//! ## Host boundary
//!
//! The [`host`] module exposes the plugin entry points ([`host::is_supported`],
//! [`host::query_info`], [`host::decode_to_canonical_bitmap`],
//! [`host::decode_to_host_handles`]) with the host's coarse status codes.
//!
//! ## Usage
//!
//! ```no_run
//! use zenjxr::{CanonicalBitmap, DecodeRequest, Unstoppable};
//!
//! # fn run(factory: &dyn zenjxr::CodecFactory, data: &[u8]) -> Result<(), zenjxr::JxrError> {
//! // Probe without decoding
//! let info = DecodeRequest::new(factory, data).probe()?;
//! println!("{}x{} {}", info.width, info.height, info.pixel_format);
//!
//! // Decode to BGRA and wrap as a BMP
//! let image = DecodeRequest::new(factory, data).decode(Unstoppable)?;
//! let bmp = CanonicalBitmap::new(image)?;
//! let file = bmp.to_bmp_file(&Unstoppable)?;
//! # let _ = file;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod bitmap;
mod decode;
mod error;
mod info;
mod limits;
mod normalize;
mod session;

pub mod engine;
pub mod format;
pub mod host;
pub mod stream;

// Re-exports
pub use bitmap::{
    BI_RGB, BMP_MAGIC, BitmapFileHeader, BitmapHeaders, BitmapInfoHeader, CanonicalBitmap,
    FILE_HEADER_SIZE, INFO_HEADER_SIZE,
};
pub use decode::{CanonicalImage, DecodeRequest};
pub use engine::{CodecFactory, DecodeParams, EngineError, ImageDecoder, Rect};
pub use enough::{Stop, StopReason, Unstoppable};
pub use error::JxrError;
pub use format::{NativePixelFormat, PixelFormatGuid, PixelFormatInfo};
pub use info::ImageInfo;
pub use limits::Limits;
pub use normalize::{normalize, transcode};
pub use session::DecodeSession;
pub use stream::{ByteStream, MemoryStream, StreamError};
