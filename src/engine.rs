//! Boundary to the external JPEG XR decoding engine.
//!
//! Entropy decoding, inverse transforms and bitstream parsing live behind
//! these traits. The session driver only resolves a decoder, hands it the
//! input stream, configures it and asks for pixels.

use alloc::boxed::Box;

use crate::format::{BitDepth, ColorFormat, PixelFormatGuid};
use crate::stream::ByteStream;

/// File extension the engine's decoder registry is keyed by.
pub const JXR_EXTENSION: &str = ".jxr";

/// Error codes reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("engine failure")]
    Fail,
    #[error("not implemented")]
    NotImplemented,
    #[error("engine out of memory")]
    OutOfMemory,
    #[error("file I/O failure")]
    FileIo,
    #[error("buffer overflow")]
    BufferOverflow,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("unsupported format")]
    UnsupportedFormat,
    #[error("engine error code {0}")]
    Other(i32),
}

/// Opaque decoder identifier handed out by [`CodecFactory::decoder_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoderId(pub u32);

/// Rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitstreamFormat {
    Spatial,
    Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlphaMode {
    /// Ignore any alpha plane.
    Opaque = 0,
    /// Decode the alpha plane alone.
    AlphaOnly = 1,
    /// Decode image and alpha planes together.
    Blend = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subband {
    All,
    NoFlexbits,
    NoHighpass,
    DcOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    None,
    FlipVertical,
    FlipHorizontal,
    Rotate180,
}

/// Decode parameters pushed into the engine before any pixel is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeParams {
    pub bitstream_format: BitstreamFormat,
    pub alpha_mode: AlphaMode,
    pub subband: Subband,
    pub ignore_overlap: bool,
    pub color_format: ColorFormat,
    pub bit_depth: BitDepth,
    pub bits_per_unit: u32,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub skip_flexbits: bool,
    pub roi: Rect,
    pub orientation: Orientation,
    pub post_proc_strength: u8,
    pub verbose: bool,
}

/// Registry that resolves and instantiates decoders.
pub trait CodecFactory {
    /// Resolve the decoder registered for a file extension such as `".jxr"`.
    fn decoder_id(&self, extension: &str) -> Result<DecoderId, EngineError>;

    /// Instantiate a fresh decoder. Dropping the box releases it.
    fn create<'a>(&self, id: DecoderId) -> Result<Box<dyn ImageDecoder<'a> + 'a>, EngineError>;
}

/// One decoder instance bound to one input stream.
///
/// After a successful [`initialize`](ImageDecoder::initialize) the decoder owns
/// the stream and must close it when dropped.
pub trait ImageDecoder<'a> {
    fn initialize(&mut self, stream: Box<dyn ByteStream + 'a>) -> Result<(), EngineError>;

    fn pixel_format(&self) -> PixelFormatGuid;

    /// Image size in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    fn configure(&mut self, params: &DecodeParams);

    /// Decode `rect` into `dst`, one row every `stride` bytes, in the native format.
    fn copy(&mut self, rect: &Rect, dst: &mut [u8], stride: usize) -> Result<(), EngineError>;
}
