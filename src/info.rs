use crate::format::{NativePixelFormat, PixelFormatGuid};
use crate::session::DecodeSession;

/// Image metadata obtained without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Format GUID reported by the decoder engine.
    pub pixel_format: PixelFormatGuid,
    pub native_format: NativePixelFormat,
    pub has_alpha: bool,
}

impl ImageInfo {
    pub(crate) fn from_session(session: &DecodeSession<'_>) -> Self {
        Self {
            width: session.width(),
            height: session.height(),
            pixel_format: session.pixel_format(),
            native_format: session.native_format(),
            has_alpha: session.format_info().is_some_and(|i| i.has_alpha),
        }
    }
}
