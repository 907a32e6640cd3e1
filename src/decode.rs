use alloc::vec::Vec;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use enough::Stop;

use crate::engine::CodecFactory;
use crate::error::JxrError;
use crate::info::ImageInfo;
use crate::limits::Limits;
use crate::normalize::normalize;
use crate::session::DecodeSession;

/// Decoded image in the canonical layout: 32bpp, `[B, G, R, A]` per pixel,
/// rows top to bottom as the engine produced them, no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalImage {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CanonicalImage {
    pub(crate) fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Row length in bytes (`width * 4`).
    pub fn row_bytes(&self) -> usize {
        self.width as usize * 4
    }

    /// One row of pixels, `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.row_bytes();
        self.pixels.get(start..start + self.row_bytes())
    }

    /// Reinterpret pixel data as typed BGRA pixels.
    #[cfg(feature = "rgb")]
    pub fn as_bgra(&self) -> &[rgb::alt::BGRA8] {
        self.pixels.as_pixels()
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of BGRA pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, rgb::alt::BGRA8> {
        imgref::ImgRef::new(self.as_bgra(), self.width as usize, self.height as usize)
    }

    /// Copy into an [`imgref::ImgVec`] of BGRA pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> imgref::ImgVec<rgb::alt::BGRA8> {
        imgref::ImgVec::new(
            self.as_bgra().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}

/// Builder for a single JPEG XR decode.
///
/// ```no_run
/// # fn run(factory: &dyn zenjxr::CodecFactory, data: &[u8]) -> Result<(), zenjxr::JxrError> {
/// use zenjxr::{DecodeRequest, Limits, Unstoppable};
///
/// let info = DecodeRequest::new(factory, data).probe()?;
/// println!("{}x{}", info.width, info.height);
///
/// let limits = Limits {
///     max_pixels: Some(64 * 1024 * 1024),
///     ..Default::default()
/// };
/// let image = DecodeRequest::new(factory, data)
///     .with_limits(&limits)
///     .decode(Unstoppable)?;
/// assert_eq!(image.pixels().len(), image.width as usize * image.height as usize * 4);
/// # Ok(())
/// # }
/// ```
pub struct DecodeRequest<'a> {
    factory: &'a dyn CodecFactory,
    data: &'a [u8],
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(factory: &'a dyn CodecFactory, data: &'a [u8]) -> Self {
        Self {
            factory,
            data,
            limits: None,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Open a session for geometry only. No pixels are decoded.
    ///
    /// Input and geometry limits apply; the memory limit does not.
    pub fn probe(&self) -> Result<ImageInfo, JxrError> {
        let session = self.open()?;
        if let Some(limits) = self.limits {
            limits.check_geometry(session.width(), session.height())?;
        }
        Ok(ImageInfo::from_session(&session))
    }

    /// Decode and normalize to [`CanonicalImage`].
    pub fn decode(self, stop: impl Stop) -> Result<CanonicalImage, JxrError> {
        let session = self.open()?;
        normalize(session, self.limits, &stop)
    }

    fn open(&self) -> Result<DecodeSession<'a>, JxrError> {
        if let Some(limits) = self.limits {
            limits.check_input(self.data.len())?;
        }
        DecodeSession::open(self.factory, self.data)
    }
}
