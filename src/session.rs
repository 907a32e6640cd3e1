//! Decode session driver: opens the engine against an in-memory stream.

use alloc::boxed::Box;

use crate::engine::{
    AlphaMode, BitstreamFormat, CodecFactory, DecodeParams, ImageDecoder, JXR_EXTENSION,
    Orientation, Rect, Subband,
};
use crate::error::JxrError;
use crate::format::{NativePixelFormat, PixelFormatGuid, PixelFormatInfo};
use crate::stream::MemoryStream;

/// One opened decoder with its queried geometry.
///
/// Owns the decoder, which in turn owns the input stream; dropping the
/// session releases both. A session decodes a single image.
pub struct DecodeSession<'a> {
    decoder: Box<dyn ImageDecoder<'a> + 'a>,
    guid: PixelFormatGuid,
    info: Option<PixelFormatInfo>,
    params: Option<DecodeParams>,
    width: u32,
    height: u32,
    stride: Option<usize>,
}

impl<'a> DecodeSession<'a> {
    /// Resolve a JPEG XR decoder, bind `data` to it and read geometry.
    pub fn open(factory: &dyn CodecFactory, data: &'a [u8]) -> Result<Self, JxrError> {
        let id = factory
            .decoder_id(JXR_EXTENSION)
            .map_err(JxrError::FormatUnavailable)?;
        let mut decoder = factory.create(id).map_err(JxrError::from_engine)?;
        decoder
            .initialize(Box::new(MemoryStream::new(data)))
            .map_err(JxrError::from_engine)?;

        let guid = decoder.pixel_format();
        let info = PixelFormatInfo::lookup(&guid);
        let (width, height) = decoder.size();

        // Unknown formats still report geometry but are never configured.
        let params = match &info {
            Some(info) => {
                let params = decode_params(info, width, height);
                log::trace!("decode parameters: {params:?}");
                decoder.configure(&params);
                Some(params)
            }
            None => {
                log::warn!("decoder reported unknown pixel format {guid}");
                None
            }
        };

        if width == 0 || height == 0 {
            return Err(JxrError::DegenerateGeometry { width, height });
        }
        let stride = info
            .map(|info| {
                info.stride(width)
                    .ok_or(JxrError::DimensionsTooLarge { width, height })
            })
            .transpose()?;

        log::debug!("opened JPEG XR session: {width}x{height}, format {guid}, stride {stride:?}");
        Ok(Self {
            decoder,
            guid,
            info,
            params,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Padded row length of the native format in bytes, `None` when the
    /// format is unknown to the lookup table.
    pub fn stride(&self) -> Option<usize> {
        self.stride
    }

    pub fn pixel_format(&self) -> PixelFormatGuid {
        self.guid
    }

    pub fn format_info(&self) -> Option<&PixelFormatInfo> {
        self.info.as_ref()
    }

    pub fn native_format(&self) -> NativePixelFormat {
        NativePixelFormat::from_guid(self.guid)
    }

    /// Parameters the decoder was configured with. Unknown formats are not configured.
    pub fn params(&self) -> Option<&DecodeParams> {
        self.params.as_ref()
    }

    /// Decode the whole image into `dst` at the native stride.
    pub(crate) fn copy_full(&mut self, dst: &mut [u8], stride: usize) -> Result<(), JxrError> {
        let rect = Rect::full(self.width, self.height);
        self.decoder
            .copy(&rect, dst, stride)
            .map_err(JxrError::from_engine)
    }
}

impl core::fmt::Debug for DecodeSession<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DecodeSession")
            .field("guid", &self.guid)
            .field("info", &self.info)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish_non_exhaustive()
    }
}

/// Fixed parameter set: spatial output of the full image, no post-processing.
fn decode_params(info: &PixelFormatInfo, width: u32, height: u32) -> DecodeParams {
    DecodeParams {
        bitstream_format: BitstreamFormat::Spatial,
        alpha_mode: if info.has_alpha {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        subband: Subband::All,
        ignore_overlap: false,
        color_format: info.color_format,
        bit_depth: info.bit_depth,
        bits_per_unit: info.bits_per_unit,
        thumbnail_width: width,
        thumbnail_height: height,
        skip_flexbits: false,
        roi: Rect::full(width, height),
        orientation: Orientation::None,
        post_proc_strength: 0,
        verbose: false,
    }
}
