//! Mock JPEG XR engine for integration tests.
//!
//! Payloads use the real container prefix (`II BC 01` + IFD offset) and a
//! small IFD carrying the pixel format GUID, width, height and the offset of
//! uncompressed, tightly packed native rows. The mock reads everything
//! through the `ByteStream` it is given and counts releases.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use zenjxr::engine::{DecoderId, JXR_EXTENSION};
use zenjxr::{
    ByteStream, CodecFactory, DecodeParams, EngineError, ImageDecoder, PixelFormatGuid,
    PixelFormatInfo, Rect,
};

const TAG_PIXEL_FORMAT: u16 = 0xBC01;
const TAG_IMAGE_WIDTH: u16 = 0xBC80;
const TAG_IMAGE_HEIGHT: u16 = 0xBC81;
const TAG_IMAGE_OFFSET: u16 = 0xBCC0;
const TAG_IMAGE_BYTE_COUNT: u16 = 0xBCC1;

const TYPE_BYTE: u16 = 1;
const TYPE_LONG: u16 = 4;

const MOCK_ID: DecoderId = DecoderId(0x4a58_5221);

/// Build a container around tightly packed native rows.
pub fn jxr_payload(guid: PixelFormatGuid, width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let entries: u16 = 5;
    let ifd_offset = 8u32;
    let guid_offset = ifd_offset + 2 + u32::from(entries) * 12 + 4;
    let image_offset = guid_offset + 16;

    let mut out = vec![0x49, 0x49, 0xBC, 0x01];
    out.extend_from_slice(&ifd_offset.to_le_bytes());
    out.extend_from_slice(&entries.to_le_bytes());
    let mut entry = |tag: u16, ty: u16, count: u32, value: u32| {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&ty.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    };
    entry(TAG_PIXEL_FORMAT, TYPE_BYTE, 16, guid_offset);
    entry(TAG_IMAGE_WIDTH, TYPE_LONG, 1, width);
    entry(TAG_IMAGE_HEIGHT, TYPE_LONG, 1, height);
    entry(TAG_IMAGE_OFFSET, TYPE_LONG, 1, image_offset);
    entry(TAG_IMAGE_BYTE_COUNT, TYPE_LONG, 1, pixels.len() as u32);
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&guid.to_le_bytes());
    out.extend_from_slice(pixels);
    out
}

/// Release bookkeeping shared between the factory and its decoders.
#[derive(Debug, Default)]
pub struct Counters {
    pub created: Cell<usize>,
    pub released: Cell<usize>,
    pub streams_closed: Cell<usize>,
    pub copies: Cell<usize>,
    pub params: RefCell<Option<DecodeParams>>,
}

#[derive(Debug, Default)]
pub struct MockFactory {
    pub counters: Rc<Counters>,
    pub unavailable: bool,
    pub create_error: Option<EngineError>,
    pub copy_error: Option<EngineError>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.counters.created.get()
    }

    pub fn released(&self) -> usize {
        self.counters.released.get()
    }

    pub fn streams_closed(&self) -> usize {
        self.counters.streams_closed.get()
    }

    pub fn copies(&self) -> usize {
        self.counters.copies.get()
    }

    pub fn params(&self) -> Option<DecodeParams> {
        *self.counters.params.borrow()
    }

    /// Every created decoder has been released, and closed its stream if it got one.
    pub fn assert_all_released(&self) {
        assert_eq!(self.created(), self.released(), "decoder leaked or double-released");
        assert!(self.streams_closed() <= self.released());
    }
}

impl CodecFactory for MockFactory {
    fn decoder_id(&self, extension: &str) -> Result<DecoderId, EngineError> {
        if self.unavailable || extension != JXR_EXTENSION {
            return Err(EngineError::UnsupportedFormat);
        }
        Ok(MOCK_ID)
    }

    fn create<'a>(&self, id: DecoderId) -> Result<Box<dyn ImageDecoder<'a> + 'a>, EngineError> {
        assert_eq!(id, MOCK_ID);
        if let Some(e) = self.create_error {
            return Err(e);
        }
        self.counters.created.set(self.counters.created.get() + 1);
        Ok(Box::new(MockDecoder {
            stream: None,
            header: Header::default(),
            counters: Rc::clone(&self.counters),
            copy_error: self.copy_error,
        }))
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Header {
    guid: Option<PixelFormatGuid>,
    width: u32,
    height: u32,
    image_offset: usize,
    image_bytes: usize,
}

struct MockDecoder<'a> {
    stream: Option<Box<dyn ByteStream + 'a>>,
    header: Header,
    counters: Rc<Counters>,
    copy_error: Option<EngineError>,
}

fn read_u16(s: &mut dyn ByteStream) -> Result<u16, EngineError> {
    let mut b = [0u8; 2];
    s.read(&mut b).map_err(|_| EngineError::FileIo)?;
    Ok(u16::from_le_bytes(b))
}

fn read_u32(s: &mut dyn ByteStream) -> Result<u32, EngineError> {
    let mut b = [0u8; 4];
    s.read(&mut b).map_err(|_| EngineError::FileIo)?;
    Ok(u32::from_le_bytes(b))
}

fn seek(s: &mut dyn ByteStream, pos: usize) -> Result<(), EngineError> {
    s.set_position(pos).map_err(|_| EngineError::FileIo)
}

fn parse_header(s: &mut dyn ByteStream) -> Result<Header, EngineError> {
    let mut magic = [0u8; 4];
    s.read(&mut magic).map_err(|_| EngineError::FileIo)?;
    if magic != [0x49, 0x49, 0xBC, 0x01] {
        return Err(EngineError::UnsupportedFormat);
    }
    let ifd = read_u32(s)? as usize;
    seek(s, ifd)?;
    let count = read_u16(s)?;

    let mut header = Header::default();
    let mut guid_offset = None;
    for _ in 0..count {
        let tag = read_u16(s)?;
        let _ty = read_u16(s)?;
        let _count = read_u32(s)?;
        let value = read_u32(s)?;
        match tag {
            TAG_PIXEL_FORMAT => guid_offset = Some(value as usize),
            TAG_IMAGE_WIDTH => header.width = value,
            TAG_IMAGE_HEIGHT => header.height = value,
            TAG_IMAGE_OFFSET => header.image_offset = value as usize,
            TAG_IMAGE_BYTE_COUNT => header.image_bytes = value as usize,
            _ => {}
        }
    }

    let guid_offset = guid_offset.ok_or(EngineError::Fail)?;
    seek(s, guid_offset)?;
    let mut guid = [0u8; 16];
    s.read(&mut guid).map_err(|_| EngineError::FileIo)?;
    header.guid = Some(PixelFormatGuid::from_le_bytes(guid));

    // Rewind like a decoder re-scanning from the top.
    seek(s, 0)?;
    Ok(header)
}

impl<'a> ImageDecoder<'a> for MockDecoder<'a> {
    fn initialize(&mut self, stream: Box<dyn ByteStream + 'a>) -> Result<(), EngineError> {
        let stream = self.stream.insert(stream);
        self.header = parse_header(stream.as_mut())?;
        Ok(())
    }

    fn pixel_format(&self) -> PixelFormatGuid {
        self.header.guid.unwrap_or(PixelFormatGuid::new(0, 0, 0, [0; 8]))
    }

    fn size(&self) -> (u32, u32) {
        (self.header.width, self.header.height)
    }

    fn configure(&mut self, params: &DecodeParams) {
        *self.counters.params.borrow_mut() = Some(*params);
    }

    fn copy(&mut self, rect: &Rect, dst: &mut [u8], stride: usize) -> Result<(), EngineError> {
        self.counters.copies.set(self.counters.copies.get() + 1);
        if let Some(e) = self.copy_error {
            return Err(e);
        }
        let info = PixelFormatInfo::lookup(&self.pixel_format()).ok_or(EngineError::UnsupportedFormat)?;
        let row_bytes = (rect.width as usize * info.bits_per_unit as usize).div_ceil(8);
        let rows = rect.height as usize;
        if dst.len() < stride * rows || stride < row_bytes {
            return Err(EngineError::BufferOverflow);
        }
        if row_bytes * rows > self.header.image_bytes {
            return Err(EngineError::Fail);
        }
        let stream = self.stream.as_mut().ok_or(EngineError::Fail)?;
        seek(stream.as_mut(), self.header.image_offset)?;
        for y in 0..rows {
            let start = y * stride;
            stream
                .read(&mut dst[start..start + row_bytes])
                .map_err(|_| EngineError::FileIo)?;
        }
        Ok(())
    }
}

impl Drop for MockDecoder<'_> {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            assert!(stream.close().is_ok());
            self.counters
                .streams_closed
                .set(self.counters.streams_closed.get() + 1);
        }
        self.counters.released.set(self.counters.released.get() + 1);
    }
}
