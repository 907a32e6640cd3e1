//! BMP envelope: file/info headers around a canonical 32bpp image.

mod encode;

use alloc::vec::Vec;
use enough::Stop;

use crate::decode::CanonicalImage;
use crate::error::JxrError;

/// `BITMAPFILEHEADER` size on disk.
pub const FILE_HEADER_SIZE: u32 = 14;
/// `BITMAPINFOHEADER` size on disk.
pub const INFO_HEADER_SIZE: u32 = 40;
/// `"BM"` read as a little-endian `u16`.
pub const BMP_MAGIC: u16 = u16::from_le_bytes(*b"BM");
/// `BI_RGB`: uncompressed.
pub const BI_RGB: u32 = 0;

/// `BITMAPFILEHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapFileHeader {
    pub bf_type: u16,
    pub bf_size: u32,
    pub bf_reserved1: u16,
    pub bf_reserved2: u16,
    pub bf_off_bits: u32,
}

impl BitmapFileHeader {
    pub fn to_le_bytes(&self) -> [u8; 14] {
        let mut out = [0u8; 14];
        out[0..2].copy_from_slice(&self.bf_type.to_le_bytes());
        out[2..6].copy_from_slice(&self.bf_size.to_le_bytes());
        out[6..8].copy_from_slice(&self.bf_reserved1.to_le_bytes());
        out[8..10].copy_from_slice(&self.bf_reserved2.to_le_bytes());
        out[10..14].copy_from_slice(&self.bf_off_bits.to_le_bytes());
        out
    }
}

/// `BITMAPINFOHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapInfoHeader {
    pub bi_size: u32,
    pub bi_width: i32,
    /// Positive: bottom-up row order by BMP convention.
    pub bi_height: i32,
    pub bi_planes: u16,
    pub bi_bit_count: u16,
    pub bi_compression: u32,
    pub bi_size_image: u32,
    pub bi_x_pels_per_meter: i32,
    pub bi_y_pels_per_meter: i32,
    pub bi_clr_used: u32,
    pub bi_clr_important: u32,
}

impl BitmapInfoHeader {
    pub fn to_le_bytes(&self) -> [u8; 40] {
        let mut out = [0u8; 40];
        out[0..4].copy_from_slice(&self.bi_size.to_le_bytes());
        out[4..8].copy_from_slice(&self.bi_width.to_le_bytes());
        out[8..12].copy_from_slice(&self.bi_height.to_le_bytes());
        out[12..14].copy_from_slice(&self.bi_planes.to_le_bytes());
        out[14..16].copy_from_slice(&self.bi_bit_count.to_le_bytes());
        out[16..20].copy_from_slice(&self.bi_compression.to_le_bytes());
        out[20..24].copy_from_slice(&self.bi_size_image.to_le_bytes());
        out[24..28].copy_from_slice(&self.bi_x_pels_per_meter.to_le_bytes());
        out[28..32].copy_from_slice(&self.bi_y_pels_per_meter.to_le_bytes());
        out[32..36].copy_from_slice(&self.bi_clr_used.to_le_bytes());
        out[36..40].copy_from_slice(&self.bi_clr_important.to_le_bytes());
        out
    }
}

/// File and info headers for a 32bpp uncompressed image, fully determined by
/// width and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapHeaders {
    file: BitmapFileHeader,
    info: BitmapInfoHeader,
}

impl BitmapHeaders {
    pub fn new(width: u32, height: u32) -> Result<Self, JxrError> {
        let too_large = || JxrError::DimensionsTooLarge { width, height };
        let bi_width = i32::try_from(width).map_err(|_| too_large())?;
        let bi_height = i32::try_from(height).map_err(|_| too_large())?;
        let pixel_bytes = u32::try_from(u64::from(width) * u64::from(height) * 4)
            .ok()
            .filter(|&n| n <= u32::MAX - FILE_HEADER_SIZE - INFO_HEADER_SIZE)
            .ok_or_else(too_large)?;
        let off_bits = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

        Ok(Self {
            file: BitmapFileHeader {
                bf_type: BMP_MAGIC,
                bf_size: off_bits + pixel_bytes,
                bf_reserved1: 0,
                bf_reserved2: 0,
                bf_off_bits: off_bits,
            },
            info: BitmapInfoHeader {
                bi_size: INFO_HEADER_SIZE,
                bi_width,
                bi_height,
                bi_planes: 1,
                bi_bit_count: 32,
                bi_compression: BI_RGB,
                bi_size_image: pixel_bytes,
                bi_x_pels_per_meter: 0,
                bi_y_pels_per_meter: 0,
                bi_clr_used: 0,
                bi_clr_important: 0,
            },
        })
    }

    pub fn file(&self) -> &BitmapFileHeader {
        &self.file
    }

    pub fn info(&self) -> &BitmapInfoHeader {
        &self.info
    }

    /// Pixel payload size: `bf_size - bf_off_bits`.
    pub fn pixel_bytes(&self) -> usize {
        (self.file.bf_size - self.file.bf_off_bits) as usize
    }
}

/// A canonical image together with its BMP headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalBitmap {
    headers: BitmapHeaders,
    image: CanonicalImage,
}

impl CanonicalBitmap {
    pub fn new(image: CanonicalImage) -> Result<Self, JxrError> {
        let headers = BitmapHeaders::new(image.width, image.height)?;
        Ok(Self { headers, image })
    }

    pub fn file_header(&self) -> &BitmapFileHeader {
        self.headers.file()
    }

    pub fn info_header(&self) -> &BitmapInfoHeader {
        self.headers.info()
    }

    pub fn headers(&self) -> &BitmapHeaders {
        &self.headers
    }

    /// Pixel payload, rows in decode order.
    pub fn pixels(&self) -> &[u8] {
        self.image.pixels()
    }

    pub fn image(&self) -> &CanonicalImage {
        &self.image
    }

    pub fn into_parts(self) -> (BitmapHeaders, CanonicalImage) {
        (self.headers, self.image)
    }

    /// Serialize as a standalone `.bmp` file.
    ///
    /// The positive `biHeight` means bottom-up storage, so rows are written in
    /// reverse to keep the first decoded row at the top of the picture.
    pub fn to_bmp_file(&self, stop: &dyn Stop) -> Result<Vec<u8>, JxrError> {
        encode::write_bmp_file(&self.headers, &self.image, stop)
    }
}
