//! Native pixel formats reported by the decoder engine.

use core::fmt;

/// Pixel format GUID as laid out by the JPEG XR reference codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormatGuid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

/// Shared prefix of the WMP/WIC pixel format GUIDs; only the last byte varies.
const fn wmp(last: u8) -> PixelFormatGuid {
    PixelFormatGuid::new(
        0x6fdd_c324,
        0x4e03,
        0x4bfe,
        [0xb1, 0x85, 0x3d, 0x77, 0x76, 0x8d, 0xc9, last],
    )
}

impl PixelFormatGuid {
    pub const BLACK_WHITE: Self = wmp(0x05);
    pub const GRAY8: Self = wmp(0x08);
    pub const BGR555: Self = wmp(0x09);
    pub const BGR565: Self = wmp(0x0a);
    pub const GRAY16: Self = wmp(0x0b);
    pub const BGR24: Self = wmp(0x0c);
    pub const RGB24: Self = wmp(0x0d);
    pub const BGR32: Self = wmp(0x0e);
    pub const BGRA32: Self = wmp(0x0f);
    pub const PBGRA32: Self = wmp(0x10);
    pub const GRAY32_FLOAT: Self = wmp(0x11);
    pub const RGB48_FIXED: Self = wmp(0x12);
    pub const GRAY16_FIXED: Self = wmp(0x13);
    pub const BGR101010: Self = wmp(0x14);
    pub const RGB48: Self = wmp(0x15);
    pub const RGBA64: Self = wmp(0x16);
    pub const RGBA128_FLOAT: Self = wmp(0x19);
    pub const RGB128_FLOAT: Self = wmp(0x1b);
    pub const CMYK32: Self = wmp(0x1c);
    pub const CMYK64: Self = wmp(0x1f);
    pub const RGBA64_HALF: Self = wmp(0x3a);
    pub const RGB48_HALF: Self = wmp(0x3b);
    pub const RGBE32: Self = wmp(0x3d);
    pub const RGBA32: Self = Self::new(
        0xf5c7_ad2d,
        0x6a8d,
        0x43dd,
        [0xa7, 0xa8, 0xa2, 0x99, 0x35, 0x26, 0x1a, 0xe9],
    );

    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Parse the 16-byte little-endian on-disk form (the `PixelFormat` IFD tag).
    pub fn from_le_bytes(b: [u8; 16]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&b[8..16]);
        Self {
            data1: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            data2: u16::from_le_bytes([b[4], b[5]]),
            data3: u16::from_le_bytes([b[6], b[7]]),
            data4,
        }
    }

    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.data1.to_le_bytes());
        out[4..6].copy_from_slice(&self.data2.to_le_bytes());
        out[6..8].copy_from_slice(&self.data3.to_le_bytes());
        out[8..16].copy_from_slice(&self.data4);
        out
    }
}

impl fmt::Display for PixelFormatGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

/// Internal color format the engine decodes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ColorFormat {
    YOnly = 0,
    Yuv420 = 1,
    Yuv422 = 2,
    Yuv444 = 3,
    Cmyk = 4,
    NComponent = 6,
    Rgb = 7,
    Rgbe = 8,
}

/// Per-channel sample depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BitDepth {
    Bd1 = 0,
    Bd8 = 1,
    Bd16 = 2,
    Bd16S = 3,
    Bd16F = 4,
    Bd32 = 5,
    Bd32S = 6,
    Bd32F = 7,
    Bd5 = 8,
    Bd10 = 9,
    Bd565 = 10,
}

/// Forward lookup result for a pixel format GUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelFormatInfo {
    pub guid: PixelFormatGuid,
    pub color_format: ColorFormat,
    pub bit_depth: BitDepth,
    /// Bits per pixel as stored in the engine's output rows.
    pub bits_per_unit: u32,
    pub has_alpha: bool,
}

const fn info(
    guid: PixelFormatGuid,
    color_format: ColorFormat,
    bit_depth: BitDepth,
    bits_per_unit: u32,
    has_alpha: bool,
) -> PixelFormatInfo {
    PixelFormatInfo {
        guid,
        color_format,
        bit_depth,
        bits_per_unit,
        has_alpha,
    }
}

static PIXEL_FORMATS: &[PixelFormatInfo] = &[
    info(PixelFormatGuid::BLACK_WHITE, ColorFormat::YOnly, BitDepth::Bd1, 1, false),
    info(PixelFormatGuid::GRAY8, ColorFormat::YOnly, BitDepth::Bd8, 8, false),
    info(PixelFormatGuid::GRAY16, ColorFormat::YOnly, BitDepth::Bd16, 16, false),
    info(PixelFormatGuid::GRAY16_FIXED, ColorFormat::YOnly, BitDepth::Bd16S, 16, false),
    info(PixelFormatGuid::GRAY32_FLOAT, ColorFormat::YOnly, BitDepth::Bd32F, 32, false),
    info(PixelFormatGuid::BGR555, ColorFormat::Rgb, BitDepth::Bd5, 16, false),
    info(PixelFormatGuid::BGR565, ColorFormat::Rgb, BitDepth::Bd565, 16, false),
    info(PixelFormatGuid::BGR24, ColorFormat::Rgb, BitDepth::Bd8, 24, false),
    info(PixelFormatGuid::RGB24, ColorFormat::Rgb, BitDepth::Bd8, 24, false),
    info(PixelFormatGuid::BGR32, ColorFormat::Rgb, BitDepth::Bd8, 32, false),
    info(PixelFormatGuid::BGRA32, ColorFormat::Rgb, BitDepth::Bd8, 32, true),
    info(PixelFormatGuid::PBGRA32, ColorFormat::Rgb, BitDepth::Bd8, 32, true),
    info(PixelFormatGuid::RGBA32, ColorFormat::Rgb, BitDepth::Bd8, 32, true),
    info(PixelFormatGuid::BGR101010, ColorFormat::Rgb, BitDepth::Bd10, 32, false),
    info(PixelFormatGuid::RGB48, ColorFormat::Rgb, BitDepth::Bd16, 48, false),
    info(PixelFormatGuid::RGB48_FIXED, ColorFormat::Rgb, BitDepth::Bd16S, 48, false),
    info(PixelFormatGuid::RGB48_HALF, ColorFormat::Rgb, BitDepth::Bd16F, 48, false),
    info(PixelFormatGuid::RGBA64, ColorFormat::Rgb, BitDepth::Bd16, 64, true),
    info(PixelFormatGuid::RGBA64_HALF, ColorFormat::Rgb, BitDepth::Bd16F, 64, true),
    info(PixelFormatGuid::RGB128_FLOAT, ColorFormat::Rgb, BitDepth::Bd32F, 128, false),
    info(PixelFormatGuid::RGBA128_FLOAT, ColorFormat::Rgb, BitDepth::Bd32F, 128, true),
    info(PixelFormatGuid::CMYK32, ColorFormat::Cmyk, BitDepth::Bd8, 32, false),
    info(PixelFormatGuid::CMYK64, ColorFormat::Cmyk, BitDepth::Bd16, 64, false),
    info(PixelFormatGuid::RGBE32, ColorFormat::Rgbe, BitDepth::Bd8, 32, false),
];

impl PixelFormatInfo {
    /// Look up a GUID in the known-format table.
    pub fn lookup(guid: &PixelFormatGuid) -> Option<Self> {
        PIXEL_FORMATS.iter().find(|i| i.guid == *guid).copied()
    }

    /// Padded row length for `width` pixels (4-byte row alignment).
    pub fn stride(&self, width: u32) -> Option<usize> {
        let bits = (width as usize).checked_mul(self.bits_per_unit as usize)?;
        bits.div_ceil(8).checked_add(3).map(|s| s & !3)
    }
}

/// Native formats the normalizer can transcode. Everything else fails loudly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativePixelFormat {
    /// 3 bytes/pixel, `[R, G, B]`.
    Rgb24,
    /// 4 bytes/pixel with alpha, copied into canonical rows byte for byte.
    Rgba32,
    Unsupported(PixelFormatGuid),
}

impl NativePixelFormat {
    pub fn from_guid(guid: PixelFormatGuid) -> Self {
        if guid == PixelFormatGuid::RGB24 {
            Self::Rgb24
        } else if guid == PixelFormatGuid::RGBA32 {
            Self::Rgba32
        } else {
            Self::Unsupported(guid)
        }
    }

    /// Bytes per native pixel, `None` for unsupported formats.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            Self::Rgb24 => Some(3),
            Self::Rgba32 => Some(4),
            Self::Unsupported(_) => None,
        }
    }
}
