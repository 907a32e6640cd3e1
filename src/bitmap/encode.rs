//! BMP file writer for canonical 32bpp images.

use alloc::vec::Vec;
use enough::Stop;

use super::BitmapHeaders;
use crate::decode::CanonicalImage;
use crate::error::JxrError;

/// Headers followed by pixel rows, last decoded row first.
pub(crate) fn write_bmp_file(
    headers: &BitmapHeaders,
    image: &CanonicalImage,
    stop: &dyn Stop,
) -> Result<Vec<u8>, JxrError> {
    let pixels = image.pixels();
    let row_bytes = image.row_bytes();
    let expected = headers.pixel_bytes();
    if pixels.len() < expected {
        return Err(JxrError::BufferTooSmall {
            needed: expected,
            actual: pixels.len(),
        });
    }

    stop.check()?;

    let file_size = headers.file().bf_size as usize;
    let mut out = Vec::with_capacity(file_size);
    out.extend_from_slice(&headers.file().to_le_bytes());
    out.extend_from_slice(&headers.info().to_le_bytes());

    // 32bpp rows are already 4-byte aligned, so no padding is written.
    for (row_idx, row) in pixels[..expected].chunks_exact(row_bytes).rev().enumerate() {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        out.extend_from_slice(row);
    }

    debug_assert_eq!(out.len(), file_size);
    Ok(out)
}
