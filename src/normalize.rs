//! Pixel format normalizer: native scanlines to canonical 32bpp BGRA.

use alloc::vec::Vec;
use enough::Stop;

use crate::decode::CanonicalImage;
use crate::error::JxrError;
use crate::format::NativePixelFormat;
use crate::limits::Limits;
use crate::session::DecodeSession;

/// Decode the session's image and rewrite it into a [`CanonicalImage`].
///
/// Consumes the session, so the decoder and its stream are released when
/// this returns, whatever the outcome. The scratch buffer never outlives the
/// call either. `limits` are checked before any buffer is allocated.
pub fn normalize(
    mut session: DecodeSession<'_>,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<CanonicalImage, JxrError> {
    let native = session.native_format();
    if let NativePixelFormat::Unsupported(guid) = native {
        log::warn!("cannot normalize native pixel format {guid}");
        return Err(JxrError::UnsupportedPixelFormat(guid));
    }

    let width = session.width();
    let height = session.height();
    if let Some(limits) = limits {
        limits.check_geometry(width, height)?;
    }
    let stride = session
        .stride()
        .ok_or(JxrError::UnsupportedPixelFormat(session.pixel_format()))?;
    let scratch_len = stride
        .checked_mul(height as usize)
        .ok_or(JxrError::DimensionsTooLarge { width, height })?;
    let out_len = canonical_len(width, height)?;
    if let Some(limits) = limits {
        limits.check_buffers(scratch_len, out_len)?;
    }

    let mut scratch = alloc_zeroed(scratch_len)?;
    stop.check()?;
    session.copy_full(&mut scratch, stride)?;

    let pixels = transcode(native, &scratch, width, height, stride, stop)?;
    Ok(CanonicalImage::new(pixels, width, height))
}

/// Rewrite `height` native rows spaced `stride` bytes apart into tightly
/// packed BGRA rows of `width * 4` bytes.
///
/// Row padding past `width * bytes_per_pixel` is ignored. Only
/// [`NativePixelFormat::Rgb24`] and [`NativePixelFormat::Rgba32`] are accepted.
pub fn transcode(
    native: NativePixelFormat,
    scratch: &[u8],
    width: u32,
    height: u32,
    stride: usize,
    stop: &dyn Stop,
) -> Result<Vec<u8>, JxrError> {
    let (bpp, convert_row): (usize, fn(&[u8], &mut [u8])) = match native {
        NativePixelFormat::Rgb24 => (3, rgb24_row_to_bgra),
        NativePixelFormat::Rgba32 => (4, rgba32_row_copy),
        NativePixelFormat::Unsupported(guid) => {
            return Err(JxrError::UnsupportedPixelFormat(guid));
        }
    };
    if width == 0 || height == 0 {
        return Err(JxrError::DegenerateGeometry { width, height });
    }

    let w = width as usize;
    let h = height as usize;
    let row_bytes = w
        .checked_mul(bpp)
        .ok_or(JxrError::DimensionsTooLarge { width, height })?;
    if stride < row_bytes {
        return Err(JxrError::BufferTooSmall {
            needed: row_bytes,
            actual: stride,
        });
    }
    let needed = stride
        .checked_mul(h)
        .ok_or(JxrError::DimensionsTooLarge { width, height })?;
    if scratch.len() < needed {
        return Err(JxrError::BufferTooSmall {
            needed,
            actual: scratch.len(),
        });
    }

    let out_row = w * 4;
    let mut out = alloc_zeroed(canonical_len(width, height)?)?;
    for (row, (src, dst)) in scratch[..needed]
        .chunks_exact(stride)
        .zip(out.chunks_exact_mut(out_row))
        .enumerate()
    {
        if row % 16 == 0 {
            stop.check()?;
        }
        convert_row(&src[..row_bytes], dst);
    }
    Ok(out)
}

/// `[R, G, B]` to `[B, G, R, 0xFF]`; the source carries no alpha.
fn rgb24_row_to_bgra(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = 0xFF;
    }
}

fn rgba32_row_copy(src: &[u8], dst: &mut [u8]) {
    dst.copy_from_slice(src);
}

fn canonical_len(width: u32, height: u32) -> Result<usize, JxrError> {
    (width as usize)
        .checked_mul(4)
        .and_then(|r| r.checked_mul(height as usize))
        .ok_or(JxrError::DimensionsTooLarge { width, height })
}

fn alloc_zeroed(bytes: usize) -> Result<Vec<u8>, JxrError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes)
        .map_err(|_| JxrError::AllocationFailure { bytes })?;
    buf.resize(bytes, 0);
    Ok(buf)
}
