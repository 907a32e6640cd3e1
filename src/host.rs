//! Plugin host boundary.
//!
//! The four entry points an image-viewer host calls, reporting failures as
//! the host's coarse [`HostStatus`] codes, plus the relocatable-memory
//! abstraction results are handed back in.

use alloc::vec::Vec;
use core::cell::Cell;

use enough::Unstoppable;

use crate::bitmap::{CanonicalBitmap, INFO_HEADER_SIZE};
use crate::decode::DecodeRequest;
use crate::engine::CodecFactory;
use crate::error::JxrError;

/// Plugin identification strings: API version, description, extension filter,
/// filter label.
pub const PLUGIN_INFO: [&str; 4] = [
    "00IN",
    "JXR Plugin for Susie Image Viewer",
    "*.jxr",
    "JXR file (*.jxr)",
];

/// Number of leading file bytes the host passes to [`is_supported`].
pub const HEADER_SIZE: usize = 64;

/// `II` byte order mark, `0xBC` JPEG XR identifier, version 1.
/// Zero bytes in the pattern match anything.
const MAGIC: [u8; 4] = [0x49, 0x49, 0xBC, 0x01];

/// Status codes the host understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum HostStatus {
    AllRight = 0,
    /// The progress callback asked to stop.
    Abort = 1,
    /// A host memory block could not be allocated.
    NoMemory = 4,
    /// Generic decode failure.
    MemoryError = 5,
}

impl HostStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<JxrError> for HostStatus {
    fn from(e: JxrError) -> Self {
        e.host_status()
    }
}

/// Geometry reported to the host by [`query_info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PictureInfo {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub x_density: u16,
    pub y_density: u16,
    pub color_depth: u16,
}

/// Host-side relocatable memory (allocate, lock, copy, unlock, free).
///
/// Methods take `&self` so that several blocks can be live at once.
pub trait HostAllocator {
    type Handle;

    fn allocate(&self, size: usize) -> Option<Self::Handle>;

    /// Pin the block and expose its bytes.
    fn lock<'h>(&self, handle: &'h mut Self::Handle) -> Option<&'h mut [u8]>;

    fn unlock(&self, handle: &mut Self::Handle);

    fn free(&self, handle: Self::Handle);
}

/// A host block that is freed on drop unless handed over with
/// [`into_handle`](HostBlock::into_handle).
pub struct HostBlock<'a, A: HostAllocator> {
    allocator: &'a A,
    handle: Option<A::Handle>,
}

impl<'a, A: HostAllocator> HostBlock<'a, A> {
    pub fn allocate(allocator: &'a A, size: usize) -> Option<Self> {
        let handle = allocator.allocate(size)?;
        Some(Self {
            allocator,
            handle: Some(handle),
        })
    }

    /// Lock, copy `src` to the start of the block, unlock.
    ///
    /// Returns `false` if the block cannot be locked or is too small.
    pub fn fill(&mut self, src: &[u8]) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        let copied = match self.allocator.lock(handle) {
            Some(dst) if dst.len() >= src.len() => {
                dst[..src.len()].copy_from_slice(src);
                true
            }
            Some(_) => false,
            None => return false,
        };
        self.allocator.unlock(handle);
        copied
    }

    /// Release ownership to the caller without freeing.
    pub fn into_handle(mut self) -> Option<A::Handle> {
        self.handle.take()
    }
}

impl<A: HostAllocator> Drop for HostBlock<'_, A> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.allocator.free(handle);
        }
    }
}

/// Result blocks handed to the host: the info header and the pixel payload.
#[derive(Debug)]
pub struct HostBitmap<H> {
    pub info: H,
    pub data: H,
}

/// Heap-backed [`HostAllocator`] that tracks live blocks.
///
/// `with_budget` limits how many allocations succeed, and
/// `with_failing_locks` makes every lock fail; both exist to exercise
/// the release paths.
#[derive(Debug, Default)]
pub struct HeapAllocator {
    live: Cell<usize>,
    budget: Cell<Option<usize>>,
    fail_locks: bool,
}

/// Block owned by [`HeapAllocator`].
#[derive(Debug)]
pub struct HeapBlock {
    buf: Vec<u8>,
    locked: bool,
}

impl HeapBlock {
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl HeapAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the first `allocations` calls to `allocate` succeed.
    pub fn with_budget(allocations: usize) -> Self {
        Self {
            budget: Cell::new(Some(allocations)),
            ..Self::default()
        }
    }

    pub fn with_failing_locks() -> Self {
        Self {
            fail_locks: true,
            ..Self::default()
        }
    }

    /// Blocks allocated and not yet freed.
    pub fn live_blocks(&self) -> usize {
        self.live.get()
    }
}

impl HostAllocator for HeapAllocator {
    type Handle = HeapBlock;

    fn allocate(&self, size: usize) -> Option<HeapBlock> {
        if let Some(left) = self.budget.get() {
            if left == 0 {
                return None;
            }
            self.budget.set(Some(left - 1));
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(size).ok()?;
        buf.resize(size, 0);
        self.live.set(self.live.get() + 1);
        Some(HeapBlock { buf, locked: false })
    }

    fn lock<'h>(&self, handle: &'h mut HeapBlock) -> Option<&'h mut [u8]> {
        if self.fail_locks {
            return None;
        }
        handle.locked = true;
        Some(&mut handle.buf)
    }

    fn unlock(&self, handle: &mut HeapBlock) {
        handle.locked = false;
    }

    /// `handle` must come from this allocator; the live count never drops below zero.
    fn free(&self, handle: HeapBlock) {
        debug_assert!(!handle.locked, "freeing a locked block");
        self.live.set(self.live.get().saturating_sub(1));
        drop(handle);
    }
}

/// Match the JPEG XR magic at the start of `first_bytes`.
pub fn is_supported(first_bytes: &[u8]) -> bool {
    if first_bytes.len() < MAGIC.len() {
        return false;
    }
    MAGIC
        .iter()
        .zip(first_bytes)
        .all(|(&want, &got)| want == 0x00 || want == got)
}

/// Geometry only; never decodes pixels.
pub fn query_info(factory: &dyn CodecFactory, data: &[u8]) -> Result<PictureInfo, HostStatus> {
    let info = DecodeRequest::new(factory, data).probe()?;
    Ok(PictureInfo {
        left: 0,
        top: 0,
        width: info.width,
        height: info.height,
        x_density: 0,
        y_density: 0,
        color_depth: 32,
    })
}

/// Full decode into canonical pixels with BMP headers.
pub fn decode_to_canonical_bitmap(
    factory: &dyn CodecFactory,
    data: &[u8],
) -> Result<CanonicalBitmap, JxrError> {
    let image = DecodeRequest::new(factory, data).decode(Unstoppable)?;
    CanonicalBitmap::new(image)
}

/// Full decode into two host blocks: the info header and the pixel payload.
///
/// `progress` is called with `(0, 1)` before decoding and `(1, 1)` after; a
/// `true` return aborts. Blocks are freed on every failure path, including
/// an abort after decoding.
pub fn decode_to_host_handles<A: HostAllocator>(
    factory: &dyn CodecFactory,
    data: &[u8],
    mut progress: Option<&mut dyn FnMut(u32, u32) -> bool>,
    allocator: &A,
) -> Result<HostBitmap<A::Handle>, HostStatus> {
    if report(&mut progress, 0, 1) {
        log::warn!("decode aborted by host before start");
        return Err(JxrError::UserAbort.into());
    }

    let bitmap = decode_to_canonical_bitmap(factory, data)?;

    let info = HostBlock::allocate(allocator, INFO_HEADER_SIZE as usize);
    let pixels = HostBlock::allocate(allocator, bitmap.headers().pixel_bytes());
    let (Some(mut info), Some(mut pixels)) = (info, pixels) else {
        return Err(HostStatus::NoMemory);
    };
    if !info.fill(&bitmap.info_header().to_le_bytes()) || !pixels.fill(bitmap.pixels()) {
        return Err(HostStatus::MemoryError);
    }
    drop(bitmap);

    if report(&mut progress, 1, 1) {
        log::warn!("decode aborted by host after completion");
        return Err(JxrError::UserAbort.into());
    }

    match (info.into_handle(), pixels.into_handle()) {
        (Some(info), Some(data)) => Ok(HostBitmap { info, data }),
        _ => Err(HostStatus::MemoryError),
    }
}

fn report(progress: &mut Option<&mut dyn FnMut(u32, u32) -> bool>, num: u32, denom: u32) -> bool {
    progress.as_mut().is_some_and(|cb| cb(num, denom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormatGuid;

    #[test]
    fn magic_matches() {
        assert!(is_supported(&[0x49, 0x49, 0xBC, 0x01]));
        assert!(is_supported(&[0x49, 0x49, 0xBC, 0x01, 0x20, 0x00, 0x00, 0x00]));
    }

    #[test]
    fn magic_rejects() {
        assert!(!is_supported(b"BM\x36\x00"));
        assert!(!is_supported(&[0x49, 0x49, 0x2A, 0x00])); // TIFF
        assert!(!is_supported(&[0x49, 0x49, 0xBC, 0x02]));
        assert!(!is_supported(&[0x49, 0x49, 0xBC]));
        assert!(!is_supported(&[]));
    }

    #[test]
    fn status_codes() {
        assert_eq!(HostStatus::AllRight.code(), 0);
        assert_eq!(HostStatus::Abort.code(), 1);
        assert_eq!(HostStatus::NoMemory.code(), 4);
        assert_eq!(HostStatus::MemoryError.code(), 5);
    }

    #[test]
    fn error_mapping_is_coarse() {
        assert_eq!(HostStatus::from(JxrError::UserAbort), HostStatus::Abort);
        assert_eq!(
            HostStatus::from(JxrError::AllocationFailure { bytes: 1 }),
            HostStatus::NoMemory
        );
        assert_eq!(
            HostStatus::from(JxrError::DegenerateGeometry { width: 0, height: 1 }),
            HostStatus::MemoryError
        );
        assert_eq!(
            HostStatus::from(JxrError::UnsupportedPixelFormat(PixelFormatGuid::GRAY8)),
            HostStatus::MemoryError
        );
    }

    #[test]
    fn block_freed_on_drop() {
        let alloc = HeapAllocator::new();
        {
            let mut block = HostBlock::allocate(&alloc, 8).unwrap();
            assert!(block.fill(&[1, 2, 3]));
            assert_eq!(alloc.live_blocks(), 1);
        }
        assert_eq!(alloc.live_blocks(), 0);
    }

    #[test]
    fn block_handed_over() {
        let alloc = HeapAllocator::new();
        let mut block = HostBlock::allocate(&alloc, 4).unwrap();
        assert!(block.fill(&[7, 8]));
        let handle = block.into_handle().unwrap();
        assert_eq!(alloc.live_blocks(), 1);
        assert_eq!(handle.bytes(), &[7, 8, 0, 0]);
        assert!(!handle.is_locked());
        alloc.free(handle);
        assert_eq!(alloc.live_blocks(), 0);
    }

    #[test]
    fn fill_rejects_oversized_source() {
        let alloc = HeapAllocator::new();
        let mut block = HostBlock::allocate(&alloc, 2).unwrap();
        assert!(!block.fill(&[1, 2, 3]));
    }

    #[test]
    fn budget_limits_allocations() {
        let alloc = HeapAllocator::with_budget(1);
        let first = HostBlock::allocate(&alloc, 4);
        assert!(first.is_some());
        assert!(HostBlock::allocate(&alloc, 4).is_none());
        drop(first);
        assert_eq!(alloc.live_blocks(), 0);
    }

    #[test]
    fn failing_locks() {
        let alloc = HeapAllocator::with_failing_locks();
        let mut block = HostBlock::allocate(&alloc, 4).unwrap();
        assert!(!block.fill(&[1]));
    }
}
