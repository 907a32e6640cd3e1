#![no_main]
use libfuzzer_sys::fuzz_target;
use zenjxr::{NativePixelFormat, transcode};

fuzz_target!(|data: &[u8]| {
    // Arbitrary geometry over arbitrary scratch; errors are fine, panics are not
    if data.len() < 4 {
        return;
    }
    let native = if data[0] & 1 == 0 {
        NativePixelFormat::Rgb24
    } else {
        NativePixelFormat::Rgba32
    };
    let width = u32::from(data[1] % 64);
    let height = u32::from(data[2] % 64);
    let stride = usize::from(data[3]);
    let scratch = &data[4..];

    let Ok(out) = transcode(native, scratch, width, height, stride, &enough::Unstoppable) else {
        return;
    };
    assert_eq!(out.len(), width as usize * height as usize * 4);
    assert!(out.chunks_exact(4).all(|px| native == NativePixelFormat::Rgba32 || px[3] == 0xFF));
});
