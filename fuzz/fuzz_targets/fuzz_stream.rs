#![no_main]
use libfuzzer_sys::fuzz_target;
use zenjxr::{ByteStream, MemoryStream};

fuzz_target!(|data: &[u8]| {
    // First half drives seeks and reads against the second half; must never panic
    let (ops, body) = data.split_at(data.len() / 2);
    let mut stream = MemoryStream::new(body);
    for op in ops.chunks(2) {
        let arg = op.get(1).copied().unwrap_or(0) as usize;
        let before = stream.position();
        match op[0] % 3 {
            0 => {
                let mut buf = vec![0u8; arg];
                if stream.read(&mut buf).is_ok() {
                    assert_eq!(&buf[..], &body[before..before + arg]);
                } else {
                    assert_eq!(stream.position(), before, "failed read moved the cursor");
                }
            }
            1 => {
                if stream.set_position(arg).is_err() {
                    assert!(arg > body.len());
                    assert_eq!(stream.position(), before);
                }
            }
            _ => assert!(stream.write(&[0]).is_err()),
        }
        assert!(stream.position() <= body.len());
        assert_eq!(stream.is_at_end(), stream.position() == body.len());
    }
});
