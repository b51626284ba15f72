#![no_main]

use libfuzzer_sys::fuzz_target;
use lmms_project::ProjectFormat;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must be rejected cleanly, never panic or over-allocate.
    let _ = ProjectFormat::Compressed.unwrap_bytes(data);

    let framed = ProjectFormat::Compressed
        .wrap_bytes(data)
        .expect("compressing in memory failed");
    let unframed = ProjectFormat::Compressed
        .unwrap_bytes(&framed)
        .expect("own framing failed to decode");
    assert_eq!(unframed, data);
});
