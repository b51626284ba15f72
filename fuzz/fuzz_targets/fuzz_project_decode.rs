#![no_main]

use libfuzzer_sys::fuzz_target;
use lmms_project::format::{decode_str, encode_xml};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that decodes must encode, and the encoding must decode again.
    if let Ok(project) = decode_str(text, "fuzz") {
        let xml = encode_xml(&project).expect("decoded project failed to encode");
        decode_str(xml, "fuzz").expect("encoded project failed to decode");
    }
});
