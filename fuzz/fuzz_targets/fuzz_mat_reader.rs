#![no_main]

use libfuzzer_sys::fuzz_target;
use matjson::convert::Converter;
use matjson::mat::Mat5Reader;

fuzz_target!(|data: &[u8]| {
    // Malformed input must come back as an error, never a panic
    if let Ok(file) = Mat5Reader::new().read_bytes(data) {
        // Anything the reader accepts must also render
        let _ = Converter::new().convert(&file.entries);
    }
});
