#![no_main]

use libfuzzer_sys::fuzz_target;
use unbrotli::{decompress_with, DecodeOptions};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail with an error, never panic
    let _ = unbrotli::decompress(data);

    let options = DecodeOptions { large_window: true, ..Default::default() };
    let _ = decompress_with(data, &options);
});
