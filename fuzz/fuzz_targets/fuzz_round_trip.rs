#![no_main]

use brotli::enc::BrotliEncoderParams;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the encoder settings, the rest is the payload
    let quality = (data[0] % 12) as i32;
    let lgwin = 10 + (data[0] / 12 % 15) as i32;
    let payload = &data[1..];
    let payload = if payload.len() > 64 * 1024 { &payload[..64 * 1024] } else { payload };

    let mut params = BrotliEncoderParams::default();
    params.quality = quality;
    params.lgwin = lgwin;
    let mut compressed = Vec::new();
    if brotli::BrotliCompress(&mut Cursor::new(payload), &mut compressed, &params).is_err() {
        return;
    }

    let decompressed = unbrotli::decompress(&compressed).expect("valid stream failed to decode");
    assert_eq!(decompressed, payload, "Round-trip mismatch");
});
