#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use flatview::{Decoder, DecoderOptions, Endian, TextEncoding};

#[derive(Arbitrary, Debug)]
struct MutatedInput {
    big_endian: bool,
    lossy_text: bool,
    cache_limit: Option<u8>,
    /// (position, xor mask) pairs applied to a valid buffer.
    flips: Vec<(u16, u8)>,
}

fuzz_target!(|input: MutatedInput| {
    let endian = if input.big_endian {
        Endian::Big
    } else {
        Endian::Little
    };
    let mut data = flatview::tests::monster_buffer(endian);
    for (pos, mask) in input.flips {
        let len = data.len();
        data[pos as usize % len] ^= mask;
    }

    let mut options = DecoderOptions::default().with_endian(endian).with_max_depth(16);
    if input.lossy_text {
        options = options.with_text(TextEncoding::Utf8Lossy);
    }
    if let Some(limit) = input.cache_limit {
        options = options.with_vtable_cache_limit(limit as usize);
    }
    let mut decoder = Decoder::with_schema(&data, flatview::tests::monster_schema(), options);
    let _ = decoder.root("Monster");
});
