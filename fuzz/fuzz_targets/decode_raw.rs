#![no_main]

use libfuzzer_sys::fuzz_target;
use flatview::{Decoder, DecoderOptions};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes against the sample schema: errors are fine, panics are not.
    let mut decoder = Decoder::with_schema(
        data,
        flatview::tests::monster_schema(),
        DecoderOptions::default().with_max_depth(16),
    );
    let _ = decoder.root("Monster");
    decoder.seek(0);
    let _ = decoder.inspect_table();
});
