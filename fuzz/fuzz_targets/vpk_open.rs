//! Fuzz target for VpkArchive::open with arbitrary byte input.
//!
//! This target exercises the VPK parsing code with potentially malformed
//! or adversarial input. The goal is to find panics, hangs, or memory
//! issues in the header and directory tree parsing logic.
//!
//! Run with: cargo +nightly fuzz run vpk_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Attempt to open arbitrary bytes as a VPK archive
    let cursor = Cursor::new(data.to_vec());

    // If the bytes parse, walking the entries and extracting them must
    // not panic either
    if let Ok(mut archive) = reefmerge::VpkArchive::open(cursor) {
        let paths: Vec<String> = archive
            .paths()
            .map(|path| path.as_str().to_string())
            .collect();
        for path in paths {
            let mut sink = Vec::new();
            let _ = archive.extract_to_writer(&path, &mut sink);
        }
    }
});
