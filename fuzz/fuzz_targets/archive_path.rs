//! Fuzz target for ArchivePath::new with arbitrary string input.
//!
//! This target exercises the path validation logic with potentially
//! malformed or adversarial path strings. The goal is to find panics or
//! logic errors in the security checks.
//!
//! Run with: cargo +nightly fuzz run archive_path
//!
//! Key security properties being tested:
//! - Path traversal rejection (../)
//! - Absolute path rejection
//! - NUL byte handling

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Try to interpret bytes as UTF-8 string
    if let Ok(path_str) = std::str::from_utf8(data) {
        // Attempt to create an ArchivePath
        let result = reefmerge::ArchivePath::new(path_str);

        // If creation succeeded, verify security invariants
        if let Ok(path) = result {
            let accepted = path.as_str();

            // Must not contain a traversal segment
            assert!(
                !accepted.split('/').any(|segment| segment == ".."),
                "Path traversal accepted: {:?}",
                accepted
            );

            // Must not be absolute
            assert!(
                !accepted.starts_with('/'),
                "Absolute path accepted: {:?}",
                accepted
            );

            // Must not contain NUL bytes
            assert!(
                !accepted.contains('\0'),
                "NUL byte accepted: {:?}",
                accepted
            );

            // The host-path bridge is total over accepted paths
            let host = path.to_host_path();
            let back = reefmerge::ArchivePath::from_host_relative(&host)
                .expect("accepted path must survive the host bridge");
            assert_eq!(back, path);
        }
    }
});
