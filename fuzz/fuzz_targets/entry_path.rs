//! Fuzz target for EntryPath::new with arbitrary string input.
//!
//! This target exercises path validation with potentially malformed or
//! adversarial strings. The goal is to find panics or logic errors in the
//! validation checks.
//!
//! Run with: cargo +nightly fuzz run entry_path
//!
//! Key security properties being tested:
//! - Path traversal rejection (../)
//! - Absolute path rejection
//! - NUL byte handling
//! - Empty segment handling

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Try to interpret bytes as UTF-8 string
    if let Ok(path_str) = std::str::from_utf8(data) {
        let result = paktree::EntryPath::new(path_str);

        // If validation succeeded, verify security invariants
        if let Ok(path) = result {
            let accepted = path.as_str();

            // Must not contain a traversal segment
            assert!(
                accepted.split('/').all(|segment| segment != ".."),
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

            // Depth and components must agree
            assert_eq!(path.depth(), accepted.split('/').count());
        }
    }
});
