//! Fuzz target for decode_package with arbitrary byte input.
//!
//! This target exercises the whole decoding pipeline with potentially
//! malformed or adversarial input: container parsing, entry extraction,
//! path validation, and tree projection. The goal is to find panics,
//! hangs, or memory issues.
//!
//! Run with: cargo +nightly fuzz run decode_package
//!
//! The fuzzer will automatically discover and save interesting inputs that
//! trigger new code paths.

#![no_main]

use libfuzzer_sys::fuzz_target;

use paktree::{DecodeLimits, TreeNode, decode_package};

fuzz_target!(|data: &[u8]| {
    // Tight limits keep individual runs fast without narrowing coverage.
    let limits = DecodeLimits::default()
        .with_max_entries(256)
        .with_max_entry_size(1024 * 1024)
        .with_max_total_size(4 * 1024 * 1024);

    // We don't care about failures - we're looking for panics or hangs
    if let Ok(entries) = decode_package("fuzz", data, &limits) {
        // If decoding succeeded, projection must hold its invariants too
        let root = TreeNode::from_entries(&entries);
        for entry in &entries {
            assert!(
                !entry.path.as_str().starts_with('/'),
                "absolute path survived decoding: {:?}",
                entry.path
            );
            assert!(
                entry.path.components().all(|c| !c.is_empty() && c != ".."),
                "invalid component survived decoding: {:?}",
                entry.path
            );
        }
        let _ = root.child_count();
    }
});
