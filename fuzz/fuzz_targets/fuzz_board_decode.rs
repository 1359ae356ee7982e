#![no_main]

//! Fuzz target for decoding stored boards and deriving storage keys.
//!
//! Stored values come from disk and may be truncated or hand-edited. Decoding
//! must never panic, and anything it accepts must hold each issue id once.

use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

use ghkanban::db::{decode_board, repo_path, storage_key};
use ghkanban::models::Bucket;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // Keys are derived from user-typed URLs
    let key = storage_key(raw);
    assert!(key.ends_with(&repo_path(raw)));

    if let Some(buckets) = decode_board(&key, raw) {
        let mut seen = HashSet::new();
        for bucket in Bucket::ALL {
            for issue in buckets.get(bucket) {
                assert!(seen.insert(issue.id), "duplicate id {}", issue.id);
                let _ = issue.opened_display();
            }
        }

        // Whatever was accepted must survive a save and reload
        if let Ok(encoded) = serde_json::to_string(&buckets) {
            let again = decode_board(&key, &encoded);
            assert_eq!(again.as_ref(), Some(&buckets));
        }
    }
});
