//! Fuzz harness for creation-time parsing.
//!
//! Any parsed value must yield a pending-day count without overflow panics.

#![no_main]

use jobage_duration::{compute_pending_days, parse_timestamp};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Some(created) = parse_timestamp(input) {
        let _ = compute_pending_days(created, created);
    }
});
