//! Fuzz harness for JSONL record ingestion.

#![no_main]

use jobage_ingest_json::parse_records;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let _ = parse_records(input);
});
