//! Fuzz harness for delimited record ingestion, comma and tab.

#![no_main]

use jobage_ingest_csv::parse_records;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = parse_records(data, b',');
    let _ = parse_records(data, b'\t');
});
