//! Fuzz harness for `SCOPE:LABEL` drill-down arguments.

#![no_main]

use jobage_report::BandSelection;
use jobage_schema::BandCatalog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(selection) = input.parse::<BandSelection>() {
        let _ = BandCatalog::standard().index_of(&selection.band);
        let _ = selection.to_string();
    }
});
