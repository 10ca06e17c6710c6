//! Fuzz harness for engine configuration files (jobage.yaml / jobage.json).
//!
//! A config that parses must either validate into a band catalog or report
//! an error, never panic.

#![no_main]

use jobage_config::{ConfigFormat, parse_config};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    for format in [ConfigFormat::Yaml, ConfigFormat::Json] {
        if let Ok(config) = parse_config(input, format) {
            let _ = config.band_catalog();
        }
    }
});
