#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the `.api_filters` document parser.
///
/// Malformed documents must yield no filters, never a panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = api_tools::filter::parse_filters("fuzz", s);
    }
});
