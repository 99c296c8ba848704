#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the class-file header reader used by incremental builds.
fuzz_target!(|data: &[u8]| {
    let _ = api_tools::model::read_class_name(data);
});
