//! Shared utilities.

mod hash;
mod version;

pub use hash::{content_hash, stable_key};
pub use version::{compare_versions, fragment_count};
