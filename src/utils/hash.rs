//! Content hashing utilities.

use xxhash_rust::xxh3::xxh3_64;

/// Compute a content hash for arbitrary bytes
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Stable hex key over an ordered list of parts.
///
/// Parts are separated by a NUL byte so `["ab", "c"]` and `["a", "bc"]`
/// hash differently.
pub fn stable_key<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut buf = Vec::new();
    for part in parts {
        buf.extend_from_slice(part.as_bytes());
        buf.push(0);
    }
    format!("{:016x}", content_hash(&buf))
}
