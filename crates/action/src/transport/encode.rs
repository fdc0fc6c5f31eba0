//! Percent-encoding helpers for path segments.

use url::form_urlencoded::byte_serialize;

/// Percent-encode a value for use as a single path segment.
///
/// Every reserved character is escaped, including `/`, so a composite
/// identifier such as `bit.ly/abc` stays one segment. Spaces become `%20`.
pub fn encode_segment(value: &str) -> String {
    // `byte_serialize` emits `+` for a space and `%2B` for a literal plus.
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Like [`encode_segment`], but leaves the characters in `keep` unescaped.
pub fn encode_segment_keep(value: &str, keep: &str) -> String {
    let mut encoded = encode_segment(value);
    for ch in keep.chars() {
        let mut buf = [0u8; 4];
        let escaped: String = ch
            .encode_utf8(&mut buf)
            .bytes()
            .map(|b| format!("%{b:02X}"))
            .collect();
        encoded = encoded.replace(&escaped, ch.encode_utf8(&mut buf));
    }
    encoded
}
