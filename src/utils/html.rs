// src/utils/html.rs

/// Percent-encodes a value for use as a single URL path segment in a link.
pub fn path_segment(input: &str) -> String {
    // `byte_serialize` targets query strings: a literal '+' is already %2B,
    // so every remaining '+' stands for a space.
    url::form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
