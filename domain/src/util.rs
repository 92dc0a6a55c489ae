//! Shared utility functions.

/// Truncate a string to at most `max_chars` characters.
///
/// Counts `char`s, not bytes, so multibyte text is never split inside a
/// code point. Returns a sub-slice of the original string; strings at or
/// under the limit are returned unchanged.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
    }

    #[test]
    fn truncate_no_op_when_short() {
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn truncate_multibyte() {
        // Each char is 3 bytes; the cut must land between chars
        assert_eq!(truncate_chars("あのね", 2), "あの");
        assert_eq!(truncate_chars("あのね", 3), "あのね");
    }

    #[test]
    fn truncate_exact_length() {
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn truncate_empty() {
        assert_eq!(truncate_chars("", 10), "");
    }
}
