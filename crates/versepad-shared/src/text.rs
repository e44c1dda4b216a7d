//! Text metrics and sanitization for lyric content.

/// Whitespace-delimited word count.
pub fn word_count(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}

/// Line count. Empty content counts zero lines; a trailing newline does not
/// add a line.
pub fn line_count(content: &str) -> u32 {
    if content.is_empty() {
        0
    } else {
        content.lines().count() as u32
    }
}

/// Normalizes a user-entered title: control characters stripped, surrounding
/// whitespace trimmed, empty falls back to "Untitled".
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title.chars().filter(|c| !c.is_control()).collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "Untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Normalizes lyric content to LF line endings. Intra-line whitespace is kept
/// untouched; lyrics are whitespace-sensitive.
pub fn sanitize_content(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("one  two\nthree\tfour"), 4);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_line_count_empty_is_zero() {
        assert_eq!(line_count(""), 0);
        assert_eq!(line_count("verse"), 1);
        assert_eq!(line_count("verse\nchorus"), 2);
        assert_eq!(line_count("verse\nchorus\n"), 2);
    }

    #[test]
    fn test_sanitize_title_fallback() {
        assert_eq!(sanitize_title("  My Song  "), "My Song");
        assert_eq!(sanitize_title(""), "Untitled");
        assert_eq!(sanitize_title(" \t "), "Untitled");
        assert_eq!(sanitize_title("a\u{0007}b"), "ab");
    }

    #[test]
    fn test_sanitize_content_normalizes_crlf() {
        assert_eq!(sanitize_content("a\r\nb\rc"), "a\nb\nc");
    }
}
