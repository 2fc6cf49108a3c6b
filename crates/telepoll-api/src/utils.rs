//! Text helpers.

/// Split a long message into chunks of at most `max_len` UTF-16 code units,
/// the unit Telegram counts message length in.
///
/// Slice boundaries always fall on char boundaries. Prefers splitting right
/// after a newline when one exists in the window.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if utf16_len(text) <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let end = window_end(rest, max_len);
        let cut = if end < rest.len() {
            rest[..end].rfind('\n').map(|i| i + 1).unwrap_or(end)
        } else {
            end
        };
        chunks.push(&rest[..cut]);
        rest = &rest[cut..];
    }

    chunks
}

/// Length of `text` as Telegram counts it.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte index just past the longest prefix of `text` that fits in
/// `max_units` UTF-16 units. Never empty: a char wider than the limit is
/// taken whole.
fn window_end(text: &str, max_units: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max_units {
            return if i == 0 { c.len_utf8() } else { i };
        }
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_message() {
        assert_eq!(split_message("hello", 4096), vec!["hello"]);
        assert_eq!(split_message("", 4096), vec![""]);
    }

    #[test]
    fn test_split_long_message() {
        let text = "a\n".repeat(3000);
        let chunks = split_message(&text, 4096);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 4096);
            assert!(chunk.ends_with('\n'));
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_without_newlines() {
        let text = "x".repeat(10);
        assert_eq!(split_message(&text, 4), vec!["xxxx", "xxxx", "xx"]);
    }

    #[test]
    fn test_split_multibyte() {
        let text = "привет мир ".repeat(500);
        let chunks = split_message(&text, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(utf16_len(chunk) <= 4096);
        }
        assert_eq!(chunks[0].chars().count(), 4096);
    }

    #[test]
    fn test_multibyte_text_under_limit_stays_whole() {
        let text = "ж".repeat(3000);
        assert!(text.len() > 4096);
        assert_eq!(split_message(&text, 4096), vec![text.as_str()]);
    }

    #[test]
    fn test_surrogate_pairs_count_double() {
        let text = "😀".repeat(2100);
        let chunks = split_message(&text, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 2048);
        assert_eq!(chunks[1].chars().count(), 52);
    }

    #[test]
    fn test_split_char_wider_than_limit() {
        assert_eq!(split_message("😀😀", 1), vec!["😀", "😀"]);
        assert_eq!(split_message("€€", 2), vec!["€€"]);
    }

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("жж"), 2);
        assert_eq!(utf16_len("😀"), 2);
    }
}
