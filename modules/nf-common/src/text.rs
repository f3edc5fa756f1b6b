//! Pure text helpers shared by the narrative generator and invariant checks.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strips markup tags, leaving plain text with collapsed whitespace.
pub fn strip_markup(content: &str) -> String {
    let without_tags = TAG.replace_all(content, " ");
    WHITESPACE.replace_all(&without_tags, " ").trim().to_string()
}

/// `word_count` is the markup-stripped token count of `content` (invariant 2).
pub fn word_count(content: &str) -> usize {
    let stripped = strip_markup(content);
    if stripped.is_empty() {
        0
    } else {
        stripped.split_whitespace().count()
    }
}

/// 200 wpm, minimum 1 minute.
pub fn reading_time_minutes(words: usize) -> u32 {
    ((words as f64 / 200.0).ceil() as u32).max(1)
}

/// Truncates to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    input.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_ignores_tags() {
        assert_eq!(word_count("<h2>Title</h2><p>one two three</p>"), 4);
    }

    #[test]
    fn reading_time_has_floor_of_one() {
        assert_eq!(reading_time_minutes(0), 1);
        assert_eq!(reading_time_minutes(50), 1);
        assert_eq!(reading_time_minutes(401), 3);
    }

    #[test]
    fn truncate_chars_respects_limit() {
        let s = "a".repeat(10);
        assert_eq!(truncate_chars(&s, 5).len(), 5);
        assert_eq!(truncate_chars(&s, 50).len(), 10);
    }
}
