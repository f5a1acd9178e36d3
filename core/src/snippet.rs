//! Plain-text excerpts around the first query match.

use regex::RegexBuilder;

/// Default excerpt length in characters.
pub const DEFAULT_SNIPPET_CHARS: usize = 160;
/// Characters of context kept before the first match.
const LEAD_CHARS: usize = 40;
const ELLIPSIS: &str = "…";

/// Extract an excerpt of `text` around the earliest case-insensitive hit of any word.
///
/// Falls back to the beginning of the text when nothing matches. Whitespace is collapsed.
pub fn extract(text: &str, words: &[String], max_chars: usize) -> Option<String> {
    if text.trim().is_empty() || max_chars == 0 {
        return None;
    }

    let first_hit = words.iter().filter(|w| !w.trim().is_empty()).filter_map(|w| find_case_insensitive(text, w)).min();

    let start = match first_hit {
        Some(idx) => text[..idx].char_indices().rev().nth(LEAD_CHARS - 1).map(|(i, _)| i).unwrap_or(0),
        None => 0,
    };
    let rest = &text[start..];
    let window: String = rest.chars().take(max_chars).collect();
    let truncated = rest.chars().nth(max_chars).is_some();

    let mut snippet = window.split_whitespace().collect::<Vec<_>>().join(" ");
    if snippet.is_empty() {
        return None;
    }
    if start > 0 {
        snippet.insert_str(0, ELLIPSIS);
    }
    if truncated {
        snippet.push_str(ELLIPSIS);
    }
    Some(snippet)
}

/// Byte offset of the first case-insensitive occurrence of `needle` in `haystack`.
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let re = RegexBuilder::new(&regex::escape(needle)).case_insensitive(true).build().ok()?;
    re.find(haystack).map(|m| m.start())
}
