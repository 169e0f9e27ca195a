//! Shared lexical normalization for the keyword and TF-IDF methods.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::constants::STOP_WORDS;

const TRIM_CHARS: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '-', '/',
];

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Lowercased content tokens in text order (duplicates kept).
///
/// A token survives if, after stripping surrounding punctuation, it has at least three
/// characters, is not a stop word, and is not purely numeric.
pub fn tokenize(text: &str) -> Vec<String> {
    let stop = stop_words();

    text.split_whitespace()
        .filter_map(|word| {
            let lower = word.to_lowercase();
            let clean = lower.trim_matches(TRIM_CHARS);

            let keep = clean.chars().count() >= 3
                && !stop.contains(clean)
                && !clean.chars().all(|c| c.is_ascii_digit());

            keep.then(|| clean.to_string())
        })
        .collect()
}

/// Distinct tokens in first-occurrence order, capped at `limit`.
pub fn unique_terms(text: &str, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .take(limit)
        .collect()
}

/// Truncates to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
