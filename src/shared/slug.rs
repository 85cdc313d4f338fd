//! Slug derivation shared by articles and categories.
//!
//! [`normalize`] turns free text into a URL-safe slug; [`resolve_unique`]
//! appends `-1`, `-2`, ... until the slug is not taken.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// Anything other than lowercase ASCII letters, digits, whitespace or hyphens
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9\s-]").unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    static ref HYPHEN_RUN: Regex = Regex::new(r"-+").unwrap();
}

/// Normalize free text into a slug.
///
/// Lower-cases, compatibility-decomposes (so `é` becomes `e` plus a combining
/// mark that is then dropped), strips everything outside `[a-z0-9\s-]`, turns
/// whitespace runs into a single hyphen, collapses hyphen runs and trims
/// hyphens from both ends. Never fails; an all-symbol input yields `""`.
pub fn normalize(text: &str) -> String {
    let decomposed: String = text.to_lowercase().nfkd().collect();
    let stripped = DISALLOWED.replace_all(&decomposed, "");
    let hyphenated = WHITESPACE_RUN.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUN.replace_all(&hyphenated, "-");

    collapsed.trim_matches('-').to_string()
}

/// Cut a slug to at most `max_chars` characters without leaving a trailing
/// hyphen. Decomposition can make a slug longer than its source text.
pub fn truncate(slug: &str, max_chars: usize) -> String {
    let cut: String = slug.chars().take(max_chars).collect();
    cut.trim_end_matches('-').to_string()
}

/// Return `candidate` if `exists` rejects it, otherwise the first of
/// `candidate-1`, `candidate-2`, ... that `exists` rejects.
///
/// An empty candidate is never returned as-is, so the result is non-empty.
pub fn resolve_unique<F>(candidate: &str, mut exists: F) -> String
where
    F: FnMut(&str) -> bool,
{
    if !candidate.is_empty() && !exists(candidate) {
        return candidate.to_string();
    }

    let mut suffix: u64 = 1;
    loop {
        let probe = format!("{}-{}", candidate, suffix);
        if !exists(&probe) {
            return probe;
        }
        suffix += 1;
    }
}
