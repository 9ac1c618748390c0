//! Turn normalization.
//!
//! Model output arrives decorated and over-long; this module turns it into a
//! plain, length-bounded conversational turn. [`normalize`] is idempotent:
//! running it over an already-normalized string is a no-op.

use regex::Regex;
use std::sync::OnceLock;

/// Markdown punctuation stripped from responses.
fn formatting_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[*_`~#\-]").expect("valid formatting regex"))
}

/// Sentence terminator runs (`.`, `!`, `?`, possibly repeated).
fn sentence_breaks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("valid sentence regex"))
}

/// Removes markdown punctuation anywhere in the text and trims it.
pub fn strip_formatting(text: &str) -> String {
    formatting_chars().replace_all(text, "").trim().to_string()
}

/// Splits text into trimmed, non-empty sentence fragments.
pub fn split_sentences(text: &str) -> Vec<String> {
    sentence_breaks()
        .split(text)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncates text to at most `max` sentences.
///
/// Text within the bound is returned trimmed but otherwise untouched,
/// keeping its original punctuation. Over-long text is rebuilt from the
/// first `max` fragments, joined by ". " and re-terminated with a single
/// period.
pub fn limit_sentences(text: &str, max: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() > max {
        format!("{}.", sentences[..max].join(". "))
    } else {
        text.trim().to_string()
    }
}

/// Full turn normalization: formatting strip, then sentence bounding.
pub fn normalize(raw: &str, max_sentences: usize) -> String {
    limit_sentences(&strip_formatting(raw), max_sentences)
}
