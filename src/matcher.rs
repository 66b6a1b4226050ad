use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::error::AnalysisError;
use crate::normalize::NormalizedText;

/// Max chars of original-case context kept on each side of a match.
pub const CONTEXT_WINDOW: usize = 70;

/// Marker prepended/appended when a snippet is clamped mid-text.
pub const ELLIPSIS: char = '…';

/// Occurrences of one keyword in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMatch {
    pub count: u64,
    pub contexts: Vec<String>,
}

/// Cleans raw keyword entries into the canonical list: trimmed, lowercased,
/// empties dropped, case-insensitive duplicates removed. Entry order is
/// preserved and is significant for every downstream tie-break and export.
pub fn prepare_keywords<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let cleaned = entry.as_ref().trim().to_lowercase();
        if cleaned.is_empty() || keywords.contains(&cleaned) {
            continue;
        }
        keywords.push(cleaned);
    }
    keywords
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whole-word pattern for a literal keyword. `\b` is attached only where the
/// keyword edge is a word character; a boundary glued to a non-word edge
/// (e.g. the `+` of `c++`) could never match.
fn keyword_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 8);
    if keyword.chars().next().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(keyword));
    if keyword.chars().last().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// The keyword list compiled into whole-word matchers, built once per run and
/// shared read-only across worker tasks.
#[derive(Debug)]
pub struct KeywordSet {
    entries: Vec<(String, Regex)>,
}

impl KeywordSet {
    pub fn compile(keywords: &[String]) -> Result<Self, AnalysisError> {
        let mut entries = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let regex = RegexBuilder::new(&keyword_pattern(keyword))
                .case_insensitive(true)
                .build()
                .map_err(|source| AnalysisError::InvalidKeyword {
                    keyword: keyword.clone(),
                    source,
                })?;
            entries.push((keyword.clone(), regex));
        }
        Ok(Self { entries })
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(word, _)| word.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Finds every non-overlapping whole-word occurrence of each keyword in one
/// document's normalized text. Zero matches is a normal result, not an error.
pub fn match_keywords(text: &NormalizedText, keywords: &KeywordSet) -> HashMap<String, KeywordMatch> {
    let mut results = HashMap::with_capacity(keywords.len());
    for (word, regex) in &keywords.entries {
        let mut hit = KeywordMatch::default();
        for m in regex.find_iter(&text.search) {
            hit.count += 1;
            hit.contexts
                .push(context_snippet(&text.display, m.start(), m.end(), regex));
        }
        results.insert(word.clone(), hit);
    }
    results
}

/// Extracts the original-case window around one match, clamped to char
/// boundaries, and wraps the keyword occurrences inside it for emphasis.
fn context_snippet(display: &str, start: usize, end: usize, regex: &Regex) -> String {
    let mut from = start;
    for _ in 0..CONTEXT_WINDOW {
        match display[..from].chars().next_back() {
            Some(c) => from -= c.len_utf8(),
            None => break,
        }
    }
    let mut to = end;
    for _ in 0..CONTEXT_WINDOW {
        match display[to..].chars().next() {
            Some(c) => to += c.len_utf8(),
            None => break,
        }
    }

    let mut snippet = String::with_capacity(to - from + 8);
    if from > 0 {
        snippet.push(ELLIPSIS);
    }
    snippet.push_str(&regex.replace_all(&display[from..to], "**${0}**"));
    if to < display.len() {
        snippet.push(ELLIPSIS);
    }
    snippet
}
