//! Text primitives shared by candidate extraction and known-entity
//! detection: sentence boundaries, word boundaries and context windows.
//!
//! All offsets are byte offsets into the scanned text unless a function
//! says otherwise.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Distance (bytes) from a boundary still counted as sentence-initial.
pub const SENTENCE_START_SLACK: usize = 3;
/// Distance allowed between a boundary and an opening quote.
pub const QUOTE_SLACK: usize = 4;

/// Characters that, like whitespace, delimit a whole-word match.
pub const BOUNDARY_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '"', '\'', '(', ')', '[', ']', '{', '}', '-', '—', '–',
    '…', '“', '”', '‘', '’', '/', '*', '_', '<', '>', '~',
];

const OPENING_QUOTES: &[char] = &['"', '\'', '“', '‘'];

// Terminal punctuation, optional closing quote, then whitespace.
static RE_SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?]["”’']?\s+"#).unwrap());

// Blank line between paragraphs.
static RE_PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n\s*").unwrap());

// ── Sentence boundaries ──────────────────────────────────────────────────

/// Offsets at which a new sentence begins. Offset 0 is always one.
#[derive(Debug, Clone)]
pub struct SentenceBoundaries {
    offsets: BTreeSet<usize>,
}

impl SentenceBoundaries {
    pub fn detect(text: &str) -> Self {
        let mut offsets = BTreeSet::new();
        offsets.insert(0);
        for m in RE_SENTENCE_END.find_iter(text) {
            offsets.insert(m.end());
        }
        for m in RE_PARAGRAPH_BREAK.find_iter(text) {
            offsets.insert(m.end());
        }
        SentenceBoundaries { offsets }
    }

    /// Closest boundary at or before `offset`.
    fn nearest_before(&self, offset: usize) -> Option<usize> {
        self.offsets.range(..=offset).next_back().copied()
    }

    /// Whether a token at `offset` opens a sentence: it lies within a few
    /// bytes of a boundary, or directly follows an opening quote that itself
    /// follows a boundary.
    pub fn is_sentence_start(&self, text: &str, offset: usize) -> bool {
        if self
            .nearest_before(offset)
            .is_some_and(|b| offset - b <= SENTENCE_START_SLACK)
        {
            return true;
        }

        let Some(prev) = text.get(..offset).and_then(|s| s.chars().next_back()) else {
            return false;
        };
        if !OPENING_QUOTES.contains(&prev) {
            return false;
        }
        let quote_at = offset - prev.len_utf8();
        self.nearest_before(quote_at)
            .is_some_and(|b| quote_at - b <= QUOTE_SLACK)
    }
}

// ── Word boundaries ──────────────────────────────────────────────────────

pub fn is_boundary_char(c: char) -> bool {
    c.is_whitespace() || BOUNDARY_PUNCTUATION.contains(&c)
}

/// Whether `text[start..end]` is delimited by boundaries (or the string
/// edges) on both sides.
pub fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text.get(..start).and_then(|s| s.chars().next_back());
    let after = text.get(end..).and_then(|s| s.chars().next());
    before.is_none_or(is_boundary_char) && after.is_none_or(is_boundary_char)
}

/// First whole-word occurrence of `needle` in `haystack`, as a byte range.
/// Occurrences embedded in a longer word are skipped.
pub fn find_whole_word(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .match_indices(needle)
        .map(|(start, m)| (start, start + m.len()))
        .find(|&(start, end)| is_whole_word(haystack, start, end))
}

/// Convert a byte offset into a character offset.
pub fn char_offset(text: &str, byte_offset: usize) -> usize {
    text.get(..byte_offset)
        .map(|s| s.chars().count())
        .unwrap_or_else(|| text.chars().count())
}

// ── Context windows ──────────────────────────────────────────────────────

/// A single-line window of `char_radius` characters on each side of a byte
/// offset, with whitespace runs collapsed. Only the window itself is walked.
pub fn context_window(text: &str, byte_offset: usize, char_radius: usize) -> String {
    let mut center = byte_offset.min(text.len());
    while !text.is_char_boundary(center) {
        center -= 1;
    }

    let start = text[..center]
        .char_indices()
        .rev()
        .take(char_radius)
        .last()
        .map_or(center, |(i, _)| i);
    let end = text[center..]
        .char_indices()
        .nth(char_radius)
        .map_or(text.len(), |(i, _)| center + i);

    text[start..end].split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased words immediately before and after `text[start..end]`, with
/// surrounding punctuation trimmed. A word is not taken across a sentence
/// end, so "Paris. The" yields no following word for "Paris".
pub fn neighbor_words(text: &str, start: usize, end: usize) -> (Option<String>, Option<String>) {
    let before = text.get(..start).unwrap_or("");
    let after = text.get(end..).unwrap_or("");

    let prev = before
        .split_whitespace()
        .next_back()
        .filter(|w| !w.ends_with(['.', '!', '?']))
        .map(clean_word)
        .filter(|w| !w.is_empty());

    let next = if after.starts_with(['.', '!', '?']) {
        None
    } else {
        after
            .trim_start_matches(|c: char| c == '\'' || c == '’' || c == 's')
            .split_whitespace()
            .next()
            .map(clean_word)
            .filter(|w| !w.is_empty())
    };

    (prev, next)
}

fn clean_word(w: &str) -> String {
    w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── sentence boundaries ──────────────────────────────────────────

    #[test]
    fn test_offset_zero_is_boundary() {
        let text = "Knox ran.";
        let b = SentenceBoundaries::detect(text);
        assert!(b.is_sentence_start(text, 0));
    }

    #[test]
    fn test_after_terminal_punctuation() {
        let text = "He left. Knox stayed! Why? Because.";
        let b = SentenceBoundaries::detect(text);
        assert!(b.is_sentence_start(text, text.find("Knox").unwrap()));
        assert!(b.is_sentence_start(text, text.find("Why").unwrap()));
        assert!(b.is_sentence_start(text, text.find("Because").unwrap()));
        assert!(!b.is_sentence_start(text, text.find("stayed").unwrap()));
    }

    #[test]
    fn test_paragraph_break_is_boundary() {
        let text = "the end of it\n\nMarlow woke";
        let b = SentenceBoundaries::detect(text);
        assert!(b.is_sentence_start(text, text.find("Marlow").unwrap()));
    }

    #[test]
    fn test_after_opening_quote() {
        let text = "She paused. \u{201c}Knox is here.\u{201d}";
        let b = SentenceBoundaries::detect(text);
        assert!(b.is_sentence_start(text, text.find("Knox").unwrap()));

        let text = "She said \"Knox is here.\"";
        let b = SentenceBoundaries::detect(text);
        assert!(!b.is_sentence_start(text, text.find("Knox").unwrap()));
    }

    #[test]
    fn test_closing_quote_before_whitespace() {
        let text = "\"Run.\" Knox ran.";
        let b = SentenceBoundaries::detect(text);
        assert!(b.is_sentence_start(text, text.find("Knox").unwrap()));
    }

    // ── word boundaries ──────────────────────────────────────────────

    #[test]
    fn test_whole_word_rejects_embedded_match() {
        assert_eq!(find_whole_word("ramseyson arrived", "ramsey"), None);
        assert_eq!(find_whole_word("mcramsey arrived", "ramsey"), None);
    }

    #[test]
    fn test_whole_word_accepts_punctuation_edges() {
        assert_eq!(find_whole_word("(ramsey)", "ramsey"), Some((1, 7)));
        assert_eq!(find_whole_word("ramsey's car", "ramsey"), Some((0, 6)));
        assert_eq!(find_whole_word("\u{201c}ramsey\u{201d}", "ramsey"), Some((3, 9)));
    }

    #[test]
    fn test_whole_word_skips_to_later_valid_match() {
        let text = "ramseyson met ramsey";
        assert_eq!(find_whole_word(text, "ramsey"), Some((14, 20)));
    }

    #[test]
    fn test_char_offset_counts_chars() {
        let text = "caf\u{e9} knox";
        let byte = text.find("knox").unwrap();
        assert_eq!(byte, 6);
        assert_eq!(char_offset(text, byte), 5);
    }

    // ── context ──────────────────────────────────────────────────────

    #[test]
    fn test_context_window_collapses_whitespace() {
        let text = "line one\n\nKnox waited   by the door";
        let at = text.find("Knox").unwrap();
        let ctx = context_window(text, at, 12);
        assert!(ctx.contains("Knox waited"));
        assert!(!ctx.contains('\n'));
    }

    #[test]
    fn test_context_window_counts_chars_not_bytes() {
        let text = "\u{e9}\u{e9}\u{e9} Knox \u{fc}\u{fc}\u{fc}";
        let at = text.find("Knox").unwrap();
        assert_eq!(context_window(text, at, 2), "\u{e9} Kn");
        assert_eq!(context_window(text, at, 6), "\u{e9}\u{e9}\u{e9} Knox \u{fc}");
        assert_eq!(context_window(text, at, 100), text);
    }

    #[test]
    fn test_context_window_at_edges() {
        assert_eq!(context_window("Knox ran", 0, 3), "Kno");
        assert_eq!(context_window("Knox ran", 8, 3), "ran");
        assert_eq!(context_window("", 0, 3), "");
    }

    #[test]
    fn test_neighbor_words() {
        let text = "Then Agent Liu said nothing.";
        let start = text.find("Liu").unwrap();
        let (prev, next) = neighbor_words(text, start, start + 3);
        assert_eq!(prev.as_deref(), Some("agent"));
        assert_eq!(next.as_deref(), Some("said"));
    }

    #[test]
    fn test_neighbor_words_skip_possessive_and_sentence_end() {
        let text = "We flew to Prague. The Kessler's men waited.";
        let p = text.find("Prague").unwrap();
        let (prev, next) = neighbor_words(text, p, p + 6);
        assert_eq!(prev.as_deref(), Some("to"));
        assert_eq!(next, None);

        let k = text.find("Kessler").unwrap();
        let (prev, next) = neighbor_words(text, k, k + 7);
        assert_eq!(prev.as_deref(), Some("the"));
        assert_eq!(next.as_deref(), Some("men"));
    }
}
