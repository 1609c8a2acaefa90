//! Candidate extraction: discover entity names in raw prose with no prior
//! knowledge of the cast.
//!
//! Capitalized phrases and acronym-shaped tokens are collected per chapter,
//! aggregated by text, filtered, scored, classified and finally
//! deduplicated so that "Liu Wei" absorbs the bare "Liu" and "Wei".

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use story_types::{Candidate, CandidateResult, Chapter, Entity};
use tracing::debug;

use crate::boundary::{SentenceBoundaries, context_window};
use crate::config::ExtractionConfig;
use crate::dedup::{deduplicate, rank_and_cap};
use crate::detect::SearchEntry;
use crate::gazetteer::{is_street_address, lookup_exact};
use crate::noise::{is_acronym_skip, is_caps_noise, is_common_word, is_noise};
use crate::scoring;

// 1–4 capitalized words; only the last may carry a possessive.
static RE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){0,3}(?:['’]s)?\b").unwrap()
});

static RE_ACRONYM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z]{2,6}\b").unwrap());

// ── Types ────────────────────────────────────────────────────────────────

/// How a candidate is spelled, which drives scoring and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// "FBI", "NSA"
    Acronym,
    /// "Liu Wei", "Shadow Council"
    MultiWord,
    /// "Knox"
    Word,
}

/// Where one occurrence of a candidate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub chapter: usize,
    pub start: usize,
    pub end: usize,
}

/// Everything recorded about one distinct candidate text.
#[derive(Debug, Clone)]
pub struct CandidateStats {
    pub text: String,
    pub shape: Shape,
    pub occurrences: usize,
    pub sentence_starts: usize,
    pub chapters: BTreeSet<usize>,
    /// The first few positions, used for context sampling
    pub positions: Vec<Position>,
    pub sample_contexts: Vec<String>,
}

impl CandidateStats {
    fn new(text: String, shape: Shape) -> Self {
        CandidateStats {
            text,
            shape,
            occurrences: 0,
            sentence_starts: 0,
            chapters: BTreeSet::new(),
            positions: Vec::new(),
            sample_contexts: Vec::new(),
        }
    }

    pub fn sentence_start_ratio(&self) -> f64 {
        if self.occurrences == 0 {
            0.0
        } else {
            self.sentence_starts as f64 / self.occurrences as f64
        }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

// ── Scanner ──────────────────────────────────────────────────────────────

/// Collects per-candidate statistics across a set of chapter bodies.
pub struct CandidateScanner<'c> {
    config: &'c ExtractionConfig,
    /// How many positions to keep per candidate
    keep_positions: usize,
}

impl<'c> CandidateScanner<'c> {
    pub fn new(config: &'c ExtractionConfig) -> Self {
        CandidateScanner {
            config,
            keep_positions: config.context_samples.max(config.sample_contexts),
        }
    }

    /// Scan every chapter and aggregate by candidate text.
    pub fn scan(&self, chapters: &[&str]) -> HashMap<String, CandidateStats> {
        let mut agg = HashMap::new();
        for (idx, text) in chapters.iter().enumerate() {
            self.scan_chapter(idx, text, &mut agg);
        }
        agg
    }

    fn scan_chapter(&self, chapter: usize, text: &str, agg: &mut HashMap<String, CandidateStats>) {
        let boundaries = SentenceBoundaries::detect(text);

        for m in RE_PHRASE.find_iter(text) {
            let mut words = words_with_offsets(m.as_str(), m.start());
            if let Some(last) = words.last_mut() {
                last.1 = strip_possessive(last.1);
            }
            // "New York" keeps its "New": a gazetteer name is never noise
            while words.len() > 1 && is_noise(words[0].1) && !is_known_name(&words) {
                words.remove(0);
            }
            let Some(&(start, _)) = words.first() else {
                continue;
            };
            let phrase = join_words(&words);
            if phrase.is_empty() || is_noise(&phrase) {
                continue;
            }

            let end = words.last().map(|(o, w)| o + w.len()).unwrap_or(start);
            let shape = if words.len() > 1 { Shape::MultiWord } else { Shape::Word };
            self.record(agg, text, &boundaries, phrase, shape, chapter, start, end);

            if words.len() > 1 {
                for &(offset, word) in &words {
                    if is_noise(word) {
                        continue;
                    }
                    self.record(
                        agg,
                        text,
                        &boundaries,
                        word.to_string(),
                        Shape::Word,
                        chapter,
                        offset,
                        offset + word.len(),
                    );
                }
            }
        }

        for m in RE_ACRONYM.find_iter(text) {
            let word = m.as_str();
            if !is_acronym_candidate(word) {
                continue;
            }
            self.record(
                agg,
                text,
                &boundaries,
                word.to_string(),
                Shape::Acronym,
                chapter,
                m.start(),
                m.end(),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        agg: &mut HashMap<String, CandidateStats>,
        text: &str,
        boundaries: &SentenceBoundaries,
        candidate: String,
        shape: Shape,
        chapter: usize,
        start: usize,
        end: usize,
    ) {
        let sentence_start = boundaries.is_sentence_start(text, start);
        let entry = agg
            .entry(candidate)
            .or_insert_with_key(|k| CandidateStats::new(k.clone(), shape));

        entry.occurrences += 1;
        if sentence_start {
            entry.sentence_starts += 1;
        }
        entry.chapters.insert(chapter);
        if entry.positions.len() < self.keep_positions {
            entry.positions.push(Position {
                chapter,
                start,
                end,
            });
        }
        if entry.sample_contexts.len() < self.config.sample_contexts {
            let ctx = context_window(text, start, self.config.context_radius);
            if !entry.sample_contexts.contains(&ctx) {
                entry.sample_contexts.push(ctx);
            }
        }
    }
}

/// Split a phrase into words, each with its absolute byte offset.
fn words_with_offsets(phrase: &str, base: usize) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut word_start = None;
    for (i, c) in phrase.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = word_start.take() {
                words.push((base + s, &phrase[s..i]));
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(s) = word_start {
        words.push((base + s, &phrase[s..]));
    }
    words
}

fn join_words(words: &[(usize, &str)]) -> String {
    words.iter().map(|(_, w)| *w).collect::<Vec<_>>().join(" ")
}

fn is_known_name(words: &[(usize, &str)]) -> bool {
    lookup_exact(&join_words(words)).is_some()
}

fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("’s"))
        .unwrap_or(word)
}

/// Acronym-shaped token that is not an abbreviation, an emphasis word, or
/// (at 4+ letters) an ordinary word written in caps.
fn is_acronym_candidate(word: &str) -> bool {
    if is_acronym_skip(word) || is_caps_noise(word) {
        return false;
    }
    !(word.len() >= 4 && is_common_word(&word.to_lowercase()))
}

pub fn is_acronym_shaped(text: &str) -> bool {
    (2..=6).contains(&text.len()) && text.chars().all(|c| c.is_ascii_uppercase())
}

// ── Filtering ────────────────────────────────────────────────────────────

/// Drop noise, street addresses, already-catalogued names, one-off words
/// and words that are capitalized only because they open sentences.
pub fn passes_filters(
    stats: &CandidateStats,
    excluded: &HashSet<String>,
    config: &ExtractionConfig,
) -> bool {
    if is_noise(&stats.text) || is_street_address(&stats.text) {
        return false;
    }
    if excluded.contains(&stats.text.to_lowercase()) {
        return false;
    }

    let acronym = stats.shape == Shape::Acronym || is_acronym_shaped(&stats.text);
    let min_hits = if acronym {
        config.min_acronym_occurrences
    } else {
        config.min_occurrences
    };
    if stats.occurrences < min_hits {
        return false;
    }

    // All-caps tokens are not capitalized by sentence position
    if acronym {
        return true;
    }

    let ratio = stats.sentence_start_ratio();
    if stats.word_count() == 1
        && ratio >= config.single_word_sentence_start_ratio
        && stats.occurrences < config.single_word_sentence_start_max_hits
    {
        return false;
    }
    if ratio > config.any_sentence_start_ratio
        && stats.occurrences < config.any_sentence_start_max_hits
    {
        return false;
    }
    true
}

// ── Extraction entry point ───────────────────────────────────────────────

/// Lowercased search terms of catalogued entities (name, aliases, first
/// name), plus the words of multi-word names. Those words would otherwise be
/// absorbed by the catalogued phrase, which is itself excluded.
fn excluded_names(entities: &[Entity]) -> HashSet<String> {
    let mut names = HashSet::new();
    for e in entities {
        names.extend(SearchEntry::build(e).terms);
        let name = e.name.trim().to_lowercase();
        if name.split_whitespace().nth(1).is_some() {
            names.extend(
                name.split_whitespace()
                    .filter(|w| !is_noise(w))
                    .map(str::to_string),
            );
        }
    }
    names
}

/// Discover entity candidates in `chapters`, skipping names already in
/// `entities`. Never fails; an empty chapter set yields an empty result.
pub fn extract_candidates(
    chapters: &[Chapter],
    entities: &[Entity],
    config: &ExtractionConfig,
) -> CandidateResult {
    let mut existing_entities: Vec<String> = entities.iter().map(|e| e.name.clone()).collect();
    existing_entities.sort();
    existing_entities.dedup();

    if chapters.is_empty() {
        return CandidateResult {
            candidates: Vec::new(),
            existing_entities,
        };
    }

    let bodies: Vec<&str> = chapters.iter().map(|c| c.body.as_str()).collect();
    let excluded = excluded_names(entities);

    let scanner = CandidateScanner::new(config);
    let agg = scanner.scan(&bodies);
    let scanned = agg.len();

    let mut scored: Vec<Candidate> = agg
        .into_values()
        .filter(|stats| passes_filters(stats, &excluded, config))
        .filter_map(|stats| {
            let score = scoring::score(&stats, bodies.len(), config);
            if score < scoring::min_score(&stats, config) {
                return None;
            }
            Some(Candidate {
                suggested_type: scoring::classify(&stats, &bodies, config),
                confidence: scoring::confidence(score, config),
                score,
                occurrences: stats.occurrences,
                chapter_spread: stats.chapters.len(),
                sample_contexts: stats.sample_contexts,
                related_candidates: Vec::new(),
                text: stats.text,
            })
        })
        .collect();
    let surviving = scored.len();

    scored = deduplicate(scored, config);
    let candidates = rank_and_cap(scored, config.max_candidates);

    debug!(
        chapters = chapters.len(),
        scanned,
        surviving,
        returned = candidates.len(),
        "candidate extraction finished"
    );

    CandidateResult {
        candidates,
        existing_entities,
    }
}
