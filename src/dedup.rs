//! Overlap resolution between multi-word candidates and their words.
//!
//! "Liu Wei" and the bare "Liu"/"Wei" are one character. Phrases are
//! processed longest first; each lists its component words as related
//! candidates, and a word is consumed (and its statistics folded in) by the
//! first, longest phrase containing it. Words no phrase contains survive.

use std::cmp::{Ordering, Reverse};
use std::collections::{HashMap, HashSet};

use story_types::Candidate;

use crate::config::ExtractionConfig;
use crate::scoring::confidence;

fn word_count(c: &Candidate) -> usize {
    c.text.split_whitespace().count()
}

pub fn deduplicate(mut candidates: Vec<Candidate>, config: &ExtractionConfig) -> Vec<Candidate> {
    // Longest phrase first; ties broken deterministically
    candidates.sort_by(|a, b| {
        word_count(b)
            .cmp(&word_count(a))
            .then_with(|| b.text.len().cmp(&a.text.len()))
            .then_with(|| b.score.cmp(&a.score))
            .then_with(|| a.text.cmp(&b.text))
    });

    let singles: HashMap<String, usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| word_count(c) == 1)
        .map(|(i, c)| (c.text.clone(), i))
        .collect();

    let mut consumed: HashSet<usize> = HashSet::new();
    // phrase index → single-word indices whose stats it absorbs
    let mut merges: Vec<(usize, usize)> = Vec::new();

    for (i, phrase) in candidates.iter_mut().enumerate() {
        if phrase.text.split_whitespace().count() < 2 {
            continue;
        }
        let words: Vec<String> = phrase.text.split_whitespace().map(str::to_string).collect();
        for word in words {
            let Some(&w) = singles.get(&word) else {
                continue;
            };
            if !phrase.related_candidates.contains(&word) {
                phrase.related_candidates.push(word);
            }
            if consumed.insert(w) {
                merges.push((i, w));
            }
        }
    }

    for (p, w) in merges {
        let (occurrences, spread, score) = {
            let word = &candidates[w];
            (word.occurrences, word.chapter_spread, word.score)
        };
        let phrase = &mut candidates[p];
        phrase.occurrences = phrase.occurrences.max(occurrences);
        phrase.chapter_spread = phrase.chapter_spread.max(spread);
        phrase.score = phrase.score.max(score);
        phrase.confidence = confidence(phrase.score, config);
    }

    candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !consumed.contains(i))
        .map(|(_, c)| c)
        .collect()
}

/// Highest score first (then more occurrences, then text), capped.
pub fn rank_and_cap(mut candidates: Vec<Candidate>, max: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| match b.score.cmp(&a.score) {
        Ordering::Equal => (Reverse(a.occurrences), &a.text).cmp(&(Reverse(b.occurrences), &b.text)),
        other => other,
    });
    candidates.truncate(max);
    candidates
}
