//! Candidate scoring, type classification and confidence banding.
//!
//! The score is the sum of four capped components (frequency, chapter
//! spread, how rarely the candidate opens a sentence, and its shape).
//! Every threshold comes from [`ExtractionConfig`].

use story_types::{Confidence, EntityType};

use crate::boundary::neighbor_words;
use crate::candidate::{CandidateStats, Shape};
use crate::config::ExtractionConfig;
use crate::cues;
use crate::gazetteer;

// ── Score ────────────────────────────────────────────────────────────────

/// The four score components, kept apart so each can be tested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreParts {
    pub frequency: f64,
    pub spread: f64,
    pub position: f64,
    pub shape: f64,
}

impl ScoreParts {
    pub fn total(&self) -> u32 {
        (self.frequency + self.spread + self.position + self.shape).round() as u32
    }
}

pub fn score_parts(stats: &CandidateStats, total_chapters: usize, cfg: &ExtractionConfig) -> ScoreParts {
    let frequency =
        (stats.occurrences as f64 * cfg.frequency_points_per_hit).min(cfg.frequency_cap);

    let spread = if total_chapters == 0 {
        0.0
    } else {
        (stats.chapters.len() as f64 / total_chapters as f64 * cfg.spread_cap).min(cfg.spread_cap)
    };

    let position = (1.0 - stats.sentence_start_ratio()) * cfg.position_cap;

    let shape = match stats.shape {
        Shape::Acronym => cfg.shape_acronym,
        Shape::MultiWord => cfg.shape_multi_word,
        Shape::Word if stats.char_len() >= 3 => cfg.shape_single_word,
        Shape::Word => cfg.shape_short_word,
    };

    ScoreParts {
        frequency,
        spread,
        position,
        shape,
    }
}

/// 0–100.
pub fn score(stats: &CandidateStats, total_chapters: usize, cfg: &ExtractionConfig) -> u32 {
    score_parts(stats, total_chapters, cfg).total()
}

/// Very short candidates need more evidence; multi-word names less.
pub fn min_score(stats: &CandidateStats, cfg: &ExtractionConfig) -> u32 {
    if stats.char_len() <= 2 {
        cfg.min_score_short
    } else if stats.word_count() > 1 {
        cfg.min_score_multi_word
    } else {
        cfg.min_score_default
    }
}

pub fn confidence(score: u32, cfg: &ExtractionConfig) -> Confidence {
    if score >= cfg.high_confidence_score {
        Confidence::High
    } else if score >= cfg.medium_confidence_score {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

// ── Type classification ──────────────────────────────────────────────────

/// Weighted evidence for each type, gathered from the words around a
/// candidate's occurrences.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContextScores {
    pub character: f64,
    pub location: f64,
    pub organization: f64,
}

impl ContextScores {
    /// Highest score wins; character wins ties, including all-zero.
    pub fn winner(&self) -> EntityType {
        if self.character >= self.location && self.character >= self.organization {
            EntityType::Character
        } else if self.location >= self.organization {
            EntityType::Location
        } else {
            EntityType::Organization
        }
    }
}

pub fn context_scores(
    stats: &CandidateStats,
    chapters: &[&str],
    cfg: &ExtractionConfig,
) -> ContextScores {
    let mut scores = ContextScores::default();

    for pos in stats.positions.iter().take(cfg.context_samples) {
        let Some(text) = chapters.get(pos.chapter) else {
            continue;
        };
        let (prev, next) = neighbor_words(text, pos.start, pos.end);

        if let Some(prev) = prev.as_deref() {
            if cues::is_character_title(prev) {
                scores.character += cfg.character_title_weight;
            }
            if cues::is_speech_verb(prev) {
                scores.character += cfg.character_verb_weight;
            }
            if cues::is_locative(prev) {
                scores.location += cfg.locative_weight;
            }
            if cues::is_organization_article(prev) {
                scores.organization += cfg.article_weight;
            }
        }
        if let Some(next) = next.as_deref() {
            if cues::is_character_verb(next) {
                scores.character += cfg.character_verb_weight;
            }
            if cues::is_organization_noun(next) {
                scores.organization += cfg.org_noun_weight;
            }
        }
    }

    // Two- and three-word names are usually people; this offsets false
    // locative hits such as "to Lisa Ramsey".
    let words = stats.word_count();
    if (2..=3).contains(&words)
        && !gazetteer::has_location_keyword(&stats.text)
        && !gazetteer::has_organization_keyword(&stats.text)
    {
        scores.character += cfg.multi_word_character_bonus;
    }

    scores
}

/// Suggest a type: acronyms are organizations, then the gazetteer (exact
/// names and suffix keywords), then context evidence.
pub fn classify(stats: &CandidateStats, chapters: &[&str], cfg: &ExtractionConfig) -> EntityType {
    if stats.shape == Shape::Acronym {
        return EntityType::Organization;
    }
    if let Some(hit) = gazetteer::lookup(&stats.text) {
        return hit.entity_type;
    }
    context_scores(stats, chapters, cfg).winner()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::candidate::{CandidateScanner, Position};

    fn stats(text: &str, shape: Shape, occurrences: usize, starts: usize, chapters: &[usize]) -> CandidateStats {
        CandidateStats {
            text: text.to_string(),
            shape,
            occurrences,
            sentence_starts: starts,
            chapters: chapters.iter().copied().collect::<BTreeSet<_>>(),
            positions: Vec::new(),
            sample_contexts: Vec::new(),
        }
    }

    fn scanned(text: &str, key: &str) -> CandidateStats {
        let cfg = ExtractionConfig::default();
        CandidateScanner::new(&cfg).scan(&[text]).remove(key).unwrap()
    }

    // ── score components ─────────────────────────────────────────────

    #[test]
    fn test_frequency_is_capped() {
        let cfg = ExtractionConfig::default();
        let s = stats("Marlow", Shape::Word, 4, 0, &[0]);
        assert_eq!(score_parts(&s, 1, &cfg).frequency, 12.0);
        let s = stats("Marlow", Shape::Word, 40, 0, &[0]);
        assert_eq!(score_parts(&s, 1, &cfg).frequency, 25.0);
    }

    #[test]
    fn test_spread_and_position() {
        let cfg = ExtractionConfig::default();
        let s = stats("Marlow", Shape::Word, 4, 1, &[0, 1]);
        let parts = score_parts(&s, 4, &cfg);
        assert_eq!(parts.spread, 12.5);
        assert_eq!(parts.position, 18.75);
    }

    #[test]
    fn test_shape_points() {
        let cfg = ExtractionConfig::default();
        assert_eq!(score_parts(&stats("FBI", Shape::Acronym, 1, 0, &[0]), 1, &cfg).shape, 15.0);
        assert_eq!(score_parts(&stats("Liu Wei", Shape::MultiWord, 1, 0, &[0]), 1, &cfg).shape, 20.0);
        assert_eq!(score_parts(&stats("Wei", Shape::Word, 1, 0, &[0]), 1, &cfg).shape, 15.0);
        assert_eq!(score_parts(&stats("Bo", Shape::Word, 1, 0, &[0]), 1, &cfg).shape, 8.0);
    }

    #[test]
    fn test_total_score() {
        // 5 hits, 3 of 3 chapters, never sentence-initial, multi-word
        let cfg = ExtractionConfig::default();
        let s = stats("Liu Wei", Shape::MultiWord, 5, 0, &[0, 1, 2]);
        assert_eq!(score(&s, 3, &cfg), 85);
    }

    // Calibration points: these thresholds are tuned, not derived.

    #[test]
    fn test_min_score_calibration() {
        let cfg = ExtractionConfig::default();
        assert_eq!(min_score(&stats("UN", Shape::Acronym, 1, 0, &[0]), &cfg), 35);
        assert_eq!(min_score(&stats("Shadow Council", Shape::MultiWord, 1, 0, &[0]), &cfg), 25);
        assert_eq!(min_score(&stats("Marlow", Shape::Word, 1, 0, &[0]), &cfg), 30);
    }

    #[test]
    fn test_confidence_band_calibration() {
        let cfg = ExtractionConfig::default();
        assert_eq!(confidence(60, &cfg), Confidence::High);
        assert_eq!(confidence(59, &cfg), Confidence::Medium);
        assert_eq!(confidence(35, &cfg), Confidence::Medium);
        assert_eq!(confidence(34, &cfg), Confidence::Low);
    }

    // ── classification ───────────────────────────────────────────────

    #[test]
    fn test_acronym_is_organization() {
        let s = stats("KRT", Shape::Acronym, 2, 0, &[0]);
        assert_eq!(classify(&s, &[], &ExtractionConfig::default()), EntityType::Organization);
    }

    #[test]
    fn test_gazetteer_wins() {
        let s = stats("Prague", Shape::Word, 2, 0, &[0]);
        assert_eq!(classify(&s, &[], &ExtractionConfig::default()), EntityType::Location);
        let s = stats("Harmon Plaza", Shape::MultiWord, 2, 0, &[0]);
        assert_eq!(classify(&s, &[], &ExtractionConfig::default()), EntityType::Location);
    }

    #[test]
    fn test_context_character() {
        let text = "Marlow said nothing. Later Detective Marlow nodded.";
        let s = scanned(text, "Marlow");
        assert_eq!(classify(&s, &[text], &ExtractionConfig::default()), EntityType::Character);
    }

    #[test]
    fn test_context_location() {
        let text = "They drove to Vantor at dawn and stayed in Vantor for a week.";
        let s = scanned(text, "Vantor");
        let cfg = ExtractionConfig::default();
        let scores = context_scores(&s, &[text], &cfg);
        assert_eq!(scores.location, 4.0);
        assert_eq!(classify(&s, &[text], &cfg), EntityType::Location);
    }

    #[test]
    fn test_context_organization() {
        let text = "Everyone feared the Obsidian operatives; the Obsidian agents were everywhere.";
        let s = scanned(text, "Obsidian");
        assert_eq!(
            classify(&s, &[text], &ExtractionConfig::default()),
            EntityType::Organization
        );
    }

    #[test]
    fn test_multi_word_bonus_beats_false_locative() {
        let text = "He wrote to Lisa Ramsey at once.";
        let mut s = scanned(text, "Lisa Ramsey");
        s.positions = vec![Position {
            chapter: 0,
            start: text.find("Lisa").unwrap(),
            end: text.find(" at").unwrap(),
        }];
        let cfg = ExtractionConfig::default();
        let scores = context_scores(&s, &[text], &cfg);
        assert_eq!(scores.location, 2.0);
        assert_eq!(scores.character, 3.0);
        assert_eq!(classify(&s, &[text], &cfg), EntityType::Character);
    }

    #[test]
    fn test_zero_tie_defaults_to_character() {
        assert_eq!(ContextScores::default().winner(), EntityType::Character);
    }
}
