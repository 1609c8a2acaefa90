//! Engine configuration.
//!
//! Every tuned number of the extraction heuristics lives here as a named
//! field. The defaults are empirically calibrated against genre fiction and
//! have no derivation beyond that; retune them against real manuscripts
//! rather than re-deriving them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Default thresholds ──────────────────────────────────────────────────

pub const MIN_OCCURRENCES: usize = 2;
pub const MIN_ACRONYM_OCCURRENCES: usize = 1;

/// Single-word candidates that open a sentence this often…
pub const SINGLE_WORD_SENTENCE_START_RATIO: f64 = 0.99;
/// …with fewer hits than this are dropped.
pub const SINGLE_WORD_SENTENCE_START_MAX_HITS: usize = 6;
pub const ANY_SENTENCE_START_RATIO: f64 = 0.9;
pub const ANY_SENTENCE_START_MAX_HITS: usize = 4;

pub const FREQUENCY_POINTS_PER_HIT: f64 = 3.0;
pub const FREQUENCY_CAP: f64 = 25.0;
pub const SPREAD_CAP: f64 = 25.0;
pub const POSITION_CAP: f64 = 25.0;
pub const SHAPE_ACRONYM: f64 = 15.0;
pub const SHAPE_MULTI_WORD: f64 = 20.0;
pub const SHAPE_SINGLE_WORD: f64 = 15.0;
pub const SHAPE_SHORT_WORD: f64 = 8.0;

pub const MIN_SCORE_SHORT: u32 = 35;
pub const MIN_SCORE_MULTI_WORD: u32 = 25;
pub const MIN_SCORE_DEFAULT: u32 = 30;

pub const HIGH_CONFIDENCE_SCORE: u32 = 60;
pub const MEDIUM_CONFIDENCE_SCORE: u32 = 35;

pub const CONTEXT_SAMPLES: usize = 10;
pub const CHARACTER_TITLE_WEIGHT: f64 = 3.0;
pub const CHARACTER_VERB_WEIGHT: f64 = 2.0;
pub const LOCATIVE_WEIGHT: f64 = 2.0;
pub const ARTICLE_WEIGHT: f64 = 1.0;
pub const ORG_NOUN_WEIGHT: f64 = 2.0;
pub const MULTI_WORD_CHARACTER_BONUS: f64 = 3.0;

pub const MAX_CANDIDATES: usize = 200;
pub const SAMPLE_CONTEXTS: usize = 3;
pub const CONTEXT_RADIUS: usize = 40;

// ── Config structs ──────────────────────────────────────────────────────

/// Filtering, scoring and classification policy for candidate extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_occurrences: usize,
    pub min_acronym_occurrences: usize,
    pub single_word_sentence_start_ratio: f64,
    pub single_word_sentence_start_max_hits: usize,
    pub any_sentence_start_ratio: f64,
    pub any_sentence_start_max_hits: usize,

    pub frequency_points_per_hit: f64,
    pub frequency_cap: f64,
    pub spread_cap: f64,
    pub position_cap: f64,
    pub shape_acronym: f64,
    pub shape_multi_word: f64,
    pub shape_single_word: f64,
    pub shape_short_word: f64,

    pub min_score_short: u32,
    pub min_score_multi_word: u32,
    pub min_score_default: u32,

    pub high_confidence_score: u32,
    pub medium_confidence_score: u32,

    pub context_samples: usize,
    pub character_title_weight: f64,
    pub character_verb_weight: f64,
    pub locative_weight: f64,
    pub article_weight: f64,
    pub org_noun_weight: f64,
    pub multi_word_character_bonus: f64,

    pub max_candidates: usize,
    pub sample_contexts: usize,
    pub context_radius: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_occurrences: MIN_OCCURRENCES,
            min_acronym_occurrences: MIN_ACRONYM_OCCURRENCES,
            single_word_sentence_start_ratio: SINGLE_WORD_SENTENCE_START_RATIO,
            single_word_sentence_start_max_hits: SINGLE_WORD_SENTENCE_START_MAX_HITS,
            any_sentence_start_ratio: ANY_SENTENCE_START_RATIO,
            any_sentence_start_max_hits: ANY_SENTENCE_START_MAX_HITS,
            frequency_points_per_hit: FREQUENCY_POINTS_PER_HIT,
            frequency_cap: FREQUENCY_CAP,
            spread_cap: SPREAD_CAP,
            position_cap: POSITION_CAP,
            shape_acronym: SHAPE_ACRONYM,
            shape_multi_word: SHAPE_MULTI_WORD,
            shape_single_word: SHAPE_SINGLE_WORD,
            shape_short_word: SHAPE_SHORT_WORD,
            min_score_short: MIN_SCORE_SHORT,
            min_score_multi_word: MIN_SCORE_MULTI_WORD,
            min_score_default: MIN_SCORE_DEFAULT,
            high_confidence_score: HIGH_CONFIDENCE_SCORE,
            medium_confidence_score: MEDIUM_CONFIDENCE_SCORE,
            context_samples: CONTEXT_SAMPLES,
            character_title_weight: CHARACTER_TITLE_WEIGHT,
            character_verb_weight: CHARACTER_VERB_WEIGHT,
            locative_weight: LOCATIVE_WEIGHT,
            article_weight: ARTICLE_WEIGHT,
            org_noun_weight: ORG_NOUN_WEIGHT,
            multi_word_character_bonus: MULTI_WORD_CHARACTER_BONUS,
            max_candidates: MAX_CANDIDATES,
            sample_contexts: SAMPLE_CONTEXTS,
            context_radius: CONTEXT_RADIUS,
        }
    }
}

/// Endpoint of the optional AI classifier. Disabled unless configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Extra attempts when the model answers with invalid JSON
    pub json_retries: usize,
    /// Only low and medium confidence candidates are sent
    pub max_batch: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 60,
            json_retries: 1,
            max_batch: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub extraction: ExtractionConfig,
    pub classifier: ClassifierConfig,
}

impl EngineConfig {
    /// Read a JSON config file. Absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}
