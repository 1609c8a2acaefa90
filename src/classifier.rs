//! Optional AI second opinion on uncertain candidates.
//!
//! Deterministic extraction always runs first. Low and medium confidence
//! candidates may then be sent to a local model that can retype them,
//! adjust their confidence or flag them as noise. Failures never reach the
//! caller: the deterministic result is kept.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use story_types::{Candidate, CandidateResult, Confidence, EntityType};
use tracing::{debug, info, warn};

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use crate::gazetteer::{self, GazetteerHit};

/// What the model is told about one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierInput {
    pub text: String,
    pub suggested_type: EntityType,
    pub contexts: Vec<String>,
    /// Curated or suffix-keyword type, when the name is a known one
    pub gazetteer: Option<GazetteerHit>,
}

impl From<&Candidate> for ClassifierInput {
    fn from(c: &Candidate) -> Self {
        ClassifierInput {
            text: c.text.clone(),
            suggested_type: c.suggested_type,
            contexts: c.sample_contexts.clone(),
            gazetteer: gazetteer::lookup(&c.text),
        }
    }
}

/// The model's verdict on one candidate. Type and confidence stay raw
/// strings so an unparsable answer can fall back to the deterministic value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassifierOverride {
    pub name: String,
    #[serde(rename = "type", default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub is_noise: bool,
    #[serde(default)]
    pub reasoning: String,
}

pub trait CandidateClassifier {
    fn classify(&self, inputs: &[ClassifierInput]) -> Result<Vec<ClassifierOverride>>;
}

// ── Ollama client ────────────────────────────────────────────────────────

pub struct OllamaClassifier {
    endpoint: String,
    model: String,
    json_retries: usize,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            json_retries: config.json_retries,
            client,
        })
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                format: "json",
            })
            .send()?;

        if !response.status().is_success() {
            return Err(Error::Classifier {
                message: format!("{url} returned {}", response.status()),
            });
        }
        Ok(response.json::<GenerateResponse>()?.response)
    }
}

impl CandidateClassifier for OllamaClassifier {
    fn classify(&self, inputs: &[ClassifierInput]) -> Result<Vec<ClassifierOverride>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut prompt = build_classification_prompt(inputs);
        for attempt in 0..=self.json_retries {
            let raw = self.generate(&prompt)?;
            match parse_overrides(&raw) {
                Ok(overrides) => {
                    debug!(attempt, overrides = overrides.len(), "classifier answered");
                    return Ok(overrides);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "classifier returned invalid JSON");
                    prompt = build_retry_prompt(&raw);
                }
            }
        }
        Err(Error::Classifier {
            message: format!("no valid JSON after {} attempts", self.json_retries + 1),
        })
    }
}

// ── Prompt and response handling ─────────────────────────────────────────

pub fn build_classification_prompt(inputs: &[ClassifierInput]) -> String {
    let types = EntityType::ALL.map(|t| t.as_str()).join(", ");
    let mut listing = String::new();
    for (i, input) in inputs.iter().enumerate() {
        let hint = match input.gazetteer {
            Some(hit) => format!(", gazetteer: {} {}%", hit.entity_type, hit.confidence),
            None => String::new(),
        };
        listing.push_str(&format!(
            "{}. \"{}\" (current guess: {}{hint})\n",
            i + 1,
            input.text,
            input.suggested_type
        ));
        for ctx in &input.contexts {
            listing.push_str(&format!("   - \"...{ctx}...\"\n"));
        }
    }

    format!(
        r#"You are reviewing proper-noun candidates extracted from a novel.

For each candidate decide whether it is a real named entity and, if so, its type.

TYPES: {types}

SCHEMA:
{{
  "classifications": [
    {{"name": "exact candidate text", "type": "character", "confidence": "high|medium|low", "is_noise": false, "reasoning": "one short sentence"}}
  ]
}}

RULES:
- Use the candidate text exactly as given for "name"
- Set "is_noise" to true for ordinary words, interjections and sentence openers
- Output ONLY the JSON object, no markdown, no explanations

CANDIDATES:
{listing}
JSON OUTPUT:"#
    )
}

pub fn build_retry_prompt(invalid_json: &str) -> String {
    format!(
        r#"The following JSON is invalid:

{invalid_json}

Fix this JSON. Output only valid JSON with no markdown formatting, no code blocks, no explanations. Just the raw JSON object."#
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OverridePayload {
    Wrapped { classifications: Vec<ClassifierOverride> },
    List(Vec<ClassifierOverride>),
}

/// Parse a model answer, tolerating a surrounding code fence and either a
/// wrapped or a bare list.
pub fn parse_overrides(raw: &str) -> Result<Vec<ClassifierOverride>> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    Ok(match serde_json::from_str::<OverridePayload>(body.trim())? {
        OverridePayload::Wrapped { classifications } => classifications,
        OverridePayload::List(list) => list,
    })
}

// ── Merging ──────────────────────────────────────────────────────────────

/// Apply model verdicts by case-insensitive name. Noise verdicts drop the
/// candidate; unknown names and unparsable fields change nothing.
pub fn apply_overrides(candidates: Vec<Candidate>, overrides: &[ClassifierOverride]) -> Vec<Candidate> {
    let by_name: HashMap<String, &ClassifierOverride> = overrides
        .iter()
        .map(|o| (o.name.trim().to_lowercase(), o))
        .collect();

    candidates
        .into_iter()
        .filter_map(|mut c| {
            let Some(o) = by_name.get(&c.text.to_lowercase()) else {
                return Some(c);
            };
            if o.is_noise {
                debug!(candidate = %c.text, reasoning = %o.reasoning, "dropped as noise");
                return None;
            }
            if let Some(t) = o.entity_type.as_deref().and_then(|t| t.parse::<EntityType>().ok()) {
                c.suggested_type = t;
            }
            if let Some(conf) = o.confidence.as_deref().and_then(|s| s.parse::<Confidence>().ok()) {
                c.confidence = conf;
            }
            Some(c)
        })
        .collect()
}

/// Send the uncertain candidates to `classifier` and merge its answer.
/// On any error the result is returned unchanged.
pub fn classify_best_effort<C: CandidateClassifier + ?Sized>(
    classifier: &C,
    mut result: CandidateResult,
    max_batch: usize,
) -> CandidateResult {
    let inputs: Vec<ClassifierInput> = result
        .candidates
        .iter()
        .filter(|c| c.confidence < Confidence::High)
        .take(max_batch)
        .map(ClassifierInput::from)
        .collect();
    if inputs.is_empty() {
        return result;
    }

    match classifier.classify(&inputs) {
        Ok(overrides) => {
            let before = result.candidates.len();
            result.candidates = apply_overrides(result.candidates, &overrides);
            info!(
                sent = inputs.len(),
                overrides = overrides.len(),
                dropped = before - result.candidates.len(),
                "AI classification applied"
            );
        }
        Err(e) => {
            warn!(error = %e, "AI classification failed, keeping deterministic results");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(text: &str, entity_type: EntityType, confidence: Confidence) -> Candidate {
        Candidate {
            text: text.to_string(),
            suggested_type: entity_type,
            confidence,
            score: 40,
            occurrences: 3,
            chapter_spread: 1,
            sample_contexts: vec![format!("near {text} again")],
            related_candidates: Vec::new(),
        }
    }

    fn verdict(name: &str, t: Option<&str>, is_noise: bool) -> ClassifierOverride {
        ClassifierOverride {
            name: name.to_string(),
            entity_type: t.map(str::to_string),
            confidence: Some("high".into()),
            is_noise,
            reasoning: String::new(),
        }
    }

    struct Fixed(Vec<ClassifierOverride>);

    impl CandidateClassifier for Fixed {
        fn classify(&self, _inputs: &[ClassifierInput]) -> Result<Vec<ClassifierOverride>> {
            Ok(self.0.clone())
        }
    }

    struct Unreachable;

    impl CandidateClassifier for Unreachable {
        fn classify(&self, _inputs: &[ClassifierInput]) -> Result<Vec<ClassifierOverride>> {
            Err(Error::Classifier {
                message: "connection refused".into(),
            })
        }
    }

    // ── merging ──────────────────────────────────────────────────────

    #[test]
    fn test_apply_overrides() {
        let candidates = vec![
            cand("Vantor", EntityType::Character, Confidence::Medium),
            cand("Suddenly", EntityType::Character, Confidence::Low),
            cand("Marlow", EntityType::Character, Confidence::Medium),
        ];
        let overrides = vec![
            verdict("vantor", Some("location"), false),
            verdict("SUDDENLY", None, true),
            verdict("Nobody", Some("character"), false),
        ];
        let out = apply_overrides(candidates, &overrides);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].suggested_type, EntityType::Location);
        assert_eq!(out[0].confidence, Confidence::High);
        // No verdict for Marlow
        assert_eq!(out[1].text, "Marlow");
        assert_eq!(out[1].confidence, Confidence::Medium);
    }

    #[test]
    fn test_unparsable_type_keeps_deterministic_value() {
        let out = apply_overrides(
            vec![cand("Marlow", EntityType::Character, Confidence::Low)],
            &[verdict("Marlow", Some("spaceship"), false)],
        );
        assert_eq!(out[0].suggested_type, EntityType::Character);
        assert_eq!(out[0].confidence, Confidence::High);
    }

    #[test]
    fn test_best_effort_keeps_result_on_error() {
        let result = CandidateResult {
            candidates: vec![cand("Vantor", EntityType::Character, Confidence::Low)],
            existing_entities: vec!["Knox".into()],
        };
        let out = classify_best_effort(&Unreachable, result.clone(), 50);
        assert_eq!(out, result);
    }

    #[test]
    fn test_best_effort_skips_high_confidence() {
        let result = CandidateResult {
            candidates: vec![cand("Knox", EntityType::Character, Confidence::High)],
            existing_entities: Vec::new(),
        };
        // Would drop Knox if it were asked
        let classifier = Fixed(vec![verdict("Knox", None, true)]);
        let out = classify_best_effort(&classifier, result, 50);
        assert_eq!(out.candidates.len(), 1);
    }

    #[test]
    fn test_best_effort_applies_verdicts() {
        let result = CandidateResult {
            candidates: vec![cand("Vantor", EntityType::Character, Confidence::Medium)],
            existing_entities: Vec::new(),
        };
        let classifier = Fixed(vec![verdict("Vantor", Some("place"), false)]);
        let out = classify_best_effort(&classifier, result, 50);
        assert_eq!(out.candidates[0].suggested_type, EntityType::Location);
    }

    // ── parsing ──────────────────────────────────────────────────────

    #[test]
    fn test_parse_wrapped_and_fenced() {
        let raw = "```json\n{\"classifications\": [{\"name\": \"Vantor\", \"type\": \"location\"}]}\n```";
        let parsed = parse_overrides(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].entity_type.as_deref(), Some("location"));
        assert!(!parsed[0].is_noise);
    }

    #[test]
    fn test_parse_bare_list() {
        let parsed = parse_overrides(r#"[{"name": "Um", "is_noise": true}]"#).unwrap();
        assert!(parsed[0].is_noise);
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(parse_overrides("sure! here you go"), Err(Error::Json(_))));
    }

    #[test]
    fn test_prompt_lists_candidates() {
        let prompt = build_classification_prompt(&[ClassifierInput::from(&cand(
            "Vantor",
            EntityType::Character,
            Confidence::Low,
        ))]);
        assert!(prompt.contains("1. \"Vantor\" (current guess: character)"));
        assert!(prompt.contains("near Vantor again"));
        assert!(prompt.contains(
            "TYPES: character, location, organization, artifact, concept, event"
        ));
    }

    #[test]
    fn test_prompt_carries_gazetteer_hint() {
        let prompt = build_classification_prompt(&[
            ClassifierInput::from(&cand("Moscow", EntityType::Location, Confidence::Medium)),
            ClassifierInput::from(&cand("Harlan Foundation", EntityType::Character, Confidence::Low)),
        ]);
        assert!(prompt.contains("1. \"Moscow\" (current guess: location, gazetteer: location 90%)"));
        assert!(prompt.contains(&format!(
            "2. \"Harlan Foundation\" (current guess: character, gazetteer: organization {}%)",
            crate::gazetteer::SUFFIX_CONFIDENCE
        )));
    }
}
