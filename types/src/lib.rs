//! Record types shared between the cross-reference engine and its consumers.
//!
//! Rows mirror the relational store (projects, manuscripts, chapters,
//! entities, appearances); the remaining types are the result shapes of
//! candidate extraction, known-entity detection and the presence query.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ProjectId = i64;
pub type ManuscriptId = i64;
pub type ChapterId = i64;
pub type EntityId = i64;
pub type AppearanceId = i64;

// ── Entity type ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Character,
    Location,
    Organization,
    Artifact,
    Concept,
    Event,
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        Self::Character,
        Self::Location,
        Self::Organization,
        Self::Artifact,
        Self::Concept,
        Self::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Location => "location",
            Self::Organization => "organization",
            Self::Artifact => "artifact",
            Self::Concept => "concept",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityType(pub String);

impl fmt::Display for UnknownEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity type: {}", self.0)
    }
}

impl std::error::Error for UnknownEntityType {}

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    /// Case-insensitive; also accepts a few common synonyms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "character" | "person" => Ok(Self::Character),
            "location" | "place" => Ok(Self::Location),
            "organization" | "organisation" | "org" => Ok(Self::Organization),
            "artifact" | "artefact" | "object" => Ok(Self::Artifact),
            "concept" => Ok(Self::Concept),
            "event" => Ok(Self::Event),
            _ => Err(UnknownEntityType(s.to_string())),
        }
    }
}

// ── Confidence band ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown confidence: {other}")),
        }
    }
}

// ── Stored rows ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

/// One book of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
    pub id: ManuscriptId,
    pub project_id: ProjectId,
    pub title: String,
    /// Position of the book within the series
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub manuscript_id: ManuscriptId,
    /// Narrative position within the manuscript
    pub order_index: u32,
    pub title: String,
    pub body: String,
}

/// A chapter as produced by ingestion, before the store assigns ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub title: String,
    pub order_index: u32,
    pub body: String,
}

/// A catalogued character, location, organization, artifact, concept or event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub project_id: ProjectId,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: String,
    /// Open, author-defined fields. May carry aliases under several keys.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Character offsets of a mention within a chapter body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

/// "This entity is mentioned in this chapter."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub id: AppearanceId,
    pub entity_id: EntityId,
    pub manuscript_id: ManuscriptId,
    pub chapter_id: ChapterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_range: Option<TextRange>,
    #[serde(default)]
    pub notes: String,
}

/// Insert payload for an appearance; the store allocates the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppearance {
    pub entity_id: EntityId,
    pub manuscript_id: ManuscriptId,
    pub chapter_id: ChapterId,
    pub text_range: Option<TextRange>,
    pub notes: String,
}

// ── Candidate extraction output ──────────────────────────────────────────

/// An unconfirmed entity name discovered in raw prose. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub suggested_type: EntityType,
    pub confidence: Confidence,
    pub score: u32,
    pub occurrences: usize,
    pub chapter_spread: usize,
    /// At most three short windows of surrounding text
    pub sample_contexts: Vec<String>,
    /// Component words absorbed into this phrase during deduplication
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_candidates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub candidates: Vec<Candidate>,
    /// Names already catalogued in the project (display only)
    pub existing_entities: Vec<String>,
}

// ── Known-entity detection output ────────────────────────────────────────

/// One (entity, chapter) link found during a detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionDetail {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub manuscript_id: ManuscriptId,
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    /// The search term (name, alias or first name) that matched
    pub matched_term: String,
    pub text_range: TextRange,
    pub is_new: bool,
}

/// An entity already present in other books that now shows up in a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossBookEntity {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub existing_books: Vec<ManuscriptId>,
    pub new_books: Vec<ManuscriptId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub total_matches: usize,
    pub new_appearances: usize,
    pub cross_book_entities: Vec<CrossBookEntity>,
    pub details: Vec<DetectionDetail>,
}

// ── Cross-book presence ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManuscriptPresence {
    pub id: ManuscriptId,
    pub title: String,
    /// Distinct chapters of this manuscript the entity appears in
    pub chapter_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPresence {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub entity_type: EntityType,
    pub manuscripts: Vec<ManuscriptPresence>,
}
