//! Known-entity detection: link catalogued entities to the chapters that
//! mention them.
//!
//! Each entity is searched under its name, its aliases and (for people with
//! more than one name) its first name, longest term first. One appearance is
//! recorded per (entity, chapter); reruns never duplicate rows.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use story_types::{
    CrossBookEntity, DetectionDetail, DetectionResult, Entity, EntityId, EntityType, ManuscriptId,
    NewAppearance, ProjectId, TextRange,
};
use tracing::{debug, info};

use crate::boundary::{char_offset, find_whole_word};
use crate::error::Result;
use crate::store::Store;

/// Metadata keys that may carry aliases.
pub const ALIAS_KEYS: &[&str] = &[
    "aliases",
    "alias",
    "nicknames",
    "nickname",
    "aka",
    "also_known_as",
];

pub const MIN_ALIAS_CHARS: usize = 2;
/// Shorter first names ("Al", "Jo") are too ambiguous to search alone.
pub const MIN_FIRST_NAME_CHARS: usize = 3;

pub const AUTO_DETECTED_NOTE: &str = "Auto-detected";

// ── Aliases ──────────────────────────────────────────────────────────────

/// Aliases found in entity metadata. Values may be a comma-separated
/// string or a list of strings; anything else is ignored.
pub fn parse_aliases(metadata: &Map<String, Value>) -> Vec<String> {
    let mut aliases: Vec<String> = Vec::new();
    let mut push = |raw: &str| {
        let alias = raw.trim();
        if alias.chars().count() >= MIN_ALIAS_CHARS && !aliases.iter().any(|a| a == alias) {
            aliases.push(alias.to_string());
        }
    };

    for key in ALIAS_KEYS {
        match metadata.get(*key) {
            Some(Value::String(s)) => s.split(',').for_each(&mut push),
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).for_each(&mut push),
            _ => {}
        }
    }
    aliases
}

// ── Search terms ─────────────────────────────────────────────────────────

/// Lowercased search terms for one entity, longest first.
#[derive(Debug, Clone)]
pub struct SearchEntry<'e> {
    pub entity: &'e Entity,
    pub terms: Vec<String>,
}

impl<'e> SearchEntry<'e> {
    pub fn build(entity: &'e Entity) -> Self {
        let mut terms: Vec<String> = Vec::new();
        let mut add = |t: String| {
            if !t.is_empty() && !terms.contains(&t) {
                terms.push(t);
            }
        };

        let name = entity.name.trim().to_lowercase();
        if entity.entity_type == EntityType::Character {
            let mut tokens = name.split_whitespace();
            if let (Some(first), Some(_)) = (tokens.next(), tokens.next()) {
                if first.chars().count() >= MIN_FIRST_NAME_CHARS {
                    add(first.to_string());
                }
            }
        }
        add(name);
        for alias in parse_aliases(&entity.metadata) {
            add(alias.to_lowercase());
        }

        // Stable: equal-length terms keep name-before-alias order
        terms.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
        SearchEntry { entity, terms }
    }
}

/// One entity found in one chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterMatch<'e> {
    pub entity: &'e Entity,
    pub term: &'e str,
    /// Byte range into the lowercased chapter body
    pub start: usize,
    pub end: usize,
}

/// Matches a fixed entity list against chapter text. Holds no store state,
/// so it can be built once per run and reused for every chapter.
pub struct KnownEntityDetector<'e> {
    entries: Vec<SearchEntry<'e>>,
}

impl<'e> KnownEntityDetector<'e> {
    pub fn new(entities: &'e [Entity]) -> Self {
        let entries = entities
            .iter()
            .map(SearchEntry::build)
            .filter(|e| !e.terms.is_empty())
            .collect();
        KnownEntityDetector { entries }
    }

    /// At most one match per entity: the first (longest) term that occurs
    /// as a whole word in `body_lower`.
    pub fn find_in_chapter<'s>(&'s self, body_lower: &str) -> Vec<ChapterMatch<'s>> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry.terms.iter().find_map(|term| {
                    find_whole_word(body_lower, term).map(|(start, end)| ChapterMatch {
                        entity: entry.entity,
                        term: term.as_str(),
                        start,
                        end,
                    })
                })
            })
            .collect()
    }
}

// ── Detection runs ───────────────────────────────────────────────────────

/// Scan every chapter of one manuscript for the project's entities and
/// record new appearances.
pub fn detect<S: Store + ?Sized>(
    store: &mut S,
    project_id: ProjectId,
    manuscript_id: ManuscriptId,
) -> Result<DetectionResult> {
    let entities = store.project_entities(project_id)?;
    let chapters = store.manuscript_chapters(manuscript_id)?;
    let mut existing = store.appearance_pairs(manuscript_id)?;

    let detector = KnownEntityDetector::new(&entities);
    let mut result = DetectionResult::default();
    let mut detected: BTreeSet<EntityId> = BTreeSet::new();

    for chapter in &chapters {
        let body_lower = chapter.body.to_lowercase();
        for m in detector.find_in_chapter(&body_lower) {
            let start = char_offset(&body_lower, m.start);
            let text_range = TextRange {
                start,
                end: start + body_lower[m.start..m.end].chars().count(),
            };
            let pair = (m.entity.id, chapter.id);
            let is_new = if existing.contains(&pair) {
                false
            } else {
                let inserted = store.insert_appearance(NewAppearance {
                    entity_id: m.entity.id,
                    manuscript_id,
                    chapter_id: chapter.id,
                    text_range: Some(text_range),
                    notes: AUTO_DETECTED_NOTE.to_string(),
                })?;
                existing.insert(pair);
                inserted
            };
            if is_new {
                result.new_appearances += 1;
            }
            detected.insert(m.entity.id);
            result.details.push(DetectionDetail {
                entity_id: m.entity.id,
                entity_name: m.entity.name.clone(),
                manuscript_id,
                chapter_id: chapter.id,
                chapter_title: chapter.title.clone(),
                matched_term: m.term.to_string(),
                text_range,
                is_new,
            });
        }
    }
    result.total_matches = result.details.len();

    for entity in entities.iter().filter(|e| detected.contains(&e.id)) {
        let others: Vec<ManuscriptId> = store
            .entity_manuscripts(entity.id)?
            .into_iter()
            .filter(|&m| m != manuscript_id)
            .collect();
        if !others.is_empty() {
            result.cross_book_entities.push(CrossBookEntity {
                entity_id: entity.id,
                entity_name: entity.name.clone(),
                existing_books: others,
                new_books: vec![manuscript_id],
            });
        }
    }

    info!(
        manuscript_id,
        chapters = chapters.len(),
        entities = entities.len(),
        total_matches = result.total_matches,
        new_appearances = result.new_appearances,
        cross_book = result.cross_book_entities.len(),
        "entity detection finished"
    );
    Ok(result)
}

/// Run [`detect`] over every manuscript of a project in series order and
/// aggregate the results.
pub fn detect_full_project<S: Store + ?Sized>(
    store: &mut S,
    project_id: ProjectId,
) -> Result<DetectionResult> {
    let manuscripts = store.project_manuscripts(project_id)?;
    let mut runs = Vec::with_capacity(manuscripts.len());
    for manuscript in &manuscripts {
        debug!(manuscript_id = manuscript.id, title = %manuscript.title, "detecting");
        runs.push(detect(&mut *store, project_id, manuscript.id)?);
    }
    let total = merge_results(runs);

    info!(
        project_id,
        manuscripts = manuscripts.len(),
        total_matches = total.total_matches,
        new_appearances = total.new_appearances,
        "project detection finished"
    );
    Ok(total)
}

/// Sum several runs. Cross-book entries are merged by entity: the first
/// entry keeps its existing books and later runs add their new books.
pub fn merge_results(runs: impl IntoIterator<Item = DetectionResult>) -> DetectionResult {
    let mut total = DetectionResult::default();
    let mut cross_book: BTreeMap<EntityId, CrossBookEntity> = BTreeMap::new();

    for r in runs {
        total.total_matches += r.total_matches;
        total.new_appearances += r.new_appearances;
        total.details.extend(r.details);

        for entry in r.cross_book_entities {
            match cross_book.get_mut(&entry.entity_id) {
                Some(merged) => {
                    for book in entry.new_books {
                        if !merged.new_books.contains(&book) {
                            merged.new_books.push(book);
                        }
                    }
                }
                None => {
                    cross_book.insert(entry.entity_id, entry);
                }
            }
        }
    }
    total.cross_book_entities = cross_book.into_values().collect();
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;
    use serde_json::json;
    use story_types::ChapterRecord;

    fn record(order: u32, body: &str) -> ChapterRecord {
        ChapterRecord {
            title: format!("Chapter {order}"),
            order_index: order,
            body: body.to_string(),
        }
    }

    fn entity_with(name: &str, entity_type: EntityType, metadata: Value) -> Entity {
        Entity {
            id: 1,
            project_id: 1,
            entity_type,
            name: name.to_string(),
            metadata: metadata.as_object().cloned().unwrap_or_default(),
        }
    }

    // ── aliases ──────────────────────────────────────────────────────

    #[test]
    fn test_parse_aliases_list_and_string() {
        let meta = json!({
            "aliases": ["Kate", " K "],
            "nickname": "Kat, Shaw",
            "aka": ["X"],
        });
        let aliases = parse_aliases(meta.as_object().unwrap());
        assert_eq!(aliases, vec!["Kate", "Kat", "Shaw"]);
    }

    #[test]
    fn test_malformed_alias_metadata_is_ignored() {
        let meta = json!({
            "aliases": 42,
            "alias": {"nested": "Kate"},
            "nicknames": [1, null, "Kit"],
        });
        assert_eq!(parse_aliases(meta.as_object().unwrap()), vec!["Kit"]);
        assert!(parse_aliases(&Map::new()).is_empty());
    }

    // ── search terms ─────────────────────────────────────────────────

    #[test]
    fn test_terms_longest_first_with_first_name() {
        let e = entity_with(
            "Katherine Shaw",
            EntityType::Character,
            json!({"aliases": ["Kate", "Katherine Shaw"]}),
        );
        let entry = SearchEntry::build(&e);
        assert_eq!(entry.terms, vec!["katherine shaw", "katherine", "kate"]);
    }

    #[test]
    fn test_no_first_name_for_places_or_short_names() {
        let place = entity_with("Blacksite Omega", EntityType::Location, json!({}));
        assert_eq!(SearchEntry::build(&place).terms, vec!["blacksite omega"]);

        let short = entity_with("Al Brandt", EntityType::Character, json!({}));
        assert_eq!(SearchEntry::build(&short).terms, vec!["al brandt"]);
    }

    #[test]
    fn test_one_match_per_entity_per_chapter() {
        let entities = vec![entity_with(
            "Katherine Shaw",
            EntityType::Character,
            json!({"aliases": ["Kate"]}),
        )];
        let detector = KnownEntityDetector::new(&entities);

        let matches = detector.find_in_chapter("kate waved. katherine shaw smiled. kate left.");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].term, "katherine shaw");

        let matches = detector.find_in_chapter("only kate was there");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].term, "kate");
    }

    #[test]
    fn test_word_boundary() {
        let entities = vec![entity_with("Ramsey", EntityType::Character, json!({}))];
        let detector = KnownEntityDetector::new(&entities);
        assert!(detector.find_in_chapter("young ramseyson waited").is_empty());
        assert_eq!(detector.find_in_chapter("ramsey's coat").len(), 1);
    }

    // ── store-backed runs ────────────────────────────────────────────

    struct Fixture {
        store: JsonStore,
        project: ProjectId,
    }

    fn fixture() -> Fixture {
        let mut store = JsonStore::new();
        let project = store.create_project("Series").id;
        Fixture { store, project }
    }

    #[test]
    fn test_commander_blake_scenario() {
        let Fixture { mut store, project } = fixture();
        let line = "Commander Blake infiltrated Blacksite Omega under orders from the Shadow Council.";
        let book = store
            .add_manuscript(project, "Book One", 1, &[record(1, line), record(2, line)])
            .unwrap();
        store
            .add_entity(project, EntityType::Character, "Commander Blake", Map::new())
            .unwrap();
        store
            .add_entity(project, EntityType::Location, "Blacksite Omega", Map::new())
            .unwrap();
        store
            .add_entity(project, EntityType::Organization, "Shadow Council", Map::new())
            .unwrap();

        let first = detect(&mut store, project, book.id).unwrap();
        assert_eq!(first.total_matches, 6);
        assert_eq!(first.new_appearances, 6);
        assert!(first.details.iter().all(|d| d.is_new));
        assert!(first.cross_book_entities.is_empty());

        let again = detect(&mut store, project, book.id).unwrap();
        assert_eq!(again.total_matches, 6);
        assert_eq!(again.new_appearances, 0);
        assert!(again.details.iter().all(|d| !d.is_new));
        assert_eq!(store.appearances().len(), 6);
    }

    #[test]
    fn test_text_range_is_char_offset() {
        let Fixture { mut store, project } = fixture();
        let book = store
            .add_manuscript(project, "Book", 1, &[record(1, "Caf\u{e9} talk: Knox arrived.")])
            .unwrap();
        store
            .add_entity(project, EntityType::Character, "Knox", Map::new())
            .unwrap();

        let r = detect(&mut store, project, book.id).unwrap();
        assert_eq!(r.details[0].text_range, TextRange { start: 11, end: 15 });
        assert_eq!(r.details[0].matched_term, "knox");
    }

    #[test]
    fn test_cross_book_reported() {
        let Fixture { mut store, project } = fixture();
        let a = store
            .add_manuscript(project, "Book A", 1, &[record(1, "Knox arrived in Vantor.")])
            .unwrap();
        let b = store
            .add_manuscript(project, "Book B", 2, &[record(1, "Years later Knox returned.")])
            .unwrap();
        let knox = store
            .add_entity(project, EntityType::Character, "Knox", Map::new())
            .unwrap();

        let ra = detect(&mut store, project, a.id).unwrap();
        assert!(ra.cross_book_entities.is_empty());

        let rb = detect(&mut store, project, b.id).unwrap();
        assert_eq!(
            rb.cross_book_entities,
            vec![CrossBookEntity {
                entity_id: knox.id,
                entity_name: "Knox".into(),
                existing_books: vec![a.id],
                new_books: vec![b.id],
            }]
        );
    }

    #[test]
    fn test_full_project_merges_cross_book() {
        let Fixture { mut store, project } = fixture();
        // Inserted out of order; series order decides processing order
        let c = store
            .add_manuscript(project, "Book C", 3, &[record(1, "Knox again.")])
            .unwrap();
        let a = store
            .add_manuscript(project, "Book A", 1, &[record(1, "Knox first.")])
            .unwrap();
        let b = store
            .add_manuscript(project, "Book B", 2, &[record(1, "Knox second.")])
            .unwrap();
        store
            .add_entity(project, EntityType::Character, "Knox", Map::new())
            .unwrap();

        let r = detect_full_project(&mut store, project).unwrap();
        assert_eq!(r.total_matches, 3);
        assert_eq!(r.new_appearances, 3);
        assert_eq!(r.cross_book_entities.len(), 1);
        let knox = &r.cross_book_entities[0];
        assert_eq!(knox.existing_books, vec![a.id]);
        assert_eq!(knox.new_books, vec![b.id, c.id]);

        let rerun = detect_full_project(&mut store, project).unwrap();
        assert_eq!(rerun.new_appearances, 0);
    }

    #[test]
    fn test_empty_manuscript() {
        let Fixture { mut store, project } = fixture();
        let book = store.add_manuscript(project, "Empty", 1, &[]).unwrap();
        store
            .add_entity(project, EntityType::Character, "Knox", Map::new())
            .unwrap();
        let r = detect(&mut store, project, book.id).unwrap();
        assert_eq!(r, DetectionResult::default());
    }
}
