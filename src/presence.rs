//! Cross-book presence: which books (and how many chapters of each) every
//! catalogued entity appears in.

use std::collections::{BTreeMap, HashMap, HashSet};

use story_types::{ChapterId, EntityId, EntityPresence, ManuscriptId, ManuscriptPresence, ProjectId};

use crate::error::Result;
use crate::store::Store;

/// One entry per entity of the project, including entities with no
/// appearances. Manuscripts are listed in series order.
pub fn cross_book_presence<S: Store + ?Sized>(
    store: &S,
    project_id: ProjectId,
) -> Result<Vec<EntityPresence>> {
    let manuscripts = store.project_manuscripts(project_id)?;
    let mut entities = store.project_entities(project_id)?;
    entities.sort_by_key(|e| e.id);

    // entity → manuscript → distinct chapters
    let mut chapters: HashMap<EntityId, HashMap<ManuscriptId, HashSet<ChapterId>>> = HashMap::new();
    for a in store.project_appearances(project_id)? {
        chapters
            .entry(a.entity_id)
            .or_default()
            .entry(a.manuscript_id)
            .or_default()
            .insert(a.chapter_id);
    }

    let order: BTreeMap<ManuscriptId, usize> = manuscripts
        .iter()
        .enumerate()
        .map(|(i, m)| (m.id, i))
        .collect();

    Ok(entities
        .into_iter()
        .map(|entity| {
            let mut present: Vec<ManuscriptPresence> = chapters
                .get(&entity.id)
                .into_iter()
                .flatten()
                .filter_map(|(mid, chs)| {
                    let m = manuscripts.iter().find(|m| m.id == *mid)?;
                    Some(ManuscriptPresence {
                        id: m.id,
                        title: m.title.clone(),
                        chapter_count: chs.len(),
                    })
                })
                .collect();
            present.sort_by_key(|p| order.get(&p.id).copied().unwrap_or(usize::MAX));

            EntityPresence {
                entity_id: entity.id,
                entity_name: entity.name,
                entity_type: entity.entity_type,
                manuscripts: present,
            }
        })
        .collect())
}
