//! Persistence collaborator.
//!
//! The engine reads rows through [`Store`] and writes nothing but new
//! appearances. [`JsonStore`] is the file-backed implementation used by the
//! CLI: the whole knowledgebase lives in one pretty-printed JSON document.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use story_types::{
    Appearance, Chapter, ChapterId, ChapterRecord, Entity, EntityId, EntityType, Manuscript,
    ManuscriptId, NewAppearance, Project, ProjectId,
};
use tracing::debug;

use crate::error::{Error, Result};

/// Read access to projects, manuscripts, chapters, entities and
/// appearances, plus the single write the engine performs.
pub trait Store {
    fn project_entities(&self, project_id: ProjectId) -> Result<Vec<Entity>>;

    /// Manuscripts of a project, ordered by series position.
    fn project_manuscripts(&self, project_id: ProjectId) -> Result<Vec<Manuscript>>;

    /// Chapters of a manuscript, ordered by narrative position.
    fn manuscript_chapters(&self, manuscript_id: ManuscriptId) -> Result<Vec<Chapter>>;

    /// `(entity_id, chapter_id)` pairs already linked in a manuscript.
    fn appearance_pairs(&self, manuscript_id: ManuscriptId)
    -> Result<HashSet<(EntityId, ChapterId)>>;

    /// Manuscripts an entity has at least one appearance in.
    fn entity_manuscripts(&self, entity_id: EntityId) -> Result<BTreeSet<ManuscriptId>>;

    fn project_appearances(&self, project_id: ProjectId) -> Result<Vec<Appearance>>;

    /// Insert unless the `(entity_id, chapter_id)` pair already exists.
    /// Returns whether a row was written.
    fn insert_appearance(&mut self, appearance: NewAppearance) -> Result<bool>;

    /// Every chapter of a project, book by book.
    fn project_chapters(&self, project_id: ProjectId) -> Result<Vec<Chapter>> {
        let mut chapters = Vec::new();
        for m in self.project_manuscripts(project_id)? {
            chapters.extend(self.manuscript_chapters(m.id)?);
        }
        Ok(chapters)
    }
}

// ── JSON file store ──────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JsonStore {
    #[serde(skip)]
    path: Option<PathBuf>,
    next_id: i64,
    projects: Vec<Project>,
    manuscripts: Vec<Manuscript>,
    chapters: Vec<Chapter>,
    entities: Vec<Entity>,
    appearances: Vec<Appearance>,
    /// Unique index on (entity_id, chapter_id)
    #[serde(skip)]
    pairs: HashSet<(EntityId, ChapterId)>,
}

impl JsonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store at `path`, or start an empty one if the file does
    /// not exist yet. [`save`](Self::save) writes back to the same path.
    pub fn load(path: &Path) -> Result<Self> {
        let mut store = if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            serde_json::from_str::<JsonStore>(&json)?
        } else {
            JsonStore::new()
        };
        store.path = Some(path.to_path_buf());
        store.pairs = store
            .appearances
            .iter()
            .map(|a| (a.entity_id, a.chapter_id))
            .collect();
        debug!(
            path = %path.display(),
            entities = store.entities.len(),
            appearances = store.appearances.len(),
            "store loaded"
        );
        Ok(store)
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))?;
        Ok(())
    }

    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // ── glue used by import and confirm ──────────────────────────────

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn create_project(&mut self, name: &str) -> Project {
        let project = Project {
            id: self.alloc_id(),
            name: name.to_string(),
        };
        self.projects.push(project.clone());
        project
    }

    /// The named project, created on first use.
    pub fn ensure_project(&mut self, name: &str) -> Project {
        match self.project_by_name(name) {
            Some(p) => p.clone(),
            None => self.create_project(name),
        }
    }

    pub fn manuscript(&self, id: ManuscriptId) -> Option<&Manuscript> {
        self.manuscripts.iter().find(|m| m.id == id)
    }

    pub fn add_manuscript(
        &mut self,
        project_id: ProjectId,
        title: &str,
        order_index: u32,
        chapters: &[ChapterRecord],
    ) -> Result<Manuscript> {
        if !self.projects.iter().any(|p| p.id == project_id) {
            return Err(Error::NotFound {
                kind: "project",
                id: project_id,
            });
        }
        let manuscript = Manuscript {
            id: self.alloc_id(),
            project_id,
            title: title.to_string(),
            order_index,
        };
        for record in chapters {
            let id = self.alloc_id();
            self.chapters.push(Chapter {
                id,
                manuscript_id: manuscript.id,
                order_index: record.order_index,
                title: record.title.clone(),
                body: record.body.clone(),
            });
        }
        self.manuscripts.push(manuscript.clone());
        Ok(manuscript)
    }

    pub fn add_entity(
        &mut self,
        project_id: ProjectId,
        entity_type: EntityType,
        name: &str,
        metadata: Map<String, Value>,
    ) -> Result<Entity> {
        if !self.projects.iter().any(|p| p.id == project_id) {
            return Err(Error::NotFound {
                kind: "project",
                id: project_id,
            });
        }
        let entity = Entity {
            id: self.alloc_id(),
            project_id,
            entity_type,
            name: name.trim().to_string(),
            metadata,
        };
        self.entities.push(entity.clone());
        Ok(entity)
    }

    pub fn appearances(&self) -> &[Appearance] {
        &self.appearances
    }
}

impl Store for JsonStore {
    fn project_entities(&self, project_id: ProjectId) -> Result<Vec<Entity>> {
        Ok(self
            .entities
            .iter()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }

    fn project_manuscripts(&self, project_id: ProjectId) -> Result<Vec<Manuscript>> {
        let mut ms: Vec<Manuscript> = self
            .manuscripts
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        ms.sort_by_key(|m| (m.order_index, m.id));
        Ok(ms)
    }

    fn manuscript_chapters(&self, manuscript_id: ManuscriptId) -> Result<Vec<Chapter>> {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .iter()
            .filter(|c| c.manuscript_id == manuscript_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|c| (c.order_index, c.id));
        Ok(chapters)
    }

    fn appearance_pairs(
        &self,
        manuscript_id: ManuscriptId,
    ) -> Result<HashSet<(EntityId, ChapterId)>> {
        Ok(self
            .appearances
            .iter()
            .filter(|a| a.manuscript_id == manuscript_id)
            .map(|a| (a.entity_id, a.chapter_id))
            .collect())
    }

    fn entity_manuscripts(&self, entity_id: EntityId) -> Result<BTreeSet<ManuscriptId>> {
        Ok(self
            .appearances
            .iter()
            .filter(|a| a.entity_id == entity_id)
            .map(|a| a.manuscript_id)
            .collect())
    }

    fn project_appearances(&self, project_id: ProjectId) -> Result<Vec<Appearance>> {
        let manuscripts: HashSet<ManuscriptId> = self
            .manuscripts
            .iter()
            .filter(|m| m.project_id == project_id)
            .map(|m| m.id)
            .collect();
        Ok(self
            .appearances
            .iter()
            .filter(|a| manuscripts.contains(&a.manuscript_id))
            .cloned()
            .collect())
    }

    fn insert_appearance(&mut self, appearance: NewAppearance) -> Result<bool> {
        if !self.pairs.insert((appearance.entity_id, appearance.chapter_id)) {
            return Ok(false);
        }
        let id = self.alloc_id();
        self.appearances.push(Appearance {
            id,
            entity_id: appearance.entity_id,
            manuscript_id: appearance.manuscript_id,
            chapter_id: appearance.chapter_id,
            text_range: appearance.text_range,
            notes: appearance.notes,
        });
        Ok(true)
    }
}
