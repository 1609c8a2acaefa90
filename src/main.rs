use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use story_xref::classifier::{OllamaClassifier, classify_best_effort};
use story_xref::detect::merge_results;
use story_xref::types::{
    Confidence, DetectionResult, EntityType, Manuscript, ManuscriptId, Project,
};
use story_xref::{EngineConfig, JsonStore, Store, scanner};

#[derive(Parser)]
#[command(
    name = "story_xref",
    about = "Entity extraction and cross-book tracking for fiction series"
)]
struct Cli {
    /// Knowledgebase file
    #[arg(long, global = true, default_value = "story.json")]
    store: PathBuf,
    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Project to operate on
    #[arg(long, global = true, default_value = "default")]
    project: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a directory of books, then detect known entities in them
    Import {
        /// Project root: {dir}/{NN_Book}/{NN_Chapter}.txt
        dir: PathBuf,
    },
    /// Suggest entity candidates from chapter text
    Extract {
        /// Limit to one manuscript (default: whole project)
        #[arg(long)]
        manuscript: Option<ManuscriptId>,
        /// Ask the configured AI classifier about uncertain candidates
        #[arg(long)]
        ai: bool,
    },
    /// Catalogue an entity, typically a confirmed candidate
    Confirm {
        name: String,
        #[arg(long = "type")]
        entity_type: EntityType,
        #[arg(long = "alias")]
        aliases: Vec<String>,
    },
    /// Record appearances of catalogued entities
    Detect {
        manuscript: Option<ManuscriptId>,
        /// Every manuscript of the project, in series order
        #[arg(long, conflicts_with = "manuscript")]
        all: bool,
    },
    /// Which books each entity appears in
    Presence,
    /// List catalogued entities
    Entities,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut store = JsonStore::load(&cli.store)
        .with_context(|| format!("cannot open store {}", cli.store.display()))?;

    match cli.command {
        Command::Import { dir } => run_import(&mut store, &cli.project, &dir)?,
        Command::Extract { manuscript, ai } => {
            run_extract(&store, &cli.project, manuscript, ai, &config)?
        }
        Command::Confirm {
            name,
            entity_type,
            aliases,
        } => run_confirm(&mut store, &cli.project, &name, entity_type, &aliases)?,
        Command::Detect { manuscript, all } => {
            run_detect(&mut store, &cli.project, manuscript, all)?
        }
        Command::Presence => run_presence(&store, &cli.project)?,
        Command::Entities => run_entities(&store, &cli.project)?,
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}

fn save(store: &JsonStore, after: &str) -> Result<()> {
    store
        .save()
        .with_context(|| format!("cannot save store after {after}"))
}

fn require_project(store: &JsonStore, name: &str) -> Result<Project> {
    match store.project_by_name(name) {
        Some(p) => Ok(p.clone()),
        None => bail!("no project named {name:?}; run `import` or `confirm` first"),
    }
}

fn require_manuscript(store: &JsonStore, project: &Project, id: ManuscriptId) -> Result<Manuscript> {
    match store.manuscript(id) {
        Some(m) if m.project_id == project.id => Ok(m.clone()),
        _ => bail!("manuscript {id} is not part of project {:?}", project.name),
    }
}

fn summarize_detection(r: &DetectionResult) {
    eprintln!(
        "{} matches, {} new appearances, {} cross-book entities",
        r.total_matches,
        r.new_appearances,
        r.cross_book_entities.len()
    );
}

// ═══════════════════════════════════════════════════════════════════════
//  IMPORT: scan directory → manuscripts → automatic detection
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct ImportReport {
    imported: Vec<Manuscript>,
    skipped: Vec<String>,
    detection: DetectionResult,
}

fn run_import(store: &mut JsonStore, project_name: &str, dir: &Path) -> Result<()> {
    eprintln!("Scanning {}", dir.display());
    let books = scanner::scan_project(dir)
        .with_context(|| format!("cannot scan {}", dir.display()))?;
    let project = store.ensure_project(project_name);

    let existing: Vec<String> = store
        .project_manuscripts(project.id)?
        .into_iter()
        .map(|m| m.title)
        .collect();

    let mut imported = Vec::new();
    let mut skipped = Vec::new();
    for book in &books {
        if existing.contains(&book.title) {
            warn!(title = %book.title, "manuscript already imported, skipping");
            skipped.push(book.title.clone());
            continue;
        }
        let m = store.add_manuscript(project.id, &book.title, book.order_index, &book.chapters)?;
        info!(
            manuscript_id = m.id,
            title = %m.title,
            path = %book.path.display(),
            chapters = book.chapters.len(),
            "imported manuscript"
        );
        imported.push(m);
    }

    // New books are linked to the existing catalogue straight away
    let mut runs = Vec::with_capacity(imported.len());
    for m in &imported {
        runs.push(story_xref::detect(store, project.id, m.id)?);
    }
    let detection = merge_results(runs);
    save(store, "import")?;

    eprintln!(
        "Imported {} manuscripts ({} skipped) into {:?}",
        imported.len(),
        skipped.len(),
        project.name
    );
    summarize_detection(&detection);
    print_json(&ImportReport {
        imported,
        skipped,
        detection,
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  EXTRACT: candidate suggestions, optionally reviewed by the AI layer
// ═══════════════════════════════════════════════════════════════════════

fn run_extract(
    store: &JsonStore,
    project_name: &str,
    manuscript: Option<ManuscriptId>,
    ai: bool,
    config: &EngineConfig,
) -> Result<()> {
    let project = require_project(store, project_name)?;
    let chapters = match manuscript {
        Some(id) => {
            let m = require_manuscript(store, &project, id)?;
            store.manuscript_chapters(m.id)?
        }
        None => store.project_chapters(project.id)?,
    };
    let entities = store.project_entities(project.id)?;

    let mut result = story_xref::extract_candidates(&chapters, &entities, &config.extraction);

    if ai || config.classifier.enabled {
        match OllamaClassifier::new(&config.classifier) {
            Ok(classifier) => {
                result = classify_best_effort(&classifier, result, config.classifier.max_batch);
            }
            Err(e) => warn!(error = %e, "cannot build AI classifier, skipping"),
        }
    }

    let mut by_confidence: BTreeMap<Confidence, usize> = BTreeMap::new();
    for c in &result.candidates {
        *by_confidence.entry(c.confidence).or_default() += 1;
    }
    eprintln!(
        "{} candidates from {} chapters ({} high, {} medium, {} low)",
        result.candidates.len(),
        chapters.len(),
        by_confidence.get(&Confidence::High).unwrap_or(&0),
        by_confidence.get(&Confidence::Medium).unwrap_or(&0),
        by_confidence.get(&Confidence::Low).unwrap_or(&0),
    );
    print_json(&result)
}

// ═══════════════════════════════════════════════════════════════════════
//  CONFIRM / ENTITIES: catalogue maintenance
// ═══════════════════════════════════════════════════════════════════════

fn run_confirm(
    store: &mut JsonStore,
    project_name: &str,
    name: &str,
    entity_type: EntityType,
    aliases: &[String],
) -> Result<()> {
    let project = store.ensure_project(project_name);
    let wanted = name.trim().to_lowercase();
    if store
        .project_entities(project.id)?
        .iter()
        .any(|e| e.name.to_lowercase() == wanted)
    {
        bail!("{name:?} is already catalogued in {:?}", project.name);
    }

    let mut metadata = Map::new();
    if !aliases.is_empty() {
        metadata.insert(
            "aliases".to_string(),
            Value::Array(aliases.iter().cloned().map(Value::String).collect()),
        );
    }
    let entity = store.add_entity(project.id, entity_type, name, metadata)?;
    save(store, "confirm")?;

    eprintln!("Catalogued {} as {} (id {})", entity.name, entity.entity_type, entity.id);
    print_json(&entity)
}

fn run_entities(store: &JsonStore, project_name: &str) -> Result<()> {
    let project = require_project(store, project_name)?;
    let mut entities = store.project_entities(project.id)?;
    entities.sort_by(|a, b| (a.entity_type, &a.name).cmp(&(b.entity_type, &b.name)));

    let mut by_type: BTreeMap<EntityType, usize> = BTreeMap::new();
    for e in &entities {
        *by_type.entry(e.entity_type).or_default() += 1;
    }
    let breakdown: Vec<String> = by_type.iter().map(|(t, n)| format!("{n} {t}")).collect();
    eprintln!("{} entities: {}", entities.len(), breakdown.join(", "));
    print_json(&entities)
}

// ═══════════════════════════════════════════════════════════════════════
//  DETECT / PRESENCE: cross-reference runs
// ═══════════════════════════════════════════════════════════════════════

fn run_detect(
    store: &mut JsonStore,
    project_name: &str,
    manuscript: Option<ManuscriptId>,
    all: bool,
) -> Result<()> {
    let project = require_project(store, project_name)?;
    let result = match (manuscript, all) {
        (_, true) => story_xref::detect_full_project(store, project.id)?,
        (Some(id), false) => {
            let m = require_manuscript(store, &project, id)?;
            story_xref::detect(store, project.id, m.id)?
        }
        (None, false) => bail!("pass a manuscript id or --all"),
    };
    save(store, "detection")?;

    summarize_detection(&result);
    print_json(&result)
}

fn run_presence(store: &JsonStore, project_name: &str) -> Result<()> {
    let project = require_project(store, project_name)?;
    let presence = story_xref::cross_book_presence(store, project.id)?;

    let multi_book = presence.iter().filter(|e| e.manuscripts.len() > 1).count();
    eprintln!(
        "{} entities, {} appear in more than one book",
        presence.len(),
        multi_book
    );
    print_json(&presence)
}
