use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use story_types::ChapterRecord;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A book directory discovered under the project root.
#[derive(Debug)]
pub struct ScannedBook {
    pub title: String,
    pub order_index: u32,
    pub path: PathBuf,
    pub chapters: Vec<ChapterRecord>,
}

const CHAPTER_EXTENSIONS: &[&str] = &["txt", "md"];

/// Files that sit next to chapters but are not prose.
const SKIP_STEMS: &[&str] = &["readme", "notes", "outline", "contents", "toc"];

/// Scan a project root and read every book and its chapters.
///
/// Expected directory layout:
///   {root}/{NN_Book Title}/{NN_Chapter Title}.txt
///
/// Numeric prefixes give the series and narrative order; without one, the
/// position in name order is used. A `# Heading` on the first line of a
/// chapter overrides the file name as its title.
pub fn scan_project(root: &Path) -> Result<Vec<ScannedBook>> {
    let mut book_dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .map_err(|e| Error::io(root, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir() && !is_hidden(p))
        .collect();
    book_dirs.sort();

    let mut books = Vec::new();
    for (position, book_dir) in book_dirs.into_iter().enumerate() {
        let dir_name = file_name(&book_dir);
        let (prefix, title) = split_numeric_prefix(&dir_name);
        let order_index = prefix.unwrap_or(position as u32 + 1);

        let chapters = scan_chapters(&book_dir)?;
        if chapters.is_empty() {
            warn!(path = %book_dir.display(), "book directory has no chapters, skipping");
            continue;
        }
        debug!(book = %title, chapters = chapters.len(), "scanned book");

        books.push(ScannedBook {
            title: display_title(title),
            order_index,
            path: book_dir,
            chapters,
        });
    }
    books.sort_by_key(|b| b.order_index);
    Ok(books)
}

fn scan_chapters(book_dir: &Path) -> Result<Vec<ChapterRecord>> {
    let mut files: Vec<PathBuf> = WalkDir::new(book_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && !is_hidden(p))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| CHAPTER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    files.sort();

    let mut chapters = Vec::new();
    for path in files {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        let (prefix, name) = split_numeric_prefix(&stem);
        if SKIP_STEMS.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }

        let raw = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let (heading, body) = split_heading(&raw);
        let order_index = prefix.unwrap_or(chapters.len() as u32 + 1);

        chapters.push(ChapterRecord {
            title: heading.unwrap_or_else(|| display_title(name)),
            order_index,
            body: body.to_string(),
        });
    }
    chapters.sort_by_key(|c| c.order_index);
    Ok(chapters)
}

/// Split a leading "NN_" (or "NN-", "NN ") prefix off a file name.
fn split_numeric_prefix(s: &str) -> (Option<u32>, &str) {
    if let Some(idx) = s.find(['_', '-', ' ']) {
        let prefix = &s[..idx];
        if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
            return (prefix.parse().ok(), s[idx + 1..].trim_start());
        }
    }
    (None, s)
}

fn display_title(name: &str) -> String {
    name.replace('_', " ").trim().to_string()
}

/// A first-line markdown heading becomes the title and is dropped from the body.
fn split_heading(raw: &str) -> (Option<String>, &str) {
    let raw = raw.trim_start_matches('\u{feff}');
    let (first, rest) = raw.split_once('\n').unwrap_or((raw, ""));
    match first.trim().strip_prefix('#') {
        Some(h) => {
            let title = h.trim_start_matches('#').trim();
            if title.is_empty() {
                (None, raw)
            } else {
                (Some(title.to_string()), rest.trim_start_matches(['\r', '\n']))
            }
        }
        None => (None, raw),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_split_numeric_prefix() {
        assert_eq!(split_numeric_prefix("02_The Long Night"), (Some(2), "The Long Night"));
        assert_eq!(split_numeric_prefix("10-Epilogue"), (Some(10), "Epilogue"));
        assert_eq!(split_numeric_prefix("Prologue"), (None, "Prologue"));
        assert_eq!(split_numeric_prefix("Part_One"), (None, "Part_One"));
    }

    #[test]
    fn test_split_heading() {
        let (title, body) = split_heading("# The Arrival\n\nKnox came.");
        assert_eq!(title.as_deref(), Some("The Arrival"));
        assert_eq!(body, "Knox came.");

        let (title, body) = split_heading("Knox came.\nThen left.");
        assert_eq!(title, None);
        assert_eq!(body, "Knox came.\nThen left.");
    }

    #[test]
    fn test_scan_project_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let book2 = root.join("02_Second_Book");
        let book1 = root.join("01_First Book");
        fs::create_dir_all(&book1).unwrap();
        fs::create_dir_all(&book2).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();

        fs::write(book1.join("02_Departure.txt"), "Knox left Vantor.").unwrap();
        fs::write(book1.join("01_Arrival.md"), "# Chapter One\nKnox arrived.").unwrap();
        fs::write(book1.join("README.md"), "notes for me").unwrap();
        fs::write(book1.join("cover.png"), [0u8, 1, 2]).unwrap();
        fs::write(book2.join("01_Return.txt"), "Knox returned.").unwrap();

        let books = scan_project(root).unwrap();
        assert_eq!(books.len(), 2);

        assert_eq!(books[0].title, "First Book");
        assert_eq!(books[0].order_index, 1);
        assert_eq!(books[0].path, book1);
        let titles: Vec<&str> = books[0].chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Chapter One", "Departure"]);
        assert_eq!(books[0].chapters[0].body, "Knox arrived.");

        assert_eq!(books[1].title, "Second Book");
        assert_eq!(books[1].chapters.len(), 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_project(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
