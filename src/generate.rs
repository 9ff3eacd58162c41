//! Manifest generation for a subject folder.
//!
//! Scans the files next to `files.json`, sorts them into categories by
//! extension and appends any that aren't listed yet. Existing entries,
//! including hand-edited ones and categories this tool doesn't know, are
//! kept as they are.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::error::GenerateError;
use crate::manifest::fallback::format_mtime;
use crate::models::{file_extension, file_name_from_url, RawRecord};
use crate::source::MANIFEST_FILE;

/// Category each known extension is filed under. Other files are ignored.
pub const CATEGORY_BY_EXTENSION: &[(&str, &str)] = &[
    ("pdf", "notes"),
    ("doc", "notes"),
    ("docx", "notes"),
    ("ppt", "notes"),
    ("pptx", "notes"),
    ("zip", "extras"),
    ("rar", "extras"),
    ("mp4", "extras"),
    ("jpg", "extras"),
];

/// Category for a file extension, if it is one the generator tracks.
pub fn category_for_extension(ext: &str) -> Option<&'static str> {
    CATEGORY_BY_EXTENSION
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, category)| *category)
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    pub manifest_path: PathBuf,
    /// Names of files appended, in scan order.
    pub added: Vec<String>,
    /// Files already listed under their category.
    pub already_listed: usize,
    /// Files whose extension isn't tracked.
    pub ignored: usize,
    /// Whether the manifest was written.
    pub written: bool,
}

/// Update `<dir>/files.json` with the files found in `dir`.
///
/// With `dry_run` the report is computed but nothing is written.
pub fn generate_manifest(dir: &Path, dry_run: bool) -> Result<GenerateReport, GenerateError> {
    if !dir.is_dir() {
        return Err(GenerateError::NotADirectory(dir.to_path_buf()));
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    let mut data = load_existing(&manifest_path)?;

    // Every tracked category gets an array, even if empty
    for (_, category) in CATEGORY_BY_EXTENSION {
        data.entry(category.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
    }

    let mut report = GenerateReport {
        manifest_path: manifest_path.clone(),
        ..Default::default()
    };

    for (name, size, date) in scan_files(dir)? {
        if name == MANIFEST_FILE {
            continue;
        }
        let Some(category) = file_extension(&name)
            .as_deref()
            .and_then(category_for_extension)
        else {
            debug!("Ignoring {}", name);
            report.ignored += 1;
            continue;
        };

        let Some(Value::Array(entries)) = data.get_mut(category) else {
            // A hand-edited manifest put something other than a list here
            report.ignored += 1;
            continue;
        };

        let listed = entries.iter().any(|entry| lists_file(entry, category, &name));
        if listed {
            report.already_listed += 1;
            continue;
        }

        entries.push(json!({
            "name": name,
            "url": name,
            "size": size,
            "date": date,
        }));
        report.added.push(name);
    }

    if !dry_run {
        let body = serde_json::to_string_pretty(&Value::Object(data)).map_err(|source| {
            GenerateError::Json {
                path: manifest_path.clone(),
                source,
            }
        })?;
        std::fs::write(&manifest_path, body + "\n").map_err(|source| GenerateError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        report.written = true;
        info!(
            "Updated {} ({} added)",
            manifest_path.display(),
            report.added.len()
        );
    }

    Ok(report)
}

/// Whether a manifest entry, in any accepted shape, refers to `file_name`.
fn lists_file(entry: &Value, category: &str, file_name: &str) -> bool {
    let Ok(raw) = serde_json::from_value::<RawRecord>(entry.clone()) else {
        return false;
    };
    raw.normalize(Some(category)).is_some_and(|record| {
        record.name == file_name || file_name_from_url(&record.url) == file_name
    })
}

fn load_existing(path: &Path) -> Result<Map<String, Value>, GenerateError> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let body = std::fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str(&body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(GenerateError::NotCategorized(path.to_path_buf())),
        Err(source) => Err(GenerateError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Regular, non-hidden files in `dir` as (name, size, date), sorted by name.
fn scan_files(dir: &Path) -> Result<Vec<(String, u64, String)>, GenerateError> {
    let io_err = |source| GenerateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let metadata = entry.metadata().map_err(io_err)?;
        if !metadata.is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let date = metadata.modified().map(format_mtime).unwrap_or_default();
        files.push((name, metadata.len(), date));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_manifest;

    fn write(dir: &Path, name: &str, contents: &[u8]) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_categorizes_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lecture1.pdf", b"%PDF");
        write(dir.path(), "slides.PPTX", b"x");
        write(dir.path(), "dataset.zip", b"PK");
        write(dir.path(), "main.py", b"print()");

        let report = generate_manifest(dir.path(), false).unwrap();
        assert!(report.written);
        assert_eq!(report.added, vec!["dataset.zip", "lecture1.pdf", "slides.PPTX"]);
        assert_eq!(report.ignored, 1);

        let body = std::fs::read_to_string(dir.path().join("files.json")).unwrap();
        let manifest = parse_manifest(&body).unwrap();
        assert_eq!(manifest.category("notes").len(), 2);
        assert_eq!(manifest.category("extras")[0].name, "dataset.zip");
        assert_eq!(manifest.category("notes")[0].size, Some(4));
        assert!(manifest.category("notes")[0].parsed_date().is_some());
    }

    #[test]
    fn test_rerun_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lecture1.pdf", b"%PDF");

        generate_manifest(dir.path(), false).unwrap();
        let report = generate_manifest(dir.path(), false).unwrap();
        assert!(report.added.is_empty());
        assert_eq!(report.already_listed, 1);

        let body = std::fs::read_to_string(dir.path().join("files.json")).unwrap();
        assert_eq!(parse_manifest(&body).unwrap().len(), 1);
    }

    #[test]
    fn test_keeps_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "files.json",
            br#"{ "code": [{ "name": "solver", "url": "https://example.org/solver.ipynb" }] }"#,
        );
        write(dir.path(), "notes.docx", b"x");

        generate_manifest(dir.path(), false).unwrap();
        let body = std::fs::read_to_string(dir.path().join("files.json")).unwrap();
        let manifest = parse_manifest(&body).unwrap();
        assert_eq!(manifest.category("code").len(), 1);
        assert_eq!(manifest.category("notes")[0].name, "notes.docx");
    }

    #[test]
    fn test_url_only_and_bare_entries_count_as_listed() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "files.json",
            br#"{ "notes": [{ "url": "lecture1.pdf" }, "slides.pptx", { "name": "Week 3", "url": "week/w3.pdf" }] }"#,
        );
        write(dir.path(), "lecture1.pdf", b"%PDF");
        write(dir.path(), "slides.pptx", b"x");
        write(dir.path(), "w3.pdf", b"%PDF");

        let report = generate_manifest(dir.path(), false).unwrap();
        assert!(report.added.is_empty());
        assert_eq!(report.already_listed, 3);

        let body = std::fs::read_to_string(dir.path().join("files.json")).unwrap();
        let manifest = parse_manifest(&body).unwrap();
        assert_eq!(manifest.category("notes").len(), 3);
    }

    #[test]
    fn test_keeps_hand_edited_key_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "files.json", br#"{ "videos": [], "extras": [], "notes": [] }"#);
        write(dir.path(), "lecture1.pdf", b"%PDF");

        generate_manifest(dir.path(), false).unwrap();
        let body = std::fs::read_to_string(dir.path().join("files.json")).unwrap();
        let data: Map<String, Value> = serde_json::from_str(&body).unwrap();
        let keys: Vec<_> = data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["videos", "extras", "notes"]);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lecture1.pdf", b"%PDF");

        let report = generate_manifest(dir.path(), true).unwrap();
        assert_eq!(report.added.len(), 1);
        assert!(!report.written);
        assert!(!dir.path().join("files.json").exists());
    }

    #[test]
    fn test_rejects_flat_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "files.json", br#"[{ "url": "a.pdf" }]"#);
        assert!(matches!(
            generate_manifest(dir.path(), false),
            Err(GenerateError::NotCategorized(_))
        ));
    }

    #[test]
    fn test_rejects_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            generate_manifest(&dir.path().join("nope"), true),
            Err(GenerateError::NotADirectory(_))
        ));
    }
}
