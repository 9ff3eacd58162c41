//! Subject manifests: parsing, normalization, stats and filtering.
//!
//! A `files.json` is either a flat array of entries (each entry names its
//! category in `type`) or an object mapping category names to arrays. Both
//! are normalized into [`Manifest`], which groups records by category.

pub mod fallback;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::LoadError;
use crate::models::{FileRecord, RawRecord};

/// Normalized file listing of one subject, grouped by category.
///
/// Categories keep the order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    categories: Vec<(String, Vec<FileRecord>)>,
}

/// Aggregate numbers shown above a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ManifestStats {
    /// Files across all categories.
    pub total_files: usize,
    /// Most recent parseable upload date across all categories.
    pub last_updated: Option<NaiveDate>,
}

impl Manifest {
    /// Build a manifest from already-normalized records, grouping by their category.
    pub fn from_records(records: impl IntoIterator<Item = FileRecord>) -> Self {
        let mut manifest = Self::default();
        for record in records {
            manifest.push(record);
        }
        manifest
    }

    /// Append a record under its own category.
    pub fn push(&mut self, record: FileRecord) {
        match self
            .categories
            .iter_mut()
            .find(|(name, _)| *name == record.category)
        {
            Some((_, records)) => records.push(record),
            None => self
                .categories
                .push((record.category.clone(), vec![record])),
        }
    }

    /// Records under `category`, in manifest order. Unknown categories are empty.
    pub fn category(&self, category: &str) -> &[FileRecord] {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, records)| records.as_slice())
            .unwrap_or(&[])
    }

    /// Category names in first-seen order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    /// All records across categories.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.categories.iter().flat_map(|(_, records)| records.iter())
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total count and most recent date, independent of any active category.
    pub fn stats(&self) -> ManifestStats {
        ManifestStats {
            total_files: self.len(),
            last_updated: self.iter().filter_map(FileRecord::parsed_date).max(),
        }
    }

    /// Records in `category` whose name contains `query` (case-insensitive).
    ///
    /// An empty or whitespace-only query matches everything in the category.
    pub fn filter<'a>(&'a self, category: &str, query: &str) -> Vec<&'a FileRecord> {
        let needle = query.trim().to_lowercase();
        self.category(category)
            .iter()
            .filter(|record| needle.is_empty() || record.name.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Parse a `files.json` body into a normalized manifest.
///
/// Fails when the body is not JSON or the top level is neither an array nor
/// an object. Individual entries that can't be understood are dropped with a
/// warning instead of failing the whole manifest.
pub fn parse_manifest(body: &str) -> Result<Manifest, LoadError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LoadError::Malformed(e.to_string()))?;

    let mut manifest = Manifest::default();
    match value {
        Value::Array(entries) => {
            for record in normalize_entries(entries, None) {
                manifest.push(record);
            }
        }
        Value::Object(map) => {
            for (category, entries) in map {
                let Value::Array(entries) = entries else {
                    warn!("Ignoring manifest key '{}': not an array", category);
                    continue;
                };
                for record in normalize_entries(entries, Some(category.as_str())) {
                    manifest.push(record);
                }
            }
        }
        other => {
            return Err(LoadError::Malformed(format!(
                "expected an array or object at top level, found {}",
                json_kind(&other)
            )));
        }
    }

    Ok(manifest)
}

fn normalize_entries(entries: Vec<Value>, category: Option<&str>) -> Vec<FileRecord> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawRecord>(entry) {
            Ok(raw) => {
                let record = raw.normalize(category);
                if record.is_none() {
                    warn!("Dropping manifest entry without name or url");
                }
                record
            }
            Err(e) => {
                warn!("Dropping malformed manifest entry: {}", e);
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
