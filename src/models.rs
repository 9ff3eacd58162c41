//! Domain models for subject file listings.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category assigned to records that don't name one.
pub const DEFAULT_CATEGORY: &str = "notes";

/// Categories the site shows as tabs. The set is open; manifests may use others.
pub const KNOWN_CATEGORIES: &[&str] = &["notes", "code", "videos", "extras"];

/// One downloadable resource of a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Display name.
    pub name: String,
    /// Path relative to the subject's folder. Never empty.
    pub url: String,
    /// Tab this file is listed under.
    pub category: String,
    /// Size in bytes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Upload date exactly as the manifest spelled it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl FileRecord {
    /// Create a record from a relative URL, deriving the name and using the default category.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: file_name_from_url(&url).to_string(),
            url,
            category: DEFAULT_CATEGORY.to_string(),
            size: None,
            date: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Lowercased file extension of the URL, ignoring any query or fragment.
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.url)
    }

    /// The upload date, if it is in one of the recognized formats.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }
}

/// A manifest entry as it appears on the wire, before normalization.
///
/// Entries are either a bare path string or an object whose fields are all
/// optional. `size` and `date` stay as raw JSON so one odd value doesn't
/// reject the whole entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRecord {
    Path(String),
    Entry(RawEntry),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Category in flat manifests. Generated categorized manifests put the extension here.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
}

impl RawRecord {
    /// Normalize into a [`FileRecord`].
    ///
    /// `category` overrides the entry's own `type` (the key of a categorized
    /// manifest). Returns `None` when the entry has neither a name nor a URL.
    pub fn normalize(self, category: Option<&str>) -> Option<FileRecord> {
        let entry = match self {
            RawRecord::Path(path) => RawEntry {
                url: Some(path),
                ..Default::default()
            },
            RawRecord::Entry(entry) => entry,
        };

        let name = non_empty(entry.name);
        let url = non_empty(entry.url);

        let (name, url) = match (name, url) {
            (Some(name), Some(url)) => (name, url),
            (None, Some(url)) => {
                let derived = file_name_from_url(&url);
                let name = if derived.is_empty() {
                    url.clone()
                } else {
                    derived.to_string()
                };
                (name, url)
            }
            (Some(name), None) => (name.clone(), name),
            (None, None) => return None,
        };

        let category = category
            .map(str::to_string)
            .or_else(|| non_empty(entry.kind))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let size = entry.size.as_ref().and_then(parse_size);
        let date = match entry.date {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        };

        Some(FileRecord {
            name,
            url,
            category,
            size,
            date,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Trailing path segment of a URL (`"folder/Lecture 1.pdf"` -> `"Lecture 1.pdf"`).
pub fn file_name_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Lowercased extension of a URL path, ignoring `?query` and `#fragment`.
pub fn file_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = file_name_from_url(path);
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Parse a size given either as a byte count or as a string like `"1.23MB"`.
pub fn parse_size(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => parse_size_str(s),
        _ => None,
    }
}

fn parse_size_str(s: &str) -> Option<u64> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let number: f64 = number.parse().ok()?;
    if number < 0.0 {
        return None;
    }

    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1024,
        "M" | "MB" | "MIB" => 1024 * 1024,
        "G" | "GB" | "GIB" => 1024 * 1024 * 1024,
        _ => return None,
    };

    Some((number * multiplier as f64).round() as u64)
}

/// Parse a manifest date in any of the formats seen in the wild.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and the
/// generator script's `DD-MM-YYYY`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .ok()
}
