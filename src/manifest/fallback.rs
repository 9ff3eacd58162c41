//! Best-effort file discovery for subjects without a `files.json`.
//!
//! Remote subjects are scraped from their web server's directory listing;
//! local subjects are scanned directly. Both produce plain [`FileRecord`]s in
//! the default category so callers can't tell the two paths apart.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use regex::Regex;
use tracing::debug;

use crate::models::{file_extension, file_name_from_url, FileRecord, DEFAULT_CATEGORY};

/// Extensions treated as downloadable resources when no manifest exists.
pub const RESOURCE_EXTENSIONS: &[&str] = &[
    "pdf", "ppt", "pptx", "doc", "docx", "xls", "xlsx", "zip", "rar", "png", "jpg", "jpeg", "gif",
    "mp4", "webm", "mov", "ipynb",
];

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)href\s*=\s*["']([^"']+\.(?:pdf|pptx?|docx?|xlsx?|zip|rar|png|jpe?g|gif|mp4|webm|mov|ipynb))["']"#,
    )
    .expect("valid href regex")
});

/// Whether `ext` (lowercase, no dot) is a resource extension.
pub fn is_resource_extension(ext: &str) -> bool {
    RESOURCE_EXTENSIONS.contains(&ext)
}

/// Extract resource links from a directory listing page.
///
/// Links are deduplicated by file name; the first occurrence wins. Names are
/// percent-decoded for display, URLs are kept as written.
pub fn extract_links(html: &str) -> Vec<FileRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for captures in HREF_RE.captures_iter(html) {
        let url = &captures[1];
        let raw_name = file_name_from_url(url);
        let name = urlencoding::decode(raw_name)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw_name.to_string());

        if !seen.insert(name.clone()) {
            continue;
        }

        records.push(FileRecord {
            name,
            url: url.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            size: None,
            date: None,
        });
    }

    debug!("Extracted {} links from directory listing", records.len());
    records
}

/// List resource files directly inside a local subject directory.
///
/// Files are sorted by name. Sizes and modification dates come from the
/// filesystem. Hidden files and subdirectories are skipped.
pub fn scan_directory(dir: &Path) -> std::io::Result<Vec<FileRecord>> {
    let mut records = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let Some(ext) = file_extension(name) else {
            continue;
        };
        if !is_resource_extension(&ext) {
            continue;
        }

        let mut record = FileRecord::from_url(name).with_size(metadata.len());
        if let Ok(modified) = metadata.modified() {
            record = record.with_date(format_mtime(modified));
        }
        records.push(record);
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(records)
}

/// Format a modification time as a local `YYYY-MM-DD` date.
pub fn format_mtime(modified: SystemTime) -> String {
    let dt: DateTime<Local> = modified.into();
    dt.format("%Y-%m-%d").to_string()
}
