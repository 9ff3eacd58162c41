//! Rendering of subject listings.
//!
//! The loader builds a [`ListingState`] and hands it to a [`Surface`], which
//! replaces whatever it showed before. Surfaces decide how to present it:
//! HTML fragments, terminal text, or JSON.

mod html;
mod terminal;

pub(crate) use html::html_escape;
pub use html::{listing_html, HtmlSurface};
pub use terminal::{listing_text, TerminalSurface};

use serde::Serialize;

use crate::manifest::{Manifest, ManifestStats};
use crate::models::{file_extension, parse_date, FileRecord};
use crate::source::ManifestSource;

/// Placeholder shown when nothing matches the active category and search.
pub const NO_FILES_MESSAGE: &str = "No files found.";
/// Shown when neither a manifest nor a directory listing could be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading files.";
/// Shown while a manifest is being fetched.
pub const LOADING_MESSAGE: &str = "Loading files…";

/// Icon shown next to a file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileIcon {
    Pdf,
    Slides,
    Document,
    Archive,
    Spreadsheet,
    Image,
    Video,
    Code,
    Generic,
}

impl FileIcon {
    pub fn for_url(url: &str) -> Self {
        match file_extension(url).as_deref() {
            Some(ext) => Self::for_extension(ext),
            None => FileIcon::Generic,
        }
    }

    pub fn for_extension(ext: &str) -> Self {
        match ext {
            "pdf" => FileIcon::Pdf,
            "ppt" | "pptx" => FileIcon::Slides,
            "doc" | "docx" => FileIcon::Document,
            "zip" | "rar" => FileIcon::Archive,
            "xls" | "xlsx" => FileIcon::Spreadsheet,
            "png" | "jpg" | "jpeg" | "gif" => FileIcon::Image,
            "mp4" | "webm" | "mov" => FileIcon::Video,
            "ipynb" | "html" | "htm" | "js" | "py" | "java" | "c" | "cpp" | "rb" | "go" => {
                FileIcon::Code
            }
            _ => FileIcon::Generic,
        }
    }

    /// Font Awesome classes used by the site's stylesheet.
    pub fn css_class(&self) -> &'static str {
        match self {
            FileIcon::Pdf => "fa-solid fa-file-pdf",
            FileIcon::Slides => "fa-solid fa-file-powerpoint",
            FileIcon::Document => "fa-solid fa-file-word",
            FileIcon::Archive => "fa-solid fa-file-zipper",
            FileIcon::Spreadsheet => "fa-solid fa-file-excel",
            FileIcon::Image => "fa-solid fa-image",
            FileIcon::Video => "fa-solid fa-film",
            FileIcon::Code => "fa-solid fa-code",
            FileIcon::Generic => "fa-solid fa-file",
        }
    }

    /// Short text label for plain-text output.
    pub fn label(&self) -> &'static str {
        match self {
            FileIcon::Pdf => "[pdf]",
            FileIcon::Slides => "[ppt]",
            FileIcon::Document => "[doc]",
            FileIcon::Archive => "[zip]",
            FileIcon::Spreadsheet => "[xls]",
            FileIcon::Image => "[img]",
            FileIcon::Video => "[vid]",
            FileIcon::Code => "[src]",
            FileIcon::Generic => "[---]",
        }
    }
}

/// Human-readable size with binary prefixes.
///
/// Whole numbers for bytes and for values of 10 or more; otherwise one
/// decimal, dropping a trailing `.0` (`2048` -> `"2 KB"`, `1536` -> `"1.5 KB"`).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let number = if unit == 0 || value >= 10.0 {
        format!("{:.0}", value)
    } else {
        let fixed = format!("{:.1}", value);
        match fixed.strip_suffix(".0") {
            Some(whole) => whole.to_string(),
            None => fixed,
        }
    };

    format!("{} {}", number, UNITS[unit])
}

/// Display form of a manifest date: `YYYY-MM-DD` when parseable, verbatim otherwise.
pub fn format_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// One row of a rendered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub name: String,
    pub href: String,
    pub icon: FileIcon,
    /// Uppercased extension, e.g. `PDF`.
    pub kind: String,
    pub size: Option<String>,
    pub date: Option<String>,
}

impl ListingEntry {
    pub fn from_record(record: &FileRecord, href: String) -> Self {
        Self {
            name: record.name.clone(),
            href,
            icon: FileIcon::for_url(&record.url),
            kind: record
                .extension()
                .map(|ext| ext.to_ascii_uppercase())
                .unwrap_or_default(),
            size: record.size.map(human_size),
            date: record.date.as_deref().map(format_date),
        }
    }
}

/// Everything a surface needs to draw one subject view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListingState {
    /// A fetch for this subject is in flight.
    Loading { subject: String },
    /// The manifest is loaded; `entries` is already filtered and may be empty.
    Ready {
        subject: String,
        category: String,
        query: String,
        stats: ManifestStats,
        entries: Vec<ListingEntry>,
    },
    /// Neither the manifest nor the fallback could be loaded.
    Unavailable { subject: String },
}

impl ListingState {
    /// Filter `manifest` for the view and resolve links through `source`.
    pub fn ready(
        source: &dyn ManifestSource,
        subject: &str,
        manifest: &Manifest,
        category: &str,
        query: &str,
    ) -> Self {
        let entries = manifest
            .filter(category, query)
            .into_iter()
            .map(|record| ListingEntry::from_record(record, source.resource_url(subject, &record.url)))
            .collect();

        ListingState::Ready {
            subject: subject.to_string(),
            category: category.to_string(),
            query: query.to_string(),
            stats: manifest.stats(),
            entries,
        }
    }

    pub fn subject(&self) -> &str {
        match self {
            ListingState::Loading { subject }
            | ListingState::Ready { subject, .. }
            | ListingState::Unavailable { subject } => subject,
        }
    }

    /// Filtered entries; empty unless the state is `Ready`.
    pub fn entries(&self) -> &[ListingEntry] {
        match self {
            ListingState::Ready { entries, .. } => entries.as_slice(),
            _ => &[],
        }
    }

    /// Aggregate stats; an unavailable manifest counts as zero files.
    pub fn stats(&self) -> Option<ManifestStats> {
        match self {
            ListingState::Ready { stats, .. } => Some(*stats),
            ListingState::Unavailable { .. } => Some(ManifestStats::default()),
            ListingState::Loading { .. } => None,
        }
    }

    /// Single-line message for non-list states, `None` when there are rows to show.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ListingState::Loading { .. } => Some(LOADING_MESSAGE),
            ListingState::Unavailable { .. } => Some(LOAD_ERROR_MESSAGE),
            ListingState::Ready { entries, .. } if entries.is_empty() => Some(NO_FILES_MESSAGE),
            ListingState::Ready { .. } => None,
        }
    }
}

/// A display target whose contents are replaced wholesale on every render.
pub trait Surface: Send {
    fn replace(&mut self, state: &ListingState);
}

/// Keeps the latest state as pretty-printed JSON.
#[derive(Debug, Default)]
pub struct JsonSurface {
    contents: String,
}

impl JsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

impl Surface for JsonSurface {
    fn replace(&mut self, state: &ListingState) {
        self.contents = serde_json::to_string_pretty(state).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize listing: {}", e);
            String::new()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileRecord;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(500), "500 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1024), "1 KB");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(2048), "2 KB");
        assert_eq!(human_size(20 * 1024), "20 KB");
        assert_eq!(human_size(3 * 1024 * 1024 + 300 * 1024), "3.3 MB");
        assert_eq!(human_size(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(human_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_icons_by_extension() {
        assert_eq!(FileIcon::for_url("a.pdf"), FileIcon::Pdf);
        assert_eq!(FileIcon::for_url("deck.PPTX"), FileIcon::Slides);
        assert_eq!(FileIcon::for_url("essay.docx"), FileIcon::Document);
        assert_eq!(FileIcon::for_url("bundle.rar"), FileIcon::Archive);
        assert_eq!(FileIcon::for_url("marks.xls"), FileIcon::Spreadsheet);
        assert_eq!(FileIcon::for_url("graph.jpeg"), FileIcon::Image);
        assert_eq!(FileIcon::for_url("lecture.mov"), FileIcon::Video);
        assert_eq!(FileIcon::for_url("lab.ipynb"), FileIcon::Code);
        assert_eq!(FileIcon::for_url("solver.py?raw=1"), FileIcon::Code);
        assert_eq!(FileIcon::for_url("notes.txt"), FileIcon::Generic);
        assert_eq!(FileIcon::for_url("LICENSE"), FileIcon::Generic);
        assert_eq!(FileIcon::Pdf.css_class(), "fa-solid fa-file-pdf");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("01-06-2024"), "2024-06-01");
        assert_eq!(format_date("last week"), "last week");
    }

    #[test]
    fn test_entry_from_record() {
        let record = FileRecord::from_url("w1/Lecture 1.pdf")
            .with_size(1536)
            .with_date("2024-01-01");
        let entry = ListingEntry::from_record(&record, "/files/x/w1/Lecture%201.pdf".to_string());
        assert_eq!(entry.name, "Lecture 1.pdf");
        assert_eq!(entry.kind, "PDF");
        assert_eq!(entry.size.as_deref(), Some("1.5 KB"));
        assert_eq!(entry.date.as_deref(), Some("2024-01-01"));
        assert_eq!(entry.icon, FileIcon::Pdf);
    }

    #[test]
    fn test_messages() {
        let loading = ListingState::Loading {
            subject: "a".to_string(),
        };
        assert_eq!(loading.message(), Some(LOADING_MESSAGE));
        assert_eq!(loading.stats(), None);

        let unavailable = ListingState::Unavailable {
            subject: "a".to_string(),
        };
        assert_eq!(unavailable.message(), Some(LOAD_ERROR_MESSAGE));
        assert_eq!(unavailable.stats().unwrap().total_files, 0);

        let empty = ListingState::Ready {
            subject: "a".to_string(),
            category: "notes".to_string(),
            query: String::new(),
            stats: ManifestStats::default(),
            entries: Vec::new(),
        };
        assert_eq!(empty.message(), Some(NO_FILES_MESSAGE));
    }

    #[test]
    fn test_json_surface() {
        let mut surface = JsonSurface::new();
        surface.replace(&ListingState::Unavailable {
            subject: "algebra".to_string(),
        });
        let value: serde_json::Value = serde_json::from_str(surface.contents()).unwrap();
        assert_eq!(value["state"], "unavailable");
        assert_eq!(value["subject"], "algebra");
    }
}
