//! HTML fragments for subject listings.

use super::{ListingState, Surface};

/// Keeps the latest listing as an HTML fragment, like a container's innerHTML.
#[derive(Debug, Clone)]
pub struct HtmlSurface {
    contents: String,
    show_stats: bool,
}

impl Default for HtmlSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSurface {
    pub fn new() -> Self {
        Self {
            contents: String::new(),
            show_stats: true,
        }
    }

    /// Omit the total/last-updated summary above the table.
    pub fn without_stats(mut self) -> Self {
        self.show_stats = false;
        self
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn into_contents(self) -> String {
        self.contents
    }
}

impl Surface for HtmlSurface {
    fn replace(&mut self, state: &ListingState) {
        self.contents = listing_html(state, self.show_stats);
    }
}

/// Render a listing state as an HTML fragment.
pub fn listing_html(state: &ListingState, show_stats: bool) -> String {
    let stats = match (show_stats, state.stats()) {
        (true, Some(stats)) => {
            let last_updated = stats
                .last_updated
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                r#"
    <div class="listing-stats">
        <span>Total files: <strong id="totalFiles">{}</strong></span>
        <span>Last updated: <strong id="lastUpdated">{}</strong></span>
    </div>"#,
                stats.total_files, last_updated
            )
        }
        _ => String::new(),
    };

    let body = match state {
        ListingState::Loading { .. } => {
            format!(r#"<p class="listing-loading">{}</p>"#, super::LOADING_MESSAGE)
        }
        ListingState::Unavailable { .. } => {
            format!(r#"<p class="listing-error">{}</p>"#, super::LOAD_ERROR_MESSAGE)
        }
        ListingState::Ready { entries, .. } if entries.is_empty() => {
            format!(r#"<p class="listing-empty">{}</p>"#, super::NO_FILES_MESSAGE)
        }
        ListingState::Ready { entries, .. } => {
            let mut rows = String::new();
            for entry in entries {
                rows.push_str(&format!(
                    r#"
            <tr>
                <td><i class="{} fa-lg" aria-hidden="true"></i> {}</td>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td><a href="{}" target="_blank" rel="noopener noreferrer" class="btn-small">View</a></td>
            </tr>"#,
                    entry.icon.css_class(),
                    html_escape(&entry.name),
                    html_escape(&entry.kind),
                    entry.size.as_deref().unwrap_or("-"),
                    entry.date.as_deref().map(html_escape).unwrap_or_else(|| "-".to_string()),
                    html_escape(&entry.href),
                ));
            }

            format!(
                r#"<table class="file-listing">
        <thead>
            <tr>
                <th>File Name</th>
                <th>Type</th>
                <th>Size</th>
                <th>Date Uploaded</th>
                <th>View</th>
            </tr>
        </thead>
        <tbody>{}
        </tbody>
    </table>"#,
                rows
            )
        }
    };

    format!(
        r#"<div class="file-list" data-subject="{}">{}
    {}
</div>"#,
        html_escape(state.subject()),
        stats,
        body
    )
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
