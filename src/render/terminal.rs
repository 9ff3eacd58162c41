//! Plain-text listings for the terminal.

use console::{style, Term};

use super::{ListingState, Surface};

/// Renders listings as styled text, optionally echoing each render to stdout.
pub struct TerminalSurface {
    contents: String,
    term: Option<Term>,
}

impl TerminalSurface {
    /// Keep the latest render in memory only.
    pub fn buffered() -> Self {
        Self {
            contents: String::new(),
            term: None,
        }
    }

    /// Also write every render to stdout.
    pub fn stdout() -> Self {
        Self {
            contents: String::new(),
            term: Some(Term::stdout()),
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

impl Surface for TerminalSurface {
    fn replace(&mut self, state: &ListingState) {
        self.contents = listing_text(state);
        if let Some(term) = &self.term {
            if let Err(e) = term.write_line(&self.contents) {
                tracing::warn!("Failed to write listing: {}", e);
            }
        }
    }
}

/// Render a listing state as terminal text.
pub fn listing_text(state: &ListingState) -> String {
    let mut out = String::new();

    let heading = match state {
        ListingState::Ready {
            subject,
            category,
            query,
            ..
        } if !query.trim().is_empty() => {
            format!("{} / {} (search: \"{}\")", subject, category, query.trim())
        }
        ListingState::Ready {
            subject, category, ..
        } => format!("{} / {}", subject, category),
        other => other.subject().to_string(),
    };
    out.push_str(&style(heading).bold().to_string());
    out.push('\n');

    if let Some(stats) = state.stats() {
        let last_updated = stats
            .last_updated
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(
            &style(format!(
                "{} files, last updated {}",
                stats.total_files, last_updated
            ))
            .dim()
            .to_string(),
        );
        out.push('\n');
    }

    match state {
        ListingState::Unavailable { .. } => {
            out.push_str(&style(super::LOAD_ERROR_MESSAGE).red().to_string());
        }
        _ => {
            if let Some(message) = state.message() {
                out.push_str(&style(message).yellow().to_string());
            }
        }
    }

    let entries = state.entries();
    let name_width = entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(0);

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let meta = [entry.size.as_deref(), entry.date.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" • ");
        out.push_str(&format!(
            "{} {:<width$}  {}  {}",
            style(entry.icon.label()).cyan(),
            entry.name,
            style(meta).dim(),
            style(&entry.href).underlined(),
            width = name_width
        ));
    }

    out
}
