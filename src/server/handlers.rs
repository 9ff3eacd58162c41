//! Request handlers.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::error;

use super::templates;
use super::AppState;
use crate::loader::SubjectView;
use crate::render::HtmlSurface;
use crate::source::{is_valid_subject_id, DirSource};

/// Query parameters of a subject page.
#[derive(Debug, Default, Deserialize)]
pub struct SubjectQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

/// Subject index.
pub async fn index(State(state): State<AppState>) -> Response {
    match list_subjects(&state.root).await {
        Ok(subjects) => Html(templates::base_template(
            "Subjects",
            &templates::subjects_list(&subjects),
            state.settings.dark_theme,
        ))
        .into_response(),
        Err(e) => {
            error!("Failed to list subjects in {}: {}", state.root.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::base_template(
                    "Subjects",
                    r#"<p class="listing-error">Could not list subjects.</p>"#,
                    state.settings.dark_theme,
                )),
            )
                .into_response()
        }
    }
}

/// Listing page for one subject.
pub async fn subject_page(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(query): Query<SubjectQuery>,
) -> Response {
    let dark = state.settings.dark_theme;
    if !is_valid_subject_id(&subject) || !is_dir(&state.root.join(&subject)).await {
        return (
            StatusCode::NOT_FOUND,
            Html(templates::base_template(
                "Not found",
                &templates::not_found(&format!("Subject '{}'", subject)),
                dark,
            )),
        )
            .into_response();
    }

    let category = query
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| state.settings.default_category.clone());
    let search = query.q.unwrap_or_default().trim().to_string();

    let source = DirSource::new(&state.root).with_link_prefix("/files");
    let view = SubjectView::new(Arc::new(source), HtmlSurface::new());
    view.load_files(&subject, &category).await;
    if !search.is_empty() {
        view.set_search(&search).await;
    }

    let categories = view.tab_categories().await;

    let listing = view.into_surface().into_contents();
    let body = templates::subject_page(&subject, &categories, &category, &search, &listing);
    Html(templates::base_template(&subject, &body, dark)).into_response()
}

/// Stylesheet.
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        templates::CSS,
    )
}

async fn is_dir(path: &FsPath) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Subject folders directly under the root, sorted.
async fn list_subjects(root: &FsPath) -> std::io::Result<Vec<String>> {
    let mut subjects = Vec::new();
    let mut entries = tokio::fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') || !is_valid_subject_id(&name) {
            continue;
        }
        subjects.push(name);
    }
    subjects.sort();
    Ok(subjects)
}
