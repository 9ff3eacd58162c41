//! Per-view file loading.
//!
//! A [`SubjectView`] owns everything one open subject page needs: the source
//! it loads from, the surface it draws on, the active category and search
//! text, and the manifest fetched for the current subject. The manifest is
//! fetched once per subject and re-filtered in memory on every category or
//! search change.
//!
//! Fetches are not cancelled when a newer one starts. Each fetch takes a
//! generation number and its result is applied only if no newer fetch has
//! started since, so a slow response can never overwrite a fresher one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::manifest::ManifestStats;
use crate::models::{DEFAULT_CATEGORY, KNOWN_CATEGORIES};
use crate::render::{ListingState, Surface};
use crate::source::{load_manifest, LoadedManifest, ManifestSource};

struct ViewState<S> {
    surface: S,
    subject: Option<String>,
    active_category: String,
    search_query: String,
    loaded: Option<LoadedManifest>,
}

/// Context of one subject view.
pub struct SubjectView<S: Surface> {
    source: Arc<dyn ManifestSource>,
    generation: AtomicU64,
    state: Mutex<ViewState<S>>,
}

impl<S: Surface> SubjectView<S> {
    pub fn new(source: Arc<dyn ManifestSource>, surface: S) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
            state: Mutex::new(ViewState {
                surface,
                subject: None,
                active_category: DEFAULT_CATEGORY.to_string(),
                search_query: String::new(),
                loaded: None,
            }),
        }
    }

    /// Show `subject_id` filtered to `category`.
    ///
    /// Fetches the manifest only when the subject differs from the one
    /// already loaded; otherwise re-filters in memory. Switching subject
    /// clears the search text. Never fails: load problems become display
    /// states on the surface.
    pub async fn load_files(&self, subject_id: &str, category: &str) {
        let generation = {
            let mut state = self.state.lock().await;
            state.active_category = category.to_string();

            if state.subject.as_deref() == Some(subject_id) && state.loaded.is_some() {
                debug!("Re-filtering '{}' for category '{}'", subject_id, category);
                self.render(&mut state);
                return;
            }

            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.subject = Some(subject_id.to_string());
            state.search_query.clear();
            state.loaded = None;
            state.surface.replace(&ListingState::Loading {
                subject: subject_id.to_string(),
            });
            generation
        };

        let loaded = load_manifest(self.source.as_ref(), subject_id).await;

        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                "Discarding stale manifest for '{}' (request {})",
                subject_id, generation
            );
            return;
        }

        info!(
            "Showing '{}' ({} files, {:?})",
            subject_id,
            loaded.manifest.len(),
            loaded.origin
        );
        state.loaded = Some(loaded);
        self.render(&mut state);
    }

    /// Switch the active category without fetching.
    pub async fn set_category(&self, category: &str) {
        let mut state = self.state.lock().await;
        state.active_category = category.to_string();
        self.render(&mut state);
    }

    /// Change the search text without fetching.
    pub async fn set_search(&self, query: &str) {
        let mut state = self.state.lock().await;
        state.search_query = query.trim().to_string();
        self.render(&mut state);
    }

    pub async fn subject(&self) -> Option<String> {
        self.state.lock().await.subject.clone()
    }

    pub async fn active_category(&self) -> String {
        self.state.lock().await.active_category.clone()
    }

    pub async fn search_query(&self) -> String {
        self.state.lock().await.search_query.clone()
    }

    /// Stats of the loaded manifest, `None` while nothing is loaded.
    pub async fn stats(&self) -> Option<ManifestStats> {
        let state = self.state.lock().await;
        state.loaded.as_ref().map(|loaded| loaded.manifest.stats())
    }

    /// Whether the current subject loaded from either source.
    pub async fn is_available(&self) -> bool {
        let state = self.state.lock().await;
        state.loaded.as_ref().is_some_and(|loaded| loaded.is_available())
    }

    /// Categories present in the loaded manifest.
    pub async fn categories(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .loaded
            .as_ref()
            .map(|loaded| loaded.manifest.category_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Tabs to offer: the known categories, then any others the manifest uses.
    pub async fn tab_categories(&self) -> Vec<String> {
        let mut tabs: Vec<String> = KNOWN_CATEGORIES.iter().map(|c| c.to_string()).collect();
        for extra in self.categories().await {
            if !tabs.contains(&extra) {
                tabs.push(extra);
            }
        }
        tabs
    }

    /// Run `f` against the surface, e.g. to read what was last rendered.
    pub async fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.surface)
    }

    pub fn into_surface(self) -> S {
        self.state.into_inner().surface
    }

    fn render(&self, state: &mut ViewState<S>) {
        let Some(subject) = state.subject.clone() else {
            return;
        };

        let listing = match &state.loaded {
            None => ListingState::Loading { subject },
            Some(loaded) if !loaded.is_available() => ListingState::Unavailable { subject },
            Some(loaded) => ListingState::ready(
                self.source.as_ref(),
                &subject,
                &loaded.manifest,
                &state.active_category,
                &state.search_query,
            ),
        };
        state.surface.replace(&listing);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::LoadError;
    use crate::manifest::{parse_manifest, Manifest};
    use crate::models::FileRecord;
    use crate::render::NO_FILES_MESSAGE;

    /// In-memory source that counts fetches and can delay per subject.
    #[derive(Default)]
    struct MemorySource {
        manifests: HashMap<String, String>,
        delays: HashMap<String, Duration>,
        fetches: AtomicUsize,
    }

    impl MemorySource {
        fn with(mut self, subject: &str, body: &str) -> Self {
            self.manifests.insert(subject.to_string(), body.to_string());
            self
        }

        fn delayed(mut self, subject: &str, delay: Duration) -> Self {
            self.delays.insert(subject.to_string(), delay);
            self
        }
    }

    #[async_trait]
    impl ManifestSource for MemorySource {
        async fn fetch_manifest(&self, subject_id: &str) -> Result<Manifest, LoadError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(subject_id) {
                tokio::time::sleep(*delay).await;
            }
            match self.manifests.get(subject_id) {
                Some(body) => parse_manifest(body),
                None => Err(LoadError::Status {
                    url: subject_id.to_string(),
                    status: 404,
                }),
            }
        }

        async fn fetch_listing(&self, subject_id: &str) -> Result<Vec<FileRecord>, LoadError> {
            Err(LoadError::Status {
                url: subject_id.to_string(),
                status: 404,
            })
        }

        fn resource_url(&self, subject_id: &str, url: &str) -> String {
            format!("notes/{}/{}", subject_id, url)
        }
    }

    /// Surface that records every state it was asked to show.
    #[derive(Default)]
    struct RecordingSurface {
        states: Vec<ListingState>,
    }

    impl Surface for RecordingSurface {
        fn replace(&mut self, state: &ListingState) {
            self.states.push(state.clone());
        }
    }

    const ALGEBRA: &str = r#"{
        "notes": [
            { "url": "Lecture 1.pdf", "date": "2024-01-01" },
            { "url": "Lecture 2.pdf" },
            { "url": "Tutorial 1.pdf" }
        ],
        "extras": [{ "url": "past-papers.zip", "date": "2024-06-01", "size": 2048 }]
    }"#;

    fn view(source: MemorySource) -> (Arc<MemorySource>, SubjectView<RecordingSurface>) {
        let source = Arc::new(source);
        let view = SubjectView::new(source.clone(), RecordingSurface::default());
        (source, view)
    }

    fn last(view: SubjectView<RecordingSurface>) -> ListingState {
        view.into_surface().states.pop().unwrap()
    }

    #[tokio::test]
    async fn test_load_shows_loading_then_listing() {
        let (_, view) = view(MemorySource::default().with("algebra", ALGEBRA));
        view.load_files("algebra", "notes").await;

        let states = view.into_surface().states;
        assert_eq!(states.len(), 2);
        assert!(matches!(states[0], ListingState::Loading { .. }));
        assert_eq!(states[1].entries().len(), 3);
        assert_eq!(states[1].entries()[0].href, "notes/algebra/Lecture 1.pdf");
    }

    #[tokio::test]
    async fn test_same_subject_refilters_without_fetching() {
        let (source, view) = view(MemorySource::default().with("algebra", ALGEBRA));
        view.load_files("algebra", "notes").await;
        view.load_files("algebra", "extras").await;
        view.set_category("notes").await;
        view.set_search("lecture").await;

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        let state = last(view);
        let names: Vec<_> = state.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Lecture 1.pdf", "Lecture 2.pdf"]);
    }

    #[tokio::test]
    async fn test_new_subject_refetches_and_resets_search() {
        let (source, view) = view(
            MemorySource::default()
                .with("algebra", ALGEBRA)
                .with("geometry", r#"[{ "url": "Lecture 9.pdf" }]"#),
        );
        view.load_files("algebra", "notes").await;
        view.set_search("tutorial").await;
        view.load_files("geometry", "notes").await;

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(view.search_query().await, "");
        assert_eq!(view.subject().await.as_deref(), Some("geometry"));
        assert_eq!(last(view).entries().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_independent_of_category() {
        let (_, view) = view(MemorySource::default().with("algebra", ALGEBRA));
        view.load_files("algebra", "notes").await;
        let notes_stats = view.stats().await.unwrap();
        view.set_category("extras").await;
        let extras_stats = view.stats().await.unwrap();

        assert_eq!(notes_stats, extras_stats);
        assert_eq!(notes_stats.total_files, 4);
        assert_eq!(
            notes_stats.last_updated,
            chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
        );
    }

    #[tokio::test]
    async fn test_no_match_replaces_previous_rows() {
        let (_, view) = view(MemorySource::default().with("algebra", ALGEBRA));
        view.load_files("algebra", "notes").await;
        view.set_search("calculus").await;

        let state = last(view);
        assert!(state.entries().is_empty());
        assert_eq!(state.message(), Some(NO_FILES_MESSAGE));
    }

    #[tokio::test]
    async fn test_unknown_category_shows_nothing() {
        let (_, view) = view(MemorySource::default().with("algebra", ALGEBRA));
        view.load_files("algebra", "homework").await;
        assert_eq!(last(view).message(), Some(NO_FILES_MESSAGE));
    }

    #[tokio::test]
    async fn test_unavailable_subject() {
        let (_, view) = view(MemorySource::default());
        view.load_files("missing", "notes").await;
        assert!(matches!(last(view), ListingState::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_stale_fetch_is_discarded() {
        let (_, view) = view(
            MemorySource::default()
                .with("slow", r#"[{ "url": "old.pdf" }]"#)
                .with("fast", r#"[{ "url": "new.pdf" }]"#)
                .delayed("slow", Duration::from_millis(150)),
        );
        let view = Arc::new(view);

        let slow = {
            let view = view.clone();
            tokio::spawn(async move { view.load_files("slow", "notes").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        view.load_files("fast", "notes").await;
        slow.await.unwrap();

        assert_eq!(view.subject().await.as_deref(), Some("fast"));
        let names = view
            .with_surface(|surface| {
                surface
                    .states
                    .last()
                    .unwrap()
                    .entries()
                    .iter()
                    .map(|e| e.name.clone())
                    .collect::<Vec<_>>()
            })
            .await;
        assert_eq!(names, vec!["new.pdf"]);
    }

    #[tokio::test]
    async fn test_category_change_during_fetch_is_kept() {
        let (_, view) = view(
            MemorySource::default()
                .with("algebra", ALGEBRA)
                .delayed("algebra", Duration::from_millis(100)),
        );
        let view = Arc::new(view);

        let load = {
            let view = view.clone();
            tokio::spawn(async move { view.load_files("algebra", "notes").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        view.set_category("extras").await;
        load.await.unwrap();

        assert_eq!(view.active_category().await, "extras");
        let names = view
            .with_surface(|surface| {
                surface.states.last().unwrap().entries()[0].name.clone()
            })
            .await;
        assert_eq!(names, "past-papers.zip");
        assert_eq!(view.categories().await, vec!["notes", "extras"]);
    }

    #[tokio::test]
    async fn test_tab_categories_append_unknown() {
        let (_, view) = view(MemorySource::default().with(
            "art",
            r#"{ "extras": [{ "url": "a.zip" }], "sketches": [{ "url": "s.png" }] }"#,
        ));
        assert_eq!(view.tab_categories().await, KNOWN_CATEGORIES);

        view.load_files("art", "notes").await;
        assert_eq!(
            view.tab_categories().await,
            vec!["notes", "code", "videos", "extras", "sketches"]
        );
    }
}
