//! Where subject manifests come from.
//!
//! A [`ManifestSource`] knows how to fetch a subject's structured manifest,
//! how to fall back to discovering files without one, and how to turn a
//! record's relative URL into a link. [`load_manifest`] runs the
//! manifest-then-fallback sequence and never fails.

mod dir;
mod http;
pub mod http_client;

pub use dir::DirSource;
pub use http::HttpSource;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::manifest::Manifest;
use crate::models::FileRecord;

/// Name of the structured manifest inside a subject folder.
pub const MANIFEST_FILE: &str = "files.json";

#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch and parse the subject's `files.json`.
    async fn fetch_manifest(&self, subject_id: &str) -> Result<Manifest, LoadError>;

    /// Discover the subject's files without a manifest.
    async fn fetch_listing(&self, subject_id: &str) -> Result<Vec<FileRecord>, LoadError>;

    /// Link target for a record URL of a subject.
    fn resource_url(&self, subject_id: &str, url: &str) -> String;
}

/// How a manifest was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestOrigin {
    /// Parsed from `files.json`.
    Structured,
    /// Discovered from a directory listing.
    DirectoryListing,
    /// Neither worked; the manifest is empty.
    Unavailable,
}

/// A manifest together with how it was obtained.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub origin: ManifestOrigin,
}

impl LoadedManifest {
    pub fn unavailable() -> Self {
        Self {
            manifest: Manifest::default(),
            origin: ManifestOrigin::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        self.origin != ManifestOrigin::Unavailable
    }
}

/// Load a subject's manifest, falling back to directory discovery.
///
/// Failures are logged and degrade to an empty, unavailable manifest.
pub async fn load_manifest(source: &dyn ManifestSource, subject_id: &str) -> LoadedManifest {
    match source.fetch_manifest(subject_id).await {
        Ok(manifest) => {
            info!(
                "Loaded manifest for '{}' ({} files)",
                subject_id,
                manifest.len()
            );
            return LoadedManifest {
                manifest,
                origin: ManifestOrigin::Structured,
            };
        }
        Err(e) if e.is_not_found() => {
            info!("No manifest for '{}', trying directory listing", subject_id);
        }
        Err(e) => {
            warn!(
                "Could not load manifest for '{}', trying directory listing: {}",
                subject_id, e
            );
        }
    }

    match source.fetch_listing(subject_id).await {
        Ok(records) => {
            info!(
                "Found {} files in directory listing for '{}'",
                records.len(),
                subject_id
            );
            LoadedManifest {
                manifest: Manifest::from_records(records),
                origin: ManifestOrigin::DirectoryListing,
            }
        }
        Err(e) => {
            warn!("Directory listing failed for '{}': {}", subject_id, e);
            LoadedManifest::unavailable()
        }
    }
}

/// Whether a subject id is safe to use as a single path segment.
pub fn is_valid_subject_id(subject_id: &str) -> bool {
    !subject_id.is_empty()
        && subject_id != "."
        && subject_id != ".."
        && subject_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Pick a source for a subjects root: HTTP(S) URLs are fetched, anything else is a local path.
pub fn source_for_root(
    root: &str,
    timeout: Duration,
    user_agent: Option<&str>,
) -> Result<Arc<dyn ManifestSource>, LoadError> {
    if root.starts_with("http://") || root.starts_with("https://") {
        let client = http_client::HttpClient::with_user_agent(timeout, user_agent)?;
        Ok(Arc::new(HttpSource::new(root, client)?))
    } else {
        let expanded = shellexpand::tilde(root);
        Ok(Arc::new(DirSource::new(PathBuf::from(expanded.as_ref()))))
    }
}
