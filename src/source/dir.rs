//! Subjects stored as folders on the local filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ManifestSource, MANIFEST_FILE};
use crate::error::LoadError;
use crate::manifest::{fallback, parse_manifest, Manifest};
use crate::models::FileRecord;

/// Reads `<root>/<subject>/files.json`, falling back to scanning `<root>/<subject>/`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    link_prefix: Option<String>,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            link_prefix: None,
        }
    }

    /// Render links as `<prefix>/<subject>/<url>` instead of filesystem paths.
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = Some(prefix.into().trim_end_matches('/').to_string());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subject_dir(&self, subject_id: &str) -> PathBuf {
        self.root.join(subject_id)
    }
}

#[async_trait]
impl ManifestSource for DirSource {
    async fn fetch_manifest(&self, subject_id: &str) -> Result<Manifest, LoadError> {
        let path = self.subject_dir(subject_id).join(MANIFEST_FILE);
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io { path, source })?;
        parse_manifest(&body)
    }

    async fn fetch_listing(&self, subject_id: &str) -> Result<Vec<FileRecord>, LoadError> {
        let dir = self.subject_dir(subject_id);
        tokio::task::spawn_blocking(move || {
            fallback::scan_directory(&dir).map_err(|source| LoadError::Io { path: dir, source })
        })
        .await
        .map_err(|e| LoadError::Io {
            path: self.subject_dir(subject_id),
            source: std::io::Error::other(e),
        })?
    }

    fn resource_url(&self, subject_id: &str, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match &self.link_prefix {
            Some(prefix) => format!(
                "{}/{}/{}",
                prefix,
                urlencoding::encode(subject_id),
                url.split('/')
                    .map(|segment| urlencoding::encode(segment).into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            ),
            None => self.subject_dir(subject_id).join(url).display().to_string(),
        }
    }
}
