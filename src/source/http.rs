//! Subjects served over HTTP, e.g. the static site itself.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::http_client::HttpClient;
use super::{ManifestSource, MANIFEST_FILE};
use crate::error::LoadError;
use crate::manifest::{fallback, parse_manifest, Manifest};
use crate::models::FileRecord;

/// Fetches `<root>/<subject>/files.json`, falling back to `<root>/<subject>/`.
#[derive(Clone)]
pub struct HttpSource {
    root: Url,
    client: HttpClient,
}

impl HttpSource {
    /// Create a source for a subjects root such as `https://example.org/notes/`.
    pub fn new(root: &str, client: HttpClient) -> Result<Self, LoadError> {
        let mut root = Url::parse(root).map_err(|e| LoadError::InvalidRoot(format!("{root}: {e}")))?;
        if root.cannot_be_a_base() {
            return Err(LoadError::InvalidRoot(root.to_string()));
        }
        // Url::join replaces the last segment unless the path ends with '/'
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        Ok(Self { root, client })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Folder URL of a subject, always ending in '/'.
    pub fn subject_url(&self, subject_id: &str) -> Result<Url, LoadError> {
        let segment = format!("{}/", urlencoding::encode(subject_id));
        self.root
            .join(&segment)
            .map_err(|e| LoadError::InvalidRoot(e.to_string()))
    }
}

#[async_trait]
impl ManifestSource for HttpSource {
    async fn fetch_manifest(&self, subject_id: &str) -> Result<Manifest, LoadError> {
        let url = self
            .subject_url(subject_id)?
            .join(MANIFEST_FILE)
            .map_err(|e| LoadError::InvalidRoot(e.to_string()))?;

        let response = self.client.get(url.as_str()).await?;
        if !response.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: response.status.as_u16(),
            });
        }
        if let Some(content_type) = response.content_type() {
            debug!("Manifest content type: {}", content_type);
        }

        let body = response.text().await?;
        parse_manifest(&body)
    }

    async fn fetch_listing(&self, subject_id: &str) -> Result<Vec<FileRecord>, LoadError> {
        let url = self.subject_url(subject_id)?;
        let html = self.client.get_text(url.as_str()).await?;
        Ok(fallback::extract_links(&html))
    }

    fn resource_url(&self, subject_id: &str, url: &str) -> String {
        match self.subject_url(subject_id).and_then(|base| {
            base.join(url)
                .map_err(|e| LoadError::InvalidRoot(e.to_string()))
        }) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => format!("{}{}/{}", self.root, subject_id, url),
        }
    }
}
