//! Web server for browsing subject files.
//!
//! Serves a local subjects root:
//! - an index of subject folders
//! - a listing page per subject with category tabs and search
//! - the files themselves under `/files`

mod handlers;
mod routes;
pub mod templates;

pub use routes::create_router;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;

use crate::config::Settings;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        if settings.is_remote() {
            bail!(
                "serving requires a local subjects root, got {}",
                settings.subjects_root
            );
        }

        let root = PathBuf::from(shellexpand::tilde(&settings.subjects_root).as_ref());
        if !root.is_dir() {
            bail!("subjects root {} is not a directory", root.display());
        }

        Ok(Self {
            root,
            settings: Arc::new(settings.clone()),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let root = state.root.clone();
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Serving {} at http://{}", root.display(), addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
