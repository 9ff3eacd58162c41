//! EduHub subject file listings.
//!
//! Loads a subject's `files.json` manifest (or scrapes its directory listing
//! when there is none), normalizes the records, filters them by category and
//! search text, and renders the result to an injected [`render::Surface`].

pub mod config;
pub mod error;
pub mod generate;
pub mod loader;
pub mod manifest;
pub mod models;
pub mod render;
pub mod server;
pub mod source;

pub use error::{GenerateError, LoadError};
pub use loader::SubjectView;
pub use manifest::Manifest;
pub use models::FileRecord;
