//! Configuration management for EduHub using the prefer crate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_CATEGORY;

/// Environment variable overriding the subjects root.
pub const ROOT_ENV: &str = "EDUHUB_ROOT";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where subject folders live: an http(s) URL or a local path.
    pub subjects_root: String,
    /// User agent for HTTP requests (None = default).
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Category shown when a subject is opened.
    pub default_category: String,
    /// Address the web server binds to.
    pub server_host: String,
    pub server_port: u16,
    /// Render pages in the dark theme by default.
    pub dark_theme: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            subjects_root: "./notes".to_string(),
            user_agent: None,
            request_timeout: 30,
            default_category: DEFAULT_CATEGORY.to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            dark_theme: false,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.max(1))
    }

    /// Whether the subjects root is fetched over HTTP.
    pub fn is_remote(&self) -> bool {
        self.subjects_root.starts_with("http://") || self.subjects_root.starts_with("https://")
    }

    /// Apply environment overrides (`EDUHUB_ROOT`).
    pub fn apply_env(&mut self) {
        if let Ok(root) = std::env::var(ROOT_ENV) {
            if !root.trim().is_empty() {
                self.subjects_root = root;
            }
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Subjects root URL or path.
    #[serde(default)]
    pub subjects_root: Option<String>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// Category shown first.
    #[serde(default)]
    pub default_category: Option<String>,
    #[serde(default)]
    pub server_host: Option<String>,
    #[serde(default)]
    pub server_port: Option<u16>,
    #[serde(default)]
    pub dark_theme: Option<bool>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers eduhub config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("eduhub").await {
            Ok(pref_config) => {
                let subjects_root: Option<String> = pref_config.get("subjects_root").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let default_category: Option<String> =
                    pref_config.get("default_category").ok();
                let server_host: Option<String> = pref_config.get("server_host").ok();
                let server_port: Option<u16> = pref_config.get("server_port").ok();
                let dark_theme: Option<bool> = pref_config.get("dark_theme").ok();

                Config {
                    subjects_root,
                    user_agent,
                    request_timeout,
                    default_category,
                    server_host,
                    server_port,
                    dark_theme,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref root) = self.subjects_root {
            settings.subjects_root = root.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref category) = self.default_category {
            if !category.trim().is_empty() {
                settings.default_category = category.trim().to_string();
            }
        }
        if let Some(ref host) = self.server_host {
            settings.server_host = host.clone();
        }
        if let Some(port) = self.server_port {
            settings.server_port = port;
        }
        if let Some(dark) = self.dark_theme {
            settings.dark_theme = dark;
        }
    }
}

/// Load settings from configuration files and the environment.
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings.apply_env();
    settings
}
