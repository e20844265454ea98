//! Application settings
//!
//! Loaded from `~/.repoapi/config.toml` when present, then overridden by
//! environment variables:
//! - `REPOAPI_APP_URL`: public base URL used in pagination links
//! - `REPOAPI_DOC_URL`: documentation URL embedded in error bodies
//! - `REPOAPI_REPO_ROOT`: directory holding `<owner>/<name>.git` repositories

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

const DEFAULT_APP_URL: &str = "http://localhost:3000/";
const DEFAULT_DOC_URL: &str = "https://godoc.org/github.com/go-gitea/go-sdk/gitea";

/// Settings shared read-only by every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Public base URL, always ending in `/`
    pub app_url: String,
    /// Documentation link returned with every API error
    pub doc_url: String,
    /// Root directory of the repository store
    pub repo_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_url: DEFAULT_APP_URL.to_string(),
            doc_url: DEFAULT_DOC_URL.to_string(),
            repo_root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("repoapi-repositories"),
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one, the default config file is
    /// used if present, otherwise built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(StoreError::config(format!(
                        "config not found at {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(path = %default_path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        settings.apply_overrides(|key| env::var(key).ok());
        settings.normalize();
        Ok(settings)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut settings: Self = toml::from_str(content)
            .map_err(|e| StoreError::config(format!("invalid TOML: {}", e)))?;
        settings.normalize();
        Ok(settings)
    }

    /// Default config file path: ~/.repoapi/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".repoapi/config.toml")
    }

    /// Settings rooted at an explicit repository directory (for tests)
    pub fn with_repo_root(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            ..Self::default()
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Apply `REPOAPI_*` overrides from the given variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REPOAPI_APP_URL") {
            self.app_url = url;
        }
        if let Some(url) = lookup("REPOAPI_DOC_URL") {
            self.doc_url = url;
        }
        if let Some(root) = lookup("REPOAPI_REPO_ROOT") {
            self.repo_root = PathBuf::from(root);
        }
    }

    fn normalize(&mut self) {
        if !self.app_url.ends_with('/') {
            self.app_url.push('/');
        }
    }
}
