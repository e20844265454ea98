//! Repository and owner records

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Maximum length for owner and repository names
const MAX_NAME_LEN: usize = 100;

/// Owner and repository names: ASCII alphanumerics, dots, hyphens, underscores
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("invalid name regex"));

/// Owner of repositories (a user or an organization)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A repository record as resolved from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub owner_name: String,
    pub name: String,
    /// No committed history yet
    pub is_bare: bool,
}

impl Repository {
    pub fn new(owner_name: impl Into<String>, name: impl Into<String>, is_bare: bool) -> Self {
        Self {
            owner_name: owner_name.into(),
            name: name.into(),
            is_bare,
        }
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner_name, self.name)
    }

    /// On-disk location under the given store root
    pub fn path(&self, root: &Path) -> PathBuf {
        repo_path(root, &self.owner_name, &self.name)
    }
}

/// Check that `name` names a single directory below the store root.
///
/// `field` is used in the error, e.g. "owner name".
pub fn validate_name(field: &'static str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::invalid_name(field, name, "cannot be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(StoreError::invalid_name(field, name, "too long"));
    }
    if name == "." || name == ".." {
        return Err(StoreError::invalid_name(field, name, "reserved path component"));
    }
    if !NAME_RE.is_match(name) {
        return Err(StoreError::invalid_name(
            field,
            name,
            "must be alphanumeric with dots, hyphens or underscores",
        ));
    }
    Ok(())
}

/// Directory holding every repository of an owner
pub fn user_path(root: &Path, owner_name: &str) -> PathBuf {
    root.join(owner_name.to_lowercase())
}

/// Path of a repository: `<root>/<owner>/<name>.git`, lowercased
pub fn repo_path(root: &Path, owner_name: &str, repo_name: &str) -> PathBuf {
    user_path(root, owner_name).join(format!("{}.git", repo_name.to_lowercase()))
}
