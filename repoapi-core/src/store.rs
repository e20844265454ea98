//! Repository record lookup
//!
//! Records are resolved from the directory layout under the store root:
//! `<root>/<owner>/<name>.git`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git::GitRepo;
use crate::models::{repo_path, user_path, validate_name, Repository, User};

/// Source of owner and repository records
pub trait RepoStore: Send + Sync {
    /// Look up an owner; `None` when unknown or not a valid name
    fn get_owner(&self, owner: &str) -> Result<Option<User>>;

    /// Look up a repository; `None` when unknown
    fn get_repository(&self, owner: &str, name: &str) -> Result<Option<Repository>>;

    /// All repositories of an owner, sorted by name
    fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>>;
}

/// Filesystem-backed store
#[derive(Debug, Clone)]
pub struct FsRepoStore {
    root: PathBuf,
}

impl FsRepoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record(&self, owner: &str, name: &str, path: &Path) -> Result<Repository> {
        // A directory we cannot open as a repository is reported as non-bare
        // so the binder surfaces the failure.
        let is_bare = match GitRepo::open(path) {
            Ok(repo) => !repo.has_branches()?,
            Err(_) => false,
        };
        Ok(Repository::new(owner, name, is_bare))
    }
}

impl RepoStore for FsRepoStore {
    fn get_owner(&self, owner: &str) -> Result<Option<User>> {
        if validate_name("owner name", owner).is_err() {
            return Ok(None);
        }
        if user_path(&self.root, owner).is_dir() {
            Ok(Some(User::new(owner)))
        } else {
            Ok(None)
        }
    }

    fn get_repository(&self, owner: &str, name: &str) -> Result<Option<Repository>> {
        if validate_name("owner name", owner).is_err()
            || validate_name("repository name", name).is_err()
        {
            return Ok(None);
        }
        let path = repo_path(&self.root, owner, name);
        if !path.is_dir() {
            return Ok(None);
        }
        self.record(owner, name, &path).map(Some)
    }

    fn list_repositories(&self, owner: &str) -> Result<Vec<Repository>> {
        if validate_name("owner name", owner).is_err() {
            return Ok(Vec::new());
        }
        let dir = user_path(&self.root, owner);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut repos = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().and_then(|n| n.strip_suffix(".git")) else {
                continue;
            };
            if validate_name("repository name", name).is_err() {
                continue;
            }
            repos.push(self.record(owner, name, &entry.path())?);
        }
        repos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(repos)
    }
}
