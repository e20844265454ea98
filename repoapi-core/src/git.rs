//! Opened repository handles
//!
//! A handle only knows how to read references from a bare repository
//! directory. Object storage is left to the storage engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, StoreError};

const HEADS_PREFIX: &str = "refs/heads/";

/// An opened repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Open the repository at `path`.
    ///
    /// The directory must exist and contain a `HEAD` file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::repo_not_found(path));
            }
            Err(e) => return Err(e.into()),
        };

        if !meta.is_dir() {
            return Err(StoreError::not_a_repository(path, "not a directory"));
        }
        if !path.join("HEAD").is_file() {
            return Err(StoreError::not_a_repository(path, "missing HEAD"));
        }

        tracing::debug!(path = %path.display(), "opened repository");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Branch `HEAD` points at, or `None` when detached
    pub fn head_branch(&self) -> Result<Option<String>> {
        let head = fs::read_to_string(self.path.join("HEAD"))?;
        Ok(head
            .trim()
            .strip_prefix("ref: ")
            .and_then(|r| r.strip_prefix(HEADS_PREFIX))
            .map(str::to_string))
    }

    /// All branch names, loose and packed, sorted and deduplicated
    pub fn branches(&self) -> Result<Vec<String>> {
        let mut names = self.loose_branches()?;
        names.extend(self.packed_branches()?);
        names.sort();
        names.dedup();
        Ok(names)
    }

    pub fn has_branches(&self) -> Result<bool> {
        Ok(!self.branches()?.is_empty())
    }

    fn loose_branches(&self) -> Result<Vec<String>> {
        let heads = self.path.join(HEADS_PREFIX);
        if !heads.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&heads).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&heads)
                .map_err(|_| StoreError::invalid_ref(entry.path().display().to_string(), &self.path))?;
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
        Ok(names)
    }

    fn packed_branches(&self) -> Result<Vec<String>> {
        let packed = self.path.join("packed-refs");
        let content = match fs::read_to_string(&packed) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for line in content.lines() {
            if line.starts_with('#') || line.starts_with('^') || line.trim().is_empty() {
                continue;
            }
            let (_, refname) = line
                .split_once(' ')
                .ok_or_else(|| StoreError::invalid_ref(line, &packed))?;
            if let Some(name) = refname.trim().strip_prefix(HEADS_PREFIX) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

/// Capability to open a repository at a path
pub trait RepoOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<GitRepo>;
}

/// Opens repositories straight from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRepoOpener;

impl RepoOpener for FsRepoOpener {
    fn open(&self, path: &Path) -> Result<GitRepo> {
        GitRepo::open(path)
    }
}

/// Create a bare repository layout with the given branches (test helper)
#[doc(hidden)]
pub fn init_bare(path: &Path, branches: &[&str]) -> Result<()> {
    fs::create_dir_all(path.join(HEADS_PREFIX))?;
    fs::create_dir_all(path.join("objects"))?;
    fs::write(path.join("HEAD"), "ref: refs/heads/main\n")?;
    for branch in branches {
        let file = path.join(HEADS_PREFIX).join(branch);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file, "0123456789abcdef0123456789abcdef01234567\n")?;
    }
    Ok(())
}
