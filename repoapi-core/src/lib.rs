//! repoapi-core: repository records, settings, and repository handles
//!
//! Everything here is synchronous and free of HTTP concerns; the server
//! crate layers request-scoped context on top of it.

pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod store;

pub use config::Settings;
pub use error::{Result, StoreError};
pub use git::{FsRepoOpener, GitRepo, RepoOpener};
pub use models::{repo_path, user_path, validate_name, Repository, User};
pub use store::{FsRepoStore, RepoStore};
