//! Request-scoped context
//!
//! [`Context`] is the base request state built by the routing layer.
//! [`ApiContext`] wraps it for API routes and adds organization scope.
//! Both live in the request extensions and are dropped with the request.
//!
//! Slots that are filled after construction (resolved repository, opened
//! handle, organization) are `OnceLock`s: one writer, read-only afterwards.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::{StatusCode, Uri};
use repoapi_core::{GitRepo, Repository, Settings, User};

/// Resolved repository plus its lazily opened handle
#[derive(Debug)]
pub struct RepoContext {
    pub owner: User,
    pub repository: Repository,
    git_repo: OnceLock<GitRepo>,
}

impl RepoContext {
    pub fn new(owner: User, repository: Repository) -> Self {
        Self {
            owner,
            repository,
            git_repo: OnceLock::new(),
        }
    }

    /// Opened handle, if bound
    pub fn git_repo(&self) -> Option<&GitRepo> {
        self.git_repo.get()
    }

    /// Bind the handle. Returns it back if one is already bound.
    pub fn attach_git_repo(&self, repo: GitRepo) -> Result<(), GitRepo> {
        self.git_repo.set(repo)
    }
}

/// Base request context
#[derive(Debug)]
pub struct Context {
    settings: Arc<Settings>,
    path: String,
    query: HashMap<String, String>,
    repo: OnceLock<RepoContext>,
}

impl Context {
    pub fn new(settings: Arc<Settings>, uri: &Uri) -> Self {
        let query = Query::<HashMap<String, String>>::try_from_uri(uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        Self {
            settings,
            path: uri.path().to_string(),
            query,
            repo: OnceLock::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Request path, with its leading slash
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Integer query value; 0 when missing or not a number
    pub fn query_int(&self, key: &str) -> i64 {
        self.query(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn repo(&self) -> Option<&RepoContext> {
        self.repo.get()
    }

    /// Assign the resolved repository. Returns it back if already assigned.
    pub fn set_repo(&self, repo: RepoContext) -> Result<(), RepoContext> {
        self.repo.set(repo)
    }
}

/// Organization scope of an API request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOrganization {
    pub organization: User,
}

/// API request context: the base context plus organization scope.
///
/// Cloning is cheap and every clone refers to the same request state.
#[derive(Debug, Clone)]
pub struct ApiContext {
    base: Arc<Context>,
    org: Arc<OnceLock<ApiOrganization>>,
}

impl ApiContext {
    pub fn new(base: Arc<Context>) -> Self {
        Self {
            base,
            org: Arc::new(OnceLock::new()),
        }
    }

    pub fn base(&self) -> &Context {
        &self.base
    }

    pub fn settings(&self) -> &Settings {
        self.base.settings()
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn query_int(&self, key: &str) -> i64 {
        self.base.query_int(key)
    }

    pub fn repo(&self) -> Option<&RepoContext> {
        self.base.repo()
    }

    pub fn org(&self) -> Option<&ApiOrganization> {
        self.org.get()
    }

    /// Assign the organization. Returns it back if already assigned.
    pub fn set_org(&self, org: ApiOrganization) -> Result<(), ApiOrganization> {
        self.org.set(org)
    }
}

impl<S> FromRequestParts<S> for ApiContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ApiContext>().cloned().ok_or_else(|| {
            tracing::error!(path = %parts.uri.path(), "API context missing from request");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}
