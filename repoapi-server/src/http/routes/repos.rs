//! Repository endpoints
//!
//! - `GET /api/v1/repos/{owner}/{repo}` - repository record
//! - `GET /api/v1/repos/{owner}/{repo}/branches` - paged branch list

use axum::http::{HeaderMap, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::{routing::get, Json, Router};
use repoapi_core::Repository;
use serde::{Deserialize, Serialize};

use super::page_size;
use crate::context::ApiContext;
use crate::http::error::{ApiError, ErrorPayload};
use crate::http::middleware::{references_git_repo, repo_assignment};
use crate::http::server::AppState;

/// Repository response
#[derive(Debug, Serialize, Deserialize)]
pub struct RepositoryResponse {
    pub owner: String,
    pub name: String,
    pub full_name: String,
    /// No committed history yet
    pub empty: bool,
    pub html_url: String,
}

impl RepositoryResponse {
    pub fn new(repo: &Repository, app_url: &str) -> Self {
        let full_name = repo.full_name();
        Self {
            owner: repo.owner_name.clone(),
            name: repo.name.clone(),
            html_url: format!("{}{}", app_url, full_name),
            full_name,
            empty: repo.is_bare,
        }
    }
}

/// Branch response
#[derive(Debug, Serialize, Deserialize)]
pub struct BranchResponse {
    pub name: String,
    pub is_default: bool,
}

/// GET /api/v1/repos/{owner}/{repo}
async fn get_repo(ctx: ApiContext) -> Result<Json<RepositoryResponse>, ApiError> {
    let repo = ctx.repo().ok_or_else(|| {
        ctx.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "GetRepository",
            "repository not assigned to request",
        )
    })?;

    Ok(Json(RepositoryResponse::new(
        &repo.repository,
        &ctx.settings().app_url,
    )))
}

/// GET /api/v1/repos/{owner}/{repo}/branches
async fn list_branches(
    ctx: ApiContext,
) -> Result<(HeaderMap, Json<Vec<BranchResponse>>), ApiError> {
    let repo = ctx.repo().ok_or_else(|| {
        ctx.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ListBranches",
            "repository not assigned to request",
        )
    })?;

    if repo.repository.is_bare {
        return Ok((HeaderMap::new(), Json(Vec::new())));
    }

    let git_repo = repo.git_repo().ok_or_else(|| {
        ctx.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ListBranches",
            "repository handle not bound",
        )
    })?;

    let branches = git_repo.branches().map_err(|e| {
        ctx.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ListBranches",
            ErrorPayload::from_error(&e),
        )
    })?;
    let head = git_repo.head_branch().map_err(|e| {
        ctx.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "HeadBranch",
            ErrorPayload::from_error(&e),
        )
    })?;

    let total = branches.len() as i64;
    let limit = page_size(ctx.query_int("limit"));
    let page = ctx.paginater(total, limit);

    let items = page
        .page_of(branches)
        .into_iter()
        .map(|name| BranchResponse {
            is_default: head.as_deref() == Some(name.as_str()),
            name,
        })
        .collect();

    let mut headers = HeaderMap::new();
    ctx.set_link_header(&mut headers, total, limit);
    Ok((headers, Json(items)))
}

/// Repository routes. Every route resolves `{owner}/{repo}` first; the
/// branch listing also binds the repository handle.
pub fn router(state: AppState) -> Router<AppState> {
    let bound = Router::new()
        .route("/api/v1/repos/{owner}/{repo}/branches", get(list_branches))
        .route_layer(from_fn_with_state(state.clone(), references_git_repo));

    Router::new()
        .route("/api/v1/repos/{owner}/{repo}", get(get_repo))
        .merge(bound)
        .route_layer(from_fn_with_state(state, repo_assignment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_response_links_to_app_url() {
        let repo = Repository::new("acme", "widgets", true);
        let resp = RepositoryResponse::new(&repo, "https://git.example.com/");

        assert_eq!(resp.full_name, "acme/widgets");
        assert_eq!(resp.html_url, "https://git.example.com/acme/widgets");
        assert!(resp.empty);
    }
}
