//! Organization endpoints

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::{routing::get, Json, Router};

use super::page_size;
use super::repos::RepositoryResponse;
use crate::context::ApiContext;
use crate::http::error::ApiError;
use crate::http::middleware::org_assignment;
use crate::http::server::AppState;

/// GET /api/v1/orgs/{org}/repos - paged repositories of an organization
async fn list_org_repos(
    State(state): State<AppState>,
    ctx: ApiContext,
) -> Result<(HeaderMap, Json<Vec<RepositoryResponse>>), ApiError> {
    let org = ctx.org().ok_or_else(|| {
        ctx.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ListOrgRepos",
            "organization not assigned to request",
        )
    })?;

    let repos = state
        .store()
        .list_repositories(&org.organization.name)
        .map_err(|e| ctx.error(StatusCode::INTERNAL_SERVER_ERROR, "GetRepositories", e))?;

    let total = repos.len() as i64;
    let limit = page_size(ctx.query_int("limit"));
    let app_url = &ctx.settings().app_url;

    let items = ctx
        .paginater(total, limit)
        .page_of(repos)
        .iter()
        .map(|repo| RepositoryResponse::new(repo, app_url))
        .collect();

    let mut headers = HeaderMap::new();
    ctx.set_link_header(&mut headers, total, limit);
    Ok((headers, Json(items)))
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/orgs/{org}/repos", get(list_org_repos))
        .route_layer(from_fn_with_state(state, org_assignment))
}
