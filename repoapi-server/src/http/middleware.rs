//! Request-entry middleware for API routes
//!
//! Runs in this order for every API request:
//! 1. [`contexter`] builds the base [`Context`]
//! 2. [`api_contexter`] wraps it in an [`ApiContext`]
//! 3. [`repo_assignment`] / [`org_assignment`] resolve path records
//! 4. [`references_git_repo`] binds the repository handle
//!
//! A middleware that fails answers with the formatted error and never calls
//! the next layer.

use std::sync::Arc;

use axum::extract::{OriginalUri, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use repoapi_core::{repo_path, validate_name, RepoOpener};

use super::error::{ApiError, ErrorPayload};
use super::server::AppState;
use crate::context::{ApiContext, ApiOrganization, Context, RepoContext};

/// Build the base request context and register it on the request
pub async fn contexter(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    // Nested routers see a stripped URI; links need the full path.
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.clone())
        .unwrap_or_else(|| req.uri().clone());

    let ctx = Context::new(state.settings_arc(), &uri);
    req.extensions_mut().insert(Arc::new(ctx));
    next.run(req).await
}

/// Compose the API context around the base context
pub async fn api_contexter(mut req: Request, next: Next) -> Response {
    let Some(base) = req.extensions().get::<Arc<Context>>().cloned() else {
        tracing::error!(path = %req.uri().path(), "base context missing; contexter must run first");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    req.extensions_mut().insert(ApiContext::new(base));
    next.run(req).await
}

/// Resolve `{owner}/{repo}` into the request's repository record
pub async fn repo_assignment(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path((owner_name, repo_name)): Path<(String, String)>,
    req: Request,
    next: Next,
) -> Response {
    if let Err(err) = assign_repo(&state, &ctx, &owner_name, &repo_name) {
        return err.into_response();
    }
    next.run(req).await
}

fn assign_repo(
    state: &AppState,
    ctx: &ApiContext,
    owner_name: &str,
    repo_name: &str,
) -> Result<(), ApiError> {
    validate_name("owner name", owner_name)
        .map_err(|e| ctx.error(StatusCode::NOT_FOUND, "GetUserByName", e))?;
    validate_name("repository name", repo_name)
        .map_err(|e| ctx.error(StatusCode::NOT_FOUND, "GetRepositoryByName", e))?;

    let owner = state
        .store()
        .get_owner(owner_name)
        .map_err(|e| ctx.error(StatusCode::INTERNAL_SERVER_ERROR, "GetUserByName", e))?
        .ok_or_else(|| ctx.error(StatusCode::NOT_FOUND, "GetUserByName", "owner does not exist"))?;

    let repository = state
        .store()
        .get_repository(owner_name, repo_name)
        .map_err(|e| ctx.error(StatusCode::INTERNAL_SERVER_ERROR, "GetRepositoryByName", e))?
        .ok_or_else(|| {
            ctx.error(
                StatusCode::NOT_FOUND,
                "GetRepositoryByName",
                "repository does not exist",
            )
        })?;

    if ctx.base().set_repo(RepoContext::new(owner, repository)).is_err() {
        tracing::debug!(path = %ctx.path(), "repository already assigned");
    }
    Ok(())
}

/// Resolve `{org}` into the request's organization scope
pub async fn org_assignment(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(org_name): Path<String>,
    req: Request,
    next: Next,
) -> Response {
    if let Err(e) = validate_name("organization name", &org_name) {
        return ctx
            .error(StatusCode::NOT_FOUND, "GetOrgByName", e)
            .into_response();
    }

    let org = match state.store().get_owner(&org_name) {
        Ok(Some(org)) => org,
        Ok(None) => {
            return ctx
                .error(StatusCode::NOT_FOUND, "GetOrgByName", "organization does not exist")
                .into_response();
        }
        Err(e) => {
            return ctx
                .error(StatusCode::INTERNAL_SERVER_ERROR, "GetOrgByName", e)
                .into_response();
        }
    };

    if ctx.set_org(ApiOrganization { organization: org }).is_err() {
        tracing::debug!(path = %ctx.path(), "organization already assigned");
    }
    next.run(req).await
}

/// Bind the repository handle before any downstream handler runs
pub async fn references_git_repo(
    State(state): State<AppState>,
    ctx: ApiContext,
    req: Request,
    next: Next,
) -> Response {
    if let Err(err) = bind_git_repo(&ctx, state.opener()) {
        return err.into_response();
    }
    next.run(req).await
}

/// Attach an opened handle to the request's repository.
///
/// Bare repositories have no references and are left unbound. An already
/// bound handle is kept as is.
pub fn bind_git_repo(ctx: &ApiContext, opener: &dyn RepoOpener) -> Result<(), ApiError> {
    let Some(repo) = ctx.repo() else {
        return Err(ctx.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "RepoRef",
            "repository not assigned to request",
        ));
    };

    if repo.repository.is_bare || repo.git_repo().is_some() {
        return Ok(());
    }

    let path = repo_path(
        &ctx.settings().repo_root,
        &repo.owner.name,
        &repo.repository.name,
    );
    match opener.open(&path) {
        Ok(git_repo) => {
            if repo.attach_git_repo(git_repo).is_err() {
                tracing::debug!(path = %ctx.path(), "repository handle already bound");
            }
            Ok(())
        }
        Err(e) => Err(ctx.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("RepoRef Invalid repo {}", path.display()),
            ErrorPayload::from_error(&e),
        )),
    }
}
