//! End-to-end tests against the full API router

use axum::body::{to_bytes, Body};
use axum::http::header::LINK;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use repoapi_core::git::init_bare;
use repoapi_core::Settings;
use repoapi_server::http::build_router;
use repoapi_server::AppState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const APP_URL: &str = "https://git.example.com/";
const DOC_URL: &str = "https://docs.example.com/api";

fn setup() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("root");
    // Lives next to the root and must stay unreachable
    init_bare(&dir.path().join("secret.git"), &["main"]).unwrap();

    for i in 0..25 {
        init_bare(&root.join(format!("acme/repo-{:02}.git", i)), &["main"]).unwrap();
    }
    init_bare(
        &root.join("widgets/gears.git"),
        &["main", "develop", "feature/teeth"],
    )
    .unwrap();
    init_bare(&root.join("widgets/blank.git"), &[]).unwrap();
    std::fs::create_dir_all(root.join("widgets/broken.git")).unwrap();

    let mut settings = Settings::with_repo_root(&root);
    settings.app_url = APP_URL.to_string();
    settings.doc_url = DOC_URL.to_string();

    let app = build_router(AppState::from_settings(settings));
    (dir, app)
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn link(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LINK)
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn org_repos_first_page() {
    let (_dir, app) = setup();

    let response = get(&app, "/api/v1/orgs/acme/repos").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        link(&response).unwrap(),
        "<https://git.example.com/api/v1/orgs/acme/repos?page=2>; rel=\"next\",\
         <https://git.example.com/api/v1/orgs/acme/repos?page=3>; rel=\"last\""
    );

    let body = json(response).await;
    let repos = body.as_array().unwrap();
    assert_eq!(repos.len(), 10);
    assert_eq!(repos[0]["full_name"], "acme/repo-00");
    assert_eq!(repos[0]["html_url"], "https://git.example.com/acme/repo-00");
}

#[tokio::test]
async fn org_repos_last_page() {
    let (_dir, app) = setup();

    let response = get(&app, "/api/v1/orgs/acme/repos?page=3").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        link(&response).unwrap(),
        "<https://git.example.com/api/v1/orgs/acme/repos?page=1>; rel=\"first\",\
         <https://git.example.com/api/v1/orgs/acme/repos?page=2>; rel=\"prev\""
    );
    assert_eq!(json(response).await.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn org_repos_single_page_has_no_link() {
    let (_dir, app) = setup();

    let response = get(&app, "/api/v1/orgs/widgets/repos").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(link(&response).is_none());
    assert_eq!(json(response).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_org_is_404_with_error_body() {
    let (_dir, app) = setup();

    let response = get(&app, "/api/v1/orgs/ghosts/repos").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json(response).await,
        serde_json::json!({"message": "organization does not exist", "url": DOC_URL})
    );
}

#[tokio::test]
async fn branches_use_bound_handle() {
    let (_dir, app) = setup();

    let response = get(&app, "/api/v1/repos/widgets/gears/branches?limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(link(&response).unwrap().contains("branches?page=2>; rel=\"next\""));

    let body = json(response).await;
    assert_eq!(
        body,
        serde_json::json!([
            {"name": "develop", "is_default": false},
            {"name": "feature/teeth", "is_default": false},
        ])
    );
}

#[tokio::test]
async fn bare_repository_lists_no_branches() {
    let (_dir, app) = setup();

    let response = get(&app, "/api/v1/repos/widgets/blank/branches").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(link(&response).is_none());
    assert_eq!(json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn unopenable_repository_is_500() {
    let (_dir, app) = setup();

    let response = get(&app, "/api/v1/repos/widgets/broken/branches").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json(response).await;
    assert!(body["message"].as_str().unwrap().contains("broken.git"));
    assert_eq!(body["url"], DOC_URL);
}

#[tokio::test]
async fn repository_record_does_not_need_a_handle() {
    let (_dir, app) = setup();

    // The record route skips the binder, so even a broken repository resolves.
    let response = get(&app, "/api/v1/repos/widgets/broken").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["empty"], false);

    let response = get(&app, "/api/v1/repos/widgets/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json(response).await,
        serde_json::json!({"message": "repository does not exist", "url": DOC_URL})
    );
}

#[tokio::test]
async fn dot_segments_never_leave_the_repository_root() {
    let (_dir, app) = setup();

    for uri in [
        "/api/v1/orgs/%2E%2E/repos",
        "/api/v1/repos/%2E%2E/secret",
        "/api/v1/repos/%2E%2E/secret/branches",
        "/api/v1/repos/widgets/%2E%2E%2F%2E%2E%2Fsecret",
        "/api/v1/repos/widgets/%2E%2E%2F%2E%2E%2Fsecret/branches",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);

        let body = json(response).await;
        assert!(body["message"].as_str().unwrap().starts_with("invalid "), "{}", uri);
        assert_eq!(body["url"], DOC_URL);
    }
}
