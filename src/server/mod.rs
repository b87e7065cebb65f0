//! HTTP service exposing the reviewer over JSON.
//!
//! - `GET /` service name and version
//! - `GET /health` liveness probe
//! - `POST /review` run one [`ReviewRequest`] and return the [`CodeReview`]

pub mod error;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::constants::VERSION;
use crate::models::{CodeReview, ReviewRequest};
use crate::orchestrator::CoReviewer;

pub use error::ApiError;

/// Shared handler state.
pub type AppState = Arc<CoReviewer>;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/review", post(review))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn run_with_shutdown<F>(
    state: AppState,
    addr: SocketAddr,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Co-Reviewer API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Co-Reviewer API shutting down");
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Co-Reviewer API", "version": VERSION }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn review(
    State(reviewer): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<CodeReview>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(workspace = %request.workspace_path, "received review request");

    match reviewer.review(&request).await {
        Ok(review) => Ok(Json(review)),
        Err(e) => {
            tracing::error!("review request failed: {e}");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::diff::test_repo::TestRepo;
    use crate::providers::{ProviderError, ReviewProvider};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct StaticProvider;

    #[async_trait]
    impl ReviewProvider for StaticProvider {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
            Ok(r#"{"summary":"ok","files_reviewed":1,"total_changes":{"additions":1,"deletions":1},
                 "comments":[],"positive_feedback":[],"overall_assessment":"approved"}"#
                .to_string())
        }
    }

    fn app() -> Router {
        create_router(Arc::new(CoReviewer::new(
            Arc::new(StaticProvider),
            Config::default(),
        )))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(body: String) -> Request<Body> {
        Request::post("/review")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn root_reports_version() {
        let (status, body) = send(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Co-Reviewer API");
        assert_eq!(body["version"], VERSION);
    }

    #[tokio::test]
    async fn health_is_healthy() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn review_returns_result() {
        let repo = TestRepo::with_commit("a.txt", "Initial content").await;
        repo.run(&["checkout", "-b", "feature"]).await;
        repo.commit_file("a.txt", "Updated content", "update").await;

        let body = json!({ "workspace_path": repo.path().display().to_string() }).to_string();
        let (status, body) = send(post_json(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall_assessment"], "approved");
        assert_eq!(body["files_reviewed"], 1);
        assert_eq!(body["metadata"]["current_branch"], "feature");
    }

    #[tokio::test]
    async fn invalid_workspace_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let body = json!({ "workspace_path": dir.path().display().to_string() }).to_string();
        let (status, body) = send(post_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("not a valid git repository"));
    }

    #[tokio::test]
    async fn unknown_branch_is_400() {
        let repo = TestRepo::with_commit("a.txt", "x").await;
        let body = json!({
            "workspace_path": repo.path().display().to_string(),
            "base_branch": "missing"
        })
        .to_string();
        let (status, body) = send(post_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn malformed_body_is_client_error() {
        let (status, body) = send(post_json("{\"base_branch\": \"main\"}".to_string())).await;
        assert!(status.is_client_error());
        assert!(body["detail"].is_string());

        let (status, _) = send(post_json("not json".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
