use crate::config::ServeConfig;
use crate::constants::FILES_API_ROUTE;
use crate::listing::{self, DirectoryEntry, ListingError};
use crate::{error, info, status};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

#[derive(Clone)]
struct FilesApiState {
    root: Arc<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct FilesQuery {
    path: Option<String>,
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingPath => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Io(e) => {
                error!("directory listing failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// build the file explorer router; `root` must be canonical
///
/// `GET /api/files?path=...` lists one directory under `root` as JSON, and
/// every other path is served as a static file from `root`
pub fn router(root: PathBuf) -> Router {
    let static_files = ServeDir::new(&root);
    let state = FilesApiState {
        root: Arc::new(root),
    };

    Router::new()
        .route(FILES_API_ROUTE, get(list_files))
        .with_state(state)
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
}

async fn list_files(
    State(state): State<FilesApiState>,
    Query(query): Query<FilesQuery>,
) -> Result<Json<Vec<DirectoryEntry>>, ListingError> {
    let root = Arc::clone(&state.root);
    let entries = tokio::task::spawn_blocking(move || listing::list(&root, query.path.as_deref()))
        .await
        .map_err(|e| ListingError::Io(std::io::Error::other(e)))??;
    Ok(Json(entries))
}

/// serve until `shutdown` resolves
pub async fn serve(
    config: ServeConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let root = config
        .root
        .canonicalize()
        .with_context(|| format!("invalid root directory: {}", config.root.display()))?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;

    let port = listener.local_addr().map_or(config.port, |addr| addr.port());

    status!("file server started");
    info!("  serving:   {}", root.display());
    info!("  address:   http://localhost:{}", port);
    info!("  files api: http://localhost:{}{}?path=.", port, FILES_API_ROUTE);

    axum::serve(listener, router(root))
        .with_graceful_shutdown(shutdown)
        .await
        .context("file server exited unexpectedly")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_root() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("docs/guide.md"), "# guide").unwrap();
        fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(root.join("app.js"), "console.log(1)").unwrap();
        (dir, root)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn lists_root_directory() {
        let (_dir, root) = test_root();
        let app = router(root.clone());

        let response = app.oneshot(get_request("/api/files?path=.")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let entries = body.as_array().unwrap();
        let names: Vec<&str> = entries
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["docs", "app.js", "index.html"]);
        assert_eq!(entries[0]["isDirectory"], true);
        assert_eq!(entries[0]["type"], "folder");
        assert_eq!(entries[1]["type"], "js");
        assert_eq!(entries[2]["icon"], "🌐");
        assert_eq!(entries[2]["path"], root.join("index.html").to_str().unwrap());
    }

    #[tokio::test]
    async fn lists_nested_directory_by_absolute_path() {
        let (_dir, root) = test_root();
        let docs = root.join("docs");
        let uri = format!("/api/files?path={}", docs.to_string_lossy());

        let response = router(root).oneshot(get_request(&uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["name"], "guide.md");
        assert_eq!(body[0]["type"], "markdown");
    }

    #[tokio::test]
    async fn missing_path_is_bad_request() {
        let (_dir, root) = test_root();

        let response = router(root).oneshot(get_request("/api/files")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "missing path parameter");
    }

    #[tokio::test]
    async fn traversal_is_forbidden() {
        let (_dir, root) = test_root();

        let response = router(root)
            .oneshot(get_request("/api/files?path=../../etc"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn nonexistent_path_is_not_found() {
        let (_dir, root) = test_root();

        let response = router(root.clone())
            .oneshot(get_request("/api/files?path=missing"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body.as_array().is_none());
        assert_eq!(body["error"], "path does not exist");

        // a file can't have children
        let response = router(root)
            .oneshot(get_request("/api/files?path=index.html/child"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_a_file_is_server_error_with_message() {
        let (_dir, root) = test_root();

        let response = router(root)
            .oneshot(get_request("/api/files?path=index.html"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("failed to read directory: ")
        );
    }

    #[tokio::test]
    async fn serves_static_files_from_root() {
        let (_dir, root) = test_root();

        let response = router(root)
            .oneshot(get_request("/index.html"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<h1>home</h1>");
    }
}
