//! HTTP surface used by the playground UI.
//!
//! The browser dispatches one tree intent per request; every response carries
//! the re-read state so the client never has to patch its own copy.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::creation::{
    default_title, Creation, CreationManager, ExportBundle, ManagerError, TreeEntry, TreeIntent,
};
use crate::storage::CreationMetadata;
use crate::tree::{NodeRecord, TreeError};

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Shared application state
pub struct AppState {
    /// Open creations and their store
    pub manager: Arc<CreationManager>,
    /// Server start time
    started_at: std::time::Instant,
}

impl AppState {
    pub fn new(manager: CreationManager) -> Self {
        Self {
            manager: Arc::new(manager),
            started_at: std::time::Instant::now(),
        }
    }
}

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub open_creations: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateCreationRequest {
    pub title: Option<String>,
    /// Template or imported files; the default template is used when absent
    pub files: Option<Vec<NodeRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreationResponse {
    pub id: String,
    pub title: String,
    pub created_on: i64,
    pub updated_on: i64,
    pub files: Vec<NodeRecord>,
    pub entries: Vec<TreeEntry>,
    pub code_size: u64,
}

impl From<&Creation> for CreationResponse {
    fn from(creation: &Creation) -> Self {
        Self {
            id: creation.id.clone(),
            title: creation.title.clone(),
            created_on: creation.created_on,
            updated_on: creation.updated_on,
            files: creation.tree.to_records(),
            entries: creation.entries(),
            code_size: creation.code_size(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreationListResponse {
    pub creations: Vec<CreationMetadata>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl IntoResponse for ManagerError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ManagerError::CreationNotFound(_) => (StatusCode::NOT_FOUND, "creation_not_found"),
            ManagerError::NoStore => (StatusCode::SERVICE_UNAVAILABLE, "no_store"),
            ManagerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
            ManagerError::Tree(e) => match e {
                TreeError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                TreeError::DuplicateName(_) => (StatusCode::CONFLICT, "duplicate_name"),
                TreeError::CyclicMove { .. } => (StatusCode::CONFLICT, "cyclic_move"),
                TreeError::NotAFolder(_) => (StatusCode::UNPROCESSABLE_ENTITY, "not_a_folder"),
                TreeError::NotAFile(_) => (StatusCode::UNPROCESSABLE_ENTITY, "not_a_file"),
                TreeError::InvalidName(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_name"),
            },
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            kind: kind.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// HTTP HANDLERS
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        open_creations: state.manager.count().await,
    })
}

/// List saved creations
async fn list_creations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let creations = match state.manager.store().map(|store| store.list_metadata()) {
        Some(Ok(items)) => items,
        Some(Err(e)) => {
            error!("Failed to list creations: {}", e);
            Vec::new()
        }
        None => Vec::new(),
    };

    let total = creations.len();
    Json(CreationListResponse { creations, total })
}

/// Create a new creation from the default template or supplied files
async fn create_creation(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCreationRequest>,
) -> Result<(StatusCode, Json<CreationResponse>), ManagerError> {
    let title = payload
        .title
        .unwrap_or_else(|| default_title(Local::now()));

    let creation = state.manager.create(&title, payload.files).await?;
    Ok((StatusCode::CREATED, Json(CreationResponse::from(&creation))))
}

/// Get the current tree of a creation
async fn get_creation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CreationResponse>, ManagerError> {
    let creation = state.manager.snapshot(&id).await?;
    Ok(Json(CreationResponse::from(&creation)))
}

/// Apply one tree intent
async fn apply_intent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(intent): Json<TreeIntent>,
) -> Result<Json<CreationResponse>, ManagerError> {
    let creation = state.manager.apply_intent(&id, intent).await?;
    Ok(Json(CreationResponse::from(&creation)))
}

/// Persist a creation
async fn save_creation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CreationMetadata>, ManagerError> {
    let meta = state.manager.save(&id).await?;
    Ok(Json(meta))
}

/// Fork a creation
async fn fork_creation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<CreationResponse>), ManagerError> {
    let fork = state.manager.fork(&id).await?;
    Ok((StatusCode::CREATED, Json(CreationResponse::from(&fork))))
}

/// Package all files of a creation
async fn export_creation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExportBundle>, ManagerError> {
    let creation = state.manager.snapshot(&id).await?;
    Ok(Json(creation.export_bundle()))
}

/// Close and delete a creation
async fn delete_creation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ManagerError> {
    if state.manager.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ManagerError::CreationNotFound(id))
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/creations", get(list_creations).post(create_creation))
        .route(
            "/api/creations/:id",
            get(get_creation).delete(delete_creation),
        )
        .route("/api/creations/:id/intents", post(apply_intent))
        .route("/api/creations/:id/save", post(save_creation))
        .route("/api/creations/:id/fork", post(fork_creation))
        .route("/api/creations/:id/export", get(export_creation))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    fn test_app() -> Router {
        router(Arc::new(AppState::new(CreationManager::new())))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create(app: &Router) -> CreationResponse {
        let response = send(
            app,
            Method::POST,
            "/api/creations",
            Some(serde_json::json!({ "title": "Demo" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        read_json(response).await
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        create(&app).await;

        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let health: HealthResponse = read_json(response).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.open_creations, 1);
    }

    #[tokio::test]
    async fn test_create_from_default_template() {
        let app = test_app();
        let creation = create(&app).await;

        assert_eq!(creation.title, "Demo");
        let paths: Vec<&str> = creation.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["index.html", "styles", "styles/style.css", "script.js"]
        );
    }

    #[tokio::test]
    async fn test_create_from_files_without_title() {
        let app = test_app();
        let response = send(
            &app,
            Method::POST,
            "/api/creations",
            Some(serde_json::json!({
                "files": [{ "name": "src", "isFolder": true, "children": [
                    { "name": "main.js", "content": "run()" }
                ]}]
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let creation: CreationResponse = read_json(response).await;
        assert!(creation.title.starts_with("Untitled "));
        assert_eq!(creation.code_size, 5);
        assert_eq!(creation.entries[1].path, "src/main.js");
    }

    #[tokio::test]
    async fn test_apply_intent_and_read_back() {
        let app = test_app();
        let creation = create(&app).await;
        let uri = format!("/api/creations/{}/intents", creation.id);

        let response = send(
            &app,
            Method::POST,
            &uri,
            Some(serde_json::json!({
                "type": "move",
                "source": "script.js",
                "destination": "styles"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, &format!("/api/creations/{}", creation.id), None).await;
        let current: CreationResponse = read_json(response).await;
        assert!(current.entries.iter().any(|e| e.path == "styles/script.js"));
    }

    #[tokio::test]
    async fn test_intent_errors_map_to_status() {
        let app = test_app();
        let creation = create(&app).await;
        let uri = format!("/api/creations/{}/intents", creation.id);

        let cases = [
            (
                serde_json::json!({ "type": "add_file", "name": "index.html" }),
                StatusCode::CONFLICT,
                "duplicate_name",
            ),
            (
                serde_json::json!({ "type": "move", "source": "styles", "destination": "styles" }),
                StatusCode::CONFLICT,
                "cyclic_move",
            ),
            (
                serde_json::json!({ "type": "remove", "path": "missing.js" }),
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                serde_json::json!({ "type": "toggle_collapse", "path": "index.html" }),
                StatusCode::UNPROCESSABLE_ENTITY,
                "not_a_folder",
            ),
        ];

        for (body, status, kind) in cases {
            let response = send(&app, Method::POST, &uri, Some(body)).await;
            assert_eq!(response.status(), status);
            let error: ErrorResponse = read_json(response).await;
            assert_eq!(error.kind, kind);
        }
    }

    #[tokio::test]
    async fn test_unknown_creation() {
        let app = test_app();

        let response = send(&app, Method::GET, "/api/creations/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let error: ErrorResponse = read_json(response).await;
        assert_eq!(error.kind, "creation_not_found");
    }

    #[tokio::test]
    async fn test_export_and_fork() {
        let app = test_app();
        let creation = create(&app).await;

        let response = send(
            &app,
            Method::GET,
            &format!("/api/creations/{}/export", creation.id),
            None,
        )
        .await;
        let bundle: ExportBundle = read_json(response).await;
        assert_eq!(bundle.entries.len(), 3);
        assert_eq!(bundle.total_bytes, creation.code_size);

        let response = send(
            &app,
            Method::POST,
            &format!("/api/creations/{}/fork", creation.id),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let fork: CreationResponse = read_json(response).await;
        assert_eq!(fork.title, "(Forked) Demo");
        assert_ne!(fork.id, creation.id);
    }

    #[tokio::test]
    async fn test_save_without_store() {
        let app = test_app();
        let creation = create(&app).await;

        let response = send(
            &app,
            Method::POST,
            &format!("/api/creations/{}/save", creation.id),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_save_list_delete_with_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::storage::StorageConfig::new(
            dir.path().join("api.sled").to_string_lossy().to_string(),
        )
        .with_flush_interval(0);
        let store = crate::storage::CreationStore::open(config).unwrap();
        let app = router(Arc::new(AppState::new(CreationManager::with_store(store))));
        let creation = create(&app).await;

        let response = send(
            &app,
            Method::POST,
            &format!("/api/creations/{}/save", creation.id),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, "/api/creations", None).await;
        let list: CreationListResponse = read_json(response).await;
        assert_eq!(list.total, 1);
        assert_eq!(list.creations[0].file_count, 3);

        let uri = format!("/api/creations/{}", creation.id);
        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
