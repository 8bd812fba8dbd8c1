//! HTTP front end: `GET /`, `POST /recommend`, `GET /train/{data_url}/`.

pub mod auth;

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    config::ServerConfig,
    engine::ContentEngine,
    error::{EngineError, Result},
    index::Recommendation,
};

use self::auth::BasicAuth;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ContentEngine>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub content: String,
    /// falls back to `engine.default_num`
    #[serde(default)]
    pub num: Option<i64>,
}

/// Engine failure as an HTTP response with `{"error": ...}` body
#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    /// blocking task panicked or was cancelled
    Task(String),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) => match e {
                EngineError::Csv(_)
                | EngineError::MissingColumn { .. }
                | EngineError::Fetch { .. }
                | EngineError::EmptyVocabulary => StatusCode::BAD_REQUEST,
                EngineError::IndexNotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
                EngineError::Io(_)
                | EngineError::Encode { .. }
                | EngineError::CorruptIndex { .. }
                | EngineError::InconsistentIndex { .. }
                | EngineError::Config(_)
                | EngineError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Engine(e) => e.to_string(),
            ApiError::Task(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %message, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Run engine work off the async workers.
async fn blocking<T, F>(f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Task(format!("engine task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "200" }))
}

async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> std::result::Result<Json<Vec<Recommendation>>, ApiError> {
    let engine = Arc::clone(&state.engine);
    let num = req.num.unwrap_or(engine.config().default_num);
    let recs = blocking(move || engine.recommend(&req.content, num)).await?;
    Ok(Json(recs))
}

async fn train(
    State(state): State<AppState>,
    Path(data_url): Path<String>,
) -> std::result::Result<&'static str, ApiError> {
    let engine = Arc::clone(&state.engine);
    tracing::info!(source = %data_url, "training requested");
    blocking(move || engine.train(&data_url)).await?;
    Ok("OK")
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tracing::info!(%method, %path, "request received");
    let start = Instant::now();
    let resp = next.run(req).await;
    tracing::info!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );
    resp
}

/// All routes require basic auth; every request is logged.
pub fn router(engine: Arc<ContentEngine>, basic_auth: BasicAuth) -> Router {
    let state = AppState { engine };
    Router::new()
        .route("/", get(health))
        .route("/recommend", post(recommend))
        .route("/train/:data_url", get(train))
        .route("/train/:data_url/", get(train))
        .route_layer(middleware::from_fn_with_state(Arc::new(basic_auth), auth::require_basic_auth))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Bind `config.bind` and serve until Ctrl+C.
pub async fn serve(engine: Arc<ContentEngine>, config: &ServerConfig) -> Result<()> {
    config.require_users()?;
    let app = router(engine, BasicAuth::new(config.users.clone(), config.realm.clone()));

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for Ctrl+C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::{body::Body, http::{header, Request as HttpRequest}};
    use tower::ServiceExt;

    use super::*;
    use crate::config::EngineConfig;

    fn app(dir: &std::path::Path) -> Router {
        let engine = Arc::new(ContentEngine::new(EngineConfig {
            index_dir: dir.join("index"),
            ..EngineConfig::default()
        }));
        let users = BTreeMap::from([("u".to_string(), "p".to_string())]);
        router(engine, BasicAuth::new(users, "test"))
    }

    fn get_req(uri: &str) -> HttpRequest<Body> {
        HttpRequest::get(uri)
            .header(header::AUTHORIZATION, auth::basic_header("u", "p"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn health_requires_auth() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path())
            .oneshot(HttpRequest::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"test\""
        );

        let resp = app(dir.path()).oneshot(get_req("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"200"}"#);
    }

    #[tokio::test]
    async fn recommend_without_index_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let req = HttpRequest::post("/recommend")
            .header(header::AUTHORIZATION, auth::basic_header("u", "p"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"content":"red"}"#))
            .unwrap();
        let resp = app(dir.path()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn train_with_missing_source_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path())
            .oneshot(get_req("/train/%2Fno%2Fsuch%2Ffile.csv/"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("/no/such/file.csv"));
    }

    #[test]
    fn error_status_mapping() {
        let s = |e: EngineError| ApiError::from(e).status();
        assert_eq!(s(EngineError::EmptyVocabulary), StatusCode::BAD_REQUEST);
        assert_eq!(
            s(EngineError::IndexNotFound { path: "x".into() }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            s(EngineError::InconsistentIndex { reason: String::new() }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
