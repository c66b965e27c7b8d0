//! HTTP adapter: a JSON API over a shared [`Dictionary`].
//!
//! | Method | Path               | Body                          | Success |
//! |--------|--------------------|-------------------------------|---------|
//! | POST   | `/api/word`        | `{"word": .., "definition": ..}` | 201  |
//! | GET    | `/api/word/:word`  |                               | 200     |
//! | PUT    | `/api/word/:word`  | `{"definition": ..}`          | 200     |
//! | DELETE | `/api/word/:word`  |                               | 200     |
//! | GET    | `/api/words`       |                               | 200     |
//!
//! Dictionary calls block on file I/O and on the mutation queue, so every
//! handler runs them on tokio's blocking pool.

use crate::error::Error;
use crate::store::Dictionary;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::Span;

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Host to bind to (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to (default: 8080).
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl HttpConfig {
    /// `host:port`, ready for binding.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ==================
// Request/Response Types
// ==================

/// Body of `POST /api/word`.
#[derive(Debug, Deserialize)]
pub struct AddWordRequest {
    /// Word to define.
    pub word: String,
    /// Its definition.
    pub definition: String,
}

/// Body of `PUT /api/word/:word`.
#[derive(Debug, Deserialize)]
pub struct UpdateWordRequest {
    /// New definition.
    pub definition: String,
}

/// Body of `GET /api/word/:word`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionResponse {
    /// The definition.
    pub definition: String,
}

/// One row of `GET /api/words`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordItem {
    /// The word.
    pub word: String,
    /// Its definition.
    pub definition: String,
}

/// Body of `GET /api/words`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordsResponse {
    /// Every entry, sorted by word.
    pub words: Vec<WordItem>,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub error: String,
}

/// Failure of a handler, rendered as a status code plus [`ErrorResponse`].
#[derive(Debug)]
pub enum ApiError {
    /// The request body couldn't be parsed.
    BadRequest(String),
    /// The dictionary refused or failed.
    Dictionary(Error),
    /// The blocking task died.
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Dictionary(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Status code an error surfaces as.
#[must_use]
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::AlreadyExists(_) => StatusCode::CONFLICT,
        Error::Closed => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Dictionary(err) => (status_for(&err), err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

// ==================
// Router
// ==================

/// Build the API router with request logging.
pub fn router(dict: Arc<Dictionary>) -> Router {
    Router::new()
        .route("/api/word", post(add_word))
        .route(
            "/api/word/:word",
            get(get_word).put(update_word).delete(remove_word),
        )
        .route("/api/words", get(list_words))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::extract::Request| {
                    let user_agent = req
                        .headers()
                        .get(header::USER_AGENT)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("");
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        query = req.uri().query().unwrap_or(""),
                        version = ?req.version(),
                        user_agent
                    )
                })
                .on_response(|res: &Response, latency: Duration, _span: &Span| {
                    let status = res.status().as_u16();
                    let status_text = res.status().canonical_reason().unwrap_or("");
                    let duration_ms = latency.as_millis() as u64;
                    if res.status().is_client_error() || res.status().is_server_error() {
                        tracing::error!(status, status_text, duration_ms, "request failed");
                    } else {
                        tracing::info!(status, status_text, duration_ms, "request handled");
                    }
                }),
        )
        .with_state(dict)
}

/// Bind `config` and serve until `shutdown` resolves.
pub async fn serve<F>(dict: Arc<Dictionary>, config: &HttpConfig, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.socket_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving dictionary API");
    axum::serve(listener, router(dict))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Run a dictionary call on the blocking pool.
async fn blocking<T, F>(dict: Arc<Dictionary>, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Dictionary) -> crate::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(dict.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

// ==================
// Handlers
// ==================

async fn add_word(
    State(dict): State<Arc<Dictionary>>,
    payload: Result<Json<AddWordRequest>, JsonRejection>,
) -> Result<(StatusCode, String), ApiError> {
    let Json(req) = payload?;
    let word = req.word.clone();
    blocking(dict, move |d| d.add(&req.word, &req.definition)).await?;
    Ok((StatusCode::CREATED, format!("Word '{word}' added successfully!")))
}

async fn get_word(
    State(dict): State<Arc<Dictionary>>,
    Path(word): Path<String>,
) -> Result<Json<DefinitionResponse>, ApiError> {
    let entry = blocking(dict, move |d| d.get(&word)).await?;
    Ok(Json(DefinitionResponse {
        definition: entry.into_definition(),
    }))
}

async fn update_word(
    State(dict): State<Arc<Dictionary>>,
    Path(word): Path<String>,
    payload: Result<Json<UpdateWordRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(req) = payload?;
    let w = word.clone();
    blocking(dict, move |d| d.update(&w, &req.definition)).await?;
    Ok(format!("Word '{word}' updated successfully!"))
}

async fn remove_word(
    State(dict): State<Arc<Dictionary>>,
    Path(word): Path<String>,
) -> Result<String, ApiError> {
    let w = word.clone();
    blocking(dict, move |d| d.remove(&w)).await?;
    Ok(format!("Word '{word}' removed successfully!"))
}

async fn list_words(State(dict): State<Arc<Dictionary>>) -> Result<Json<WordsResponse>, ApiError> {
    let (words, mut entries) = blocking(dict, |d| d.list()).await?;
    let words = words
        .into_iter()
        .filter_map(|word| {
            entries.remove(&word).map(|e| WordItem {
                word,
                definition: e.into_definition(),
            })
        })
        .collect();
    Ok(Json(WordsResponse { words }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(status_for(&Error::NotFound("a".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&Error::AlreadyExists("a".into())), StatusCode::CONFLICT);
        assert_eq!(status_for(&Error::Closed), StatusCode::SERVICE_UNAVAILABLE);
        let io = Error::Io(std::io::Error::other("disk full"));
        assert_eq!(status_for(&io), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
