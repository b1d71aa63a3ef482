//! Request Handlers
//!
//! Map HTTP requests onto engine calls and engine errors onto statuses.

use std::io;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::engine::Engine;
use crate::error::{Result, TabError};

/// `PUT /v1/{key}`: body is the value
pub(crate) async fn put_value(
    State(engine): State<Arc<Engine>>,
    Path(key): Path<String>,
    body: Bytes,
) -> Response {
    let value = match String::from_utf8(body.to_vec()) {
        Ok(value) => value,
        Err(_) => return (StatusCode::BAD_REQUEST, "value must be valid UTF-8").into_response(),
    };

    tracing::debug!("PUT {} ({} bytes)", key, value.len());
    match logged_write(engine, move |engine| engine.put(&key, &value)).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /v1/{key}`
pub(crate) async fn get_value(
    State(engine): State<Arc<Engine>>,
    Path(key): Path<String>,
) -> Response {
    tracing::debug!("GET {}", key);
    match engine.get(&key) {
        Ok(value) => (StatusCode::OK, value).into_response(),
        Err(e) => error_response(e),
    }
}

/// `DELETE /v1/{key}`
pub(crate) async fn delete_value(
    State(engine): State<Arc<Engine>>,
    Path(key): Path<String>,
) -> Response {
    tracing::debug!("DELETE {}", key);
    match logged_write(engine, move |engine| engine.delete(&key)).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(e),
    }
}

/// Run a mutation off the async workers
///
/// Enqueueing blocks while the log queue is full; that must not hold up
/// reads or other connections.
async fn logged_write<F>(engine: Arc<Engine>, op: F) -> Result<()>
where
    F: FnOnce(&Engine) -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&engine))
        .await
        .map_err(|e| TabError::Io(io::Error::new(io::ErrorKind::Other, e)))?
}

/// Any method on `/v1` or `/v1/` without a key segment
pub(crate) async fn missing_key() -> Response {
    (StatusCode::BAD_REQUEST, "missing key").into_response()
}

fn error_response(err: TabError) -> Response {
    let status = match &err {
        TabError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        TabError::InvalidKey => StatusCode::BAD_REQUEST,
        e if e.is_durability_failure() => {
            tracing::error!("Write accepted by the store but not logged: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}
