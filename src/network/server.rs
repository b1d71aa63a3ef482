//! HTTP Server
//!
//! Builds the router and serves it until shutdown is requested.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;

use super::handlers;
use crate::engine::Engine;
use crate::error::Result;

/// Routes for the key-value API
pub fn build_router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route(
            "/v1/:key",
            put(handlers::put_value)
                .get(handlers::get_value)
                .delete(handlers::delete_value),
        )
        .route(
            "/v1",
            put(handlers::missing_key)
                .get(handlers::missing_key)
                .delete(handlers::missing_key),
        )
        .route(
            "/v1/",
            put(handlers::missing_key)
                .get(handlers::missing_key)
                .delete(handlers::missing_key),
        )
        .with_state(engine)
}

/// HTTP server for TabKV
pub struct Server {
    listen_addr: String,
    engine: Arc<Engine>,
}

impl Server {
    /// Create a new server with the given address and engine
    pub fn new(listen_addr: impl Into<String>, engine: Arc<Engine>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            engine,
        }
    }

    /// Bind and serve until `shutdown` resolves, then finish in-flight requests
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.listen_addr.as_str()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, build_router(self.engine))
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
