//! Network Module
//!
//! HTTP adapter over the engine.
//!
//! ## Architecture
//! - axum router on a tokio runtime
//! - `/v1/{key}` routes for PUT, GET and DELETE
//! - Handlers call into the shared `Engine`, never into the log directly

mod handlers;
mod server;

pub use server::{build_router, Server};
