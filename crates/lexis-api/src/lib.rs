//! JSON HTTP API for Lexis.
//!
//! Exposes an axum [`Router`] backed by a shared [`Engine`]. The routes are
//! the ones the browser extension calls; TLS and process concerns are the
//! caller's responsibility.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/translate` | [`translate::handler`] |
//! | `POST` | `/api/hover` | [`hover::handler`] |
//! | `GET`  | `/api/stats` | [`progress::stats`] |
//! | `GET`  | `/api/history` | [`progress::history`] |
//! | `GET`  | `/health` | liveness probe |

pub mod error;
pub mod hover;
pub mod progress;
pub mod translate;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use lexis_core::{engine::Engine, oracle::WordOracle, store::VocabStore};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;

/// Build the API router for `engine`.
///
/// CORS is fully permissive: the extension's content scripts call from
/// arbitrary page origins.
pub fn api_router<S, O>(engine: Arc<Engine<S, O>>) -> Router<()>
where
  S: VocabStore + 'static,
  O: WordOracle + 'static,
{
  Router::new()
    .route("/translate", post(translate::handler::<S, O>))
    .route("/api/hover", post(hover::handler::<S, O>))
    .route("/api/stats", get(progress::stats::<S, O>))
    .route("/api/history", get(progress::history::<S, O>))
    .route("/health", get(health))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(engine)
}

/// `GET /health`
async fn health() -> Json<Value> {
  Json(json!({ "status": "healthy", "message": "Translation API is running" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
