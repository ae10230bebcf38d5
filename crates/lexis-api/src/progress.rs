//! Read-only learning progress endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/stats` | Metrics over today's set |
//! | `GET`  | `/api/history` | Every ledger entry, ordered by word |

use std::sync::Arc;

use axum::{Json, extract::State};
use lexis_core::{
  engine::Engine,
  oracle::WordOracle,
  record::HistoricalEntry,
  stats::Stats,
  store::VocabStore,
};

use crate::error::ApiError;

/// `GET /api/stats`
pub async fn stats<S, O>(
  State(engine): State<Arc<Engine<S, O>>>,
) -> Result<Json<Stats>, ApiError>
where
  S: VocabStore,
  O: WordOracle,
{
  Ok(Json(engine.stats().await?))
}

/// `GET /api/history`
pub async fn history<S, O>(
  State(engine): State<Arc<Engine<S, O>>>,
) -> Result<Json<Vec<HistoricalEntry>>, ApiError>
where
  S: VocabStore,
  O: WordOracle,
{
  Ok(Json(engine.history().await?))
}
