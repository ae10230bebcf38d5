//! Handler for `POST /api/hover`.
//!
//! Body: `{"english": "<word>"}`. Returns `{"updated": bool}`; `false` when
//! the word is not in today's set.

use std::sync::Arc;

use axum::{Json, extract::State};
use lexis_core::{engine::Engine, oracle::WordOracle, store::VocabStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct HoverBody {
  pub english: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HoverResponse {
  pub updated: bool,
}

/// `POST /api/hover`
pub async fn handler<S, O>(
  State(engine): State<Arc<Engine<S, O>>>,
  Json(body): Json<HoverBody>,
) -> Result<Json<HoverResponse>, ApiError>
where
  S: VocabStore,
  O: WordOracle,
{
  let word = body
    .english
    .as_deref()
    .map(str::trim)
    .filter(|w| !w.is_empty())
    .ok_or_else(|| ApiError::BadRequest("No word provided".into()))?;

  let updated = engine.record_hover(word).await?;
  Ok(Json(HoverResponse { updated }))
}
