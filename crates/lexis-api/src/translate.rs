//! Handler for `POST /translate`.
//!
//! Body: `{"text": "...", "level": "beginner", "targetLanguage": "fr"}`.
//! `level` and `targetLanguage` are optional and default to `beginner` and
//! `fr`. The first request of a new day (or for a new language or level)
//! rotates the vocabulary set before answering.

use std::sync::Arc;

use axum::{Json, extract::State};
use lexis_core::{
  engine::Engine,
  oracle::WordOracle,
  record::{Level, Translation},
  store::VocabStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Language used when a request names none.
pub const DEFAULT_LANGUAGE: &str = "fr";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBody {
  #[serde(default)]
  pub text:            String,
  pub level:           Option<String>,
  pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
  pub translations: Vec<Translation>,
}

/// `POST /translate`
pub async fn handler<S, O>(
  State(engine): State<Arc<Engine<S, O>>>,
  Json(body): Json<TranslateBody>,
) -> Result<Json<TranslateResponse>, ApiError>
where
  S: VocabStore,
  O: WordOracle,
{
  let level = match body.level.as_deref().map(str::trim) {
    None | Some("") => Level::default(),
    Some(raw) => raw
      .parse::<Level>()
      .map_err(|_| ApiError::BadRequest(format!("unknown level {raw:?}")))?,
  };
  let target_language = body
    .target_language
    .as_deref()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .unwrap_or(DEFAULT_LANGUAGE);

  let translations = engine.translate(&body.text, level, target_language).await?;
  Ok(Json(TranslateResponse { translations }))
}
