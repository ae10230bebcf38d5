//! The `WordOracle` trait: the external capability that proposes the next
//! active set.
//!
//! Implementations own their transport and prompt wording. The engine only
//! hands over a [`GenerationRequest`] and parses the raw text that comes back
//! with [`crate::parse::parse_oracle_rows`].

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::record::Level;

/// One `(word, frequency, days_since_active)` history triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub word:              String,
  pub frequency:         u64,
  pub days_since_active: u32,
}

/// Everything an oracle is told when asked for a new set.
///
/// The oracle is asked to prefer history words with low frequency and few
/// days since they were active, avoid high-frequency words entirely, and
/// otherwise introduce new words. The engine does not enforce any of that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
  pub level:           Level,
  pub target_language: String,
  pub history:         Vec<HistoryEntry>,
  /// Number of rows requested, derived from `level`.
  pub word_count:      usize,
}

impl GenerationRequest {
  pub fn new(
    level: Level,
    target_language: impl Into<String>,
    history: Vec<HistoryEntry>,
  ) -> Self {
    Self {
      level,
      target_language: target_language.into(),
      history,
      word_count: level.word_count(),
    }
  }
}

/// Abstraction over a word-generation backend.
pub trait WordOracle: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Produce raw, newline-delimited rows for `request`.
  fn generate<'a>(
    &'a self,
    request: &'a GenerationRequest,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
