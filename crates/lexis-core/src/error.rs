//! Error types for `lexis-core`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required input was missing or empty. Nothing was changed.
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("word oracle unavailable: {0}")]
  OracleUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("word oracle did not answer within {0:?}")]
  OracleTimeout(Duration),

  /// The oracle answered, but not one row of its output was usable.
  #[error("unusable oracle output: {0}")]
  OracleParse(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }

  /// Whether the failure came from the oracle side of a rotation, leaving
  /// any previous active set intact.
  pub fn is_rotation_failure(&self) -> bool {
    matches!(
      self,
      Self::OracleUnavailable(_) | Self::OracleTimeout(_) | Self::OracleParse(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
