//! Runtime server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the optional TOML
//! file, then `LEXIS_*` environment variables (e.g. `LEXIS_GEMINI_API_KEY`,
//! `LEXIS_PORT`).

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use lexis_core::{
  engine::{EngineConfig, RotationFailurePolicy},
  matcher::WordMatcher,
};
use serde::Deserialize;

use crate::gemini::GeminiConfig;

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  pub store_path:             PathBuf,
  pub gemini_api_key:         String,
  pub gemini_model:           String,
  pub gemini_base_url:        String,
  pub oracle_timeout_secs:    u64,
  /// Exclude common English words from matching.
  pub filter_stop_words:      bool,
  /// Keep answering from yesterday's set while the oracle is failing.
  pub serve_stale_on_failure: bool,
}

impl ServerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 5001)?
      .set_default("store_path", "~/.local/share/lexis/lexis.db")?
      .set_default("gemini_model", "gemini-2.5-flash-lite")?
      .set_default("gemini_base_url", "https://generativelanguage.googleapis.com")?
      .set_default("oracle_timeout_secs", 60)?
      .set_default("filter_stop_words", false)?
      .set_default("serve_stale_on_failure", true)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LEXIS"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig (is LEXIS_GEMINI_API_KEY set?)")
  }

  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig {
      oracle_timeout:      Duration::from_secs(self.oracle_timeout_secs),
      on_rotation_failure: if self.serve_stale_on_failure {
        RotationFailurePolicy::ServeStale
      } else {
        RotationFailurePolicy::Fail
      },
    }
  }

  pub fn matcher(&self) -> WordMatcher {
    if self.filter_stop_words {
      WordMatcher::with_common_stop_words()
    } else {
      WordMatcher::new()
    }
  }

  pub fn gemini(&self) -> GeminiConfig {
    GeminiConfig {
      base_url: self.gemini_base_url.clone(),
      model:    self.gemini_model.clone(),
      api_key:  self.gemini_api_key.clone(),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
