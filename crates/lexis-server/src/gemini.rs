//! [`GeminiOracle`]: a [`WordOracle`] backed by the Gemini
//! `generateContent` REST endpoint.

use lexis_core::oracle::{GenerationRequest, WordOracle};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeminiError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("gemini answered {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("gemini response contained no text")]
  EmptyResponse,
}

/// Connection settings for the Gemini API.
#[derive(Clone)]
pub struct GeminiConfig {
  pub base_url: String,
  pub model:    String,
  pub api_key:  String,
}

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiOracle {
  client: Client,
  config: GeminiConfig,
}

impl GeminiOracle {
  pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
    let client = Client::builder().build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:generateContent",
      self.config.base_url.trim_end_matches('/'),
      self.config.model
    )
  }
}

impl WordOracle for GeminiOracle {
  type Error = GeminiError;

  async fn generate(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
    let body = GenerateBody {
      contents: vec![Content {
        parts: vec![Part { text: build_prompt(request) }],
      }],
    };

    let resp = self
      .client
      .post(self.url())
      .header("x-goog-api-key", &self.config.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(GeminiError::Status { status, body });
    }

    let answer: GenerateAnswer = resp.json().await?;
    answer.text().ok_or(GeminiError::EmptyResponse)
  }
}

// ─── Prompt ───────────────────────────────────────────────────────────────────

/// The instruction sent to the model for `request`.
pub fn build_prompt(request: &GenerationRequest) -> String {
  let history = if request.history.is_empty() {
    "The learner has no history yet.".to_string()
  } else {
    let triples: Vec<String> = request
      .history
      .iter()
      .map(|h| format!("({}, {}, {})", h.word, h.frequency, h.days_since_active))
      .collect();
    format!(
      "Words the learner has met before, as (english, frequency, days since last seen): {}",
      triples.join(", ")
    )
  };

  format!(
    "You are choosing vocabulary for someone learning {language}. \
     Produce exactly {count} common nouns of {level} difficulty.\n\
     Output only CSV rows: no header line, no commentary, no code fences.\n\
     Each row is: English,Translation,Meaning,Pronunciation,Frequency\n\
     - Meaning: at most 8 words, without commas.\n\
     - Pronunciation: hyphenated syllables, like Pro-Nun-See-A-Shun.\n\
     - Frequency: always 0.\n\
     Prefer history words whose frequency and days since last seen are both low. \
     Leave out history words with a high frequency entirely. \
     Otherwise pick new words the learner should meet.\n\
     {history}",
    language = request.target_language,
    count = request.word_count,
    level = request.level,
  )
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateBody {
  contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
  #[serde(default)]
  text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateAnswer {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<Content>,
}

impl GenerateAnswer {
  /// Concatenated text of the first candidate, if it has any.
  fn text(self) -> Option<String> {
    let content = self.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    (!text.trim().is_empty()).then_some(text)
  }
}

#[cfg(test)]
mod tests {
  use lexis_core::{oracle::HistoryEntry, record::Level};

  use super::*;

  #[test]
  fn prompt_carries_size_level_and_history() {
    let request = GenerationRequest::new(Level::Intermediate, "es", vec![HistoryEntry {
      word:              "cat".into(),
      frequency:         3,
      days_since_active: 2,
    }]);
    let prompt = build_prompt(&request);

    assert!(prompt.contains("learning es"));
    assert!(prompt.contains("exactly 50 common nouns of intermediate difficulty"));
    assert!(prompt.contains("(cat, 3, 2)"));
  }

  #[test]
  fn prompt_without_history() {
    let request = GenerationRequest::new(Level::Beginner, "fr", Vec::new());
    let prompt = build_prompt(&request);
    assert!(prompt.contains("exactly 15 common nouns"));
    assert!(prompt.contains("no history yet"));
  }

  #[test]
  fn answer_text_joins_first_candidate_parts() {
    let answer: GenerateAnswer = serde_json::from_str(
      r#"{"candidates":[{"content":{"parts":[{"text":"cat,chat,feline,shah,0\n"},{"text":"dog,chien,pet,shee-ahn,0"}],"role":"model"}}]}"#,
    )
    .unwrap();
    assert_eq!(
      answer.text().as_deref(),
      Some("cat,chat,feline,shah,0\ndog,chien,pet,shee-ahn,0")
    );
  }

  #[test]
  fn answer_without_candidates_has_no_text() {
    let answer: GenerateAnswer = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
    assert_eq!(answer.text(), None);
  }

  #[test]
  fn url_targets_model() {
    let oracle = GeminiOracle::new(GeminiConfig {
      base_url: "https://example.test/".into(),
      model:    "gemini-test".into(),
      api_key:  "k".into(),
    })
    .unwrap();
    assert_eq!(
      oracle.url(),
      "https://example.test/v1beta/models/gemini-test:generateContent"
    );
  }
}
