//! Record schema: the active-set entry, its metadata, and the ledger entry.
//!
//! Word identity is case-insensitive everywhere: two records whose
//! `source_word`s differ only in case are the same word. [`word_key`] is the
//! canonical form used for comparisons and storage keys.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical comparison key for a source word.
pub fn word_key(word: &str) -> String { word.trim().to_lowercase() }

// ─── Level ───────────────────────────────────────────────────────────────────

/// Learner difficulty level. Part of the active set's staleness key.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Level {
  #[default]
  Beginner,
  Intermediate,
  Advanced,
}

impl Level {
  /// How many words the oracle is asked for when generating a set at this
  /// level.
  pub fn word_count(self) -> usize {
    match self {
      Self::Beginner => 15,
      Self::Intermediate => 50,
      Self::Advanced => 100,
    }
  }
}

// ─── Active set ──────────────────────────────────────────────────────────────

/// One entry in the active vocabulary set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRecord {
  /// The term in the base language.
  pub source_word:   String,
  pub translated:    String,
  /// Short gloss.
  pub meaning:       String,
  pub pronunciation: String,
  /// Hover count during this set's lifetime.
  pub frequency:     u32,
  /// Free-form tag such as a part of speech; absent in older rows.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub word_type:     Option<String>,
}

impl VocabularyRecord {
  /// A fresh record with `frequency = 0` and no word type.
  pub fn new(
    source_word: impl Into<String>,
    translated: impl Into<String>,
    meaning: impl Into<String>,
    pronunciation: impl Into<String>,
  ) -> Self {
    Self {
      source_word:   source_word.into(),
      translated:    translated.into(),
      meaning:       meaning.into(),
      pronunciation: pronunciation.into(),
      frequency:     0,
      word_type:     None,
    }
  }

  pub fn key(&self) -> String { word_key(&self.source_word) }

  pub fn is_word(&self, word: &str) -> bool { self.key() == word_key(word) }
}

/// The key an active set was generated for. Replaced as a whole on rotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSetMetadata {
  pub generation_date: NaiveDate,
  pub target_language: String,
  pub level:           Level,
}

impl ActiveSetMetadata {
  pub fn new(
    generation_date: NaiveDate,
    target_language: impl Into<String>,
    level: Level,
  ) -> Self {
    Self {
      generation_date,
      target_language: target_language.into(),
      level,
    }
  }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Long-term exposure history for one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEntry {
  pub source_word:       String,
  /// Last-known translation, overwritten whenever the word reappears.
  pub translated:        String,
  pub meaning:           String,
  pub pronunciation:     String,
  /// Total hovers across every active-set lifetime of the word.
  pub frequency:         u64,
  /// Rotation cycles since the word was last active; 1 right after it was.
  pub days_since_active: u32,
}

impl HistoricalEntry {
  pub fn key(&self) -> String { word_key(&self.source_word) }
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// One matched word in a translation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
  pub original:      String,
  pub translated:    String,
  pub meaning:       String,
  pub pronunciation: String,
}

impl From<VocabularyRecord> for Translation {
  fn from(r: VocabularyRecord) -> Self {
    Self {
      original:      r.source_word,
      translated:    r.translated,
      meaning:       r.meaning,
      pronunciation: r.pronunciation,
    }
  }
}
