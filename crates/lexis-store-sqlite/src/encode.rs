//! Encoding and decoding helpers between Rust domain types and the plain-text
//! and integer representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, levels as their lowercase name, counters
//! as `INTEGER`.

use chrono::NaiveDate;
use lexis_core::record::{
  ActiveSetMetadata, HistoricalEntry, Level, VocabularyRecord,
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Level ───────────────────────────────────────────────────────────────────

pub fn encode_level(level: Level) -> &'static str {
  match level {
    Level::Beginner => "beginner",
    Level::Intermediate => "intermediate",
    Level::Advanced => "advanced",
  }
}

pub fn decode_level(s: &str) -> Result<Level> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown level: {s:?}")))
}

// ─── Counters ────────────────────────────────────────────────────────────────

pub fn encode_count(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

fn decode_count<T: TryFrom<i64>>(column: &str, n: i64) -> Result<T> {
  T::try_from(n).map_err(|_| Error::Decode(format!("{column} out of range: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from the `active_meta` row.
pub struct RawMetadata {
  pub generation_date: String,
  pub target_language: String,
  pub level:           String,
}

impl RawMetadata {
  pub fn into_metadata(self) -> Result<ActiveSetMetadata> {
    Ok(ActiveSetMetadata {
      generation_date: decode_date(&self.generation_date)?,
      target_language: self.target_language,
      level:           decode_level(&self.level)?,
    })
  }
}

/// Raw values read directly from an `active_words` row.
pub struct RawRecord {
  pub source_word:   String,
  pub translated:    String,
  pub meaning:       String,
  pub pronunciation: String,
  pub frequency:     i64,
  pub word_type:     Option<String>,
}

impl RawRecord {
  pub fn into_record(self) -> Result<VocabularyRecord> {
    Ok(VocabularyRecord {
      source_word:   self.source_word,
      translated:    self.translated,
      meaning:       self.meaning,
      pronunciation: self.pronunciation,
      frequency:     decode_count("frequency", self.frequency)?,
      word_type:     self.word_type,
    })
  }
}

/// Raw values read directly from a `ledger` row.
pub struct RawEntry {
  pub source_word:       String,
  pub translated:        String,
  pub meaning:           String,
  pub pronunciation:     String,
  pub frequency:         i64,
  pub days_since_active: i64,
}

impl RawEntry {
  pub fn into_entry(self) -> Result<HistoricalEntry> {
    Ok(HistoricalEntry {
      source_word:       self.source_word,
      translated:        self.translated,
      meaning:           self.meaning,
      pronunciation:     self.pronunciation,
      frequency:         decode_count("frequency", self.frequency)?,
      days_since_active: decode_count("days_since_active", self.days_since_active)?,
    })
  }
}
