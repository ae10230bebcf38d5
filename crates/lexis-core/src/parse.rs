//! Oracle output parser.
//!
//! The oracle answers with headerless, newline-delimited rows:
//!
//! ```text
//! English, Translation, Meaning, Pronunciation, Frequency
//! ```
//!
//! A row missing the trailing frequency column is accepted as if it ended in
//! `,0`. Whatever the oracle put in that column, new records start at `0`.
//! Malformed rows are dropped individually; only an answer with no usable
//! row at all is an error.

use std::collections::HashSet;

use crate::{
  Error, Result,
  record::{VocabularyRecord, word_key},
};

/// Why a single row was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
  ColumnCount(usize),
  EmptyWord,
  EmptyTranslation,
  Duplicate(String),
}

/// Parse one row into a record with `frequency = 0`.
pub fn parse_row(line: &str) -> Result<VocabularyRecord, RowRejection> {
  let mut fields: Vec<&str> = line.split(',').map(str::trim).collect();
  if fields.len() == 4 {
    fields.push("0");
  }
  if fields.len() != 5 {
    return Err(RowRejection::ColumnCount(fields.len()));
  }
  if fields[0].is_empty() {
    return Err(RowRejection::EmptyWord);
  }
  if fields[1].is_empty() {
    return Err(RowRejection::EmptyTranslation);
  }

  Ok(VocabularyRecord::new(fields[0], fields[1], fields[2], fields[3]))
}

/// Lines that carry no row at all: blanks, `//` comments, Markdown fences,
/// and an echoed column header.
fn is_noise(line: &str) -> bool {
  line.is_empty() || line.starts_with("//") || line.starts_with("```") || is_header(line)
}

fn is_header(line: &str) -> bool {
  let mut fields = line.split(',').map(str::trim);
  matches!(
    (fields.next(), fields.next()),
    (Some(word), Some(translation))
      if word.eq_ignore_ascii_case("english")
        && translation.eq_ignore_ascii_case("translation")
  )
}

/// Parse a full oracle answer, keeping the first occurrence of each word.
pub fn parse_oracle_rows(raw: &str) -> Result<Vec<VocabularyRecord>> {
  let mut seen = HashSet::new();
  let mut records = Vec::new();
  let mut dropped = 0usize;

  for line in raw.lines().map(str::trim).filter(|l| !is_noise(l)) {
    let outcome = parse_row(line).and_then(|record| {
      if seen.insert(record.key()) {
        Ok(record)
      } else {
        Err(RowRejection::Duplicate(word_key(&record.source_word)))
      }
    });

    match outcome {
      Ok(record) => records.push(record),
      Err(reason) => {
        dropped += 1;
        tracing::debug!(?reason, line, "dropping oracle row");
      }
    }
  }

  if records.is_empty() {
    return Err(Error::OracleParse(format!(
      "no well-formed rows ({dropped} dropped)"
    )));
  }
  Ok(records)
}
