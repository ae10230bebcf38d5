//! Historical ledger: cross-day exposure history, one entry per word.
//!
//! A ledger holds words for a single target language. Entries are only ever
//! added or updated by [`Ledger::merge_outgoing`]; the whole ledger is
//! emptied when [`Ledger::adopt_language`] switches languages.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::{
  oracle::HistoryEntry,
  record::{HistoricalEntry, VocabularyRecord, word_key},
};

/// Counts from one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
  /// Words seen for the first time.
  pub created:   usize,
  /// Words already in the ledger that were active again.
  pub refreshed: usize,
  /// Words absent from the outgoing set, whose day counter advanced.
  pub aged:      usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
  language: Option<String>,
  entries:  BTreeMap<String, HistoricalEntry>,
}

impl Ledger {
  pub fn new() -> Self { Self::default() }

  /// Rebuild a ledger from stored entries. Later duplicates of a word win.
  pub fn from_entries(
    language: Option<String>,
    entries: impl IntoIterator<Item = HistoricalEntry>,
  ) -> Self {
    Self {
      language,
      entries: entries.into_iter().map(|e| (e.key(), e)).collect(),
    }
  }

  pub fn language(&self) -> Option<&str> { self.language.as_deref() }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn get(&self, word: &str) -> Option<&HistoricalEntry> {
    self.entries.get(&word_key(word))
  }

  /// Entries ordered by their lowercase word.
  pub fn entries(&self) -> impl Iterator<Item = &HistoricalEntry> {
    self.entries.values()
  }

  pub fn into_entries(self) -> Vec<HistoricalEntry> {
    self.entries.into_values().collect()
  }

  /// Make `language` the ledger's language. If the ledger already belonged
  /// to a different language, every entry is discarded and `true` is
  /// returned.
  pub fn adopt_language(&mut self, language: &str) -> bool {
    let reset = match self.language.as_deref() {
      Some(current) => current != language && !self.entries.is_empty(),
      None => false,
    };
    if reset {
      self.entries.clear();
    }
    self.language = Some(language.to_owned());
    reset
  }

  /// Fold an expiring active set into the ledger.
  ///
  /// Words in `outgoing` get their final frequency added and their day
  /// counter reset to 1, with translation fields taken from the outgoing
  /// record. Every other entry ages by one day.
  pub fn merge_outgoing(&mut self, outgoing: &[VocabularyRecord]) -> MergeSummary {
    let mut summary = MergeSummary::default();
    let mut touched = HashSet::with_capacity(outgoing.len());

    for record in outgoing {
      let key = record.key();
      if !touched.insert(key.clone()) {
        continue;
      }
      match self.entries.get_mut(&key) {
        Some(entry) => {
          entry.frequency += u64::from(record.frequency);
          entry.days_since_active = 1;
          entry.source_word = record.source_word.clone();
          entry.translated = record.translated.clone();
          entry.meaning = record.meaning.clone();
          entry.pronunciation = record.pronunciation.clone();
          summary.refreshed += 1;
        }
        None => {
          self.entries.insert(key, HistoricalEntry {
            source_word:       record.source_word.clone(),
            translated:        record.translated.clone(),
            meaning:           record.meaning.clone(),
            pronunciation:     record.pronunciation.clone(),
            frequency:         u64::from(record.frequency),
            days_since_active: 1,
          });
          summary.created += 1;
        }
      }
    }

    for (key, entry) in self.entries.iter_mut() {
      if !touched.contains(key) {
        entry.days_since_active = entry.days_since_active.saturating_add(1);
        summary.aged += 1;
      }
    }

    summary
  }

  /// The `(word, frequency, days_since_active)` triples handed to the oracle.
  pub fn history(&self) -> Vec<HistoryEntry> {
    self
      .entries
      .values()
      .map(|e| HistoryEntry {
        word:              e.source_word.clone(),
        frequency:         e.frequency,
        days_since_active: e.days_since_active,
      })
      .collect()
  }
}
