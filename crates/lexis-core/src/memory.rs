//! [`MemoryStore`]: a process-local [`VocabStore`].
//!
//! State lives behind a single mutex, so every operation observes either the
//! whole previous active set or the whole new one. Nothing survives a
//! restart; use `lexis-store-sqlite` for durable storage.

use std::{
  collections::HashSet,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

use crate::{
  ledger::Ledger,
  record::{ActiveSetMetadata, VocabularyRecord, word_key},
  store::VocabStore,
};

#[derive(Debug, Error)]
pub enum MemoryError {
  /// Two records in one active set share a word, compared case-insensitively.
  #[error("duplicate word in active set: {0}")]
  DuplicateWord(String),
}

/// Reject a set in which any word appears twice.
fn check_unique(records: &[VocabularyRecord]) -> Result<(), MemoryError> {
  let mut seen = HashSet::with_capacity(records.len());
  for record in records {
    let key = record.key();
    if !seen.insert(key.clone()) {
      return Err(MemoryError::DuplicateWord(key));
    }
  }
  Ok(())
}

#[derive(Debug, Default)]
struct State {
  metadata: Option<ActiveSetMetadata>,
  records:  Vec<VocabularyRecord>,
  ledger:   Ledger,
}

/// Cloning is cheap: clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<State>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// A store whose ledger starts out as `ledger`.
  pub fn with_ledger(ledger: Ledger) -> Self {
    let store = Self::new();
    store.lock().ledger = ledger;
    store
  }

  fn lock(&self) -> MutexGuard<'_, State> {
    // Every mutation below is a single assignment or increment, so a poisoned
    // lock still guards consistent state.
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl VocabStore for MemoryStore {
  type Error = MemoryError;

  async fn current_metadata(&self) -> Result<Option<ActiveSetMetadata>, MemoryError> {
    Ok(self.lock().metadata.clone())
  }

  async fn active_records(&self) -> Result<Vec<VocabularyRecord>, MemoryError> {
    Ok(self.lock().records.clone())
  }

  async fn lookup(
    &self,
    words: &HashSet<String>,
  ) -> Result<Vec<VocabularyRecord>, MemoryError> {
    let keys: HashSet<String> = words.iter().map(|w| word_key(w)).collect();
    Ok(
      self
        .lock()
        .records
        .iter()
        .filter(|r| keys.contains(&r.key()))
        .cloned()
        .collect(),
    )
  }

  async fn record_hover(&self, word: &str) -> Result<bool, MemoryError> {
    let mut state = self.lock();
    match state.records.iter_mut().find(|r| r.is_word(word)) {
      Some(record) => {
        record.frequency = record.frequency.saturating_add(1);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn install(
    &self,
    records: Vec<VocabularyRecord>,
    metadata: ActiveSetMetadata,
  ) -> Result<(), MemoryError> {
    check_unique(&records)?;
    let mut state = self.lock();
    state.records = records;
    state.metadata = Some(metadata);
    Ok(())
  }

  async fn ledger(&self) -> Result<Ledger, MemoryError> { Ok(self.lock().ledger.clone()) }

  async fn commit_rotation(
    &self,
    ledger: Ledger,
    records: Vec<VocabularyRecord>,
    metadata: ActiveSetMetadata,
  ) -> Result<(), MemoryError> {
    check_unique(&records)?;
    let mut state = self.lock();
    state.ledger = ledger;
    state.records = records;
    state.metadata = Some(metadata);
    Ok(())
  }
}
