//! The `VocabStore` trait: persistence for the active set and the ledger.
//!
//! The trait is implemented by storage backends (`lexis-store-sqlite`, and
//! [`crate::memory::MemoryStore`]). The engine depends on this abstraction,
//! not on any concrete backend.

use std::{collections::HashSet, future::Future};

use crate::{
  ledger::Ledger,
  record::{ActiveSetMetadata, VocabularyRecord},
};

/// Abstraction over a Lexis storage backend.
///
/// The active set is only ever replaced whole; the ledger is only ever
/// upserted, together with the set that replaces the one folded into it.
/// Writes must be atomic: a failed write leaves the previous state readable.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait VocabStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Active set ────────────────────────────────────────────────────────

  /// The key the current set was generated for, or `None` if no set was
  /// ever installed.
  fn current_metadata(
    &self,
  ) -> impl Future<Output = Result<Option<ActiveSetMetadata>, Self::Error>> + Send + '_;

  /// Every record of the active set, in stored order.
  fn active_records(
    &self,
  ) -> impl Future<Output = Result<Vec<VocabularyRecord>, Self::Error>> + Send + '_;

  /// Records whose word is in `words`, compared case-insensitively, in the
  /// active set's stored order. Unknown words are skipped.
  fn lookup<'a>(
    &'a self,
    words: &'a HashSet<String>,
  ) -> impl Future<Output = Result<Vec<VocabularyRecord>, Self::Error>> + Send + 'a;

  /// Add one to the matching record's frequency. Returns `false`, changing
  /// nothing, when no record matches.
  fn record_hover<'a>(
    &'a self,
    word: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Replace the entire active set and its metadata.
  fn install(
    &self,
    records: Vec<VocabularyRecord>,
    metadata: ActiveSetMetadata,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// Read the whole ledger.
  fn ledger(&self) -> impl Future<Output = Result<Ledger, Self::Error>> + Send + '_;

  /// Persist `ledger` and install `records` / `metadata` as one atomic
  /// unit. Entries are upserted by word; if the ledger's language changed,
  /// stored entries for the previous language are dropped first.
  fn commit_rotation(
    &self,
    ledger: Ledger,
    records: Vec<VocabularyRecord>,
    metadata: ActiveSetMetadata,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
