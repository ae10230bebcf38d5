//! The rotation engine: serves translations, hovers, and stats against the
//! active set, and rotates that set when a request's key no longer matches.
//!
//! A request for `(date, target_language, level)` finds the set either
//! FRESH (the stored metadata equals the key) or STALE (anything else,
//! including an empty store). A stale set is rotated before the request is
//! served:
//!
//! 1. the outgoing set is merged into a copy of the ledger (skipped for an
//!    empty store; the copy is emptied first if the language changed);
//! 2. the oracle is asked for a new set, given that merged history;
//! 3. the oracle's answer is parsed;
//! 4. the merge is redone against the outgoing set as it is now, and the
//!    ledger and the new set are committed together.
//!
//! Nothing is written until step 4, so a failed or timed-out oracle call
//! leaves the stored state exactly as it was.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::{
  Error, Result,
  ledger::{Ledger, MergeSummary},
  matcher::WordMatcher,
  oracle::{GenerationRequest, WordOracle},
  parse::parse_oracle_rows,
  record::{ActiveSetMetadata, HistoricalEntry, Level, Translation},
  stats::Stats,
  store::VocabStore,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// What a translation request does when the rotation it triggered fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationFailurePolicy {
  /// Answer from the previous set when there is one. Without a previous set
  /// the error is returned.
  #[default]
  ServeStale,
  /// Always return the error.
  Fail,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
  /// Upper bound on a single oracle call.
  pub oracle_timeout:      Duration,
  pub on_rotation_failure: RotationFailurePolicy,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      oracle_timeout:      Duration::from_secs(60),
      on_rotation_failure: RotationFailurePolicy::default(),
    }
  }
}

/// Result of [`Engine::ensure_fresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
  /// The active set already matched the key.
  Fresh,
  Rotated {
    /// Records in the newly installed set.
    installed:    usize,
    merge:        MergeSummary,
    /// Whether the ledger was emptied because the language changed.
    ledger_reset: bool,
  },
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct Engine<S, O> {
  store:    S,
  oracle:   O,
  matcher:  WordMatcher,
  config:   EngineConfig,
  /// Held from the staleness re-check through the commit; one rotation at a
  /// time.
  rotation: Mutex<()>,
  /// Shared by reads and hovers, exclusive for the final merge and commit.
  gate:     RwLock<()>,
}

impl<S, O> Engine<S, O>
where
  S: VocabStore,
  O: WordOracle,
{
  pub fn new(store: S, oracle: O, matcher: WordMatcher, config: EngineConfig) -> Self {
    Self {
      store,
      oracle,
      matcher,
      config,
      rotation: Mutex::new(()),
      gate: RwLock::new(()),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn oracle(&self) -> &O { &self.oracle }

  pub fn matcher(&self) -> &WordMatcher { &self.matcher }

  // ── Caller-facing operations ──────────────────────────────────────────

  /// Translate `text` against today's set for `level` and `target_language`.
  pub async fn translate(
    &self,
    text: &str,
    level: Level,
    target_language: &str,
  ) -> Result<Vec<Translation>> {
    self
      .translate_on(Local::now().date_naive(), text, level, target_language)
      .await
  }

  /// Translate `text` as though `today` were the current date.
  pub async fn translate_on(
    &self,
    today: NaiveDate,
    text: &str,
    level: Level,
    target_language: &str,
  ) -> Result<Vec<Translation>> {
    if text.trim().is_empty() {
      return Err(Error::Validation("no text provided".into()));
    }
    let target_language = target_language.trim();
    if target_language.is_empty() {
      return Err(Error::Validation("no target language provided".into()));
    }

    let key = ActiveSetMetadata::new(today, target_language, level);
    if let Err(e) = self.ensure_fresh(&key).await {
      let serve_stale = e.is_rotation_failure()
        && self.config.on_rotation_failure == RotationFailurePolicy::ServeStale
        && self.current_metadata().await?.is_some();
      if !serve_stale {
        return Err(e);
      }
      tracing::warn!(error = %e, "rotation failed; serving previous vocabulary set");
    }

    let words = self.matcher.extract_candidate_words(text);
    if words.is_empty() {
      return Ok(Vec::new());
    }

    let _shared = self.gate.read().await;
    let records = self.store.lookup(&words).await.map_err(Error::storage)?;
    Ok(records.into_iter().map(Translation::from).collect())
  }

  /// Count one exposure of `word`. Returns whether the word is in the
  /// active set.
  pub async fn record_hover(&self, word: &str) -> Result<bool> {
    let word = word.trim();
    if word.is_empty() {
      return Err(Error::Validation("no word provided".into()));
    }

    let _shared = self.gate.read().await;
    self.store.record_hover(word).await.map_err(Error::storage)
  }

  pub async fn stats(&self) -> Result<Stats> {
    let _shared = self.gate.read().await;
    let records = self.store.active_records().await.map_err(Error::storage)?;
    Ok(Stats::compute(&records))
  }

  /// The ledger's entries, ordered by word.
  pub async fn history(&self) -> Result<Vec<HistoricalEntry>> {
    let ledger = self.store.ledger().await.map_err(Error::storage)?;
    Ok(ledger.into_entries())
  }

  pub async fn current_metadata(&self) -> Result<Option<ActiveSetMetadata>> {
    self.store.current_metadata().await.map_err(Error::storage)
  }

  // ── Rotation ──────────────────────────────────────────────────────────

  /// Rotate the active set unless it already matches `key`.
  pub async fn ensure_fresh(&self, key: &ActiveSetMetadata) -> Result<RotationOutcome> {
    if self.current_metadata().await?.as_ref() == Some(key) {
      return Ok(RotationOutcome::Fresh);
    }

    let _rotating = self.rotation.lock().await;

    // Another request may have rotated while we waited for the lock.
    let current = self.current_metadata().await?;
    if current.as_ref() == Some(key) {
      tracing::debug!("vocabulary set rotated by a concurrent request");
      return Ok(RotationOutcome::Fresh);
    }
    let initialised = current.is_some();

    tracing::info!(
      date = %key.generation_date,
      language = %key.target_language,
      level = %key.level,
      initialised,
      "rotating vocabulary set"
    );

    let stored = self.store.ledger().await.map_err(Error::storage)?;
    let (preview, _, _) = self.merge_outgoing(stored.clone(), key, initialised).await?;

    let request = GenerationRequest::new(key.level, &key.target_language, preview.history());
    let raw = match tokio::time::timeout(
      self.config.oracle_timeout,
      self.oracle.generate(&request),
    )
    .await
    {
      Ok(Ok(raw)) => raw,
      Ok(Err(e)) => return Err(Error::OracleUnavailable(Box::new(e))),
      Err(_) => return Err(Error::OracleTimeout(self.config.oracle_timeout)),
    };
    let records = parse_oracle_rows(&raw)?;
    let installed = records.len();

    let _exclusive = self.gate.write().await;
    let (ledger, merge, ledger_reset) = self.merge_outgoing(stored, key, initialised).await?;
    if ledger_reset {
      tracing::warn!(
        language = %key.target_language,
        "target language changed; previous history discarded"
      );
    }
    let ledger_size = ledger.len();
    self
      .store
      .commit_rotation(ledger, records, key.clone())
      .await
      .map_err(Error::storage)?;

    tracing::info!(
      installed,
      ledger_size,
      created = merge.created,
      refreshed = merge.refreshed,
      aged = merge.aged,
      "vocabulary set rotated"
    );
    Ok(RotationOutcome::Rotated { installed, merge, ledger_reset })
  }

  /// Apply the language check and fold the current active set into `ledger`.
  async fn merge_outgoing(
    &self,
    mut ledger: Ledger,
    key: &ActiveSetMetadata,
    initialised: bool,
  ) -> Result<(Ledger, MergeSummary, bool)> {
    let reset = ledger.adopt_language(&key.target_language);
    let merge = if initialised {
      let outgoing = self.store.active_records().await.map_err(Error::storage)?;
      ledger.merge_outgoing(&outgoing)
    } else {
      MergeSummary::default()
    };
    Ok((ledger, merge, reset))
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::VecDeque,
    sync::{
      Mutex as StdMutex,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use super::*;
  use crate::{
    memory::MemoryStore,
    record::VocabularyRecord,
  };

  // ── Scripted oracle ───────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("oracle down: {0}")]
  struct OracleDown(String);

  #[derive(Default)]
  struct ScriptedOracle {
    responses: StdMutex<VecDeque<Result<String, String>>>,
    requests:  StdMutex<Vec<GenerationRequest>>,
    calls:     AtomicUsize,
    delay:     Option<Duration>,
  }

  impl ScriptedOracle {
    fn answering(responses: &[&str]) -> Self {
      Self {
        responses: StdMutex::new(responses.iter().map(|r| Ok(r.to_string())).collect()),
        ..Self::default()
      }
    }

    fn failing(message: &str) -> Self {
      Self {
        responses: StdMutex::new(VecDeque::from([Err(message.to_string())])),
        ..Self::default()
      }
    }

    fn delayed(mut self, delay: Duration) -> Self {
      self.delay = Some(delay);
      self
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    fn last_request(&self) -> GenerationRequest {
      self.requests.lock().unwrap().last().cloned().expect("no request")
    }
  }

  impl WordOracle for ScriptedOracle {
    type Error = OracleDown;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, OracleDown> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.requests.lock().unwrap().push(request.clone());
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      let next = self.responses.lock().unwrap().pop_front();
      next
        .unwrap_or_else(|| Err("script exhausted".into()))
        .map_err(OracleDown)
    }
  }

  // ── Fixtures ──────────────────────────────────────────────────────────

  const FR_SET: &str = "cat,chat,small feline,shah,0\ndog,chien,loyal pet,shee-ahn";

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 14).unwrap() }

  fn yesterday() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 13).unwrap() }

  fn key(date: NaiveDate, language: &str, level: Level) -> ActiveSetMetadata {
    ActiveSetMetadata::new(date, language, level)
  }

  fn record(word: &str, translated: &str, frequency: u32) -> VocabularyRecord {
    let mut r = VocabularyRecord::new(word, translated, "gloss", "say");
    r.frequency = frequency;
    r
  }

  fn engine(store: MemoryStore, oracle: ScriptedOracle) -> Engine<MemoryStore, ScriptedOracle> {
    Engine::new(store, oracle, WordMatcher::new(), EngineConfig::default())
  }

  async fn stale_store(records: Vec<VocabularyRecord>) -> MemoryStore {
    let store = MemoryStore::new();
    store
      .install(records, key(yesterday(), "fr", Level::Beginner))
      .await
      .unwrap();
    store
  }

  // ── Fresh path ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn fresh_set_is_served_without_rotation() {
    let store = MemoryStore::new();
    store
      .install(
        vec![VocabularyRecord::new("hello", "bonjour", "greeting", "bohn-zhoor")],
        key(today(), "fr", Level::Beginner),
      )
      .await
      .unwrap();
    let engine = engine(store, ScriptedOracle::default());

    let out = engine
      .translate_on(today(), "Hello there!", Level::Beginner, "fr")
      .await
      .unwrap();

    assert_eq!(out, vec![Translation {
      original:      "hello".into(),
      translated:    "bonjour".into(),
      meaning:       "greeting".into(),
      pronunciation: "bohn-zhoor".into(),
    }]);
    assert_eq!(engine.oracle().calls(), 0);
  }

  #[tokio::test]
  async fn matching_ignores_case() {
    let store = MemoryStore::new();
    store
      .install(
        vec![VocabularyRecord::new("Hello", "bonjour", "greeting", "bohn-zhoor")],
        key(today(), "fr", Level::Beginner),
      )
      .await
      .unwrap();
    let engine = engine(store, ScriptedOracle::default());

    let out = engine
      .translate_on(today(), "HELLO world", Level::Beginner, "fr")
      .await
      .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].original, "Hello");
  }

  // ── Rotation ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn repeated_requests_rotate_once() {
    let store = stale_store(vec![record("owl", "hibou", 2)]).await;
    let engine = engine(store, ScriptedOracle::answering(&[FR_SET]));

    engine.translate_on(today(), "a cat", Level::Beginner, "fr").await.unwrap();
    let out = engine.translate_on(today(), "a cat", Level::Beginner, "fr").await.unwrap();

    assert_eq!(engine.oracle().calls(), 1);
    assert_eq!(out[0].translated, "chat");
    let owl = engine.store().ledger().await.unwrap().get("owl").cloned().unwrap();
    assert_eq!(owl.frequency, 2);
    assert_eq!(owl.days_since_active, 1);
  }

  #[tokio::test]
  async fn rotation_merges_outgoing_set() {
    let ledger = Ledger::from_entries(Some("fr".into()), [
      HistoricalEntry {
        source_word:       "cat".into(),
        translated:        "chat".into(),
        meaning:           String::new(),
        pronunciation:     String::new(),
        frequency:         3,
        days_since_active: 5,
      },
      HistoricalEntry {
        source_word:       "dog".into(),
        translated:        "chien".into(),
        meaning:           String::new(),
        pronunciation:     String::new(),
        frequency:         4,
        days_since_active: 2,
      },
    ]);
    let store = MemoryStore::with_ledger(ledger);
    store
      .install(
        vec![record("cat", "chat", 2), record("bird", "oiseau", 1)],
        key(yesterday(), "fr", Level::Beginner),
      )
      .await
      .unwrap();
    let engine = engine(store, ScriptedOracle::answering(&[FR_SET]));

    let outcome = engine
      .ensure_fresh(&key(today(), "fr", Level::Beginner))
      .await
      .unwrap();
    assert!(matches!(outcome, RotationOutcome::Rotated { installed: 2, ledger_reset: false, .. }));

    let ledger = engine.store().ledger().await.unwrap();
    let cat = ledger.get("cat").unwrap();
    assert_eq!((cat.frequency, cat.days_since_active), (5, 1));
    let dog = ledger.get("dog").unwrap();
    assert_eq!((dog.frequency, dog.days_since_active), (4, 3));
    let bird = ledger.get("bird").unwrap();
    assert_eq!((bird.frequency, bird.days_since_active), (1, 1));
  }

  #[tokio::test]
  async fn oracle_sees_merged_history_and_level_size() {
    let store = stale_store(vec![record("owl", "hibou", 4)]).await;
    let engine = engine(store, ScriptedOracle::answering(&[FR_SET]));

    engine
      .ensure_fresh(&key(today(), "fr", Level::Intermediate))
      .await
      .unwrap();

    let request = engine.oracle().last_request();
    assert_eq!(request.level, Level::Intermediate);
    assert_eq!(request.word_count, 50);
    assert_eq!(request.target_language, "fr");
    assert_eq!(request.history.len(), 1);
    assert_eq!(request.history[0].word, "owl");
    assert_eq!(request.history[0].frequency, 4);
    assert_eq!(request.history[0].days_since_active, 1);
  }

  #[tokio::test]
  async fn empty_store_rotates_without_merge() {
    let engine = engine(MemoryStore::new(), ScriptedOracle::answering(&[FR_SET]));

    let outcome = engine
      .ensure_fresh(&key(today(), "fr", Level::Beginner))
      .await
      .unwrap();

    assert_eq!(outcome, RotationOutcome::Rotated {
      installed:    2,
      merge:        MergeSummary::default(),
      ledger_reset: false,
    });
    assert!(engine.store().ledger().await.unwrap().is_empty());
    assert_eq!(
      engine.current_metadata().await.unwrap(),
      Some(key(today(), "fr", Level::Beginner))
    );
  }

  #[tokio::test]
  async fn generated_frequency_is_forced_to_zero() {
    let engine = engine(
      MemoryStore::new(),
      ScriptedOracle::answering(&["cat,chat,small feline,shah,9"]),
    );
    engine
      .ensure_fresh(&key(today(), "fr", Level::Beginner))
      .await
      .unwrap();

    let records = engine.store().active_records().await.unwrap();
    assert_eq!(records[0].frequency, 0);
  }

  #[tokio::test]
  async fn language_switch_resets_ledger() {
    let ledger = Ledger::from_entries(Some("fr".into()), [HistoricalEntry {
      source_word:       "old".into(),
      translated:        "vieux".into(),
      meaning:           String::new(),
      pronunciation:     String::new(),
      frequency:         9,
      days_since_active: 1,
    }]);
    let store = MemoryStore::with_ledger(ledger);
    store
      .install(vec![record("cat", "chat", 1)], key(today(), "fr", Level::Beginner))
      .await
      .unwrap();
    let engine = engine(
      store,
      ScriptedOracle::answering(&["cat,gato,small feline,GAH-toh"]),
    );

    let outcome = engine
      .ensure_fresh(&key(today(), "es", Level::Beginner))
      .await
      .unwrap();
    assert!(matches!(outcome, RotationOutcome::Rotated { ledger_reset: true, .. }));

    let ledger = engine.store().ledger().await.unwrap();
    assert_eq!(ledger.language(), Some("es"));
    assert!(ledger.get("old").is_none());
    assert_eq!(ledger.get("cat").unwrap().frequency, 1);
    assert_eq!(engine.oracle().last_request().history.len(), 1);
  }

  #[tokio::test]
  async fn concurrent_requests_share_one_rotation() {
    let oracle = ScriptedOracle::answering(&[FR_SET, FR_SET])
      .delayed(Duration::from_millis(50));
    let engine = engine(stale_store(vec![record("owl", "hibou", 1)]).await, oracle);

    let (a, b) = tokio::join!(
      engine.translate_on(today(), "cat", Level::Beginner, "fr"),
      engine.translate_on(today(), "dog", Level::Beginner, "fr"),
    );

    assert_eq!(a.unwrap()[0].translated, "chat");
    assert_eq!(b.unwrap()[0].translated, "chien");
    assert_eq!(engine.oracle().calls(), 1);
    let owl = engine.store().ledger().await.unwrap().get("owl").cloned().unwrap();
    assert_eq!(owl.frequency, 1);
  }

  #[tokio::test]
  async fn hover_during_oracle_call_reaches_ledger() {
    let oracle = ScriptedOracle::answering(&[FR_SET]).delayed(Duration::from_millis(80));
    let engine = engine(stale_store(vec![record("owl", "hibou", 0)]).await, oracle);
    let today_fr = key(today(), "fr", Level::Beginner);

    let (rotation, hovered) = tokio::join!(
      engine.ensure_fresh(&today_fr),
      async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.record_hover("owl").await
      },
    );

    rotation.unwrap();
    assert!(hovered.unwrap());
    let owl = engine.store().ledger().await.unwrap().get("owl").cloned().unwrap();
    assert_eq!(owl.frequency, 1);
  }

  // ── Rotation failures ─────────────────────────────────────────────────

  #[tokio::test]
  async fn failed_oracle_serves_previous_set() {
    let store = stale_store(vec![record("owl", "hibou", 0)]).await;
    let engine = engine(store, ScriptedOracle::failing("503"));

    let out = engine
      .translate_on(today(), "an owl", Level::Beginner, "fr")
      .await
      .unwrap();

    assert_eq!(out[0].translated, "hibou");
    assert_eq!(
      engine.current_metadata().await.unwrap(),
      Some(key(yesterday(), "fr", Level::Beginner))
    );
    assert!(engine.store().ledger().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn fail_policy_surfaces_oracle_error() {
    let store = stale_store(vec![record("owl", "hibou", 0)]).await;
    let engine = Engine::new(
      store,
      ScriptedOracle::failing("503"),
      WordMatcher::new(),
      EngineConfig {
        on_rotation_failure: RotationFailurePolicy::Fail,
        ..EngineConfig::default()
      },
    );

    let err = engine
      .translate_on(today(), "an owl", Level::Beginner, "fr")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::OracleUnavailable(_)));
  }

  #[tokio::test]
  async fn failure_on_empty_store_is_surfaced() {
    let engine = engine(MemoryStore::new(), ScriptedOracle::failing("503"));

    let err = engine
      .translate_on(today(), "cat", Level::Beginner, "fr")
      .await
      .unwrap_err();
    assert!(err.is_rotation_failure());
    assert_eq!(engine.current_metadata().await.unwrap(), None);
  }

  #[tokio::test]
  async fn unparseable_answer_installs_nothing() {
    let store = stale_store(vec![record("owl", "hibou", 3)]).await;
    let engine = engine(store, ScriptedOracle::answering(&["I'm sorry"]));

    let err = engine
      .ensure_fresh(&key(today(), "fr", Level::Beginner))
      .await
      .unwrap_err();

    assert!(matches!(err, Error::OracleParse(_)));
    let records = engine.store().active_records().await.unwrap();
    assert_eq!(records, vec![record("owl", "hibou", 3)]);
    assert!(engine.store().ledger().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn slow_oracle_times_out() {
    let oracle = ScriptedOracle::answering(&[FR_SET]).delayed(Duration::from_secs(5));
    let engine = Engine::new(
      MemoryStore::new(),
      oracle,
      WordMatcher::new(),
      EngineConfig {
        oracle_timeout: Duration::from_millis(20),
        ..EngineConfig::default()
      },
    );

    let err = engine
      .ensure_fresh(&key(today(), "fr", Level::Beginner))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::OracleTimeout(_)));
    assert_eq!(engine.current_metadata().await.unwrap(), None);
  }

  // ── Validation, hover, stats ──────────────────────────────────────────

  #[tokio::test]
  async fn empty_inputs_are_rejected_without_rotation() {
    let engine = engine(MemoryStore::new(), ScriptedOracle::answering(&[FR_SET]));

    let err = engine
      .translate_on(today(), "   ", Level::Beginner, "fr")
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(matches!(engine.record_hover("").await, Err(Error::Validation(_))));
    assert_eq!(engine.oracle().calls(), 0);
  }

  #[tokio::test]
  async fn hovers_accumulate_case_insensitively() {
    let store = stale_store(vec![record("cat", "chat", 0)]).await;
    let engine = engine(store, ScriptedOracle::default());

    assert!(engine.record_hover("Cat").await.unwrap());
    assert!(engine.record_hover("cat").await.unwrap());
    assert!(!engine.record_hover("zebra").await.unwrap());

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.total_hovers, 2);
    assert_eq!(stats.max_frequency, 2);
    assert_eq!(stats.most_common_word.as_deref(), Some("cat"));
    assert_eq!(stats.learning_progress, 100.0);
  }

  #[tokio::test]
  async fn stats_on_empty_store() {
    let engine = engine(MemoryStore::new(), ScriptedOracle::default());
    assert_eq!(engine.stats().await.unwrap(), Stats::default());
  }
}
