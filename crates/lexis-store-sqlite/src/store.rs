//! [`SqliteStore`]: the SQLite implementation of [`VocabStore`].

use std::{collections::HashSet, path::Path};

use lexis_core::{
  ledger::Ledger,
  record::{ActiveSetMetadata, VocabularyRecord, word_key},
  store::VocabStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{
    RawEntry, RawMetadata, RawRecord, encode_count, encode_date, encode_level,
  },
  schema::SCHEMA,
};

const SELECT_ACTIVE: &str = "SELECT source_word, translated, meaning, pronunciation,
                                    frequency, word_type
                             FROM active_words";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Lexis vocabulary store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
  Ok(RawRecord {
    source_word:   row.get(0)?,
    translated:    row.get(1)?,
    meaning:       row.get(2)?,
    pronunciation: row.get(3)?,
    frequency:     row.get(4)?,
    word_type:     row.get(5)?,
  })
}

/// Replace the active set and its metadata. Callers wrap this in a
/// transaction.
fn write_active_set(
  conn: &rusqlite::Connection,
  records: &[VocabularyRecord],
  date: &str,
  language: &str,
  level: &str,
) -> rusqlite::Result<()> {
  conn.execute("DELETE FROM active_words", [])?;

  let mut stmt = conn.prepare(
    "INSERT INTO active_words (
       position, word_key, source_word, translated, meaning,
       pronunciation, frequency, word_type
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
  )?;
  for (position, r) in records.iter().enumerate() {
    stmt.execute(rusqlite::params![
      position as i64,
      word_key(&r.source_word),
      r.source_word,
      r.translated,
      r.meaning,
      r.pronunciation,
      i64::from(r.frequency),
      r.word_type,
    ])?;
  }

  conn.execute(
    "INSERT INTO active_meta (id, generation_date, target_language, level)
     VALUES (1, ?1, ?2, ?3)
     ON CONFLICT (id) DO UPDATE SET
       generation_date = excluded.generation_date,
       target_language = excluded.target_language,
       level           = excluded.level",
    rusqlite::params![date, language, level],
  )?;
  Ok(())
}

/// Upsert every ledger entry, dropping stored history first if it belongs to
/// another language. Callers wrap this in a transaction.
fn write_ledger(conn: &rusqlite::Connection, ledger: &Ledger) -> rusqlite::Result<()> {
  let stored_language: Option<String> = conn
    .query_row("SELECT language FROM ledger_meta WHERE id = 1", [], |r| r.get(0))
    .optional()?
    .flatten();

  if stored_language.is_some() && stored_language.as_deref() != ledger.language() {
    conn.execute("DELETE FROM ledger", [])?;
  }

  conn.execute(
    "INSERT INTO ledger_meta (id, language) VALUES (1, ?1)
     ON CONFLICT (id) DO UPDATE SET language = excluded.language",
    rusqlite::params![ledger.language()],
  )?;

  let mut stmt = conn.prepare(
    "INSERT INTO ledger (
       word_key, source_word, translated, meaning, pronunciation,
       frequency, days_since_active
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
     ON CONFLICT (word_key) DO UPDATE SET
       source_word       = excluded.source_word,
       translated        = excluded.translated,
       meaning           = excluded.meaning,
       pronunciation     = excluded.pronunciation,
       frequency         = excluded.frequency,
       days_since_active = excluded.days_since_active",
  )?;
  for e in ledger.entries() {
    stmt.execute(rusqlite::params![
      e.key(),
      e.source_word,
      e.translated,
      e.meaning,
      e.pronunciation,
      encode_count(e.frequency),
      i64::from(e.days_since_active),
    ])?;
  }
  Ok(())
}

// ─── VocabStore impl ─────────────────────────────────────────────────────────

impl VocabStore for SqliteStore {
  type Error = crate::Error;

  // ── Active set ────────────────────────────────────────────────────────────

  async fn current_metadata(&self) -> Result<Option<ActiveSetMetadata>> {
    let raw: Option<RawMetadata> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT generation_date, target_language, level
             FROM active_meta WHERE id = 1",
            [],
            |row| {
              Ok(RawMetadata {
                generation_date: row.get(0)?,
                target_language: row.get(1)?,
                level:           row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMetadata::into_metadata).transpose()
  }

  async fn active_records(&self) -> Result<Vec<VocabularyRecord>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("{SELECT_ACTIVE} ORDER BY position"))?;
        let rows = stmt
          .query_map([], read_record)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn lookup(&self, words: &HashSet<String>) -> Result<Vec<VocabularyRecord>> {
    if words.is_empty() {
      return Ok(Vec::new());
    }
    let keys: Vec<String> = words.iter().map(|w| word_key(w)).collect();

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; keys.len()].join(", ");
        let sql = format!(
          "{SELECT_ACTIVE} WHERE word_key IN ({placeholders}) ORDER BY position"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(keys.iter()), read_record)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn record_hover(&self, word: &str) -> Result<bool> {
    let key = word_key(word);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE active_words SET frequency = frequency + 1 WHERE word_key = ?1",
          rusqlite::params![key],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn install(
    &self,
    records: Vec<VocabularyRecord>,
    metadata: ActiveSetMetadata,
  ) -> Result<()> {
    let date = encode_date(metadata.generation_date);
    let level = encode_level(metadata.level);
    let language = metadata.target_language;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_active_set(&tx, &records, &date, &language, level)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn ledger(&self) -> Result<Ledger> {
    let (language, raws): (Option<String>, Vec<RawEntry>) = self
      .conn
      .call(|conn| {
        let language: Option<String> = conn
          .query_row("SELECT language FROM ledger_meta WHERE id = 1", [], |r| r.get(0))
          .optional()?
          .flatten();

        let mut stmt = conn.prepare(
          "SELECT source_word, translated, meaning, pronunciation,
                  frequency, days_since_active
           FROM ledger",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawEntry {
              source_word:       row.get(0)?,
              translated:        row.get(1)?,
              meaning:           row.get(2)?,
              pronunciation:     row.get(3)?,
              frequency:         row.get(4)?,
              days_since_active: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((language, rows))
      })
      .await?;

    let entries = raws
      .into_iter()
      .map(RawEntry::into_entry)
      .collect::<Result<Vec<_>>>()?;
    Ok(Ledger::from_entries(language, entries))
  }

  async fn commit_rotation(
    &self,
    ledger: Ledger,
    records: Vec<VocabularyRecord>,
    metadata: ActiveSetMetadata,
  ) -> Result<()> {
    let date = encode_date(metadata.generation_date);
    let level = encode_level(metadata.level);
    let language = metadata.target_language;
    let (entries, words) = (ledger.len(), records.len());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_ledger(&tx, &ledger)?;
        write_active_set(&tx, &records, &date, &language, level)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(entries, words, "rotation committed to sqlite");
    Ok(())
  }
}
