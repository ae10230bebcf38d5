//! Summary metrics over the current active set.

use serde::{Deserialize, Serialize};

use crate::record::VocabularyRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
  pub total_words:         usize,
  /// Records hovered at least once.
  pub words_learned_today: usize,
  pub total_hovers:        u64,
  /// The first record reaching `max_frequency`; `None` while nothing has
  /// been hovered.
  pub most_common_word:    Option<String>,
  /// Percentage of words learned, rounded to one decimal with ties to even.
  pub learning_progress:   f64,
  pub max_frequency:       u32,
}

impl Stats {
  pub fn compute(records: &[VocabularyRecord]) -> Self {
    let mut stats = Self {
      total_words: records.len(),
      ..Self::default()
    };

    for record in records {
      stats.total_hovers += u64::from(record.frequency);
      if record.frequency > 0 {
        stats.words_learned_today += 1;
      }
      if record.frequency > stats.max_frequency {
        stats.max_frequency = record.frequency;
        stats.most_common_word = Some(record.source_word.clone());
      }
    }

    if stats.total_words > 0 {
      let ratio = stats.words_learned_today as f64 / stats.total_words as f64;
      stats.learning_progress = (ratio * 1000.0).round_ties_even() / 10.0;
    }
    stats
  }
}
