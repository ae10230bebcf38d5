//! Word matcher: pulls candidate vocabulary tokens out of free text.
//!
//! Pipeline:
//!   raw text
//!     └─ markup tags            → space
//!          └─ non-word, non-space chars → space
//!               └─ ASCII alphabetic runs of ≥ 3 letters, lowercased
//!                    └─ optional stop-word exclusion → set

use std::collections::HashSet;

use regex::Regex;

/// Common English function words, for callers that opt into filtering.
pub const COMMON_STOP_WORDS: &[&str] = &[
  "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had",
  "her", "was", "one", "our", "out", "has", "his", "how", "its", "may", "who",
  "did", "yes", "she", "him", "let", "say", "too", "use", "that", "with",
  "have", "this", "will", "your", "from", "they", "been", "were", "said",
  "each", "which", "their", "what", "there", "when", "then", "them", "these",
  "some", "would", "into", "than", "more", "also", "just", "only", "very",
  "over", "such", "about", "could", "should", "other",
];

/// Extracts lowercase candidate words from text.
///
/// The default matcher keeps every token. Stop-word exclusion is opt-in so
/// that an incomplete list never silently hides learnable words.
#[derive(Debug, Clone)]
pub struct WordMatcher {
  tags:       Regex,
  separators: Regex,
  words:      Regex,
  stop_words: HashSet<String>,
}

impl Default for WordMatcher {
  fn default() -> Self { Self::new() }
}

impl WordMatcher {
  pub fn new() -> Self {
    Self {
      tags:       Regex::new(r"<[^>]+>").expect("static regex"),
      separators: Regex::new(r"[^\w\s]").expect("static regex"),
      words:      Regex::new(r"\b[a-zA-Z]{3,}\b").expect("static regex"),
      stop_words: HashSet::new(),
    }
  }

  /// A matcher that excludes `words` (compared case-insensitively).
  pub fn with_stop_words<I, W>(words: I) -> Self
  where
    I: IntoIterator<Item = W>,
    W: AsRef<str>,
  {
    let mut matcher = Self::new();
    matcher.stop_words = words
      .into_iter()
      .map(|w| w.as_ref().to_lowercase())
      .collect();
    matcher
  }

  /// A matcher that excludes [`COMMON_STOP_WORDS`].
  pub fn with_common_stop_words() -> Self {
    Self::with_stop_words(COMMON_STOP_WORDS)
  }

  pub fn filters_stop_words(&self) -> bool { !self.stop_words.is_empty() }

  pub fn extract_candidate_words(&self, text: &str) -> HashSet<String> {
    let untagged = self.tags.replace_all(text, " ");
    let separated = self.separators.replace_all(&untagged, " ");

    self
      .words
      .find_iter(&separated)
      .map(|m| m.as_str().to_lowercase())
      .filter(|w| !self.stop_words.contains(w))
      .collect()
  }
}
