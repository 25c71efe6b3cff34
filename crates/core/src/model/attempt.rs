use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error("correct field count must be 0-3, got {0}")]
    InvalidCorrectCount(u8),
}

//
// ─── CORRECT COUNT ────────────────────────────────────────────────────────────
//

/// How many of the three answer fields matched the active reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CorrectCount(u8);

impl CorrectCount {
    pub const MAX: u8 = 3;

    /// # Errors
    ///
    /// Returns `AttemptError::InvalidCorrectCount` if the value is above 3.
    pub fn new(value: u8) -> Result<Self, AttemptError> {
        if value > Self::MAX {
            return Err(AttemptError::InvalidCorrectCount(value));
        }
        Ok(Self(value))
    }

    /// Count `true` flags among the three field matches.
    #[must_use]
    pub fn from_matches(matches: [bool; 3]) -> Self {
        let count = matches.iter().filter(|matched| **matched).count();
        // At most three flags, so this always fits.
        Self(u8::try_from(count).unwrap_or(Self::MAX))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_perfect(self) -> bool {
        self.0 == Self::MAX
    }
}

//
// ─── HISTORY ENTRY ────────────────────────────────────────────────────────────
//

/// One line of the append-only score history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreHistoryEntry {
    recorded_at: DateTime<Utc>,
    score: u32,
    correct_fields: CorrectCount,
}

impl ScoreHistoryEntry {
    #[must_use]
    pub fn new(recorded_at: DateTime<Utc>, score: u32, correct_fields: CorrectCount) -> Self {
        Self {
            recorded_at,
            score,
            correct_fields,
        }
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn correct_fields(&self) -> CorrectCount {
        self.correct_fields
    }

    /// ISO-8601 timestamp as written to the history store.
    #[must_use]
    pub fn timestamp_iso(&self) -> String {
        self.recorded_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}
