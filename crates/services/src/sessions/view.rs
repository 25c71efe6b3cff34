use std::fmt;

use reaction_core::model::{CorrectCount, ScoreHistoryEntry};

/// Where the session is in its round cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No round has started yet.
    Idle,
    /// A reaction is active and the player may answer.
    AwaitingAnswer,
}

/// Score readout for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u32,
    pub high_score: u32,
    pub seconds_remaining: u32,
    pub phase: SessionPhase,
}

impl Scoreboard {
    #[must_use]
    pub fn time_left_label(&self) -> String {
        format!("Time Left: {}s", self.seconds_remaining)
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {} | High Score: {}", self.score, self.high_score)
    }
}

/// A write that failed during a submission. Gameplay continued regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceWarning {
    HighScore { message: String },
    History { message: String },
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceWarning::HighScore { message } => {
                write!(f, "high score was not saved: {message}")
            }
            PersistenceWarning::History { message } => {
                write!(f, "attempt was not logged: {message}")
            }
        }
    }
}

/// Coarse result, used to pick a success or failure cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Correct,
    Incorrect,
}

/// Everything a caller needs to render feedback for one submission.
///
/// The expected answers are always revealed, normalized the same way the
/// comparison saw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub correct_count: CorrectCount,
    pub points: u32,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub correct_products: String,
    pub correct_type: String,
    pub correct_conditions: String,
    pub entry: ScoreHistoryEntry,
    pub warnings: Vec<PersistenceWarning>,
}

impl SubmissionResult {
    #[must_use]
    pub fn outcome(&self) -> SubmissionOutcome {
        if self.points > 0 {
            SubmissionOutcome::Correct
        } else {
            SubmissionOutcome::Incorrect
        }
    }
}

/// What a single countdown tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown was stopped or no round is active.
    Ignored,
    Running { seconds_remaining: u32 },
    /// Time ran out: the score was reset and a new round started.
    Expired { scoreboard: Scoreboard },
}
