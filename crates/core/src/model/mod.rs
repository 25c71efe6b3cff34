mod attempt;
mod bank;
mod reaction;
mod settings;

pub use attempt::{AttemptError, CorrectCount, ScoreHistoryEntry};
pub use bank::{BankError, QuestionBank};
pub use reaction::{
    NO_HINT_TEXT, NO_NOTES_TEXT, ReactionDetails, ReactionDraft, ReactionError, ReactionField,
    ReactionRecord,
};
pub use settings::{DEFAULT_ROUND_SECONDS, SessionSettings, SettingsError};
