use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use reaction_core::model::{
    QuestionBank, ReactionDetails, ReactionRecord, ScoreHistoryEntry, SessionSettings,
};
use reaction_core::scoring::{self, AnswerSheet};
use storage::repository::{HistoryLog, ScoreStore};
use tracing::{debug, info, warn};

use super::countdown::{Countdown, CountdownTick};
use super::view::{
    PersistenceWarning, Scoreboard, SessionPhase, SubmissionResult, TickOutcome,
};
use crate::Clock;
use crate::error::SessionError;

//
// ─── SESSION CONTROLLER ────────────────────────────────────────────────────────
//

/// Runs rounds against a question bank and keeps score.
///
/// Every mutating operation takes `&mut self`, so a tick and a submission can
/// never run at the same time. A submission also stops the countdown before
/// touching the score, which turns any tick delivered late into a no-op.
pub struct SessionController {
    bank: Arc<QuestionBank>,
    scores: Arc<dyn ScoreStore>,
    history: Arc<dyn HistoryLog>,
    clock: Clock,
    rng: StdRng,
    current: Option<usize>,
    score: u32,
    high_score: u32,
    countdown: Countdown,
}

impl SessionController {
    /// Build an idle controller, reading the persisted high score.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the high score cannot be read.
    pub async fn load(
        bank: Arc<QuestionBank>,
        scores: Arc<dyn ScoreStore>,
        history: Arc<dyn HistoryLog>,
        clock: Clock,
        settings: SessionSettings,
    ) -> Result<Self, SessionError> {
        let high_score = scores.load_high_score().await?;
        info!(high_score, records = bank.len(), "session loaded");

        Ok(Self {
            bank,
            scores,
            history,
            clock,
            rng: StdRng::from_os_rng(),
            current: None,
            score: 0,
            high_score,
            countdown: Countdown::new(settings.round_seconds()),
        })
    }

    /// Replace the random source (usually a seeded one for deterministic tests).
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.current.is_some() {
            SessionPhase::AwaitingAnswer
        } else {
            SessionPhase::Idle
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn is_countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    #[must_use]
    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard {
            score: self.score,
            high_score: self.high_score,
            seconds_remaining: self.countdown.remaining(),
            phase: self.phase(),
        }
    }

    #[must_use]
    pub fn current_record(&self) -> Option<&ReactionRecord> {
        self.current.and_then(|index| self.bank.get(index))
    }

    #[must_use]
    pub fn current_prompt(&self) -> Option<String> {
        self.current_record().map(ReactionRecord::prompt)
    }

    fn active_record(&self) -> Result<&ReactionRecord, SessionError> {
        self.current_record().ok_or(SessionError::NoActiveRound)
    }

    /// Pick a new reaction and restart the countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bank` if the bank is empty.
    pub fn start_round(&mut self) -> Result<&ReactionRecord, SessionError> {
        let index = self.bank.pick_random_index(&mut self.rng)?;
        self.current = Some(index);
        self.countdown.restart();

        let record = self.active_record()?;
        debug!(index, prompt = %record.prompt(), "round started");
        Ok(record)
    }

    /// Move on to another reaction without grading the current one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bank` if the bank is empty.
    pub fn skip_round(&mut self) -> Result<&ReactionRecord, SessionError> {
        debug!(score = self.score, "round skipped");
        self.start_round()
    }

    /// Advance the countdown by one second.
    ///
    /// On the tick that reaches zero the score drops to 0 and a new round begins.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bank` if a new round cannot be started.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        match self.countdown.tick() {
            CountdownTick::Stopped => Ok(TickOutcome::Ignored),
            CountdownTick::Running(seconds_remaining) => {
                Ok(TickOutcome::Running { seconds_remaining })
            }
            CountdownTick::Elapsed => {
                let lost = self.score;
                self.score = 0;
                info!(lost, high_score = self.high_score, "round timed out, score reset");
                self.start_round()?;
                Ok(TickOutcome::Expired {
                    scoreboard: self.scoreboard(),
                })
            }
        }
    }

    /// Grade an answer for the active reaction, update scores, log the attempt,
    /// and start the next round.
    ///
    /// Failed writes do not fail the submission; they are logged and returned
    /// in `SubmissionResult::warnings`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRound` before the first round, or
    /// `SessionError::Bank` if the next round cannot be started.
    pub async fn submit_answer(
        &mut self,
        products: &str,
        reaction_type: &str,
        conditions: &str,
    ) -> Result<SubmissionResult, SessionError> {
        if self.current.is_none() {
            return Err(SessionError::NoActiveRound);
        }
        self.countdown.stop();

        let (grade, correct_products, correct_type, correct_conditions) = {
            let record = self.active_record()?;
            let grade = scoring::grade(
                record,
                &AnswerSheet::new(products, reaction_type, conditions),
            );
            (
                grade,
                scoring::normalize(record.products()),
                scoring::normalize(record.reaction_type()),
                scoring::normalize(record.conditions()),
            )
        };

        let mut warnings = Vec::new();
        let mut new_high_score = false;

        if grade.points > 0 {
            self.score = self.score.saturating_add(grade.points);
            if self.score > self.high_score {
                self.high_score = self.score;
                new_high_score = true;
                info!(high_score = self.high_score, "new high score");
                if let Err(err) = self.scores.save_high_score(self.high_score).await {
                    warn!(error = %err, high_score = self.high_score, "failed to persist high score");
                    warnings.push(PersistenceWarning::HighScore {
                        message: err.to_string(),
                    });
                }
            }
        } else {
            self.score = 0;
        }

        let entry = ScoreHistoryEntry::new(self.clock.now(), self.score, grade.correct_count);
        if let Err(err) = self.history.append_history(&entry).await {
            warn!(error = %err, "failed to append score history");
            warnings.push(PersistenceWarning::History {
                message: err.to_string(),
            });
        }

        info!(
            correct = grade.correct_count.value(),
            points = grade.points,
            score = self.score,
            "answer graded"
        );

        self.start_round()?;

        Ok(SubmissionResult {
            correct_count: grade.correct_count,
            points: grade.points,
            score: self.score,
            high_score: self.high_score,
            new_high_score,
            correct_products,
            correct_type,
            correct_conditions,
            entry,
            warnings,
        })
    }

    /// The active reaction's notes, or a fixed fallback.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRound` before the first round.
    pub fn hint(&self) -> Result<&str, SessionError> {
        Ok(self.active_record()?.hint())
    }

    /// # Errors
    ///
    /// Returns `SessionError::NoActiveRound` before the first round.
    pub fn details(&self) -> Result<ReactionDetails, SessionError> {
        Ok(self.active_record()?.details())
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("bank_len", &self.bank.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("high_score", &self.high_score)
            .field("countdown", &self.countdown)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
