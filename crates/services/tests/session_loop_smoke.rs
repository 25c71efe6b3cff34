use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use reaction_core::model::{
    QuestionBank, ReactionDraft, ReactionRecord, ScoreHistoryEntry, SessionSettings,
};
use reaction_core::time::fixed_clock;
use services::{
    PersistenceWarning, SessionController, SessionPhase, SubmissionOutcome, TickOutcome,
};
use storage::repository::{HistoryLog, InMemoryRepository, ScoreStore, StorageError};

fn water() -> ReactionRecord {
    ReactionDraft {
        element_a: "H2".into(),
        element_b: "O2".into(),
        products: "H2O".into(),
        reaction_type: "Synthesis".into(),
        conditions: "Spark".into(),
        reaction_equation: None,
        notes: Some("n/a".into()),
    }
    .validate()
    .unwrap()
}

/// Score store that counts writes and can be told to fail them.
#[derive(Default)]
struct RecordingScores {
    initial: u32,
    saved: Mutex<Vec<u32>>,
    fail_writes: bool,
}

#[async_trait]
impl ScoreStore for RecordingScores {
    async fn load_high_score(&self) -> Result<u32, StorageError> {
        Ok(self.initial)
    }

    async fn save_high_score(&self, value: u32) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.saved.lock().unwrap().push(value);
        Ok(())
    }
}

/// History log whose appends always fail.
#[derive(Default)]
struct BrokenHistory {
    attempts: AtomicUsize,
}

#[async_trait]
impl HistoryLog for BrokenHistory {
    async fn append_history(&self, _entry: &ScoreHistoryEntry) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Io(std::io::Error::other("read-only file system")))
    }

    async fn list_history(&self, _limit: usize) -> Result<Vec<ScoreHistoryEntry>, StorageError> {
        Ok(Vec::new())
    }
}

async fn session_with(
    scores: Arc<dyn ScoreStore>,
    history: Arc<dyn HistoryLog>,
) -> SessionController {
    SessionController::load(
        Arc::new(QuestionBank::new(vec![water()])),
        scores,
        history,
        fixed_clock(),
        SessionSettings::default(),
    )
    .await
    .unwrap()
    .with_rng(StdRng::seed_from_u64(11))
}

#[tokio::test]
async fn full_then_wrong_answer_scores_and_resets() {
    let repo = InMemoryRepository::new();
    let mut session = session_with(Arc::new(repo.clone()), Arc::new(repo.clone())).await;

    let record = session.start_round().unwrap();
    assert_eq!(record.prompt(), "H2 + O2 = ?");

    let first = session
        .submit_answer("h2o", "synthesis", "spark")
        .await
        .unwrap();
    assert_eq!(first.correct_count.value(), 3);
    assert_eq!(first.points, 30);
    assert_eq!(first.score, 30);
    assert_eq!(first.outcome(), SubmissionOutcome::Correct);
    assert_eq!(session.score(), 30);

    let second = session
        .submit_answer("wrong", "wrong", "wrong")
        .await
        .unwrap();
    assert_eq!(second.correct_count.value(), 0);
    assert_eq!(second.points, 0);
    assert_eq!(second.score, 0);
    assert_eq!(second.outcome(), SubmissionOutcome::Incorrect);
    assert_eq!(session.high_score(), 30);

    let history = repo.history_snapshot().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].score(), 30);
    assert_eq!(history[1].correct_fields().value(), 0);
}

#[tokio::test]
async fn comparison_is_case_and_whitespace_insensitive() {
    let repo = InMemoryRepository::new();
    let mut session = session_with(Arc::new(repo.clone()), Arc::new(repo)).await;
    session.start_round().unwrap();

    let result = session
        .submit_answer(" H2O ", "  SYNTHESIS", "spark\t")
        .await
        .unwrap();
    assert_eq!(result.correct_count.value(), 3);
}

#[tokio::test]
async fn partial_credit_accumulates() {
    let repo = InMemoryRepository::new();
    let mut session = session_with(Arc::new(repo.clone()), Arc::new(repo)).await;
    session.start_round().unwrap();

    let one = session.submit_answer("h2o", "x", "x").await.unwrap();
    assert_eq!((one.points, one.score), (10, 10));
    let two = session.submit_answer("h2o", "synthesis", "x").await.unwrap();
    assert_eq!((two.points, two.score), (20, 30));
}

#[tokio::test]
async fn high_score_is_written_once_per_qualifying_submission() {
    let scores = Arc::new(RecordingScores {
        initial: 50,
        ..RecordingScores::default()
    });
    let repo = InMemoryRepository::new();
    let mut session = session_with(scores.clone(), Arc::new(repo)).await;
    session.start_round().unwrap();

    // 30, then 40: neither beats 50.
    session.submit_answer("h2o", "synthesis", "spark").await.unwrap();
    let below = session.submit_answer("h2o", "x", "x").await.unwrap();
    assert_eq!(below.score, 40);
    assert_eq!(below.high_score, 50);
    assert!(!below.new_high_score);
    assert!(scores.saved.lock().unwrap().is_empty());

    // 70, then 100: two qualifying submissions, two writes.
    let above = session.submit_answer("h2o", "synthesis", "spark").await.unwrap();
    assert!(above.new_high_score);
    session.submit_answer("h2o", "synthesis", "spark").await.unwrap();

    assert_eq!(*scores.saved.lock().unwrap(), vec![70, 100]);
    assert_eq!(session.high_score(), 100);
}

#[tokio::test]
async fn sixty_ticks_reset_score_and_start_new_round() {
    let repo = InMemoryRepository::new();
    let mut session = session_with(Arc::new(repo.clone()), Arc::new(repo)).await;
    session.start_round().unwrap();
    session.submit_answer("h2o", "synthesis", "x").await.unwrap();
    assert_eq!(session.score(), 20);

    for _ in 0..59 {
        assert!(matches!(
            session.tick().unwrap(),
            TickOutcome::Running { .. }
        ));
    }
    assert_eq!(session.score(), 20);

    let outcome = session.tick().unwrap();
    assert!(matches!(outcome, TickOutcome::Expired { .. }));
    assert_eq!(session.score(), 0);
    assert_eq!(session.seconds_remaining(), 60);
    assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
}

#[tokio::test]
async fn every_submission_logs_one_valid_entry() {
    let repo = InMemoryRepository::new();
    let mut session = session_with(Arc::new(repo.clone()), Arc::new(repo.clone())).await;
    session.start_round().unwrap();

    let answers = [
        ("h2o", "synthesis", "spark"),
        ("h2o", "nope", "nope"),
        ("", "", ""),
        ("H2O", "Synthesis", "nope"),
    ];
    for (i, (p, t, c)) in answers.into_iter().enumerate() {
        session.submit_answer(p, t, c).await.unwrap();
        assert_eq!(repo.history_snapshot().unwrap().len(), i + 1);
    }

    for entry in repo.history_snapshot().unwrap() {
        assert!(entry.correct_fields().value() <= 3);
        assert!(DateTime::parse_from_rfc3339(&entry.timestamp_iso()).is_ok());
    }
}

#[tokio::test]
async fn failed_writes_warn_but_do_not_block_next_round() {
    let scores = Arc::new(RecordingScores {
        fail_writes: true,
        ..RecordingScores::default()
    });
    let history = Arc::new(BrokenHistory::default());
    let mut session = session_with(scores, history.clone()).await;
    session.start_round().unwrap();

    let result = session
        .submit_answer("h2o", "synthesis", "spark")
        .await
        .unwrap();

    assert_eq!(result.score, 30);
    assert_eq!(result.high_score, 30);
    assert_eq!(result.warnings.len(), 2);
    assert!(matches!(
        result.warnings[0],
        PersistenceWarning::HighScore { .. }
    ));
    assert!(matches!(result.warnings[1], PersistenceWarning::History { .. }));
    assert_eq!(history.attempts.load(Ordering::SeqCst), 1);

    assert_eq!(session.phase(), SessionPhase::AwaitingAnswer);
    assert!(session.is_countdown_running());
    assert_eq!(session.high_score(), 30);
}
