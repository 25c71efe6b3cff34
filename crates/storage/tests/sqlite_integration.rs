use chrono::Duration;
use reaction_core::model::{CorrectCount, ScoreHistoryEntry};
use reaction_core::time::fixed_now;
use storage::repository::{HistoryLog, ScoreStore, Storage};
use storage::sqlite::SqliteRepository;

fn entry(offset_secs: i64, score: u32, correct: u8) -> ScoreHistoryEntry {
    ScoreHistoryEntry::new(
        fixed_now() + Duration::seconds(offset_secs),
        score,
        CorrectCount::new(correct).unwrap(),
    )
}

#[tokio::test]
async fn sqlite_high_score_starts_at_zero_and_overwrites() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_high_score?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.load_high_score().await.unwrap(), 0);

    repo.save_high_score(30).await.unwrap();
    repo.save_high_score(90).await.unwrap();
    assert_eq!(repo.load_high_score().await.unwrap(), 90);
}

#[tokio::test]
async fn sqlite_history_keeps_order_and_limit() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_history?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.append_history(&entry(0, 10, 1)).await.unwrap();
    repo.append_history(&entry(1, 40, 3)).await.unwrap();
    repo.append_history(&entry(2, 0, 0)).await.unwrap();

    let all = repo.list_history(10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0], entry(0, 10, 1));
    assert_eq!(all[2].correct_fields().value(), 0);

    let recent = repo.list_history(2).await.unwrap();
    let scores: Vec<_> = recent.iter().map(ScoreHistoryEntry::score).collect();
    assert_eq!(scores, [40, 0]);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn sqlite_storage_wires_both_stores() {
    let storage = Storage::sqlite("sqlite::memory:").await.expect("open");
    storage.scores.save_high_score(25).await.unwrap();
    storage.history.append_history(&entry(0, 25, 2)).await.unwrap();

    assert_eq!(storage.scores.load_high_score().await.unwrap(), 25);
    assert_eq!(storage.history.list_history(5).await.unwrap().len(), 1);
}
