use std::path::Path;
use std::sync::Arc;

use reaction_core::model::{BankError, QuestionBank, SessionSettings};
use storage::repository::{Storage, StorageBackend};
use storage::source;
use tracing::info;

use crate::Clock;
use crate::error::AppServicesError;
use crate::sessions::SessionController;

/// Assembles the question bank, storage, and session settings for the binary.
#[derive(Clone)]
pub struct AppServices {
    bank: Arc<QuestionBank>,
    storage: Storage,
    clock: Clock,
    settings: SessionSettings,
}

impl AppServices {
    /// Load the question source and open storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the source is unavailable or malformed, holds
    /// no records, or storage cannot be opened.
    pub async fn open(
        questions: &Path,
        backend: &StorageBackend,
        clock: Clock,
        settings: SessionSettings,
    ) -> Result<Self, AppServicesError> {
        let bank = source::load_bank(questions)?;
        let storage = Storage::open(backend).await?;
        info!(?backend, "storage ready");
        Self::from_parts(bank, storage, clock, settings)
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Bank` if the bank is empty.
    pub fn from_parts(
        bank: QuestionBank,
        storage: Storage,
        clock: Clock,
        settings: SessionSettings,
    ) -> Result<Self, AppServicesError> {
        if bank.is_empty() {
            return Err(BankError::Empty.into());
        }
        Ok(Self {
            bank: Arc::new(bank),
            storage,
            clock,
            settings,
        })
    }

    /// Build a controller and start its first round.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the high score cannot be read.
    pub async fn start_session(&self) -> Result<SessionController, AppServicesError> {
        let mut session = SessionController::load(
            Arc::clone(&self.bank),
            Arc::clone(&self.storage.scores),
            Arc::clone(&self.storage.history),
            self.clock,
            self.settings,
        )
        .await?;
        session.start_round()?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reaction_core::model::ReactionDraft;
    use reaction_core::time::fixed_clock;

    fn bank() -> QuestionBank {
        QuestionBank::new(vec![
            ReactionDraft {
                element_a: "Na".into(),
                element_b: "Cl2".into(),
                products: "NaCl".into(),
                reaction_type: "Synthesis".into(),
                conditions: "Heat".into(),
                reaction_equation: None,
                notes: None,
            }
            .validate()
            .unwrap(),
        ])
    }

    #[test]
    fn empty_bank_is_fatal() {
        let err = AppServices::from_parts(
            QuestionBank::default(),
            Storage::in_memory(),
            fixed_clock(),
            SessionSettings::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, AppServicesError::Bank(BankError::Empty)));
    }

    #[tokio::test]
    async fn started_session_has_an_active_round() {
        let services = AppServices::from_parts(
            bank(),
            Storage::in_memory(),
            fixed_clock(),
            SessionSettings::new(15).unwrap(),
        )
        .unwrap();

        let session = services.start_session().await.unwrap();
        assert_eq!(session.current_prompt().as_deref(), Some("Na + Cl2 = ?"));
        assert_eq!(session.seconds_remaining(), 15);
    }

    #[tokio::test]
    async fn missing_source_is_reported() {
        let err = AppServices::open(
            Path::new("/no/such/reactions.csv"),
            &StorageBackend::Memory,
            fixed_clock(),
            SessionSettings::default(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(
            err,
            AppServicesError::Source(storage::source::SourceError::DataUnavailable { .. })
        ));
    }
}
