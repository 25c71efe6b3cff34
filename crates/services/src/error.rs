//! Shared error types for the services crate.

use thiserror::Error;

use reaction_core::model::{BankError, SettingsError};
use storage::repository::StorageError;
use storage::source::SourceError;

/// Errors emitted by the session controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no round is active")]
    NoActiveRound,
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
