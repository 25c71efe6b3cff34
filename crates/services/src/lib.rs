#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod sessions;

pub use reaction_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{AppServicesError, SessionError};

pub use sessions::{
    PersistenceWarning, Scoreboard, SessionController, SessionPhase, SubmissionOutcome,
    SubmissionResult, TickOutcome,
};
