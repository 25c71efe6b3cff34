mod controller;
mod countdown;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::SessionController;
pub use countdown::{Countdown, CountdownTick};
pub use view::{
    PersistenceWarning, Scoreboard, SessionPhase, SubmissionOutcome, SubmissionResult,
    TickOutcome,
};
