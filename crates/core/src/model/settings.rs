use thiserror::Error;

/// Seconds a player gets per round unless configured otherwise.
pub const DEFAULT_ROUND_SECONDS: u32 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("round length must be > 0 seconds")]
    InvalidRoundSeconds,
}

/// Tunables for a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    round_seconds: u32,
}

impl SessionSettings {
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidRoundSeconds` if `round_seconds` is zero.
    pub fn new(round_seconds: u32) -> Result<Self, SettingsError> {
        if round_seconds == 0 {
            return Err(SettingsError::InvalidRoundSeconds);
        }
        Ok(Self { round_seconds })
    }

    #[must_use]
    pub fn round_seconds(&self) -> u32 {
        self.round_seconds
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            round_seconds: DEFAULT_ROUND_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_is_one_minute() {
        assert_eq!(SessionSettings::default().round_seconds(), 60);
    }

    #[test]
    fn zero_round_is_rejected() {
        assert_eq!(
            SessionSettings::new(0).unwrap_err(),
            SettingsError::InvalidRoundSeconds
        );
        assert_eq!(SessionSettings::new(15).unwrap().round_seconds(), 15);
    }
}
