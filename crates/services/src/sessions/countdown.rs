/// Result of advancing the countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// The countdown was not running; nothing changed.
    Stopped,
    /// Time remains.
    Running(u32),
    /// This tick reached zero. The countdown has stopped itself.
    Elapsed,
}

/// Per-round countdown driven by an external one-second tick.
///
/// Stopping it makes later ticks no-ops until the next `restart`, so a tick
/// that races a submission cannot touch session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            running: false,
        }
    }

    pub fn restart(&mut self) {
        self.remaining = self.duration;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn tick(&mut self) -> CountdownTick {
        if !self.running {
            return CountdownTick::Stopped;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            CountdownTick::Elapsed
        } else {
            CountdownTick::Running(self.remaining)
        }
    }
}
