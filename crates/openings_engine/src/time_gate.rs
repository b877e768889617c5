use std::time::Duration;

use chess_core::ClockState;

use crate::config::BookConfig;

/// Decides whether there is enough time on the clock to ask the explorer.
/// A lookup adds network latency that a low-time scramble cannot afford.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGate {
    min_time: Duration,
    min_increment: Duration,
}

impl TimeGate {
    pub fn new(min_time: Duration, min_increment: Duration) -> Self {
        Self {
            min_time,
            min_increment,
        }
    }

    pub fn from_config(config: &BookConfig) -> Self {
        Self::new(config.min_time_for_book(), config.min_increment_for_book())
    }

    pub fn should_consult_book(&self, clock: Option<&ClockState>) -> bool {
        match clock {
            None => true,
            Some(clock) => clock.remaining > self.min_time || clock.increment >= self.min_increment,
        }
    }
}

impl Default for TimeGate {
    fn default() -> Self {
        Self::from_config(&BookConfig::default())
    }
}
