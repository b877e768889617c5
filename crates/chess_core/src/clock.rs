use std::time::Duration;

use crate::piece::Color;

/// Clock of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    pub remaining: Duration,
    pub increment: Duration,
}

impl ClockState {
    pub fn new(remaining: Duration, increment: Duration) -> Self {
        Self {
            remaining,
            increment,
        }
    }

    pub fn from_millis(remaining_ms: u64, increment_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(remaining_ms),
            Duration::from_millis(increment_ms),
        )
    }
}

/// Both players' clocks, as reported by the game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    pub white: ClockState,
    pub black: ClockState,
}

impl GameClock {
    pub fn for_side(&self, color: Color) -> ClockState {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}
