use std::time::Duration;

use chess_core::{ClockState, Position, UciMove};
use log::{debug, info};
use rand::Rng;

use crate::error::EngineError;
use crate::explorer::BookClient;
use crate::mode::SelectionMode;
use crate::session::BookSession;

// Think time used when the game has no clock
const UNTIMED_MOVE_TIME: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimits {
    pub clock: Option<ClockState>,
    pub move_time: Option<Duration>,
}

impl SearchLimits {
    pub fn from_clock(clock: Option<&ClockState>) -> Self {
        match clock {
            Some(clock) => Self {
                clock: Some(*clock),
                move_time: None,
            },
            None => Self {
                clock: None,
                move_time: Some(UNTIMED_MOVE_TIME),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: UciMove,
    pub score: Option<Score>,
}

/// The local engine. Its internals are not this crate's business.
pub trait SearchEngine {
    fn search(&mut self, position: &dyn Position, limits: SearchLimits) -> Result<SearchResult, EngineError>;
}

/// The move to play and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub best_move: UciMove,
    pub mode: SelectionMode,
    pub score: Option<Score>,
}

/// Something that can pick the bot's next move.
pub trait MoveDecider {
    fn decide(&mut self, position: &dyn Position, clock: Option<&ClockState>) -> Result<Decision, EngineError>;
}

/// Plays from the opening explorer while it has answers, then hands over to
/// the engine.
pub struct OpeningsBot<C, E, R> {
    session: BookSession<C, R>,
    engine: E,
}

impl<C, E, R> OpeningsBot<C, E, R> {
    pub fn new(session: BookSession<C, R>, engine: E) -> Self {
        Self { session, engine }
    }

    pub fn session(&self) -> &BookSession<C, R> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BookSession<C, R> {
        &mut self.session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<C: BookClient, E: SearchEngine, R: Rng> MoveDecider for OpeningsBot<C, E, R> {
    fn decide(&mut self, position: &dyn Position, clock: Option<&ClockState>) -> Result<Decision, EngineError> {
        if let Some((best_move, mode)) = self.session.decide_move(position, clock) {
            info!("Playing {} from the {}", best_move, mode);
            return Ok(Decision {
                best_move,
                mode,
                score: None,
            });
        }

        let result = self.engine.search(position, SearchLimits::from_clock(clock))?;
        self.session.record_mode(SelectionMode::EngineSearch);
        debug!("Engine played {} ({:?})", result.best_move, result.score);
        Ok(Decision {
            best_move: result.best_move,
            mode: SelectionMode::EngineSearch,
            score: result.score,
        })
    }
}

/// Never looks at a book.
pub struct EngineOnly<E> {
    engine: E,
}

impl<E> EngineOnly<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: SearchEngine> MoveDecider for EngineOnly<E> {
    fn decide(&mut self, position: &dyn Position, clock: Option<&ClockState>) -> Result<Decision, EngineError> {
        let result = self.engine.search(position, SearchLimits::from_clock(clock))?;
        Ok(Decision {
            best_move: result.best_move,
            mode: SelectionMode::EngineSearch,
            score: result.score,
        })
    }
}
