use chess_core::{ClockState, Color, Position, UciMove, Variant, STARTING_FEN};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::BookConfig;
use crate::error::BookError;
use crate::explorer::{BookClient, IndexingStatus, ProfileLookup};
use crate::mode::{ModeTracker, SelectionMode};
use crate::opening_book::pick_from;
use crate::tier::TierSelector;
use crate::time_gate::TimeGate;

/// Player whose own games are used as the opening book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOpponent {
    pub username: String,
    // 0 until resolved from the player's profile
    pub rating: u32,
}

impl TrackedOpponent {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            rating: 0,
        }
    }

    pub fn with_rating(mut self, rating: u32) -> Self {
        self.rating = rating;
        self
    }
}

/// What happened when a player started being tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingReport {
    pub white: IndexingStatus,
    pub black: IndexingStatus,
    pub rating: u32,
}

/// State of one running bot: who is tracked, where the last move came from,
/// and the collaborators needed to pick a book move. Moves are decided one at
/// a time, so everything is owned here and passed around by `&mut`.
pub struct BookSession<C, R = StdRng> {
    client: C,
    rng: R,
    selector: TierSelector,
    gate: TimeGate,
    tracked: Option<TrackedOpponent>,
    modes: ModeTracker,
}

impl<C> BookSession<C, StdRng> {
    pub fn from_entropy(config: &BookConfig, client: C) -> Self {
        Self::new(config, client, StdRng::from_entropy())
    }
}

impl<C, R> BookSession<C, R> {
    pub fn new(config: &BookConfig, client: C, rng: R) -> Self {
        Self {
            client,
            rng,
            selector: TierSelector::new(config),
            gate: TimeGate::from_config(config),
            tracked: None,
            modes: ModeTracker::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn tracked(&self) -> Option<&TrackedOpponent> {
        self.tracked.as_ref()
    }

    pub fn set_tracked(&mut self, opponent: TrackedOpponent) {
        self.tracked = Some(opponent);
    }

    pub fn untrack_opponent(&mut self) {
        if let Some(opponent) = self.tracked.take() {
            info!("Stopped tracking {}", opponent.username);
        }
    }

    pub fn current_mode(&self) -> SelectionMode {
        self.modes.current()
    }

    pub fn mode_description(&self) -> String {
        self.modes.describe()
    }

    pub fn record_mode(&mut self, mode: SelectionMode) {
        self.modes.record(mode);
    }
}

impl<C: BookClient, R: Rng> BookSession<C, R> {
    /// Picks a book move for the position, or `None` when the engine should
    /// search instead. A failed explorer request never escapes: it is logged
    /// and treated as an empty book.
    pub fn decide_move<P: Position + ?Sized>(
        &mut self,
        position: &P,
        clock: Option<&ClockState>,
    ) -> Option<(UciMove, SelectionMode)> {
        if !self.gate.should_consult_book(clock) {
            debug!("Not enough time on the clock for a book lookup");
            return None;
        }

        match self.try_book_move(position) {
            Ok(Some((mv, mode))) => {
                self.modes.record(mode);
                Some((mv, mode))
            }
            Ok(None) => None,
            Err(err) => {
                warn!("{}: {}", err, error_source(&err));
                None
            }
        }
    }

    /// Queries the book and samples a move without touching the mode.
    pub fn try_book_move<P: Position + ?Sized>(
        &mut self,
        position: &P,
    ) -> Result<Option<(UciMove, SelectionMode)>, BookError> {
        let (results, mode) = self
            .selector
            .run(&self.client, position, self.tracked.as_ref())?;
        let picked = pick_from(&results, position.legal_moves(), &mut self.rng);
        match picked {
            Some(mv) => debug!("{} picked {} from {} candidates", mode, mv, results.moves.len()),
            None => debug!("{} has no playable move here", mode),
        }
        Ok(picked.map(|mv| (mv, mode)))
    }
}

impl<C: BookClient + ProfileLookup, R> BookSession<C, R> {
    /// Starts using `username`'s games as the book. The explorer indexes a
    /// player lazily, so both colours are requested once up front; their
    /// status is reported but never blocks tracking.
    pub fn track_opponent(&mut self, username: &str, variant: Variant) -> TrackingReport {
        let mut params = self
            .selector
            .player_params(username, STARTING_FEN, variant, Color::White);
        let endpoint = self.selector.player_endpoint().to_string();
        let white = self.client.probe(&endpoint, &params);
        params.set("color", Color::Black.as_str());
        let black = self.client.probe(&endpoint, &params);
        debug!("Indexing {}: white {:?}, black {:?}", username, white, black);

        let previous = self
            .tracked
            .as_ref()
            .filter(|opponent| opponent.username == username)
            .map_or(0, |opponent| opponent.rating);
        let rating = match self.client.get_profile(username) {
            Ok(profile) => match profile.rating_for(variant) {
                Some(rating) => rating,
                None => {
                    info!("{} has no {} rating, keeping {}", username, variant, previous);
                    previous
                }
            },
            Err(err) => {
                info!("Could not look up {}'s profile ({}), keeping rating {}", username, err, previous);
                previous
            }
        };

        info!("Tracking {} (rating {})", username, rating);
        self.tracked = Some(TrackedOpponent::new(username).with_rating(rating));
        TrackingReport {
            white,
            black,
            rating,
        }
    }
}

fn error_source(err: &BookError) -> String {
    match err {
        BookError::QueryFailed { source, .. } => source.to_string(),
    }
}
