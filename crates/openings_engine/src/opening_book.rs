use chess_core::UciMove;
use log::debug;
use rand::Rng;
use serde::Deserialize;

/// One candidate move from the explorer with its aggregate outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookEntry {
    pub uci: String,
    #[serde(default)]
    pub white: u64,
    #[serde(default)]
    pub black: u64,
    #[serde(default)]
    pub draws: u64,
}

impl BookEntry {
    pub fn new(uci: impl Into<String>, white: u64, black: u64, draws: u64) -> Self {
        Self {
            uci: uci.into(),
            white,
            black,
            draws,
        }
    }

    // How often the move was played, regardless of who won
    pub fn games_played(&self) -> u64 {
        self.white.saturating_add(self.black).saturating_add(self.draws)
    }
}

/// Explorer answer for one position. An empty list means no book data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookQueryResult {
    #[serde(default)]
    pub moves: Vec<BookEntry>,
}

impl BookQueryResult {
    pub fn new(moves: Vec<BookEntry>) -> Self {
        Self { moves }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.moves
            .iter()
            .fold(0u64, |total, entry| total.saturating_add(entry.games_played()))
    }
}

/// Picks one move with probability proportional to how often it was played.
/// Returns `None` when there is nothing with positive weight to pick.
pub fn pick<R: Rng + ?Sized>(results: &BookQueryResult, rng: &mut R) -> Option<UciMove> {
    pick_from(results, &[], rng)
}

/// Like [`pick`], but drops candidates outside `legal` when the legal moves
/// are known (non-empty).
pub fn pick_from<R: Rng + ?Sized>(
    results: &BookQueryResult,
    legal: &[UciMove],
    rng: &mut R,
) -> Option<UciMove> {
    let candidates: Vec<(UciMove, u64)> = results
        .moves
        .iter()
        .filter_map(|entry| match entry.uci.parse::<UciMove>() {
            Ok(mv) => Some((mv, entry.games_played())),
            Err(err) => {
                debug!("Skipping book entry: {}", err);
                None
            }
        })
        .filter(|(mv, _)| legal.is_empty() || legal.contains(mv))
        .collect();

    let total_weight = candidates
        .iter()
        .fold(0u64, |total, (_, weight)| total.saturating_add(*weight));
    if total_weight == 0 {
        return None;
    }

    let mut chosen_weight = rng.gen_range(0..total_weight);
    for (mv, weight) in &candidates {
        if chosen_weight < *weight {
            return Some(*mv);
        }
        chosen_weight -= weight;
    }

    // Only reachable if the weights saturated
    candidates
        .iter()
        .rev()
        .find(|(_, weight)| *weight > 0)
        .map(|(mv, _)| *mv)
}
