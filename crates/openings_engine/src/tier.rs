use chess_core::{Color, Position, Variant};
use log::{debug, info};

use crate::config::{BookConfig, RATING_TIERS};
use crate::error::BookError;
use crate::explorer::{BookClient, QueryParams};
use crate::mode::SelectionMode;
use crate::opening_book::BookQueryResult;
use crate::session::TrackedOpponent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Player,
    RatedGeneral,
    DefaultGeneral,
}

impl Tier {
    pub fn mode(self) -> SelectionMode {
        match self {
            Tier::Player => SelectionMode::PlayerBook,
            Tier::RatedGeneral | Tier::DefaultGeneral => SelectionMode::GeneralBook,
        }
    }
}

/// A single explorer request: which tier, where to send it, with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub tier: Tier,
    pub endpoint: String,
    pub params: QueryParams,
}

impl QueryPlan {
    pub fn mode(&self) -> SelectionMode {
        self.tier.mode()
    }
}

#[derive(Debug, Clone)]
pub struct TierSelector {
    player_endpoint: String,
    general_endpoint: String,
    max_moves: u32,
    standard_rating_floor: u32,
    variant_rating_floor: u32,
    rating_tolerance: u32,
    rating_tiers: Vec<u32>,
    speeds: Vec<String>,
}

impl TierSelector {
    pub fn new(config: &BookConfig) -> Self {
        let mut rating_tiers = config.rating_tiers.clone();
        rating_tiers.sort_unstable();
        rating_tiers.dedup();
        if rating_tiers.is_empty() {
            rating_tiers = RATING_TIERS.to_vec();
        }

        Self {
            player_endpoint: config.player_endpoint(),
            general_endpoint: config.general_endpoint(),
            max_moves: config.max_moves,
            standard_rating_floor: config.standard_rating_floor,
            variant_rating_floor: config.variant_rating_floor,
            rating_tolerance: config.rating_tolerance,
            rating_tiers,
            speeds: config.speeds.clone(),
        }
    }

    pub fn player_endpoint(&self) -> &str {
        &self.player_endpoint
    }

    /// First query to issue for this position.
    pub fn select_tier<P: Position + ?Sized>(
        &self,
        position: &P,
        tracked: Option<&TrackedOpponent>,
    ) -> QueryPlan {
        match tracked {
            Some(opponent) => QueryPlan {
                tier: Tier::Player,
                endpoint: self.player_endpoint.clone(),
                params: self.player_params(
                    &opponent.username,
                    &position.fen(),
                    position.variant(),
                    position.side_to_move(),
                ),
            },
            None => {
                let floor = self.variant_floor(position.variant());
                QueryPlan {
                    tier: Tier::DefaultGeneral,
                    endpoint: self.general_endpoint.clone(),
                    params: self.general_params(position, &self.ratings_from(floor)),
                }
            }
        }
    }

    /// General-book query used when the tracked player's book has nothing
    /// for this position. Games a little below the player's strength still
    /// count.
    pub fn fallback_plan<P: Position + ?Sized>(&self, position: &P, rating: u32) -> QueryPlan {
        let floor = rating.saturating_sub(self.rating_tolerance);
        QueryPlan {
            tier: Tier::RatedGeneral,
            endpoint: self.general_endpoint.clone(),
            params: self.general_params(position, &self.ratings_from(floor)),
        }
    }

    /// Runs the plan for this position, falling back from an empty player
    /// book to the rated general book. At most two requests are made.
    pub fn run<C, P>(
        &self,
        client: &C,
        position: &P,
        tracked: Option<&TrackedOpponent>,
    ) -> Result<(BookQueryResult, SelectionMode), BookError>
    where
        C: BookClient + ?Sized,
        P: Position + ?Sized,
    {
        let plan = self.select_tier(position, tracked);
        let result = execute(client, &plan)?;

        match tracked {
            Some(opponent) if result.is_empty() => {
                info!(
                    "No games by {} in this position, trying the general book",
                    opponent.username
                );
                let fallback = self.fallback_plan(position, opponent.rating);
                let result = execute(client, &fallback)?;
                Ok((result, fallback.mode()))
            }
            _ => Ok((result, plan.mode())),
        }
    }

    pub fn variant_floor(&self, variant: Variant) -> u32 {
        if variant.is_standard() {
            self.standard_rating_floor
        } else {
            self.variant_rating_floor
        }
    }

    /// Rating buckets from the one containing `floor` upward. Never empty:
    /// the lowest bucket is always reachable with a floor of 0, and a floor
    /// above every bucket keeps the top one.
    pub fn ratings_from(&self, floor: u32) -> Vec<u32> {
        let start = self
            .rating_tiers
            .iter()
            .rposition(|&tier| tier <= floor)
            .unwrap_or(0);
        self.rating_tiers[start..].to_vec()
    }

    pub fn player_params(
        &self,
        username: &str,
        fen: &str,
        variant: Variant,
        color: Color,
    ) -> QueryParams {
        QueryParams::new()
            .with("player", username)
            .with("fen", fen)
            .with("moves", self.max_moves)
            .with("variant", variant.key())
            .with("recentGames", 0)
            .with("color", color.as_str())
    }

    fn general_params<P: Position + ?Sized>(&self, position: &P, ratings: &[u32]) -> QueryParams {
        QueryParams::new()
            .with("fen", position.fen())
            .with("moves", self.max_moves)
            .with("variant", position.variant().key())
            .with("topGames", 0)
            .with("recentGames", 0)
            .with("ratings", join(ratings))
            .with("speeds", self.speeds.join(","))
    }
}

fn execute<C: BookClient + ?Sized>(client: &C, plan: &QueryPlan) -> Result<BookQueryResult, BookError> {
    debug!("{:?} query to {}", plan.tier, plan.endpoint);
    client
        .query(&plan.endpoint, &plan.params)
        .map_err(|source| BookError::QueryFailed {
            endpoint: plan.endpoint.clone(),
            source,
        })
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
