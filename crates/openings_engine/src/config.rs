use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

// Rating buckets the explorer aggregates games into
pub const RATING_TIERS: [u32; 10] = [0, 400, 1000, 1200, 1400, 1600, 1800, 2000, 2200, 2500];

// Everything but ultraBullet, whose games are too noisy to learn openings from
pub const BOOK_SPEEDS: [&str; 5] = ["bullet", "blitz", "rapid", "classical", "correspondence"];

const EXPLORER_URL: &str = "https://explorer.lichess.ovh";
const PROFILE_URL: &str = "https://lichess.org/api/user";

/// Settings for the opening-book path. Every field has a default, so an
/// empty TOML file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub explorer_url: String,
    pub profile_url: String,
    pub max_moves: u32,
    pub min_time_for_book_ms: u64,
    pub min_increment_for_book_ms: u64,
    pub standard_rating_floor: u32,
    pub variant_rating_floor: u32,
    pub rating_tolerance: u32,
    pub rating_tiers: Vec<u32>,
    pub speeds: Vec<String>,
    pub request_timeout_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            explorer_url: EXPLORER_URL.to_string(),
            profile_url: PROFILE_URL.to_string(),
            max_moves: 100,
            min_time_for_book_ms: 10_000,
            min_increment_for_book_ms: 1_000,
            standard_rating_floor: 1600,
            variant_rating_floor: 1000,
            rating_tolerance: 200,
            rating_tiers: RATING_TIERS.to_vec(),
            speeds: BOOK_SPEEDS.iter().map(|s| s.to_string()).collect(),
            request_timeout_ms: 10_000,
            probe_timeout_ms: 5_000,
        }
    }
}

impl BookConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: BookConfig = toml::from_str(contents)?;
        config.validate()?;
        config.rating_tiers.sort_unstable();
        config.rating_tiers.dedup();
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rating_tiers.is_empty() {
            return Err(ConfigError::Invalid("rating_tiers must not be empty"));
        }
        if self.speeds.is_empty() {
            return Err(ConfigError::Invalid("speeds must not be empty"));
        }
        if self.max_moves == 0 {
            return Err(ConfigError::Invalid("max_moves must be positive"));
        }
        Ok(())
    }

    pub fn min_time_for_book(&self) -> Duration {
        Duration::from_millis(self.min_time_for_book_ms)
    }

    pub fn min_increment_for_book(&self) -> Duration {
        Duration::from_millis(self.min_increment_for_book_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn player_endpoint(&self) -> String {
        format!("{}/player", self.explorer_url.trim_end_matches('/'))
    }

    pub fn general_endpoint(&self) -> String {
        format!("{}/lichess", self.explorer_url.trim_end_matches('/'))
    }
}
