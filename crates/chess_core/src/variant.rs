use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Rule set of a game, normalized to the names the opening explorer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    #[default]
    Standard,
    Chess960,
    Crazyhouse,
    Antichess,
    Atomic,
    Horde,
    KingOfTheHill,
    RacingKings,
    ThreeCheck,
}

impl Variant {
    pub const ALL: [Variant; 9] = [
        Variant::Standard,
        Variant::Chess960,
        Variant::Crazyhouse,
        Variant::Antichess,
        Variant::Atomic,
        Variant::Horde,
        Variant::KingOfTheHill,
        Variant::RacingKings,
        Variant::ThreeCheck,
    ];

    // Key used by the explorer `variant` parameter and the profile `perfs` map
    pub fn key(self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Chess960 => "chess960",
            Variant::Crazyhouse => "crazyhouse",
            Variant::Antichess => "antichess",
            Variant::Atomic => "atomic",
            Variant::Horde => "horde",
            Variant::KingOfTheHill => "kingOfTheHill",
            Variant::RacingKings => "racingKings",
            Variant::ThreeCheck => "threeCheck",
        }
    }

    pub fn is_standard(self) -> bool {
        self == Variant::Standard
    }

    /// Maps a UCI engine variant name (`chess`, `3check`, `giveaway`, ...)
    /// onto a variant.
    pub fn from_uci_name(name: &str) -> Option<Self> {
        let variant = match name.to_ascii_lowercase().as_str() {
            "chess" | "standard" | "fromposition" => Variant::Standard,
            "chess960" | "fischerandom" => Variant::Chess960,
            "crazyhouse" => Variant::Crazyhouse,
            "antichess" | "giveaway" => Variant::Antichess,
            "atomic" => Variant::Atomic,
            "horde" => Variant::Horde,
            "kingofthehill" => Variant::KingOfTheHill,
            "racingkings" => Variant::RacingKings,
            "3check" | "threecheck" => Variant::ThreeCheck,
            _ => return None,
        };
        Some(variant)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Variant {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::from_uci_name(s).ok_or_else(|| ParseError::UnknownVariant(s.to_string()))
    }
}
