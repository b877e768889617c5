use std::str::FromStr;

use log::debug;

use crate::{error::ParseError, moves::UciMove, piece::Color, variant::Variant};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Board state as seen by the opening engine.
///
/// The engine never applies moves, it only needs enough of the position to
/// build an explorer query and to check book moves against the legal set.
pub trait Position {
    fn side_to_move(&self) -> Color;
    fn variant(&self) -> Variant;
    fn fen(&self) -> String;
    fn halfmove_clock(&self) -> u32;
    fn fullmove_number(&self) -> u32;

    // An empty slice means the legal moves are not known
    fn legal_moves(&self) -> &[UciMove];
}

/// A position described by its FEN. Legal moves come from whoever owns the
/// rules (the game server or the local engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenPosition {
    placement: String,
    side_to_move: Color,
    castling: String,
    en_passant: String,
    // Three-check only: checks each side may still give, white first
    remaining_checks: Option<(u8, u8)>,
    halfmove_clock: u32,
    fullmove_number: u32,
    variant: Variant,
    legal_moves: Vec<UciMove>,
}

impl FenPosition {
    pub fn startpos() -> Self {
        // The constant is well formed, so build it field by field instead of parsing
        Self {
            placement: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".to_string(),
            side_to_move: Color::White,
            castling: "KQkq".to_string(),
            en_passant: "-".to_string(),
            remaining_checks: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            variant: Variant::Standard,
            legal_moves: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &'static str| ParseError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(invalid("expected at least 4 fields"));
        }

        validate_placement(fields[0]).map_err(invalid)?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(invalid("side to move must be 'w' or 'b'")),
        };

        let castling = fields[2];
        if castling != "-"
            && !castling
                .chars()
                .all(|c| matches!(c, 'K' | 'Q' | 'k' | 'q' | 'A'..='H' | 'a'..='h'))
        {
            return Err(invalid("bad castling field"));
        }

        let en_passant = fields[3];
        if en_passant != "-" && crate::square::Square::from_algebraic(en_passant).is_none() {
            return Err(invalid("bad en passant square"));
        }

        let mut rest = &fields[4..];
        let remaining_checks = match rest.first() {
            Some(field) if field.contains('+') => {
                rest = &rest[1..];
                Some(parse_checks(field).ok_or_else(|| invalid("bad check counts"))?)
            }
            _ => None,
        };

        let (halfmove_clock, fullmove_number) = match rest {
            [halfmove, fullmove] => {
                let halfmove = halfmove
                    .parse::<u32>()
                    .map_err(|_| invalid("bad halfmove clock"))?;
                let fullmove = fullmove
                    .parse::<u32>()
                    .map_err(|_| invalid("bad fullmove number"))?;
                (halfmove, fullmove.max(1))
            }
            [] => {
                debug!("FEN without move counters, assuming 0 1: {}", fen);
                (0, 1)
            }
            _ => return Err(invalid("expected 4 or 6 fields plus optional check counts")),
        };

        Ok(Self {
            placement: fields[0].to_string(),
            side_to_move,
            castling: castling.to_string(),
            en_passant: en_passant.to_string(),
            remaining_checks,
            halfmove_clock,
            fullmove_number,
            variant: Variant::Standard,
            legal_moves: Vec::new(),
        })
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_legal_moves(mut self, legal_moves: Vec<UciMove>) -> Self {
        self.legal_moves = legal_moves;
        self
    }

    pub fn remaining_checks(&self) -> Option<(u8, u8)> {
        self.remaining_checks
    }
}

// `3+3` style counter from three-check FENs
fn parse_checks(field: &str) -> Option<(u8, u8)> {
    let (white, black) = field.split_once('+')?;
    Some((white.parse().ok()?, black.parse().ok()?))
}

// Checks the eight ranks add up to eight files each. Crazyhouse pockets
// (`[...]` or a ninth `/` section) and promoted markers (`~`) are tolerated.
fn validate_placement(placement: &str) -> Result<(), &'static str> {
    let board = match placement.find('[') {
        Some(idx) => {
            if !placement.ends_with(']') {
                return Err("unterminated pocket");
            }
            &placement[..idx]
        }
        None => placement,
    };

    let ranks: Vec<&str> = board.split('/').collect();
    let ranks = match ranks.len() {
        8 => &ranks[..],
        9 => &ranks[..8],
        _ => return Err("expected 8 ranks"),
    };

    for rank in ranks {
        let mut files = 0u32;
        for c in rank.chars() {
            match c {
                '1'..='8' => files += c as u32 - '0' as u32,
                '~' => {}
                c if "pnbrqkPNBRQK".contains(c) => files += 1,
                _ => return Err("unexpected character in placement"),
            }
        }
        if files != 8 {
            return Err("rank does not cover 8 files");
        }
    }
    Ok(())
}

impl FromStr for FenPosition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FenPosition::from_fen(s)
    }
}

impl Position for FenPosition {
    fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    fn variant(&self) -> Variant {
        self.variant
    }

    fn fen(&self) -> String {
        let mut fen = format!(
            "{} {} {} {}",
            self.placement,
            if self.side_to_move == Color::White { "w" } else { "b" },
            self.castling,
            self.en_passant,
        );
        if let Some((white, black)) = self.remaining_checks {
            fen.push_str(&format!(" {}+{}", white, black));
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    fn legal_moves(&self) -> &[UciMove] {
        &self.legal_moves
    }
}
