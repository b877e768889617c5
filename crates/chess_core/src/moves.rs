use std::fmt;
use std::str::FromStr;

use crate::{error::ParseError, piece::PieceType, square::Square};

/// A move in coordinate (UCI) notation, as returned by the opening explorer.
///
/// Drops (`P@e4`) only occur in crazyhouse books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UciMove {
    Normal {
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    },
    Put {
        role: PieceType,
        to: Square,
    },
}

impl UciMove {
    pub fn new(from: Square, to: Square) -> Self {
        UciMove::Normal {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        UciMove::Normal {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

impl FromStr for UciMove {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidMove(s.to_string());
        if !s.is_ascii() {
            return Err(invalid());
        }

        if let Some((role, to)) = s.split_once('@') {
            let mut role_chars = role.chars();
            let role = match (role_chars.next(), role_chars.next()) {
                (Some(c), None) => PieceType::from_char(c).ok_or_else(invalid)?,
                _ => return Err(invalid()),
            };
            let to = Square::from_algebraic(to).ok_or_else(invalid)?;
            return Ok(UciMove::Put { role, to });
        }

        if s.len() != 4 && s.len() != 5 {
            return Err(invalid());
        }
        let from = Square::from_algebraic(&s[0..2]).ok_or_else(invalid)?;
        let to = Square::from_algebraic(&s[2..4]).ok_or_else(invalid)?;
        let promotion = match s[4..].chars().next() {
            Some(c) => match PieceType::from_char(c) {
                Some(PieceType::Pawn) | None => return Err(invalid()),
                Some(role) => Some(role),
            },
            None => None,
        };

        Ok(UciMove::Normal { from, to, promotion })
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            UciMove::Normal { from, to, promotion } => {
                write!(f, "{}{}", from, to)?;
                if let Some(role) = promotion {
                    write!(f, "{}", role.to_char())?;
                }
                Ok(())
            }
            UciMove::Put { role, to } => {
                write!(f, "{}@{}", role.to_char().to_ascii_uppercase(), to)
            }
        }
    }
}
