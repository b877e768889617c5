use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid FEN \"{fen}\": {reason}")]
    InvalidFen { fen: String, reason: &'static str },
    #[error("invalid square \"{0}\"")]
    InvalidSquare(String),
    #[error("invalid UCI move \"{0}\"")]
    InvalidMove(String),
    #[error("unknown variant \"{0}\"")]
    UnknownVariant(String),
}
