// Core chess types shared by the opening engine
pub mod clock;
pub mod error;
pub mod moves;
pub mod piece;
pub mod position;
pub mod square;
pub mod variant;

// Re-export main types for convenience
pub use clock::{ClockState, GameClock};
pub use error::ParseError;
pub use moves::UciMove;
pub use piece::{Color, PieceType};
pub use position::{FenPosition, Position, STARTING_FEN};
pub use square::Square;
pub use variant::Variant;
