// Chess rules: board state, move generation and game termination
pub mod board;
pub mod error;
pub mod moves;
pub mod perft;
pub mod piece;
pub mod position;

// Re-export main types for convenience
pub use board::{Board, CastlingRights, GameResult, Outcome, STARTING_FEN};
pub use error::{FenError, MoveError};
pub use moves::{Move, MoveType};
pub use perft::perft;
pub use piece::{Color, Piece, PieceType};
pub use position::Position;
