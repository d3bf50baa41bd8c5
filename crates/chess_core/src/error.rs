use thiserror::Error;

/// Failures while reading a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN must have at least 4 fields, found {0}")]
    TooFewFields(usize),
    #[error("FEN placement must have 8 ranks, found {0}")]
    WrongRankCount(usize),
    #[error("invalid piece character '{0}' in FEN")]
    InvalidPiece(char),
    #[error("rank {0} in FEN does not describe exactly 8 files")]
    BadRankLength(u8),
    #[error("invalid side to move '{0}', expected 'w' or 'b'")]
    InvalidSideToMove(String),
    #[error("invalid castling character '{0}' in FEN")]
    InvalidCastling(char),
    #[error("invalid en passant square '{0}'")]
    InvalidEnPassant(String),
    #[error("invalid move counter '{0}'")]
    InvalidCounter(String),
}

/// Failures while reading or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("'{0}' is not a move in UCI notation")]
    Parse(String),
    #[error("no piece on {0}")]
    NoPiece(String),
    #[error("{0} is not legal in this position")]
    Illegal(String),
}
