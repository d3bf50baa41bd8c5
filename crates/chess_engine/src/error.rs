use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no legal moves in this position")]
    NoLegalMoves,
    #[error("search depth must be at least 1")]
    InvalidDepth,
}
