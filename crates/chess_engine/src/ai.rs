use chess_core::{Board, Move};
use log::info;
use std::time::Instant;

use crate::error::SearchError;
use crate::evaluation::{evaluate_position, Score};
use crate::search::{SearchResult, Searcher, DEFAULT_SEARCH_DEPTH};

pub const MIN_DEPTH: u8 = 1;
pub const MAX_DEPTH: u8 = 6;  // Without pruning the tree grows too fast past this

/// Settings for a [`ChessAI`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Plies to search; clamped into `MIN_DEPTH..=MAX_DEPTH`
    pub depth: u8,
    /// Seed for the fallback move generator; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            seed: None,
        }
    }
}

/// Game-facing engine: a material minimax searcher at a fixed depth.
pub struct ChessAI {
    max_depth: u8,
    searcher: Searcher,
}

impl ChessAI {
    pub fn new(depth: u8) -> Self {
        Self::from_config(&EngineConfig {
            depth,
            ..EngineConfig::default()
        })
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let searcher = match config.seed {
            Some(seed) => Searcher::seeded(seed),
            None => Searcher::new(),
        };
        ChessAI {
            max_depth: config.depth.clamp(MIN_DEPTH, MAX_DEPTH),
            searcher,
        }
    }

    pub fn depth(&self) -> u8 {
        self.max_depth
    }

    pub fn set_depth(&mut self, depth: u8) {
        self.max_depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
    }

    /// Searches `board` for the side to move. The board is borrowed mutably
    /// for the search and handed back unchanged.
    pub fn analyze(&mut self, board: &mut Board) -> Result<SearchResult<Move>, SearchError> {
        let start_time = Instant::now();
        let result = self.searcher.select_best_move(board, self.max_depth)?;
        info!(
            "{} to move: chose {} (score {}) at depth {} after {} nodes in {:?}",
            board.current_turn(),
            result.best_move,
            result.score,
            result.depth,
            result.nodes,
            start_time.elapsed()
        );
        Ok(result)
    }

    pub fn get_move(&mut self, board: &mut Board) -> Result<Move, SearchError> {
        self.analyze(board).map(|result| result.best_move)
    }

    /// Per-move scores at the root, for diagnostics.
    pub fn root_scores(&mut self, board: &mut Board) -> Result<Vec<(Move, Score)>, SearchError> {
        self.searcher.score_root_moves(board, self.max_depth)
    }

    /// Material balance of `board` from White's side.
    pub fn evaluate(&self, board: &Board) -> Score {
        evaluate_position(board)
    }
}

impl Default for ChessAI {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
