pub mod ai;
pub mod error;
pub mod evaluation;
pub mod rules;
pub mod search;

pub use ai::{ChessAI, EngineConfig};
pub use error::SearchError;
pub use evaluation::{evaluate_position, material, Evaluator, MaterialEvaluator, Score};
pub use rules::RulesEngine;
pub use search::{search_best_move, SearchResult, Searcher, DEFAULT_SEARCH_DEPTH};
