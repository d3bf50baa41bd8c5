use chess_core::Color;
use log::{debug, trace, warn};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::error::SearchError;
use crate::evaluation::{Evaluator, MaterialEvaluator, Score};
use crate::rules::RulesEngine;

/// Plies searched when the caller does not choose a depth.
pub const DEFAULT_SEARCH_DEPTH: u8 = 4;

// Initial values of the max and min folds; no evaluation reaches them.
const NEG_INFINITY: Score = Score::MIN;
const POS_INFINITY: Score = Score::MAX;

/// Outcome of a root search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<M> {
    pub best_move: M,
    /// Minimax score of `best_move` from the mover's point of view
    pub score: Score,
    pub depth: u8,
    /// Nodes visited, root included
    pub nodes: u64,
    /// Whether the move came from the random fallback
    pub from_fallback: bool,
}

/// Fixed-depth minimax over any [`RulesEngine`].
///
/// Every move the searcher pushes is undone before the call that pushed it
/// returns, so a position is left exactly as it was handed in.
pub struct Searcher<E = MaterialEvaluator, R = StdRng> {
    evaluator: E,
    rng: R,
    perspective: Color,
    nodes: u64,
}

impl Searcher {
    /// Material evaluation with an entropy-seeded fallback generator.
    pub fn new() -> Self {
        Self::with_parts(MaterialEvaluator, StdRng::from_entropy())
    }

    /// Material evaluation with a reproducible fallback generator.
    pub fn seeded(seed: u64) -> Self {
        Self::with_parts(MaterialEvaluator, StdRng::seed_from_u64(seed))
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator, R: Rng> Searcher<E, R> {
    pub fn with_parts(evaluator: E, rng: R) -> Self {
        Self {
            evaluator,
            rng,
            perspective: Color::White,
            nodes: 0,
        }
    }

    /// Side whose score [`Searcher::minimax`] reports. Defaults to White.
    pub fn for_side(mut self, perspective: Color) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn perspective(&self) -> Color {
        self.perspective
    }

    /// Nodes visited by the most recent root search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Static score of `position` from this searcher's perspective.
    pub fn evaluate<P: RulesEngine>(&self, position: &P) -> Score {
        self.evaluator.evaluate(position, self.perspective)
    }

    /// Minimax value of `position` searched `depth` plies deep.
    ///
    /// `maximizing` says whether the side to move in `position` is the one
    /// whose score is maximized. Scores are from [`Searcher::perspective`].
    pub fn minimax<P: RulesEngine>(&mut self, position: &mut P, depth: u8, maximizing: bool) -> Score {
        self.minimax_for(position, depth, maximizing, self.perspective)
    }

    fn minimax_for<P: RulesEngine>(
        &mut self,
        position: &mut P,
        depth: u8,
        maximizing: bool,
        perspective: Color,
    ) -> Score {
        self.nodes += 1;

        if depth == 0 || position.is_terminal() {
            return self.evaluator.evaluate(position, perspective);
        }

        let moves = position.legal_moves();
        // Nothing to play in a position the rules do not call finished;
        // score it statically rather than return a fold sentinel.
        if moves.is_empty() {
            return self.evaluator.evaluate(position, perspective);
        }

        let mut best = if maximizing { NEG_INFINITY } else { POS_INFINITY };
        for mv in moves {
            position.push(mv);
            let score = self.minimax_for(position, depth - 1, !maximizing, perspective);
            position.undo();

            best = if maximizing { best.max(score) } else { best.min(score) };
        }
        best
    }

    /// Minimax score of every root move, in the order the rules engine
    /// lists them. Scores are from the point of view of the side to move.
    pub fn score_root_moves<P: RulesEngine>(
        &mut self,
        position: &mut P,
        depth: u8,
    ) -> Result<Vec<(P::Move, Score)>, SearchError> {
        if depth == 0 {
            return Err(SearchError::InvalidDepth);
        }

        self.nodes = 1;
        let perspective = position.side_to_move();
        let moves = position.legal_moves();
        let mut scored = Vec::with_capacity(moves.len());

        for mv in moves {
            position.push(mv);
            let score = self.minimax_for(position, depth - 1, false, perspective);
            position.undo();

            trace!("root move {:?} scored {}", mv, score);
            scored.push((mv, score));
        }
        Ok(scored)
    }

    /// Picks the move with the highest minimax score for the side to move.
    ///
    /// Ties go to the move listed first. If no move scores above the fold
    /// floor, one is drawn at random from the root moves; a position without
    /// legal moves yields [`SearchError::NoLegalMoves`].
    pub fn select_best_move<P: RulesEngine>(
        &mut self,
        position: &mut P,
        depth: u8,
    ) -> Result<SearchResult<P::Move>, SearchError> {
        let scored = self.score_root_moves(position, depth)?;

        let mut best_move = None;
        let mut best_score = NEG_INFINITY;
        for &(mv, score) in &scored {
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
        }

        let (best_move, from_fallback) = match best_move {
            Some(mv) => (mv, false),
            None => {
                let Some(&(mv, _)) = scored.choose(&mut self.rng) else {
                    debug!("no legal moves at the root");
                    return Err(SearchError::NoLegalMoves);
                };
                warn!("no root move improved on the search floor, playing {:?} at random", mv);
                (mv, true)
            }
        };

        debug!(
            "depth {} searched {} nodes: best {:?} scored {}",
            depth, self.nodes, best_move, best_score
        );

        Ok(SearchResult {
            best_move,
            score: best_score,
            depth,
            nodes: self.nodes,
            from_fallback,
        })
    }
}

/// Best move for the side to move using the default material searcher.
pub fn search_best_move<P: RulesEngine>(
    position: &mut P,
    depth: u8,
) -> Result<SearchResult<P::Move>, SearchError> {
    Searcher::new().select_best_move(position, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::PieceType;

    struct Node {
        value: i32,
        children: Vec<usize>,
        terminal: bool,
    }

    /// Hand-built game tree. A node's value is White's material edge, moves
    /// are child indices, and every push and undo is counted.
    struct TreeGame {
        nodes: Vec<Node>,
        root_side: Color,
        path: Vec<usize>,
        pushes: usize,
        undos: usize,
        deepest: usize,
    }

    impl TreeGame {
        fn new(root_value: i32) -> Self {
            Self {
                nodes: vec![Node { value: root_value, children: Vec::new(), terminal: false }],
                root_side: Color::White,
                path: Vec::new(),
                pushes: 0,
                undos: 0,
                deepest: 0,
            }
        }

        fn black_to_move(mut self) -> Self {
            self.root_side = Color::Black;
            self
        }

        fn add(&mut self, parent: usize, value: i32) -> usize {
            let id = self.nodes.len();
            self.nodes.push(Node { value, children: Vec::new(), terminal: false });
            self.nodes[parent].children.push(id);
            id
        }

        fn add_leaves(&mut self, parent: usize, values: &[i32]) {
            for &value in values {
                self.add(parent, value);
            }
        }

        fn current(&self) -> &Node {
            &self.nodes[*self.path.last().unwrap_or(&0)]
        }
    }

    impl RulesEngine for TreeGame {
        type Move = usize;

        fn legal_moves(&self) -> Vec<usize> {
            self.current().children.clone()
        }

        fn is_terminal(&self) -> bool {
            self.current().terminal
        }

        fn push(&mut self, mv: usize) {
            assert!(self.current().children.contains(&mv), "pushed a move that is not legal");
            self.path.push(mv);
            self.pushes += 1;
            self.deepest = self.deepest.max(self.path.len());
        }

        fn undo(&mut self) {
            assert!(self.path.pop().is_some(), "undo without a matching push");
            self.undos += 1;
        }

        fn side_to_move(&self) -> Color {
            if self.path.len() % 2 == 0 {
                self.root_side
            } else {
                self.root_side.opposite()
            }
        }

        fn piece_count(&self, color: Color, piece_type: PieceType) -> u32 {
            if piece_type != PieceType::Pawn {
                return 0;
            }
            let value = self.current().value;
            match color {
                Color::White => value.max(0) as u32,
                Color::Black => (-value).max(0) as u32,
            }
        }
    }

    /// Scores every position at the bottom of the scale.
    struct Floor;

    impl Evaluator for Floor {
        fn evaluate<P: RulesEngine>(&self, _position: &P, _perspective: Color) -> Score {
            Score::MIN
        }
    }

    /// Two root moves, each answered by two replies.
    fn two_by_two() -> TreeGame {
        let mut game = TreeGame::new(0);
        let a = game.add(0, 0);
        let b = game.add(0, 0);
        game.add_leaves(a, &[3, -2]);
        game.add_leaves(b, &[1, 4]);
        game
    }

    #[test]
    fn minimax_alternates_max_and_min() {
        let mut game = two_by_two();
        let mut searcher = Searcher::seeded(1);
        assert_eq!(searcher.minimax(&mut game, 2, true), 1);
        assert_eq!(searcher.minimax(&mut game, 2, false), 3);
        assert_eq!(searcher.minimax(&mut game, 1, true), 0);
    }

    #[test]
    fn black_perspective_negates_every_score() {
        let mut game = two_by_two();
        let mut white = Searcher::seeded(1);
        let mut black = Searcher::seeded(1).for_side(Color::Black);
        assert_eq!(black.perspective(), Color::Black);
        assert_eq!(black.minimax(&mut game, 2, true), -3);

        for depth in 0..=2 {
            for maximizing in [true, false] {
                assert_eq!(
                    black.minimax(&mut game, depth, maximizing),
                    -white.minimax(&mut game, depth, !maximizing)
                );
            }
        }
        assert_eq!(game.pushes, game.undos);
    }

    #[test]
    fn selector_picks_the_best_guaranteed_outcome() {
        let mut game = two_by_two();
        let result = Searcher::seeded(1).select_best_move(&mut game, 2).unwrap();
        assert_eq!(result.best_move, 2);
        assert_eq!(result.score, 1);
        assert_eq!(result.nodes, 7);
        assert!(!result.from_fallback);
    }

    #[test]
    fn every_push_is_undone() {
        let mut game = two_by_two();
        let mut searcher = Searcher::seeded(1);
        searcher.select_best_move(&mut game, 2).unwrap();
        assert!(game.path.is_empty());
        assert_eq!(game.pushes, game.undos);
        assert_eq!(game.pushes, 6);

        searcher.minimax(&mut game, 2, true);
        assert!(game.path.is_empty());
        assert_eq!(game.pushes, game.undos);
    }

    #[test]
    fn depth_bounds_the_recursion() {
        // A chain four plies long
        let mut game = TreeGame::new(0);
        let mut parent = 0;
        for value in [1, 2, 3, 4] {
            parent = game.add(parent, value);
        }
        let mut searcher = Searcher::seeded(1);
        assert_eq!(searcher.minimax(&mut game, 2, true), 2);
        assert_eq!(game.deepest, 2);
        assert_eq!(searcher.minimax(&mut game, 10, true), 4);
        assert_eq!(game.deepest, 4);
    }

    #[test]
    fn depth_zero_is_the_static_evaluation() {
        let mut game = two_by_two();
        game.nodes[0].value = 6;
        let mut searcher = Searcher::seeded(1);
        let evaluation = searcher.evaluate(&game);
        assert_eq!(evaluation, 6);
        assert_eq!(searcher.minimax(&mut game, 0, true), evaluation);
        assert_eq!(searcher.minimax(&mut game, 0, false), evaluation);
        assert_eq!(game.pushes, 0);

        let mut stuck = TreeGame::new(-3);
        assert_eq!(searcher.minimax(&mut stuck, 0, true), -3);
        assert_eq!(searcher.minimax(&mut stuck, 0, false), -3);
    }

    #[test]
    fn terminal_positions_are_not_expanded() {
        let mut game = two_by_two();
        game.nodes[0].terminal = true;
        game.nodes[0].value = 2;
        let mut searcher = Searcher::seeded(1);
        assert_eq!(searcher.minimax(&mut game, 3, true), 2);
        assert_eq!(game.pushes, 0);
    }

    #[test]
    fn stuck_position_is_evaluated_not_infinite() {
        // Non-terminal, yet no moves: the static score comes back
        let mut game = TreeGame::new(0);
        let a = game.add(0, 0);
        game.add(a, 5);
        let dead_end = game.add(0, -1);

        let mut searcher = Searcher::seeded(1);
        assert_eq!(searcher.minimax(&mut game, 3, true), 5);

        game.path.push(dead_end);
        assert_eq!(searcher.minimax(&mut game, 3, true), -1);
        assert_eq!(searcher.minimax(&mut game, 3, false), -1);
    }

    #[test]
    fn ties_go_to_the_first_listed_move() {
        let mut game = TreeGame::new(0);
        game.add_leaves(0, &[2, 5, 5, 1]);
        for seed in 0..5 {
            let result = Searcher::seeded(seed).select_best_move(&mut game, 1).unwrap();
            assert_eq!(result.best_move, 2);
            assert_eq!(result.score, 5);
        }
    }

    #[test]
    fn running_best_never_decreases() {
        let mut game = TreeGame::new(0);
        game.add_leaves(0, &[1, 3, 2, 3, 0, -4]);
        let mut searcher = Searcher::seeded(1);
        let scored = searcher.score_root_moves(&mut game, 1).unwrap();
        assert_eq!(scored.iter().map(|&(_, score)| score).collect::<Vec<_>>(), vec![1, 3, 2, 3, 0, -4]);

        let mut running = NEG_INFINITY;
        for &(_, score) in &scored {
            let next = running.max(score);
            assert!(next >= running);
            running = next;
        }

        let result = searcher.select_best_move(&mut game, 1).unwrap();
        assert_eq!(result.best_move, 2);
        assert_eq!(result.score, running);
    }

    #[test]
    fn black_maximizes_its_own_material() {
        let mut game = TreeGame::new(0).black_to_move();
        game.add_leaves(0, &[2, -3, 0]);
        let result = Searcher::seeded(1).select_best_move(&mut game, 1).unwrap();
        assert_eq!(result.best_move, 2);
        assert_eq!(result.score, 3);
    }

    #[test]
    fn no_legal_moves_is_an_error() {
        let mut game = TreeGame::new(4);
        let mut searcher = Searcher::seeded(1);
        assert_eq!(searcher.select_best_move(&mut game, 3), Err(SearchError::NoLegalMoves));
        assert_eq!(game.pushes, 0);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let mut game = two_by_two();
        assert_eq!(Searcher::seeded(1).select_best_move(&mut game, 0), Err(SearchError::InvalidDepth));
        assert_eq!(Searcher::seeded(1).score_root_moves(&mut game, 0), Err(SearchError::InvalidDepth));
    }

    #[test]
    fn fallback_draws_from_the_injected_generator() {
        let mut game = TreeGame::new(0);
        game.add_leaves(0, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let root_moves = game.legal_moves();

        let pick = |seed| {
            let mut searcher = Searcher::with_parts(Floor, StdRng::seed_from_u64(seed));
            let mut game = TreeGame::new(0);
            game.add_leaves(0, &[1, 2, 3, 4, 5, 6, 7, 8]);
            searcher.select_best_move(&mut game, 1).unwrap()
        };

        let first = pick(42);
        assert!(first.from_fallback);
        assert_eq!(first.score, Score::MIN);
        assert!(root_moves.contains(&first.best_move));
        assert_eq!(pick(42), first);
    }

    #[test]
    fn fallback_with_nothing_to_pick_from() {
        let mut searcher = Searcher::with_parts(Floor, StdRng::seed_from_u64(3));
        let mut game = TreeGame::new(0);
        assert_eq!(searcher.select_best_move(&mut game, 2), Err(SearchError::NoLegalMoves));
    }
}
