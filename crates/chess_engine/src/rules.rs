use std::fmt::Debug;

use chess_core::{Board, Color, Move, PieceType};

/// What the search needs from a game implementation.
///
/// `legal_moves` must return the same order every time it is called on the
/// same position, and `undo` must exactly reverse the most recent `push`.
pub trait RulesEngine {
    type Move: Copy + PartialEq + Debug;

    fn legal_moves(&self) -> Vec<Self::Move>;

    fn is_terminal(&self) -> bool;

    fn push(&mut self, mv: Self::Move);

    fn undo(&mut self);

    fn side_to_move(&self) -> Color;

    fn piece_count(&self, color: Color, piece_type: PieceType) -> u32;
}

impl RulesEngine for Board {
    type Move = Move;

    fn legal_moves(&self) -> Vec<Move> {
        Board::legal_moves(self)
    }

    fn is_terminal(&self) -> bool {
        self.is_game_over()
    }

    fn push(&mut self, mv: Move) {
        self.push_unchecked(mv);
    }

    fn undo(&mut self) {
        Board::undo(self);
    }

    fn side_to_move(&self) -> Color {
        self.current_turn()
    }

    fn piece_count(&self, color: Color, piece_type: PieceType) -> u32 {
        Board::piece_count(self, color, piece_type)
    }
}
