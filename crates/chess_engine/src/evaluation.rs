use chess_core::{Color, PieceType};

use crate::rules::RulesEngine;

/// Evaluation score. Bounded in practice by the material on the board.
pub type Score = i32;

// Classical piece values in pawns. The king is never counted.
pub const PAWN_VALUE: Score = 1;
pub const KNIGHT_VALUE: Score = 3;
pub const BISHOP_VALUE: Score = 3;
pub const ROOK_VALUE: Score = 5;
pub const QUEEN_VALUE: Score = 9;

const WEIGHTED_PIECES: [(PieceType, Score); 5] = [
    (PieceType::Queen, QUEEN_VALUE),
    (PieceType::Rook, ROOK_VALUE),
    (PieceType::Bishop, BISHOP_VALUE),
    (PieceType::Knight, KNIGHT_VALUE),
    (PieceType::Pawn, PAWN_VALUE),
];

/// Static evaluation used at the leaves of the search tree.
///
/// Implementations must be pure: the same position and perspective always
/// give the same score, and the position is never modified.
pub trait Evaluator {
    /// Scores `position` for `perspective`; higher is better for that side.
    fn evaluate<P: RulesEngine>(&self, position: &P, perspective: Color) -> Score;
}

/// Material balance: own weighted material minus the opponent's.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate<P: RulesEngine>(&self, position: &P, perspective: Color) -> Score {
        material(position, perspective) - material(position, perspective.opposite())
    }
}

/// Weighted material of one side: `9q + 5r + 3b + 3n + p`.
pub fn material<P: RulesEngine>(position: &P, color: Color) -> Score {
    WEIGHTED_PIECES
        .iter()
        .map(|&(piece_type, value)| position.piece_count(color, piece_type) as Score * value)
        .sum()
}

/// Material balance from White's point of view.
/// Positive scores favor White, negative scores favor Black.
pub fn evaluate_position<P: RulesEngine>(position: &P) -> Score {
    MaterialEvaluator.evaluate(position, Color::White)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Board;

    #[test]
    fn starting_position_is_balanced() {
        let board = Board::new();
        assert_eq!(material(&board, Color::White), 39);
        assert_eq!(material(&board, Color::Black), 39);
        assert_eq!(evaluate_position(&board), 0);
    }

    #[test]
    fn material_formula_uses_fixed_weights() {
        // 1 queen, 2 rooks, 0 bishops, 1 knight, 5 pawns against a bare king
        let board = Board::from_fen("4k3/8/8/8/8/8/PPPPP3/RN1QK2R w - - 0 1").unwrap();
        assert_eq!(material(&board, Color::White), 9 + 10 + 0 + 3 + 5);
        assert_eq!(material(&board, Color::Black), 0);
        assert_eq!(evaluate_position(&board), 27);
        assert_eq!(MaterialEvaluator.evaluate(&board, Color::Black), -27);
    }

    #[test]
    fn kings_are_not_counted() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(evaluate_position(&board), 0);
        assert_eq!(material(&board, Color::White), 0);
    }

    #[test]
    fn evaluation_is_pure() {
        let board = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let before = board.clone();
        let first = evaluate_position(&board);
        let second = evaluate_position(&board);
        assert_eq!(first, second);
        assert_eq!(board, before);
    }

    #[test]
    fn terminal_positions_still_evaluate() {
        // Back-rank mate; black still has more material on the board
        let board = Board::from_fen("R5k1/5ppp/8/8/8/8/8/n5K1 b - - 0 1").unwrap();
        assert!(board.is_checkmate());
        assert_eq!(evaluate_position(&board), 5 - (3 + 3));
    }
}
