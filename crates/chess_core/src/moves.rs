use std::fmt;

use crate::{error::MoveError, piece::{Color, PieceType}, Board, Piece, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub move_type: MoveType,
    pub promotion: Option<PieceType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveType {
    Normal,
    Capture,
    EnPassant,
    Castle,
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2),
    (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1),
    (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            promotion: None,
            move_type: MoveType::Normal,
        }
    }

    pub fn with_promotion(from: Position, to: Position, promotion: PieceType) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
            move_type: MoveType::Normal,
        }
    }

    pub fn castle(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            promotion: None,
            move_type: MoveType::Castle,
        }
    }

    fn of_type(from: Position, to: Position, move_type: MoveType, promotion: Option<PieceType>) -> Self {
        Self { from, to, move_type, promotion }
    }

    /// Parses long algebraic notation such as `e2e4` or `e7e8q`.
    ///
    /// The result carries `MoveType::Normal`; use [`Board::parse_move`] to get
    /// the fully classified legal move.
    pub fn from_uci(notation: &str) -> Result<Self, MoveError> {
        let parse_err = || MoveError::Parse(notation.to_string());
        if !notation.is_ascii() || !(4..=5).contains(&notation.len()) {
            return Err(parse_err());
        }

        let from = Position::from_algebraic(&notation[0..2]).ok_or_else(parse_err)?;
        let to = Position::from_algebraic(&notation[2..4]).ok_or_else(parse_err)?;
        match notation[4..].chars().next() {
            None => Ok(Self::new(from, to)),
            Some(c) => match PieceType::from_char(c) {
                Some(promotion) if c.is_ascii_lowercase() && PieceType::PROMOTIONS.contains(&promotion) => {
                    Ok(Self::with_promotion(from, to, promotion))
                }
                _ => Err(parse_err()),
            },
        }
    }

    /// Same squares and promotion, ignoring the move classification.
    pub fn same_squares(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.to_char())?;
        }
        Ok(())
    }
}

/// Appends every pseudo-legal move of `piece` standing on `from`. Moves that
/// leave the mover's own king in check are not filtered here.
pub(crate) fn pseudo_legal_moves(board: &Board, from: Position, piece: Piece, moves: &mut Vec<Move>) {
    match piece.piece_type {
        PieceType::Pawn => pawn_moves(board, from, piece.color, moves),
        PieceType::Knight => step_moves(board, from, piece.color, &KNIGHT_OFFSETS, moves),
        PieceType::Bishop => slide_moves(board, from, piece.color, &BISHOP_DIRECTIONS, moves),
        PieceType::Rook => slide_moves(board, from, piece.color, &ROOK_DIRECTIONS, moves),
        PieceType::Queen => {
            slide_moves(board, from, piece.color, &ROOK_DIRECTIONS, moves);
            slide_moves(board, from, piece.color, &BISHOP_DIRECTIONS, moves);
        }
        PieceType::King => {
            step_moves(board, from, piece.color, &KING_OFFSETS, moves);
            castling_moves(board, from, piece.color, moves);
        }
    }
}

fn pawn_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    let direction = color.forward();
    let (start_rank, last_rank) = match color {
        Color::White => (2, 8),
        Color::Black => (7, 1),
    };

    let mut push_pawn_move = |to: Position, move_type: MoveType| {
        if to.rank == last_rank {
            for promotion in PieceType::PROMOTIONS {
                moves.push(Move::of_type(from, to, move_type, Some(promotion)));
            }
        } else {
            moves.push(Move::of_type(from, to, move_type, None));
        }
    };

    // Forward pushes
    if let Some(one) = from.offset(0, direction) {
        if board.get_piece(one).is_none() {
            push_pawn_move(one, MoveType::Normal);
            if from.rank == start_rank {
                if let Some(two) = one.offset(0, direction) {
                    if board.get_piece(two).is_none() {
                        push_pawn_move(two, MoveType::Normal);
                    }
                }
            }
        }
    }

    // Captures, including en passant
    for file_delta in [-1, 1] {
        let Some(to) = from.offset(file_delta, direction) else {
            continue;
        };
        match board.get_piece(to) {
            Some(target) if target.color != color => push_pawn_move(to, MoveType::Capture),
            None if board.en_passant() == Some(to) => push_pawn_move(to, MoveType::EnPassant),
            _ => {}
        }
    }
}

fn step_moves(board: &Board, from: Position, color: Color, offsets: &[(i8, i8)], moves: &mut Vec<Move>) {
    for &(file_delta, rank_delta) in offsets {
        let Some(to) = from.offset(file_delta, rank_delta) else {
            continue;
        };
        match board.get_piece(to) {
            None => moves.push(Move::new(from, to)),
            Some(target) if target.color != color => {
                moves.push(Move::of_type(from, to, MoveType::Capture, None))
            }
            Some(_) => {}
        }
    }
}

fn slide_moves(board: &Board, from: Position, color: Color, directions: &[(i8, i8)], moves: &mut Vec<Move>) {
    for &(file_delta, rank_delta) in directions {
        let mut current = from;
        while let Some(to) = current.offset(file_delta, rank_delta) {
            match board.get_piece(to) {
                None => moves.push(Move::new(from, to)),
                Some(target) => {
                    if target.color != color {
                        moves.push(Move::of_type(from, to, MoveType::Capture, None));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}

fn castling_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    let rank = match color {
        Color::White => 1,
        Color::Black => 8,
    };
    if from != (Position { file: 5, rank }) {
        return;
    }

    let rights = board.castling_rights();
    let (kingside, queenside) = match color {
        Color::White => (rights.white_kingside, rights.white_queenside),
        Color::Black => (rights.black_kingside, rights.black_queenside),
    };
    if !kingside && !queenside {
        return;
    }

    let enemy = color.opposite();
    if board.is_square_attacked(from, enemy) {
        return;
    }

    let square = |file| Position { file, rank };
    let own_rook = |file| board.get_piece(square(file)) == Some(&Piece::new(PieceType::Rook, color));
    let empty = |files: &[u8]| files.iter().all(|&file| board.get_piece(square(file)).is_none());
    let safe = |files: &[u8]| files.iter().all(|&file| !board.is_square_attacked(square(file), enemy));

    if kingside && own_rook(8) && empty(&[6, 7]) && safe(&[6, 7]) {
        moves.push(Move::castle(from, square(7)));
    }
    if queenside && own_rook(1) && empty(&[2, 3, 4]) && safe(&[3, 4]) {
        moves.push(Move::castle(from, square(3)));
    }
}

/// Whether `piece` on `from` attacks `target`, taking blockers into account.
pub(crate) fn attacks(board: &Board, from: Position, piece: Piece, target: Position) -> bool {
    let rank_diff = target.rank as i8 - from.rank as i8;
    let file_diff = target.file as i8 - from.file as i8;
    if rank_diff == 0 && file_diff == 0 {
        return false;
    }

    match piece.piece_type {
        PieceType::Pawn => rank_diff == piece.color.forward() && file_diff.abs() == 1,
        PieceType::Knight => {
            (rank_diff.abs() == 2 && file_diff.abs() == 1) || (rank_diff.abs() == 1 && file_diff.abs() == 2)
        }
        PieceType::King => rank_diff.abs() <= 1 && file_diff.abs() <= 1,
        PieceType::Bishop => is_diagonal(rank_diff, file_diff) && is_path_clear(board, from, target),
        PieceType::Rook => is_straight(rank_diff, file_diff) && is_path_clear(board, from, target),
        PieceType::Queen => {
            (is_diagonal(rank_diff, file_diff) || is_straight(rank_diff, file_diff))
                && is_path_clear(board, from, target)
        }
    }
}

fn is_diagonal(rank_diff: i8, file_diff: i8) -> bool {
    rank_diff.abs() == file_diff.abs()
}

fn is_straight(rank_diff: i8, file_diff: i8) -> bool {
    rank_diff == 0 || file_diff == 0
}

/// Squares strictly between `from` and `to` are empty. Only meaningful for
/// squares sharing a rank, file or diagonal.
fn is_path_clear(board: &Board, from: Position, to: Position) -> bool {
    let rank_step = (to.rank as i8 - from.rank as i8).signum();
    let file_step = (to.file as i8 - from.file as i8).signum();

    let mut current = from.offset(file_step, rank_step);
    while let Some(pos) = current {
        if pos == to {
            return true;
        }
        if board.get_piece(pos).is_some() {
            return false;
        }
        current = pos.offset(file_step, rank_step);
    }
    true
}
