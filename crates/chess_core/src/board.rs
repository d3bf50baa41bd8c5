use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::{
    error::{FenError, MoveError},
    moves::{attacks, pseudo_legal_moves, MoveType},
    piece::{Color, PieceType},
    Move, Piece, Position,
};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Halfmove clock value at which the game is drawn without a claim.
const SEVENTY_FIVE_MOVE_LIMIT: u32 = 150;

/// Occurrences of one position that end the game without a claim.
const FIVEFOLD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    fn revoke(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Drops the right tied to a rook's home square, if `pos` is one.
    fn revoke_corner(&mut self, pos: Position) {
        match (pos.file, pos.rank) {
            (1, 1) => self.white_queenside = false,
            (8, 1) => self.white_kingside = false,
            (1, 8) => self.black_queenside = false,
            (8, 8) => self.black_kingside = false,
            _ => {}
        }
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
}

impl Outcome {
    pub fn result(self) -> GameResult {
        match self {
            Outcome::Checkmate { winner: Color::White } => GameResult::WhiteWins,
            Outcome::Checkmate { winner: Color::Black } => GameResult::BlackWins,
            _ => GameResult::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Ongoing => "*",
        };
        f.write_str(text)
    }
}

/// Everything `push_unchecked` overwrites, so `undo` can put it back.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UndoRecord {
    chess_move: Move,
    moved: Option<Piece>,
    captured: Option<(Position, Piece)>,
    turn: Color,
    castling_rights: CastlingRights,
    en_passant: Option<Position>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: HashMap<Position, Piece>,
    current_turn: Color,
    castling_rights: CastlingRights,
    en_passant: Option<Position>,
    halfmove_clock: u32,
    fullmove_number: u32,
    history: Vec<UndoRecord>,
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_initial_position();
        board
    }

    fn empty() -> Self {
        Self {
            pieces: HashMap::new(),
            current_turn: Color::White,
            castling_rights: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    pub fn setup_initial_position(&mut self) {
        self.pieces.clear();
        self.history.clear();
        self.current_turn = Color::White;
        self.castling_rights = CastlingRights::default();
        self.en_passant = None;
        self.halfmove_clock = 0;
        self.fullmove_number = 1;

        // Setup pawns
        for file in 1..=8 {
            self.pieces.insert(Position { file, rank: 2 }, Piece::new(PieceType::Pawn, Color::White));
            self.pieces.insert(Position { file, rank: 7 }, Piece::new(PieceType::Pawn, Color::Black));
        }

        // Setup other pieces
        let piece_order = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (file, &piece_type) in (1..=8).zip(piece_order.iter()) {
            self.pieces.insert(Position { file, rank: 1 }, Piece::new(piece_type, Color::White));
            self.pieces.insert(Position { file, rank: 8 }, Piece::new(piece_type, Color::Black));
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewFields(fields.len()));
        }

        let mut board = Self::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount(ranks.len()));
        }
        for (row, rank_text) in ranks.iter().enumerate() {
            let rank = 8 - row as u8;
            let mut file = 1u8;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::BadRankLength(rank));
                    }
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece(c))?;
                    let pos = Position::new(file, rank).ok_or(FenError::BadRankLength(rank))?;
                    board.pieces.insert(pos, piece);
                    file += 1;
                }
                if file > 9 {
                    return Err(FenError::BadRankLength(rank));
                }
            }
            if file != 9 {
                return Err(FenError::BadRankLength(rank));
            }
        }

        board.current_turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove(other.to_string())),
        };

        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => board.castling_rights.white_kingside = true,
                    'Q' => board.castling_rights.white_queenside = true,
                    'k' => board.castling_rights.black_kingside = true,
                    'q' => board.castling_rights.black_queenside = true,
                    other => return Err(FenError::InvalidCastling(other)),
                }
            }
        }

        board.en_passant = match fields[3] {
            "-" => None,
            square => Some(
                Position::from_algebraic(square)
                    .filter(|pos| pos.rank == 3 || pos.rank == 6)
                    .ok_or_else(|| FenError::InvalidEnPassant(square.to_string()))?,
            ),
        };

        let counter = |field: Option<&&str>, default: u32| match field {
            None => Ok(default),
            Some(text) => text.parse::<u32>().map_err(|_| FenError::InvalidCounter(text.to_string())),
        };
        board.halfmove_clock = counter(fields.get(4), 0)?;
        board.fullmove_number = counter(fields.get(5), 1)?;

        debug!("loaded position {}", board.to_fen());
        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (1..=8).rev() {
            let mut empty = 0;
            for file in 1..=8 {
                match self.pieces.get(&Position { file, rank }) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if rank > 1 {
                placement.push('/');
            }
        }

        let side = match self.current_turn {
            Color::White => "w",
            Color::Black => "b",
        };

        let rights = self.castling_rights;
        let mut castling: String = [
            (rights.white_kingside, 'K'),
            (rights.white_queenside, 'Q'),
            (rights.black_kingside, 'k'),
            (rights.black_queenside, 'q'),
        ]
        .iter()
        .filter(|(allowed, _)| *allowed)
        .map(|(_, c)| *c)
        .collect();
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = self.en_passant.map_or_else(|| "-".to_string(), |pos| pos.to_string());

        format!(
            "{placement} {side} {castling} {en_passant} {} {}",
            self.halfmove_clock, self.fullmove_number
        )
    }

    pub fn get_piece(&self, pos: Position) -> Option<&Piece> {
        self.pieces.get(&pos)
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant(&self) -> Option<Position> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Number of moves that `undo` can still take back.
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    pub fn piece_count(&self, color: Color, piece_type: PieceType) -> u32 {
        self.pieces
            .values()
            .filter(|piece| piece.color == color && piece.piece_type == piece_type)
            .count() as u32
    }

    /// All legal moves for the side to move, ordered by origin square (rank 1
    /// first, file a first) and then by each piece's generation order.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut scratch = self.scratch();
        self.pseudo_legal_moves()
            .into_iter()
            .filter(|&mv| scratch.keeps_king_safe(mv))
            .collect()
    }

    /// Stops at the first legal move instead of listing them all.
    pub fn has_legal_moves(&self) -> bool {
        let mut scratch = self.scratch();
        self.pseudo_legal_moves()
            .into_iter()
            .any(|mv| scratch.keeps_king_safe(mv))
    }

    fn pseudo_legal_moves(&self) -> Vec<Move> {
        let mut pseudo = Vec::with_capacity(64);
        for pos in Position::all() {
            if let Some(&piece) = self.pieces.get(&pos) {
                if piece.color == self.current_turn {
                    pseudo_legal_moves(self, pos, piece, &mut pseudo);
                }
            }
        }
        pseudo
    }

    /// Copy of the position without the undo history.
    fn scratch(&self) -> Board {
        Board {
            pieces: self.pieces.clone(),
            current_turn: self.current_turn,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            history: Vec::new(),
        }
    }

    /// Whether the side to move is out of check after `chess_move`.
    fn keeps_king_safe(&mut self, chess_move: Move) -> bool {
        let mover = self.current_turn;
        self.push_unchecked(chess_move);
        let safe = !self.is_in_check(mover);
        self.undo();
        safe
    }

    /// Reads a UCI move and resolves it against the legal moves of this position.
    pub fn parse_move(&self, notation: &str) -> Result<Move, MoveError> {
        let parsed = Move::from_uci(notation.trim())?;
        if self.get_piece(parsed.from).is_none() {
            return Err(MoveError::NoPiece(parsed.from.to_string()));
        }
        self.legal_moves()
            .into_iter()
            .find(|mv| mv.same_squares(&parsed))
            .ok_or_else(|| MoveError::Illegal(parsed.to_string()))
    }

    /// Plays `chess_move` if it is legal in this position.
    pub fn make_move(&mut self, chess_move: Move) -> Result<(), MoveError> {
        let piece = self
            .get_piece(chess_move.from)
            .ok_or_else(|| MoveError::NoPiece(chess_move.from.to_string()))?;
        if piece.color != self.current_turn {
            return Err(MoveError::Illegal(chess_move.to_string()));
        }

        let legal = self
            .legal_moves()
            .into_iter()
            .find(|mv| mv.same_squares(&chess_move))
            .ok_or_else(|| MoveError::Illegal(chess_move.to_string()))?;
        self.push_unchecked(legal);
        Ok(())
    }

    /// Applies a move without checking legality. The move should come from
    /// [`Board::legal_moves`]. A move from an empty square is recorded as a
    /// no-op so that the following [`Board::undo`] still pairs with it.
    pub fn push_unchecked(&mut self, chess_move: Move) {
        let mut record = UndoRecord {
            chess_move,
            moved: None,
            captured: None,
            turn: self.current_turn,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };

        let Some(piece) = self.pieces.remove(&chess_move.from) else {
            self.history.push(record);
            return;
        };
        record.moved = Some(piece);

        // Capture, either on the target square or behind it for en passant
        let captured_at = if chess_move.move_type == MoveType::EnPassant {
            Position { file: chess_move.to.file, rank: chess_move.from.rank }
        } else {
            chess_move.to
        };
        record.captured = self.pieces.remove(&captured_at).map(|captured| (captured_at, captured));

        let final_piece = match chess_move.promotion {
            Some(promotion_type) if piece.piece_type == PieceType::Pawn => Piece::new(promotion_type, piece.color),
            _ => piece,
        };
        self.pieces.insert(chess_move.to, final_piece);

        if let Some((rook_from, rook_to)) = castling_rook_squares(piece, chess_move) {
            if let Some(rook) = self.pieces.remove(&rook_from) {
                self.pieces.insert(rook_to, rook);
            }
        }

        if piece.piece_type == PieceType::King {
            self.castling_rights.revoke(piece.color);
        }
        self.castling_rights.revoke_corner(chess_move.from);
        self.castling_rights.revoke_corner(chess_move.to);

        let rank_diff = chess_move.to.rank as i8 - chess_move.from.rank as i8;
        self.en_passant = if piece.piece_type == PieceType::Pawn && rank_diff.abs() == 2 {
            chess_move.from.offset(0, rank_diff / 2)
        } else {
            None
        };

        if piece.piece_type == PieceType::Pawn || record.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.current_turn == Color::Black {
            self.fullmove_number += 1;
        }
        self.current_turn = self.current_turn.opposite();

        self.history.push(record);
    }

    /// Takes back the most recent pushed move. Does nothing when there is none.
    pub fn undo(&mut self) {
        let Some(record) = self.history.pop() else {
            return;
        };

        if let Some(piece) = record.moved {
            let chess_move = record.chess_move;
            self.pieces.remove(&chess_move.to);
            self.pieces.insert(chess_move.from, piece);

            if let Some((rook_from, rook_to)) = castling_rook_squares(piece, chess_move) {
                if let Some(rook) = self.pieces.remove(&rook_to) {
                    self.pieces.insert(rook_from, rook);
                }
            }

            if let Some((pos, captured)) = record.captured {
                self.pieces.insert(pos, captured);
            }
        }

        self.current_turn = record.turn;
        self.castling_rights = record.castling_rights;
        self.en_passant = record.en_passant;
        self.halfmove_clock = record.halfmove_clock;
        self.fullmove_number = record.fullmove_number;
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        let king = Piece::new(PieceType::King, color);
        match self.pieces.iter().find(|(_, piece)| **piece == king) {
            Some((&king_pos, _)) => self.is_square_attacked(king_pos, color.opposite()),
            None => false,
        }
    }

    /// Whether any piece of `attacker` attacks `pos`.
    pub fn is_square_attacked(&self, pos: Position, attacker: Color) -> bool {
        self.pieces
            .iter()
            .any(|(&from, piece)| piece.color == attacker && attacks(self, from, *piece, pos))
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_in_check(self.current_turn) && !self.has_legal_moves()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check(self.current_turn) && !self.has_legal_moves()
    }

    pub fn has_insufficient_material(&self) -> bool {
        let others: Vec<(&Position, &Piece)> = self
            .pieces
            .iter()
            .filter(|(_, piece)| piece.piece_type != PieceType::King)
            .collect();

        match others.as_slice() {
            // King vs King
            [] => true,
            // King and Bishop/Knight vs King
            [(_, piece)] => matches!(piece.piece_type, PieceType::Bishop | PieceType::Knight),
            // Only bishops left, all on one shade, for either side
            [(first_pos, _), rest @ ..] => others
                .iter()
                .all(|(_, piece)| piece.piece_type == PieceType::Bishop)
                && rest.iter().all(|(pos, _)| pos.is_light() == first_pos.is_light()),
        }
    }

    /// Whether the current position has now occurred five times. Only the
    /// moves played on this board count; a position loaded from FEN has no
    /// earlier occurrences.
    pub fn is_fivefold_repetition(&self) -> bool {
        // Captures and pawn moves cannot be repeated across
        let reversible = (self.halfmove_clock as usize).min(self.history.len());
        if reversible < 4 * (FIVEFOLD - 1) {
            return false;
        }

        let mut earlier = self.clone();
        let mut seen = 1;
        for ply in 1..=reversible {
            earlier.undo();
            if ply % 2 == 0 && earlier.same_position(self) {
                seen += 1;
                if seen >= FIVEFOLD {
                    return true;
                }
            }
        }
        false
    }

    fn same_position(&self, other: &Board) -> bool {
        self.current_turn == other.current_turn
            && self.castling_rights == other.castling_rights
            && self.en_passant == other.en_passant
            && self.pieces == other.pieces
    }

    /// The way the game ended, or `None` while it is still in progress.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.has_legal_moves() {
            return Some(if self.is_in_check(self.current_turn) {
                Outcome::Checkmate { winner: self.current_turn.opposite() }
            } else {
                Outcome::Stalemate
            });
        }
        if self.has_insufficient_material() {
            return Some(Outcome::InsufficientMaterial);
        }
        if self.halfmove_clock >= SEVENTY_FIVE_MOVE_LIMIT {
            return Some(Outcome::SeventyFiveMoves);
        }
        if self.is_fivefold_repetition() {
            return Some(Outcome::FivefoldRepetition);
        }
        None
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn result(&self) -> GameResult {
        self.outcome().map_or(GameResult::Ongoing, Outcome::result)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagram with rank 8 on top, `.` for empty squares.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (1..=8).rev() {
            let row: Vec<String> = (1..=8)
                .map(|file| {
                    self.pieces
                        .get(&Position { file, rank })
                        .map_or('.', |piece| piece.to_char())
                        .to_string()
                })
                .collect();
            write!(f, "{}", row.join(" "))?;
            if rank > 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Rook origin and destination when `chess_move` is a castle by `piece`.
fn castling_rook_squares(piece: Piece, chess_move: Move) -> Option<(Position, Position)> {
    if piece.piece_type != PieceType::King {
        return None;
    }
    let file_diff = chess_move.to.file as i8 - chess_move.from.file as i8;
    if file_diff.abs() != 2 {
        return None;
    }
    let rank = chess_move.from.rank;
    let is_kingside = file_diff > 0;
    let rook_from = Position { file: if is_kingside { 8 } else { 1 }, rank };
    let rook_to = Position { file: if is_kingside { 6 } else { 4 }, rank };
    Some((rook_from, rook_to))
}
