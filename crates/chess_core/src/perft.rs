use crate::Board;

/// Counts the leaf nodes of the legal move tree below `board`, `depth` plies deep.
pub fn perft(board: &mut Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = board.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves {
        board.push_unchecked(mv);
        nodes += perft(board, depth - 1);
        board.undo();
    }
    nodes
}
