//! Move generation checked against published perft node counts.

use chess_core::{perft, Board};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn check(fen: &str, expected: &[u64]) {
    let mut board = Board::from_fen(fen).unwrap();
    let before = board.clone();
    for (depth, &nodes) in expected.iter().enumerate() {
        let depth = depth as u8 + 1;
        assert_eq!(perft(&mut board, depth), nodes, "{fen} at depth {depth}");
    }
    assert_eq!(board, before);
}

#[test]
fn perft_start_position() {
    let mut board = Board::new();
    assert_eq!(perft(&mut board, 0), 1);
    check(chess_core::STARTING_FEN, &[20, 400, 8902]);
}

#[test]
fn perft_kiwipete() {
    check(KIWIPETE, &[48, 2039]);
}

#[test]
fn perft_position_3() {
    check(POSITION_3, &[14, 191, 2812]);
}

#[test]
fn perft_position_4() {
    check(POSITION_4, &[6, 264]);
}

#[test]
fn perft_position_5() {
    check(POSITION_5, &[44, 1486]);
}
