use std::time::Instant;

use crate::movegen::{self, GenMode};
use crate::moves::MoveList;
use crate::state::{ExtMove, Position};

/// Count the leaf nodes of the legal game tree: generate, make, keep only
/// moves that leave the mover's king safe, recurse.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let side = pos.side_to_move;
    let mut list = MoveList::new();
    movegen::generate_moves(pos, &mut list, GenMode::All);

    let mut nodes = 0;
    for i in 0..list.len() {
        let mut ext = ExtMove::new(list.get(i));
        pos.make(side, &mut ext);
        if !pos.in_check(side) {
            nodes += perft(pos, depth - 1);
        }
        pos.unmake(side, &ext);
    }
    nodes
}

/// Per-root-move node counts, the standard movegen debugging tool.
pub fn perft_divide(pos: &mut Position, depth: u32) {
    println!("--- perft divide, depth {} ---", depth);
    let side = pos.side_to_move;
    let mut list = MoveList::new();
    movegen::generate_moves(pos, &mut list, GenMode::All);

    let mut total = 0;
    for i in 0..list.len() {
        let mv = list.get(i);
        let mut ext = ExtMove::new(mv);
        pos.make(side, &mut ext);
        if !pos.in_check(side) {
            let count = if depth > 0 { perft(pos, depth - 1) } else { 1 };
            println!("{}: {}", mv, count);
            total += count;
        }
        pos.unmake(side, &ext);
    }
    println!("total: {}", total);
}

pub fn run_perft_suite() {
    println!("--- perft suite ---");

    let positions: [(&str, &str, [u64; 6]); 5] = [
        (
            "start position",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            [1, 20, 400, 8902, 197281, 4865609],
        ),
        (
            "kiwipete",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
            [1, 48, 2039, 97862, 4085603, 193690690],
        ),
        (
            "rook endgame",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            [1, 14, 191, 2812, 43238, 674624],
        ),
        (
            "promotion tangle",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            [1, 6, 264, 9467, 422333, 15833292],
        ),
        (
            "buried mate",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            [1, 44, 1486, 62379, 2103487, 89941194],
        ),
    ];

    let mut total_nodes = 0u64;
    let mut total_ms = 0u128;

    for (name, fen, expected) in positions.iter() {
        println!("\n{}", name);
        let mut pos = Position::parse_fen(fen);

        let depth = 4;
        let start = Instant::now();
        let nodes = perft(&mut pos, depth);
        let ms = start.elapsed().as_millis();

        total_nodes += nodes;
        total_ms += ms;

        println!("depth {}: {} nodes in {}ms", depth, nodes, ms);
        if nodes == expected[depth as usize] {
            println!("PASS");
        } else {
            println!("FAIL (expected {})", expected[depth as usize]);
            perft_divide(&mut pos, depth);
        }
    }

    println!("\ntotal: {} nodes in {}ms", total_nodes, total_ms);
    if total_ms > 0 {
        println!("nps: {}", total_nodes as u128 * 1000 / total_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_tables;

    #[test]
    fn test_perft_start_position() {
        init_tables();
        let mut pos = Position::startpos();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8902);
        assert_eq!(perft(&mut pos, 4), 197281);
    }

    #[test]
    fn test_perft_kiwipete() {
        init_tables();
        let mut pos = Position::parse_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
        );
        assert_eq!(perft(&mut pos, 1), 48);
        assert_eq!(perft(&mut pos, 2), 2039);
        assert_eq!(perft(&mut pos, 3), 97862);
    }

    #[test]
    fn test_perft_castling_rank() {
        init_tables();
        let mut pos = Position::parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(perft(&mut pos, 1), 26);
    }

    #[test]
    fn test_perft_en_passant_pin() {
        init_tables();
        // en passant would expose the king to the h5 rook
        let mut pos = Position::parse_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        assert_eq!(perft(&mut pos, 1), 14);
        assert_eq!(perft(&mut pos, 2), 191);
        assert_eq!(perft(&mut pos, 3), 2812);
    }

    #[test]
    fn test_perft_promotions() {
        init_tables();
        let mut pos = Position::parse_fen(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        );
        assert_eq!(perft(&mut pos, 1), 6);
        assert_eq!(perft(&mut pos, 2), 264);
        assert_eq!(perft(&mut pos, 3), 9467);
    }
}
