use std::sync::Once;

use cinder::movegen::{self, GenMode};
use cinder::moves::MoveList;
use cinder::state::{make_piece, ExtMove, Position, KING, NO_PIECE, PAWN, WHITE};

static INIT: Once = Once::new();

fn init() {
    INIT.call_once(cinder::init_tables);
}

/// Every derived field must agree with the piece array, and the incremental
/// hash with a from-scratch recomputation.
fn assert_consistent(pos: &Position, context: &str) {
    let mut all = 0u64;
    for color in [0usize, 1usize] {
        let mut color_union = 0u64;
        for ptype in PAWN..=KING {
            let mut bb = pos.pieces(color, ptype);
            color_union |= bb.0;
            while bb.0 != 0 {
                let sq = bb.pop_lsb();
                assert_eq!(
                    pos.piece_on(sq),
                    make_piece(color, ptype),
                    "bitboard/array mismatch at {} ({})",
                    sq,
                    context
                );
            }
        }
        assert_eq!(color_union, pos.pieces_for(color).0, "color union ({})", context);
        all |= color_union;
    }
    assert_eq!(all, pos.all_pieces().0, "occupancy union ({})", context);

    for sq in 0..64u8 {
        if !pos.all_pieces().get_bit(sq) {
            assert_eq!(pos.piece_on(sq), NO_PIECE, "ghost piece at {} ({})", sq, context);
        }
    }

    for color in [0usize, 1usize] {
        let kings = pos.pieces(color, KING);
        assert!(kings.count_bits() <= 1, "two kings ({})", context);
        if kings.0 != 0 {
            assert_eq!(pos.king_sq[color], kings.lsb(), "king square ({})", context);
        }
    }

    assert_eq!(
        pos.zobrist(),
        pos.zobrist_from_scratch(),
        "incremental hash diverged ({})",
        context
    );
}

const FENS: [&str; 6] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

#[test]
fn test_make_unmake_restores_every_field() {
    init();
    for fen in FENS {
        let original = Position::parse_fen(fen);
        let mut list = MoveList::new();
        movegen::generate_moves(&original, &mut list, GenMode::All);
        assert!(!list.is_empty(), "no moves generated for {}", fen);

        for mv in list.iter() {
            let mut pos = original;
            let side = pos.side_to_move;
            let mut ext = ExtMove::new(mv);

            pos.make(side, &mut ext);
            assert_consistent(&pos, &format!("after {} in {}", mv, fen));

            pos.unmake(side, &ext);
            assert_eq!(pos, original, "round trip failed for {} in {}", mv, fen);
            assert_eq!(pos.zobrist(), original.zobrist());
        }
    }
}

#[test]
fn test_make_unmake_composes_over_long_lines() {
    init();
    let original = Position::parse_fen(FENS[1]);
    let mut pos = original;
    let mut trail: Vec<ExtMove> = Vec::new();

    // walk a 24-ply line always taking the first legal move
    for _ in 0..24 {
        let mut list = MoveList::new();
        movegen::generate_moves(&pos, &mut list, GenMode::All);
        let mut advanced = false;
        for i in 0..list.len() {
            if let Some(ext) = pos.make_checked(list.get(i)) {
                trail.push(ext);
                advanced = true;
                break;
            }
        }
        if !advanced {
            break;
        }
        assert_consistent(&pos, "mid-line");
    }

    while let Some(ext) = trail.pop() {
        let color = 1 - pos.side_to_move;
        pos.unmake(color, &ext);
    }
    assert_eq!(pos, original, "long line did not unwind to the start");
}

#[test]
fn test_en_passant_round_trip() {
    init();
    let original = Position::parse_fen("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
    let mut pos = original;

    let mut list = MoveList::new();
    movegen::generate_moves(&pos, &mut list, GenMode::Captures);
    let ep = list.iter().find(|m| m.is_en_passant()).expect("ep move missing");

    let mut ext = ExtMove::new(ep);
    pos.make(1, &mut ext);
    assert_eq!(ext.captured, make_piece(WHITE, PAWN));
    assert_eq!(pos.piece_on(27), NO_PIECE, "captured pawn not removed from d4");
    assert_consistent(&pos, "after en passant");

    pos.unmake(1, &ext);
    assert_eq!(pos, original);
}

#[test]
fn test_castle_round_trip_both_sides() {
    init();
    let original = Position::parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let mut list = MoveList::new();
    movegen::generate_moves(&original, &mut list, GenMode::All);

    let castles: Vec<_> = list.iter().filter(|m| m.is_castle()).collect();
    assert_eq!(castles.len(), 2);

    for mv in castles {
        let mut pos = original;
        let mut ext = ExtMove::new(mv);
        pos.make(WHITE, &mut ext);

        // the rook landed next to the king and all rights are gone
        if mv.is_castle_right() {
            assert_eq!(pos.piece_on(5), make_piece(WHITE, cinder::state::ROOK));
            assert_eq!(pos.piece_on(6), make_piece(WHITE, KING));
        } else {
            assert_eq!(pos.piece_on(3), make_piece(WHITE, cinder::state::ROOK));
            assert_eq!(pos.piece_on(2), make_piece(WHITE, KING));
        }
        assert_eq!(
            pos.state.castling[WHITE] & (cinder::state::CAN_CASTLE_LEFT | cinder::state::CAN_CASTLE_RIGHT),
            0
        );
        assert_consistent(&pos, "after castling");

        pos.unmake(WHITE, &ext);
        assert_eq!(pos, original);
    }
}

#[test]
fn test_promotion_round_trip() {
    init();
    let original = Position::parse_fen("3n4/4P3/8/8/7k/8/8/4K3 w - - 0 1");
    let mut list = MoveList::new();
    movegen::generate_moves(&original, &mut list, GenMode::All);

    // four push promotions and four capture promotions
    let promos: Vec<_> = list.iter().filter(|m| m.is_promotion()).collect();
    assert_eq!(promos.len(), 8);

    for mv in promos {
        let mut pos = original;
        let mut ext = ExtMove::new(mv);
        pos.make(WHITE, &mut ext);
        assert_eq!(
            pos.piece_on(mv.target()),
            make_piece(WHITE, mv.promotion_type())
        );
        assert_consistent(&pos, "after promotion");
        pos.unmake(WHITE, &ext);
        assert_eq!(pos, original);
    }
}

#[test]
fn test_rook_capture_clears_castling_right() {
    init();
    // black bishop takes the h1 rook; white loses the short right
    let original = Position::parse_fen("4k3/8/8/8/8/5b2/8/R3K2R b KQ - 0 1");
    let mut pos = original;
    let mv = cinder::uci::parse_move(&pos, "f3h1").expect("capture not generated");

    let ext = pos.make_checked(mv).expect("capture should be legal");
    assert_eq!(pos.state.castling[WHITE] & cinder::state::CAN_CASTLE_RIGHT, 0);
    assert_ne!(pos.state.castling[WHITE] & cinder::state::CAN_CASTLE_LEFT, 0);

    pos.unmake(1, &ext);
    assert_eq!(pos, original);
}

#[test]
fn test_rook_move_clears_castling_right() {
    init();
    let mut pos = Position::parse_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
    let mv = cinder::uci::parse_move(&pos, "a1a4").unwrap();
    pos.make_checked(mv).unwrap();
    assert_eq!(pos.state.castling[WHITE] & cinder::state::CAN_CASTLE_LEFT, 0);
    assert_ne!(pos.state.castling[WHITE] & cinder::state::CAN_CASTLE_RIGHT, 0);
}
