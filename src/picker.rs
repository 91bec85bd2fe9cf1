use crate::movegen::{self, GenMode};
use crate::moves::{Move, MoveList};
use crate::state::Position;

/// Stages of move production. The transposition-table move goes out before
/// anything is generated; captures and quiets follow as separate sorted
/// batches. A TT move that also appears among the generated moves is simply
/// searched twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    TtMove,
    CapturesInit,
    Captures,
    QuietsInit,
    Quiets,
    Done,
}

pub struct MovePicker {
    stage: Stage,
    tt_move: Move,
    list: MoveList,
    /// Entries below this index are still unconsumed; the list is sorted
    /// ascending, so we hand out moves from the top.
    idx: usize,
}

impl MovePicker {
    pub fn new(tt_move: Move) -> Self {
        Self {
            stage: Stage::TtMove,
            tt_move,
            list: MoveList::new(),
            idx: 0,
        }
    }

    #[inline(always)]
    pub fn has_next(&self) -> bool {
        self.stage != Stage::Done
    }

    /// Next candidate in ordering priority, or the null move once exhausted.
    pub fn next(&mut self, pos: &Position) -> Move {
        loop {
            match self.stage {
                Stage::TtMove => {
                    self.stage = Stage::CapturesInit;
                    if !self.tt_move.is_null() && movegen::is_move_pseudo_legal(pos, self.tt_move)
                    {
                        return self.tt_move;
                    }
                }
                Stage::CapturesInit => {
                    self.list.clear();
                    movegen::generate_moves(pos, &mut self.list, GenMode::Captures);
                    self.list.sort();
                    self.idx = self.list.len();
                    self.stage = Stage::Captures;
                }
                Stage::Captures => {
                    if self.idx > 0 {
                        self.idx -= 1;
                        return self.list.get(self.idx);
                    }
                    self.stage = Stage::QuietsInit;
                }
                Stage::QuietsInit => {
                    self.list.clear();
                    movegen::generate_moves(pos, &mut self.list, GenMode::Quiets);
                    self.list.sort();
                    self.idx = self.list.len();
                    self.stage = Stage::Quiets;
                }
                Stage::Quiets => {
                    if self.idx > 0 {
                        self.idx -= 1;
                        return self.list.get(self.idx);
                    }
                    self.stage = Stage::Done;
                }
                Stage::Done => return Move::default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_tables;
    use crate::movegen::score_move;

    #[test]
    fn test_picker_yields_tt_move_first_then_everything() {
        init_tables();
        let pos = Position::parse_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
        );

        let mut all = MoveList::new();
        movegen::generate_moves(&pos, &mut all, GenMode::All);

        // pick some quiet move as the hash move
        let tt_move = all.iter().find(|m| pos.piece_on(m.target()) == crate::state::NO_PIECE).unwrap();

        let mut picker = MovePicker::new(tt_move);
        let mut seen = Vec::new();
        while picker.has_next() {
            let mv = picker.next(&pos);
            if mv.is_null() {
                break;
            }
            seen.push(mv);
        }

        assert_eq!(seen[0], tt_move);
        // every generated move shows up (the tt move twice)
        for mv in all.iter() {
            assert!(seen.contains(&mv), "picker dropped {}", mv);
        }
        assert_eq!(seen.len(), all.len() + 1);
    }

    #[test]
    fn test_picker_rejects_bogus_tt_move() {
        init_tables();
        let pos = Position::startpos();
        // rook a1 to a5 is blocked by the a2 pawn
        let bogus = Move::quiet(0, 32);
        let mut picker = MovePicker::new(bogus);
        let first = picker.next(&pos);
        assert_ne!(first, bogus);
    }

    #[test]
    fn test_captures_come_out_best_first() {
        init_tables();
        // two captures of different value are available
        let pos = Position::parse_fen("4k3/8/2q1n3/3P4/8/8/8/4K3 w - - 0 1");
        let mut picker = MovePicker::new(Move::default());
        let first = picker.next(&pos);
        let second = picker.next(&pos);
        assert!(score_move(&pos, first) >= score_move(&pos, second));
        // queen capture ranks above knight capture
        assert_eq!(first.target(), 42);
    }
}
