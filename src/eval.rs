use crate::state::{Position, BLACK, KING, PAWN, WHITE};

/// Evaluations are scaled integers: one pawn = 1000.
pub const EVAL_SCALE: i32 = 1000;
pub const DRAW_EVAL: i32 = 0;

/// Symmetric sentinels outside every reachable score.
pub const EVAL_INF: i32 = i32::MAX;

/// Being mated right now scores -MATE_BASE; a mate found `ply` half-moves
/// from the root scores `ply` closer to zero, so shorter mates dominate.
pub const MATE_BASE: i32 = 9_999 * EVAL_SCALE;
/// Scores beyond this magnitude are mate scores.
pub const MATE_RANGE: i32 = 9_000 * EVAL_SCALE;

#[inline(always)]
pub fn mated_in(ply: usize) -> i32 {
    -MATE_BASE + ply as i32
}

#[inline(always)]
pub fn mate_in(ply: usize) -> i32 {
    MATE_BASE - ply as i32
}

#[inline(always)]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > MATE_RANGE
}

/// Half-moves until mate encoded in a mate score.
#[inline(always)]
pub fn mate_distance(score: i32) -> i32 {
    MATE_BASE - score.abs()
}

/// Static evaluator consumed at the quiescence leaves. Scores are absolute
/// (white-positive) in EVAL_SCALE units; the search applies the side sign.
pub trait Evaluator {
    fn evaluate(&self, pos: &Position) -> i32;
}

pub const MATERIAL: [i32; 6] = [1, 3, 3, 5, 9, 0];

/// Plain material count, the reference evaluator.
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, pos: &Position) -> i32 {
        let mut score = 0;
        for ptype in PAWN..KING {
            let diff = pos.pieces(WHITE, ptype).count_bits() as i32
                - pos.pieces(BLACK, ptype).count_bits() as i32;
            score += diff * MATERIAL[ptype] * EVAL_SCALE;
        }
        score
    }
}
