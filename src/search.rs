use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::eval::{self, Evaluator, DRAW_EVAL, EVAL_INF};
use crate::movegen::{self, GenMode};
use crate::moves::{Move, MoveList};
use crate::picker::MovePicker;
use crate::state::{sign_of, ExtMove, Position, NO_PIECE};
use crate::tt::{TranspositionTable, DEPTH_MATE, FLAG_EXACT, FLAG_LOWER, FLAG_UPPER};

pub const MAX_PLY: usize = 128;

/// Per-ply frame. The best root move is read from the frame at ply 0 after
/// a search returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackEntry {
    pub best_move: Move,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchMetrics {
    pub nodes: u64,
    pub leaf_nodes: u64,
    pub captures: u64,
    pub illegal: u64,
    pub checkmates: u64,
    pub stalemates: u64,
    pub tt_hits: u64,
    pub tt_cutoffs: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    pub depth: u16,
    pub metrics: SearchMetrics,
}

/// Exclusive owner of everything one search touches. The position, the
/// stack and the metrics belong to this worker for the whole call; only the
/// stop flag is shared.
pub struct SearchContext<'a> {
    pub pos: &'a mut Position,
    pub tt: &'a mut TranspositionTable,
    pub eval: &'a dyn Evaluator,
    pub stop: Arc<AtomicBool>,
    pub stack: [StackEntry; MAX_PLY],
    pub metrics: SearchMetrics,
    pub stopped: bool,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        pos: &'a mut Position,
        tt: &'a mut TranspositionTable,
        eval: &'a dyn Evaluator,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            pos,
            tt,
            eval,
            stop,
            stack: [StackEntry::default(); MAX_PLY],
            metrics: SearchMetrics::default(),
            stopped: false,
        }
    }

    #[inline(always)]
    fn static_eval(&self) -> i32 {
        sign_of(self.pos.side_to_move) * self.eval.evaluate(self.pos)
    }

    /// Negamax with alpha-beta. Scores are from the mover's point of view;
    /// the caller negates. Depth 1 nodes descend into quiescence for their
    /// children.
    pub fn negamax(&mut self, mut alpha: i32, mut beta: i32, depth: u16, ply: usize) -> i32 {
        if self.stop.load(Ordering::Relaxed) {
            self.stopped = true;
            return 0;
        }
        self.metrics.nodes += 1;

        if ply >= MAX_PLY - 1 {
            return self.static_eval();
        }

        let side = self.pos.side_to_move;
        let sign = sign_of(side);

        // fast draws
        if self.pos.state.rule50 >= 100 {
            return DRAW_EVAL;
        }
        if self.pos.is_insufficient_material() {
            return DRAW_EVAL;
        }

        // kings are never actually captured; a missing one decides the game
        if !self.pos.has_king(1 - side) {
            return eval::mate_in(ply);
        }
        if !self.pos.has_king(side) {
            return eval::mated_in(ply);
        }

        let hash = self.pos.zobrist();
        let entry = self.tt.probe(hash);
        if !entry.is_empty() {
            self.metrics.tt_hits += 1;
            // no table cutoffs at the root: the caller reads the best move
            // from the root frame, which a bare score return would not fill
            if ply > 0 && entry.depth >= depth {
                let score = sign * entry.score;
                match entry.flag {
                    FLAG_EXACT => return score,
                    FLAG_LOWER => alpha = alpha.max(score),
                    FLAG_UPPER => beta = beta.min(score),
                    _ => {}
                }
                if alpha >= beta {
                    self.metrics.tt_cutoffs += 1;
                    return beta;
                }
            }
        }

        let mut picker = MovePicker::new(entry.best);
        let alpha_orig = alpha;
        let mut best_score = -EVAL_INF;
        let mut best_move = Move::default();
        let mut legal_moves = 0;

        while picker.has_next() {
            let mv = picker.next(self.pos);
            if mv.is_null() {
                break;
            }

            let mut ext = ExtMove::new(mv);
            self.pos.make(side, &mut ext);
            if self.pos.in_check(side) {
                self.metrics.illegal += 1;
                self.pos.unmake(side, &ext);
                continue;
            }
            legal_moves += 1;
            if ext.captured != NO_PIECE {
                self.metrics.captures += 1;
            }

            let score = if depth == 1 {
                -self.qsearch(-beta, -alpha, ply + 1)
            } else {
                -self.negamax(-beta, -alpha, depth - 1, ply + 1)
            };

            self.pos.unmake(side, &ext);

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                self.stack[ply].best_move = mv;
            }
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    // fail high: the cutting move is a lower bound here
                    self.tt
                        .store(hash, FLAG_LOWER, store_depth(depth, score), sign * score, mv);
                    return beta;
                }
            }
        }

        if legal_moves == 0 {
            return if self.pos.in_check(side) {
                self.metrics.checkmates += 1;
                eval::mated_in(ply)
            } else {
                self.metrics.stalemates += 1;
                DRAW_EVAL
            };
        }

        let flag = if alpha > alpha_orig { FLAG_EXACT } else { FLAG_UPPER };
        self.tt.store(
            hash,
            flag,
            store_depth(depth, best_score),
            sign * best_score,
            best_move,
        );

        best_score
    }

    /// Quiescence: expand captures until the position is quiet, then fall
    /// back to the static evaluation. Terminates because every recursion
    /// consumes a piece.
    pub fn qsearch(&mut self, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        if self.stop.load(Ordering::Relaxed) {
            self.stopped = true;
            return 0;
        }
        self.metrics.nodes += 1;

        if ply >= MAX_PLY - 1 {
            self.metrics.leaf_nodes += 1;
            return self.static_eval();
        }

        let side = self.pos.side_to_move;

        let mut list = MoveList::new();
        movegen::generate_moves(self.pos, &mut list, GenMode::Captures);
        list.sort();

        let mut best_score = -EVAL_INF;
        let mut legal_captures = 0;

        for i in (0..list.len()).rev() {
            let mv = list.get(i);
            let mut ext = ExtMove::new(mv);
            self.pos.make(side, &mut ext);
            if self.pos.in_check(side) {
                self.metrics.illegal += 1;
                self.pos.unmake(side, &ext);
                continue;
            }
            legal_captures += 1;
            self.metrics.captures += 1;

            let score = -self.qsearch(-beta, -alpha, ply + 1);
            self.pos.unmake(side, &ext);

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
            }
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    return beta;
                }
            }
        }

        if legal_captures > 0 {
            return best_score;
        }

        // quiet position; mate and stalemate are decided right here
        if !self.has_legal_quiet() {
            return if self.pos.in_check(side) {
                self.metrics.checkmates += 1;
                eval::mated_in(ply)
            } else {
                self.metrics.stalemates += 1;
                DRAW_EVAL
            };
        }

        self.metrics.leaf_nodes += 1;
        self.static_eval()
    }

    fn has_legal_quiet(&mut self) -> bool {
        let side = self.pos.side_to_move;
        let mut list = MoveList::new();
        movegen::generate_moves(self.pos, &mut list, GenMode::Quiets);
        for i in 0..list.len() {
            let mut ext = ExtMove::new(list.get(i));
            self.pos.make(side, &mut ext);
            let legal = !self.pos.in_check(side);
            self.pos.unmake(side, &ext);
            if legal {
                return true;
            }
        }
        false
    }
}

/// Mate entries get the unlimited-depth sentinel so that shallower writes
/// never evict them and the score propagates unchanged.
fn store_depth(depth: u16, score: i32) -> u16 {
    if eval::is_mate_score(score) {
        DEPTH_MATE
    } else {
        depth
    }
}

/// Iterative deepening driver. On cancellation the result of the last
/// completed depth is returned.
pub fn search_position(
    pos: &mut Position,
    max_depth: u16,
    tt: &mut TranspositionTable,
    eval: &dyn Evaluator,
    stop: Arc<AtomicBool>,
) -> SearchResult {
    let start = Instant::now();
    let mut ctx = SearchContext::new(pos, tt, eval, stop);

    let mut result = SearchResult {
        best_move: Move::default(),
        score: 0,
        depth: 0,
        metrics: SearchMetrics::default(),
    };

    for depth in 1..=max_depth.max(1) {
        ctx.stack = [StackEntry::default(); MAX_PLY];
        let score = ctx.negamax(-EVAL_INF, EVAL_INF, depth, 0);
        if ctx.stopped {
            break;
        }

        result.best_move = ctx.stack[0].best_move;
        result.score = score;
        result.depth = depth;

        let ms = start.elapsed().as_millis();
        let nps = if ms > 0 {
            ctx.metrics.nodes as u128 * 1000 / ms
        } else {
            0
        };
        let pv = pv_line(ctx.pos, ctx.tt, depth);
        println!(
            "info depth {} score {} nodes {} nps {} hashfull {} time {} pv {}",
            depth,
            format_score(score),
            ctx.metrics.nodes,
            nps,
            ctx.tt.hashfull(),
            ms,
            pv
        );
        log::info!(
            "depth {} score {} nodes {} time {}ms",
            depth,
            format_score(score),
            ctx.metrics.nodes,
            ms
        );
    }

    result.metrics = ctx.metrics;
    result
}

/// Walk the table's best moves forward to print a principal variation,
/// then rewind. Stored moves are revalidated before being trusted.
fn pv_line(pos: &mut Position, tt: &TranspositionTable, depth: u16) -> String {
    let mut line = String::new();
    let mut made: Vec<ExtMove> = Vec::new();

    for _ in 0..depth {
        let entry = tt.probe(pos.zobrist());
        if entry.is_empty()
            || entry.best.is_null()
            || !movegen::is_move_pseudo_legal(pos, entry.best)
        {
            break;
        }
        let ext = match pos.make_checked(entry.best) {
            Some(ext) => ext,
            None => break,
        };
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&entry.best.to_string());
        made.push(ext);
    }

    for ext in made.iter().rev() {
        let color = 1 - pos.side_to_move;
        pos.unmake(color, ext);
    }
    line
}

pub fn format_score(score: i32) -> String {
    if eval::is_mate_score(score) {
        let moves = (eval::mate_distance(score) + 1) / 2;
        if score > 0 {
            format!("mate {}", moves)
        } else {
            format!("mate -{}", moves)
        }
    } else {
        // EVAL_SCALE is 1000 per pawn; UCI wants centipawns
        format!("cp {}", score / 10)
    }
}
