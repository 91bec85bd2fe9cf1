pub mod bitboard;
pub mod eval;
pub mod logging;
pub mod movegen;
pub mod moves;
pub mod perft;
pub mod picker;
pub mod search;
pub mod state;
pub mod tt;
pub mod uci;
pub mod zobrist;

use std::env;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Build every global lookup table. Idempotent; must run before anything
/// touches a position.
pub fn init_tables() {
    zobrist::init_zobrist();
    bitboard::init_slider_tables();
    movegen::init_move_tables();
}

pub fn run_cli() {
    logging::init_logging();
    init_tables();

    let args: Vec<String> = env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "perft" => {
                perft::run_perft_suite();
                return;
            }
            "bench" => {
                run_bench(args.get(2).and_then(|s| s.parse().ok()).unwrap_or(7));
                return;
            }
            _ => {}
        }
    }

    uci::uci_loop();
}

/// Fixed-depth search from the start position, for quick speed checks.
fn run_bench(depth: u16) {
    let mut pos = state::Position::startpos();
    let mut tt = tt::TranspositionTable::new(64);
    let stop = Arc::new(AtomicBool::new(false));

    println!("bench: startpos to depth {}", depth);
    let result = search::search_position(&mut pos, depth, &mut tt, &eval::MaterialEvaluator, stop);
    println!(
        "bench done: depth {} best {} score {} nodes {} (leaf {}, illegal {}, tt hits {})",
        result.depth,
        result.best_move,
        search::format_score(result.score),
        result.metrics.nodes,
        result.metrics.leaf_nodes,
        result.metrics.illegal,
        result.metrics.tt_hits,
    );
}
