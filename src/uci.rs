use std::io::{self, BufRead};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::eval::MaterialEvaluator;
use crate::movegen::{self, GenMode};
use crate::moves::{square_from_name, Move, MoveList};
use crate::perft;
use crate::search;
use crate::state::{Position, NULL_SQ};
use crate::tt::TranspositionTable;

const DEFAULT_HASH_MB: usize = 64;
const DEFAULT_DEPTH: u16 = 7;

pub fn uci_loop() {
    let stdin = io::stdin();
    let mut buffer = String::new();

    let mut tt = TranspositionTable::new(DEFAULT_HASH_MB);
    let mut pos = Position::startpos();
    let evaluator = MaterialEvaluator;

    loop {
        buffer.clear();
        match stdin.lock().read_line(&mut buffer) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let cmd = buffer.trim();
        if cmd.is_empty() {
            continue;
        }
        log::debug!("uci command: {}", cmd);

        let parts: Vec<&str> = cmd.split_whitespace().collect();
        match parts[0] {
            "uci" => {
                println!("id name Cinder");
                println!("id author cinder developers");
                println!(
                    "option name Hash type spin default {} min 1 max 1024",
                    DEFAULT_HASH_MB
                );
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                pos = Position::startpos();
                tt.clear();
            }
            "position" => handle_position(&mut pos, &parts),
            "go" => {
                let depth = parse_go_depth(&parts);
                let stop = Arc::new(AtomicBool::new(false));
                let result = search::search_position(&mut pos, depth, &mut tt, &evaluator, stop);

                let best = if result.best_move.is_null() {
                    first_legal_move(&mut pos)
                } else {
                    Some(result.best_move)
                };
                match best {
                    Some(mv) => println!("bestmove {}", mv),
                    None => println!("bestmove (none)"),
                }
            }
            "perft" => {
                let depth = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
                perft::perft_divide(&mut pos, depth);
            }
            "setoption" => {
                if parts.len() > 4 && parts[1] == "name" && parts[2] == "Hash" && parts[3] == "value"
                {
                    if let Ok(mb) = parts[4].parse::<usize>() {
                        tt.resize(mb);
                    }
                }
            }
            "d" => pos.print(),
            "quit" | "exit" => break,
            _ => {}
        }
    }
}

fn handle_position(pos: &mut Position, parts: &[&str]) {
    if parts.len() < 2 {
        return;
    }

    let mut move_index = parts.len();
    if parts[1] == "startpos" {
        *pos = Position::startpos();
        if parts.len() > 2 && parts[2] == "moves" {
            move_index = 3;
        }
    } else {
        // accept both "position fen <fen>" and "position <fen>"
        let fen_start = if parts[1] == "fen" { 2 } else { 1 };
        let mut fen = String::new();
        let mut i = fen_start;
        while i < parts.len() && parts[i] != "moves" {
            fen.push_str(parts[i]);
            fen.push(' ');
            i += 1;
        }
        *pos = Position::parse_fen(&fen);
        if i < parts.len() && parts[i] == "moves" {
            move_index = i + 1;
        }
    }

    for token in parts.iter().skip(move_index) {
        match parse_move(pos, token) {
            Some(mv) => {
                // a move that leaves the mover in check is silently dropped
                if pos.make_checked(mv).is_none() {
                    log::warn!("illegal move ignored: {}", token);
                }
            }
            None => log::warn!("unparseable move ignored: {}", token),
        }
    }
}

/// Resolve a long-algebraic move string against the generated moves so
/// flags (castle, en passant, promotion) come out right.
pub fn parse_move(pos: &Position, text: &str) -> Option<Move> {
    if text.len() < 4 {
        return None;
    }
    let src = square_from_name(&text[0..2]);
    let dst = square_from_name(&text[2..4]);
    if src == NULL_SQ || dst == NULL_SQ {
        return None;
    }
    let promo = text.chars().nth(4).and_then(|c| match c {
        'n' => Some(crate::state::KNIGHT),
        'b' => Some(crate::state::BISHOP),
        'r' => Some(crate::state::ROOK),
        'q' => Some(crate::state::QUEEN),
        _ => None,
    });

    let mut list = MoveList::new();
    movegen::generate_moves(pos, &mut list, GenMode::All);
    for mv in list.iter() {
        if mv.source() != src || mv.target() != dst {
            continue;
        }
        if mv.is_promotion() {
            if promo == Some(mv.promotion_type()) {
                return Some(mv);
            }
        } else if promo.is_none() {
            return Some(mv);
        }
    }
    None
}

fn first_legal_move(pos: &mut Position) -> Option<Move> {
    let mut list = MoveList::new();
    movegen::generate_moves(pos, &mut list, GenMode::All);
    for i in 0..list.len() {
        let mv = list.get(i);
        if let Some(ext) = pos.make_checked(mv) {
            pos.unmake(1 - pos.side_to_move, &ext);
            return Some(mv);
        }
    }
    None
}

fn parse_go_depth(parts: &[&str]) -> u16 {
    let mut i = 1;
    while i < parts.len() {
        if parts[i] == "depth" {
            if let Some(d) = parts.get(i + 1).and_then(|s| s.parse().ok()) {
                return d;
            }
        }
        i += 1;
    }
    DEFAULT_DEPTH
}
