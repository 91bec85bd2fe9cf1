use std::sync::OnceLock;

use crate::state::{color_of, type_of};

// One key per (piece, square), one per en-passant target square, one for
// the side to move. Fixed for the life of the process; castling rights and
// the fifty-move counter are not part of the fold.
static PIECE_KEYS: OnceLock<[[u64; 64]; 12]> = OnceLock::new();
static EN_PASSANT_KEYS: OnceLock<[u64; 64]> = OnceLock::new();
static SIDE_KEY: OnceLock<u64> = OnceLock::new();

// xorshift32 expanded to 16-bit limbs. The seed only has to avoid key
// collisions in practice; a collision costs performance, not correctness,
// because stored best moves are revalidated before use.
struct Prng {
    state: u32,
}

impl Prng {
    fn new(seed: u32) -> Self {
        Prng { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    fn next_u64(&mut self) -> u64 {
        let n1 = self.next_u32() as u64;
        let n2 = self.next_u32() as u64;
        let n3 = self.next_u32() as u64;
        let n4 = self.next_u32() as u64;
        n1 | (n2 << 16) | (n3 << 32) | (n4 << 48)
    }
}

pub fn init_zobrist() {
    if PIECE_KEYS.get().is_some() {
        return;
    }

    let mut rng = Prng::new(0x2545_F491);

    let mut piece_keys = [[0u64; 64]; 12];
    for keys in piece_keys.iter_mut() {
        for key in keys.iter_mut() {
            *key = rng.next_u64();
        }
    }

    let mut ep_keys = [0u64; 64];
    for key in ep_keys.iter_mut() {
        *key = rng.next_u64();
    }

    let _ = PIECE_KEYS.set(piece_keys);
    let _ = EN_PASSANT_KEYS.set(ep_keys);
    let _ = SIDE_KEY.set(rng.next_u64());

    log::info!("zobrist keys initialized");
}

/// Key for a piece byte on a square.
#[inline(always)]
pub fn piece_key(piece: u8, sq: u8) -> u64 {
    let idx = color_of(piece) * 6 + type_of(piece);
    PIECE_KEYS.get().expect("zobrist not init")[idx][sq as usize]
}

#[inline(always)]
pub fn ep_key(sq: u8) -> u64 {
    EN_PASSANT_KEYS.get().expect("zobrist not init")[sq as usize]
}

#[inline(always)]
pub fn side_key() -> u64 {
    *SIDE_KEY.get().expect("zobrist not init")
}
