use crate::moves::Move;

pub const FLAG_NONE: u8 = 0;
pub const FLAG_EXACT: u8 = 1;
pub const FLAG_LOWER: u8 = 2;
pub const FLAG_UPPER: u8 = 3;

/// Depth sentinel for entries whose score is final regardless of search
/// depth (mates); they survive every depth-preferred replacement.
pub const DEPTH_MATE: u16 = u16::MAX;

/// One slot of the table. Scores are absolute (white-positive); the flag
/// tells how the score bounds the true value. The stored move must be
/// revalidated for pseudo-legality by the reader, which makes key
/// collisions harmless.
#[derive(Debug, Clone, Copy, Default)]
pub struct TTEntry {
    pub key: u64,
    pub flag: u8,
    pub depth: u16,
    pub score: i32,
    pub best: Move,
}

impl TTEntry {
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.flag == FLAG_NONE
    }
}

/// Open-address table with power-of-two capacity and single-entry slots.
/// Indexing is a mask of the zobrist hash. Writes keep the deeper entry.
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    mask: usize,
}

impl TranspositionTable {
    /// Build a table of roughly `mb` megabytes, rounded down to a power of
    /// two entries.
    pub fn new(mb: usize) -> Self {
        let bytes = mb.max(1) * 1024 * 1024;
        let entry_size = std::mem::size_of::<TTEntry>();
        let mut count = 1usize;
        while count * 2 * entry_size <= bytes {
            count *= 2;
        }
        log::info!("transposition table: {} entries ({} MB requested)", count, mb);
        Self {
            entries: vec![TTEntry::default(); count],
            mask: count - 1,
        }
    }

    #[inline(always)]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// The entry at the hash slot, or an empty entry if the slot belongs to
    /// a different position.
    #[inline(always)]
    pub fn probe(&self, hash: u64) -> TTEntry {
        let entry = self.entries[self.index(hash)];
        if !entry.is_empty() && entry.key == hash {
            entry
        } else {
            TTEntry::default()
        }
    }

    /// Store unless the slot already holds a deeper entry.
    pub fn store(&mut self, hash: u64, flag: u8, depth: u16, score: i32, best: Move) {
        let idx = self.index(hash);
        let slot = &mut self.entries[idx];
        if slot.is_empty() || slot.depth <= depth {
            *slot = TTEntry {
                key: hash,
                flag,
                depth,
                score,
                best,
            };
        }
    }

    pub fn clear(&mut self) {
        self.entries.fill(TTEntry::default());
    }

    pub fn resize(&mut self, mb: usize) {
        *self = Self::new(mb);
    }

    /// Permille of used slots in a fixed-size sample, for info output.
    pub fn hashfull(&self) -> usize {
        let sample = self.entries.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let used = self.entries[..sample].iter().filter(|e| !e.is_empty()).count();
        used * 1000 / sample
    }
}
