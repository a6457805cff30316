use cozy_chess::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Full fingerprint; the slot index only keeps the low bits.
    pub key: u64,
    pub best: Option<Move>,
    pub depth: u32,
    pub score: i32,
    pub bound: Bound,
}

pub const DEFAULT_HASH_MB: usize = 16;

/// Direct-mapped table indexed by `fingerprint & mask`, always-replace.
pub struct TranspositionTable {
    slots: Vec<Option<Entry>>,
    mask: usize,
}

impl Default for TranspositionTable {
    fn default() -> Self { Self::with_capacity_mb(DEFAULT_HASH_MB) }
}

fn floor_power_of_two(n: usize) -> usize {
    let n = n.max(1);
    1 << (usize::BITS - 1 - n.leading_zeros())
}

impl TranspositionTable {
    /// Capacity is rounded down to a power of two (at least one slot).
    pub fn with_capacity_entries(entries: usize) -> Self {
        let cap = floor_power_of_two(entries);
        Self { slots: vec![None; cap], mask: cap - 1 }
    }

    pub fn with_capacity_mb(mb: usize) -> Self {
        let bytes = mb.max(1).saturating_mul(1024 * 1024);
        Self::with_capacity_entries(bytes / std::mem::size_of::<Option<Entry>>())
    }

    pub fn capacity(&self) -> usize { self.slots.len() }

    pub fn size_mb(&self) -> usize { (self.slots.len() * std::mem::size_of::<Option<Entry>>()) >> 20 }

    /// Occupied slots.
    pub fn len(&self) -> usize { self.slots.iter().filter(|s| s.is_some()).count() }

    pub fn is_empty(&self) -> bool { self.slots.iter().all(|s| s.is_none()) }

    pub fn clear(&mut self) { self.slots.fill(None); }

    #[inline]
    fn index(&self, key: u64) -> usize { (key as usize) & self.mask }

    /// Entry stored for exactly this fingerprint; an aliased slot reads as a miss.
    pub fn entry(&self, key: u64) -> Option<Entry> {
        self.slots[self.index(key)].filter(|e| e.key == key)
    }

    pub fn best_move(&self, key: u64) -> Option<Move> { self.entry(key).and_then(|e| e.best) }

    /// Score usable at `depth` for window `[alpha, beta]`, or `None` to re-search.
    pub fn probe(&self, key: u64, depth: u32, alpha: i32, beta: i32) -> Option<i32> {
        let e = self.entry(key)?;
        if e.depth < depth { return None; }
        match e.bound {
            Bound::Exact => Some(e.score),
            Bound::Lower if e.score >= beta => Some(beta),
            Bound::Upper if e.score <= alpha => Some(alpha),
            _ => None,
        }
    }

    pub fn record(&mut self, key: u64, depth: u32, score: i32, bound: Bound, best: Option<Move>) {
        let idx = self.index(key);
        self.slots[idx] = Some(Entry { key, best, depth, score, bound });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_power_of_two() {
        assert_eq!(TranspositionTable::with_capacity_entries(1000).capacity(), 512);
        assert_eq!(TranspositionTable::with_capacity_entries(1024).capacity(), 1024);
        assert_eq!(TranspositionTable::with_capacity_entries(0).capacity(), 1);
        assert!(TranspositionTable::with_capacity_mb(1).capacity().is_power_of_two());
    }

    #[test]
    fn exact_hit_returns_stored_score() {
        let mut tt = TranspositionTable::with_capacity_entries(64);
        tt.record(7, 3, 42, Bound::Exact, None);
        assert_eq!(tt.probe(7, 3, -100, 100), Some(42));
        assert_eq!(tt.probe(7, 2, -100, 100), Some(42));
        assert_eq!(tt.probe(7, 4, -100, 100), None);
    }

    #[test]
    fn lower_bound_only_validates_beta_cutoff() {
        let mut tt = TranspositionTable::with_capacity_entries(64);
        tt.record(9, 2, 150, Bound::Lower, None);
        assert_eq!(tt.probe(9, 2, 0, 100), Some(100));
        assert_eq!(tt.probe(9, 2, 0, 200), None);
    }

    #[test]
    fn upper_bound_only_validates_fail_low() {
        let mut tt = TranspositionTable::with_capacity_entries(64);
        tt.record(9, 2, -50, Bound::Upper, None);
        assert_eq!(tt.probe(9, 2, 0, 100), Some(0));
        assert_eq!(tt.probe(9, 2, -80, 100), None);
    }

    #[test]
    fn aliased_slot_is_a_miss_and_last_write_wins() {
        let mut tt = TranspositionTable::with_capacity_entries(16);
        let a = 3u64;
        let b = a + 16 * 1001;
        tt.record(a, 5, 10, Bound::Exact, None);
        assert_eq!(tt.probe(b, 0, -100, 100), None);
        tt.record(b, 1, 20, Bound::Exact, None);
        assert_eq!(tt.entry(a), None);
        assert_eq!(tt.probe(b, 1, -100, 100), Some(20));
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn clear_empties_every_slot() {
        let mut tt = TranspositionTable::with_capacity_entries(8);
        for k in 0..8u64 { tt.record(k, 1, 0, Bound::Exact, None); }
        assert_eq!(tt.len(), 8);
        tt.clear();
        assert!(tt.is_empty());
    }
}
