use cozy_chess::{Board, Color, Piece};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

/// Seed for the process-wide key table; fixed so fingerprints are stable across runs.
pub const ZOBRIST_SEED: u64 = 0xF00D_F00D_DEAD_BEEF;

#[derive(Clone, PartialEq, Eq)]
pub struct ZobristKeys {
    pieces: [[u64; 64]; 12],
    side: u64,
    // white short, white long, black short, black long
    castling: [u64; 4],
    en_passant: [u64; 8],
}

fn piece_index(color: Color, piece: Piece) -> usize {
    color as usize * 6 + piece as usize
}

impl ZobristKeys {
    pub fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pieces = [[0u64; 64]; 12];
        for row in pieces.iter_mut() {
            for k in row.iter_mut() { *k = rng.gen(); }
        }
        let side = rng.gen();
        let mut castling = [0u64; 4];
        for k in castling.iter_mut() { *k = rng.gen(); }
        let mut en_passant = [0u64; 8];
        for k in en_passant.iter_mut() { *k = rng.gen(); }
        Self { pieces, side, castling, en_passant }
    }

    pub fn fingerprint(&self, board: &Board) -> u64 {
        let mut key = 0u64;
        for &color in &Color::ALL {
            for &piece in &Piece::ALL {
                let row = &self.pieces[piece_index(color, piece)];
                for sq in board.colors(color) & board.pieces(piece) { key ^= row[sq as usize]; }
            }
        }
        if board.side_to_move() == Color::Black { key ^= self.side; }
        for (i, &color) in Color::ALL.iter().enumerate() {
            let rights = board.castle_rights(color);
            if rights.short.is_some() { key ^= self.castling[i * 2]; }
            if rights.long.is_some() { key ^= self.castling[i * 2 + 1]; }
        }
        if let Some(file) = board.en_passant() { key ^= self.en_passant[file as usize]; }
        key
    }
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(|| ZobristKeys::generate(ZOBRIST_SEED))
}

pub fn compute(board: &Board) -> u64 { keys().fingerprint(board) }
