use cozy_chess::{Board, Color, Piece};

pub const PAWN: i32 = 100;
pub const KNIGHT: i32 = 320;
pub const BISHOP: i32 = 330;
pub const ROOK: i32 = 500;
pub const QUEEN: i32 = 900;
pub const KING: i32 = 20_000;

// Mate scoring helpers
pub const MATE_SCORE: i32 = 30_000;
pub const DRAW_SCORE: i32 = 0;
pub const INFINITY: i32 = 32_000;

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => PAWN,
        Piece::Knight => KNIGHT,
        Piece::Bishop => BISHOP,
        Piece::Rook => ROOK,
        Piece::Queen => QUEEN,
        Piece::King => KING,
    }
}

/// Score for the side to move when it is checkmated `ply` plies from the root.
pub fn mated_in(ply: u32) -> i32 { -MATE_SCORE + ply as i32 }

pub fn is_mate_score(score: i32) -> bool { score.abs() >= MATE_SCORE - 1_000 }

// Piece-square tables, rank 8 first, from White's point of view.
#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_PST: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

fn pst(piece: Piece) -> &'static [i32; 64] {
    match piece {
        Piece::Pawn => &PAWN_PST,
        Piece::Knight => &KNIGHT_PST,
        Piece::Bishop => &BISHOP_PST,
        Piece::Rook => &ROOK_PST,
        Piece::Queen => &QUEEN_PST,
        Piece::King => &KING_PST,
    }
}

// Table index for a square (a1 = 0); tables are mirrored for Black.
#[inline]
fn pst_index(color: Color, sq: usize) -> usize {
    let (file, rank) = (sq % 8, sq / 8);
    match color {
        Color::White => (7 - rank) * 8 + file,
        Color::Black => rank * 8 + file,
    }
}

// White-relative material plus placement.
pub fn eval_white_cp(board: &Board) -> i32 {
    let mut score = 0;
    for &color in &Color::ALL {
        let sign = if color == Color::White { 1 } else { -1 };
        for &piece in &Piece::ALL {
            let table = pst(piece);
            for sq in board.colors(color) & board.pieces(piece) {
                score += sign * (piece_value(piece) + table[pst_index(color, sq as usize)]);
            }
        }
    }
    score
}

fn legal_move_count(board: &Board) -> i32 {
    let mut n = 0;
    board.generate_moves(|ml| {
        n += ml.len() as i32;
        false
    });
    n
}

/// Legal moves of the side to move minus those of the opponent, a tenth of a
/// centipawn each. Zero while in check: the opponent cannot be given the move.
pub fn mobility(board: &Board) -> i32 {
    match board.null_move() {
        Some(flipped) => (legal_move_count(board) - legal_move_count(&flipped)) / MOBILITY_DIVISOR,
        None => 0,
    }
}

const MOBILITY_DIVISOR: i32 = 10;

/// Static score from the side to move's perspective (negamax-friendly):
/// material and placement plus mobility.
pub fn evaluate(board: &Board) -> i32 {
    let base = eval_white_cp(board);
    let base = if board.side_to_move() == Color::White { base } else { -base };
    base + mobility(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced() {
        assert_eq!(evaluate(&Board::default()), 0);
    }

    #[test]
    fn score_flips_with_side_to_move() {
        let w = Board::from_fen("4k3/8/8/8/8/8/3Q4/4K3 w - - 0 1", false).unwrap();
        let b = Board::from_fen("4k3/8/8/8/8/8/3Q4/4K3 b - - 0 1", false).unwrap();
        assert!(evaluate(&w) > 800);
        assert_eq!(evaluate(&w), -evaluate(&b));
    }

    #[test]
    fn mobility_rewards_the_freer_side() {
        let w = Board::from_fen("4k3/8/8/8/8/8/3Q4/4K3 w - - 0 1", false).unwrap();
        let b = Board::from_fen("4k3/8/8/8/8/8/3Q4/4K3 b - - 0 1", false).unwrap();
        let (white_moves, black_moves) = (legal_move_count(&w), legal_move_count(&b));
        assert!(white_moves > black_moves);
        assert_eq!(mobility(&w), (white_moves - black_moves) / 10);
        assert_eq!(evaluate(&w), eval_white_cp(&w) + mobility(&w));
        assert_eq!(mobility(&Board::default()), 0);
    }

    #[test]
    fn no_mobility_term_in_check() {
        let b = Board::from_fen("4k3/8/8/8/8/8/4Q3/4K3 b - - 0 1", false).unwrap();
        assert_eq!(mobility(&b), 0);
    }

    #[test]
    fn pawn_tables_mirror() {
        // e2 for White and e7 for Black read the same table cell
        assert_eq!(pst_index(Color::White, 12), pst_index(Color::Black, 52));
        assert_eq!(PAWN_PST[pst_index(Color::White, 12)], -20);
    }
}
