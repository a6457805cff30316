use cozy_chess::{Move, Piece, Square};

use crate::board::Position;
use crate::search::eval::piece_value;

// Least valuable legal capture onto `sq`; queen promotions win ties among pawns.
fn least_valuable_attacker(pos: &Position, sq: Square) -> Option<Move> {
    pos.attackers_to(sq)
        .into_iter()
        .min_by_key(|&(piece, mv)| {
            let promo_rank = match mv.promotion { None | Some(Piece::Queen) => 0, Some(_) => 1 };
            (piece_value(piece), promo_rank)
        })
        .map(|(_, mv)| mv)
}

/// Net material the side to move can win by capturing on `sq`, never below zero:
/// the side may always decline to continue a losing exchange.
///
/// Every simulated capture is unmade before returning.
pub fn static_exchange(pos: &mut Position, sq: Square) -> i32 {
    let Some((_, victim)) = pos.piece_on(sq) else { return 0 };
    let Some(mv) = least_valuable_attacker(pos, sq) else { return 0 };
    pos.make_move(mv);
    let reply = static_exchange(pos, sq);
    pos.unmake_move();
    (piece_value(victim) - reply).max(0)
}

/// Exchange balance of playing capture `mv`; may be negative.
pub fn see_capture(pos: &mut Position, mv: Move) -> i32 {
    let gain = pos.captured_piece(mv).map_or(0, piece_value);
    pos.make_move(mv);
    let reply = static_exchange(pos, mv.to);
    pos.unmake_move();
    gain - reply
}

/// Captures scored by SEE, best first. Ordering only: nothing is dropped.
pub fn order_captures(pos: &mut Position, moves: &[Move]) -> Vec<(Move, i32)> {
    let captures: Vec<Move> = moves.iter().copied().filter(|&m| pos.is_capture(m)).collect();
    let mut scored: Vec<(Move, i32)> = captures.into_iter().map(|m| (m, see_capture(pos, m))).collect();
    scored.sort_by_key(|&(_, s)| std::cmp::Reverse(s));
    scored
}

/// Hash move first, then captures by SEE, then quiet moves in generation order.
pub fn order_moves(pos: &mut Position, moves: Vec<Move>, hash_move: Option<Move>) -> Vec<Move> {
    let mut out = Vec::with_capacity(moves.len());
    if let Some(hm) = hash_move {
        if moves.contains(&hm) { out.push(hm); }
    }
    for (m, _) in order_captures(pos, &moves) {
        if Some(m) != hash_move { out.push(m); }
    }
    for m in moves {
        if Some(m) != hash_move && !pos.is_capture(m) { out.push(m); }
    }
    out
}
