use cozy_chess::Move;
use std::collections::HashSet;

use crate::board::Position;
use crate::search::eval::{evaluate, mated_in, DRAW_SCORE};
use crate::search::see::{order_captures, order_moves};
use crate::search::time::SearchControl;
use crate::search::tt::{Bound, TranspositionTable};
use crate::search::MAX_PLY;

/// Everything one recursive search needs: the position it walks with
/// make/unmake, an optional transposition table, the stop flag and counters.
/// Independent searches hold independent contexts.
pub struct SearchContext<'a> {
    pos: &'a mut Position,
    tt: Option<&'a mut TranspositionTable>,
    control: &'a SearchControl,
    nodes: u64,
    node_limit: Option<u64>,
    // Triangular PV: pv[ply] is the best line found below the node at `ply`.
    pv: Vec<Vec<Move>>,
}

fn window_bound(score: i32, alpha: i32, beta: i32) -> Bound {
    if score <= alpha { Bound::Upper } else if score >= beta { Bound::Lower } else { Bound::Exact }
}

impl<'a> SearchContext<'a> {
    pub fn new(pos: &'a mut Position, tt: Option<&'a mut TranspositionTable>, control: &'a SearchControl) -> Self {
        let pv = (0..=MAX_PLY as usize + 1).map(|_| Vec::new()).collect();
        Self { pos, tt, control, nodes: 0, node_limit: None, pv }
    }

    /// Raises the stop flag once this many nodes have been visited.
    pub fn with_node_limit(mut self, limit: Option<u64>) -> Self {
        self.node_limit = limit;
        self
    }

    pub fn nodes(&self) -> u64 { self.nodes }

    /// Line found below the node at `ply` by the last `search` that passed through it.
    pub fn line(&self, ply: u32) -> &[Move] { &self.pv[ply as usize] }

    #[inline]
    fn count_node(&mut self) {
        self.nodes += 1;
        if self.node_limit.is_some_and(|max| self.nodes >= max) { self.control.stop(); }
    }

    fn update_line(&mut self, ply: usize, mv: Move) {
        let (head, tail) = self.pv.split_at_mut(ply + 1);
        let line = &mut head[ply];
        line.clear();
        line.push(mv);
        line.extend_from_slice(&tail[0]);
    }

    pub fn position(&mut self) -> &mut Position { &mut *self.pos }

    pub fn table(&self) -> Option<&TranspositionTable> { self.tt.as_deref() }

    #[inline]
    pub fn is_stopped(&self) -> bool { self.control.is_stopped() }

    // Nothing is written once stopped: a cancelled subtree backs up horizon scores.
    fn store(&mut self, key: u64, depth: u32, score: i32, bound: Bound, best: Option<Move>) {
        if self.control.is_stopped() { return; }
        if let Some(tt) = self.tt.as_deref_mut() { tt.record(key, depth, score, bound, best); }
    }

    pub fn record_root(&mut self, depth: u32, score: i32, best: Move) {
        let key = self.pos.fingerprint();
        self.store(key, depth, score, Bound::Exact, Some(best));
    }

    /// Negamax alpha-beta (fail-hard) to `max_depth` plies from the root; `ply`
    /// is the distance of this node from the root.
    pub fn search(&mut self, max_depth: u32, ply: u32, mut alpha: i32, beta: i32) -> i32 {
        self.count_node();
        self.pv[ply as usize].clear();
        let remaining = max_depth.saturating_sub(ply);
        let key = self.pos.fingerprint();

        if let Some(tt) = self.tt.as_deref() {
            if let Some(score) = tt.probe(key, remaining, alpha, beta) { return score; }
        }

        if ply >= max_depth || self.control.is_stopped() {
            if ply == 0 && !self.pos.in_check() { return evaluate(self.pos.board()); }
            let score = self.quiescence(alpha, beta);
            self.store(key, 0, score, window_bound(score, alpha, beta), None);
            return score;
        }

        let moves = self.pos.legal_moves();
        if moves.is_empty() {
            return if self.pos.in_check() { mated_in(ply) } else { DRAW_SCORE };
        }
        let hash_move = self.tt.as_deref().and_then(|tt| tt.best_move(key));
        let ordered = order_moves(self.pos, moves, hash_move);

        let mut best_move: Option<Move> = None;
        for mv in ordered {
            self.pos.make_move(mv);
            let score = -self.search(max_depth, ply + 1, -beta, -alpha);
            self.pos.unmake_move();
            if score >= beta {
                self.store(key, remaining, score, Bound::Lower, Some(mv));
                return beta;
            }
            if score > alpha {
                alpha = score;
                best_move = Some(mv);
                self.update_line(ply as usize, mv);
            }
        }
        let bound = if best_move.is_some() { Bound::Exact } else { Bound::Upper };
        self.store(key, remaining, alpha, bound, best_move);
        alpha
    }

    /// Capture-only extension past the horizon. Stand pat is a lower bound;
    /// captures are tried best SEE first until the position is quiet.
    pub fn quiescence(&mut self, mut alpha: i32, beta: i32) -> i32 {
        self.count_node();
        let stand = evaluate(self.pos.board());
        if stand >= beta { return beta; }
        if stand > alpha { alpha = stand; }
        if self.control.is_stopped() { return alpha; }

        let moves = self.pos.legal_moves();
        for (mv, _) in order_captures(self.pos, &moves) {
            self.pos.make_move(mv);
            let score = -self.quiescence(-beta, -alpha);
            self.pos.unmake_move();
            if score >= beta { return beta; }
            if score > alpha { alpha = score; }
        }
        alpha
    }

    /// Best line from the root: the line collected during the search, cut at
    /// the first illegal move. A line cut short by a table hit is continued
    /// from stored best moves while they stay legal.
    pub fn principal_variation(&mut self, collected: &[Move], max_len: usize) -> Vec<Move> {
        let mut line = Vec::with_capacity(max_len);
        let mut seen = HashSet::new();
        seen.insert(self.pos.fingerprint());
        for &mv in collected.iter().take(max_len) {
            if !self.pos.legal_moves().contains(&mv) { break; }
            self.pos.make_move(mv);
            line.push(mv);
            seen.insert(self.pos.fingerprint());
        }
        if let Some(tt) = self.tt.as_deref() {
            while line.len() < max_len {
                let Some(mv) = tt.best_move(self.pos.fingerprint()) else { break };
                if !self.pos.legal_moves().contains(&mv) { break; }
                self.pos.make_move(mv);
                line.push(mv);
                if !seen.insert(self.pos.fingerprint()) { break; }
            }
        }
        for _ in 0..line.len() { self.pos.unmake_move(); }
        line
    }
}
