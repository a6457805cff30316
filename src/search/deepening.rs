use cozy_chess::Move;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::time::Instant;

use crate::board::Position;
use crate::error::EngineError;
use crate::search::alphabeta::SearchContext;
use crate::search::eval::{evaluate, INFINITY};
use crate::search::see::order_moves;
use crate::search::time::{SearchControl, TimeController};
use crate::search::tt::TranspositionTable;
use crate::search::{IterationReport, Reporter, SearchParams, SearchResult, MAX_PLY, PARALLEL_DEFAULT_DEPTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootMove {
    pub mv: Move,
    pub score: i32,
}

enum RootPass {
    // Carries the line of the best move.
    Complete(Vec<Move>),
    // Cancelled; carries the best root move whose evaluation finished before the stop.
    Interrupted(Option<RootMove>),
}

// One iteration over the root moves. Later moves only need to beat the best so
// far, so a fail-low move keeps the bound it failed at (stable sort keeps its place).
fn search_root(ctx: &mut SearchContext<'_>, root: &mut [RootMove], depth: u32) -> RootPass {
    let mut alpha = -INFINITY;
    let mut best: Option<RootMove> = None;
    let mut line = Vec::new();
    for rm in root.iter_mut() {
        if ctx.is_stopped() { return RootPass::Interrupted(best); }
        ctx.position().make_move(rm.mv);
        let score = -ctx.search(depth, 1, -INFINITY, -alpha);
        ctx.position().unmake_move();
        if ctx.is_stopped() { return RootPass::Interrupted(best); }
        rm.score = score;
        if score > alpha {
            alpha = score;
            best = Some(*rm);
            line.clear();
            line.push(rm.mv);
            line.extend_from_slice(ctx.line(1));
        }
    }
    RootPass::Complete(line)
}

/// Runs the search described by `params`: iterative deepening on the calling
/// thread, or the fixed-depth root fan-out when `threads > 1`. A movetime
/// budget starts a `TimeController` on `control` for the duration of the call.
pub fn run(
    pos: &mut Position,
    tt: Option<&mut TranspositionTable>,
    control: &SearchControl,
    params: &SearchParams,
    reporter: Option<&Reporter>,
) -> Result<SearchResult, EngineError> {
    let _timer = params.movetime.map(|budget| TimeController::start(control.clone(), budget));
    if params.threads > 1 {
        let depth = params.depth.unwrap_or(PARALLEL_DEFAULT_DEPTH);
        // Workers get no tables when the caller searches without one
        let hash_mb = if params.use_tt { tt.as_deref().map(TranspositionTable::size_mb).or(Some(1)) } else { None };
        let root: &Position = pos;
        return match rayon::ThreadPoolBuilder::new().num_threads(params.threads).build() {
            Ok(pool) => pool.install(|| search_parallel(root, depth, control, hash_mb)),
            Err(e) => {
                warn!("could not build a {}-thread pool ({e}); using the global pool", params.threads);
                search_parallel(root, depth, control, hash_mb)
            }
        };
    }
    iterative_deepening(pos, tt, control, params, reporter)
}

/// Deepens one ply at a time until the depth limit, the ply cap or a stop.
///
/// Root moves are re-sorted by score after every completed iteration so the
/// previous best is searched first. A cancelled iteration is discarded: the
/// result is the last completed iteration's best move and score. Before any
/// iteration completes it is the best root move whose evaluation finished,
/// or the first ordered root move if none did.
pub fn iterative_deepening(
    pos: &mut Position,
    tt: Option<&mut TranspositionTable>,
    control: &SearchControl,
    params: &SearchParams,
    reporter: Option<&Reporter>,
) -> Result<SearchResult, EngineError> {
    if let Some(t) = pos.terminal() { return Err(EngineError::NoLegalMoves(t)); }
    let start = Instant::now();

    let hash_move = tt.as_deref().and_then(|t| t.best_move(pos.fingerprint()));
    let moves = pos.legal_moves();
    let mut root: Vec<RootMove> = order_moves(pos, moves, hash_move)
        .into_iter()
        .map(|mv| RootMove { mv, score: -INFINITY })
        .collect();
    // A forced move needs no deeper look
    let max_depth = if root.len() == 1 { 1 } else { params.depth.unwrap_or(MAX_PLY).clamp(1, MAX_PLY) };

    let mut best = RootMove { mv: root[0].mv, score: evaluate(pos.board()) };
    let mut pv = vec![best.mv];
    let mut completed = 0u32;
    let mut ctx = SearchContext::new(pos, tt, control).with_node_limit(params.max_nodes);

    for depth in 1..=max_depth {
        if ctx.is_stopped() { break; }
        match search_root(&mut ctx, &mut root, depth) {
            RootPass::Complete(line) => {
                root.sort_by_key(|rm| Reverse(rm.score));
                best = root[0];
                completed = depth;
                ctx.record_root(depth, best.score, best.mv);
                let collected = if line.first() == Some(&best.mv) { line } else { vec![best.mv] };
                pv = ctx.principal_variation(&collected, depth as usize);
                debug!("depth {} score {} nodes {} best {}", depth, best.score, ctx.nodes(), best.mv);
                if let Some(report) = reporter {
                    report(&IterationReport { depth, score: best.score, nodes: ctx.nodes(), elapsed: start.elapsed(), pv: pv.clone() });
                }
            }
            RootPass::Interrupted(partial) => {
                if completed == 0 {
                    if let Some(rm) = partial {
                        best = rm;
                        pv = vec![rm.mv];
                    }
                }
                debug!("iteration {} cancelled; keeping depth {} result", depth, completed);
                break;
            }
        }
    }

    let nodes = ctx.nodes();
    info!("search done: best {} score {} depth {} nodes {} in {:?}", best.mv, best.score, completed, nodes, start.elapsed());
    Ok(SearchResult { best_move: Some(best.mv), score: best.score, nodes, depth: completed, pv })
}

/// Fan-out variant: every root move is searched to `depth` by a rayon worker on
/// its own copy of the position, with its own table of `hash_mb` split across
/// the workers (`None`: no tables). The results are reduced by maximum score
/// once all workers return. Ties go to the earlier move in root order.
pub fn search_parallel(pos: &Position, depth: u32, control: &SearchControl, hash_mb: Option<usize>) -> Result<SearchResult, EngineError> {
    if let Some(t) = pos.terminal() { return Err(EngineError::NoLegalMoves(t)); }
    let start = Instant::now();
    let depth = depth.clamp(1, MAX_PLY);
    let mut scratch = pos.clone();
    let moves = order_moves(&mut scratch, pos.legal_moves(), None);
    let worker_mb = hash_mb.map(|mb| (mb / rayon::current_num_threads().max(1)).max(1));

    let results: Vec<(RootMove, u64, bool)> = moves
        .par_iter()
        .map_init(
            || worker_mb.map(TranspositionTable::with_capacity_mb),
            |tt, &mv| {
                let mut child = pos.clone();
                child.make_move(mv);
                let mut ctx = SearchContext::new(&mut child, tt.as_mut(), control);
                let score = -ctx.search(depth, 1, -INFINITY, INFINITY);
                let finished = !ctx.is_stopped();
                (RootMove { mv, score }, ctx.nodes(), finished)
            },
        )
        .collect();

    let nodes = results.iter().map(|r| r.1).sum();
    let mut best: Option<RootMove> = None;
    for &(rm, _, finished) in &results {
        if !finished { continue; }
        if best.map_or(true, |b| rm.score > b.score) { best = Some(rm); }
    }
    let all_finished = results.iter().all(|r| r.2);
    let best = best.unwrap_or(RootMove { mv: moves[0], score: evaluate(pos.board()) });
    info!("parallel search done: best {} score {} depth {} nodes {} in {:?}", best.mv, best.score, depth, nodes, start.elapsed());
    Ok(SearchResult {
        best_move: Some(best.mv),
        score: best.score,
        nodes,
        depth: if all_finished { depth } else { 0 },
        pv: vec![best.mv],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_move_is_returned_at_depth_one() {
        // Black king on h8 in check from the rook on a8 has only Kh7
        let mut pos = Position::from_fen("R6k/8/5K2/8/8/8/8/8 b - - 0 1").unwrap();
        let control = SearchControl::new();
        let params = SearchParams::fixed_depth(6);
        let res = iterative_deepening(&mut pos, None, &control, &params, None).unwrap();
        assert_eq!(res.depth, 1);
        assert_eq!(pos.uci_move(res.best_move.unwrap()), "h8h7");
    }

    #[test]
    fn pre_stopped_search_still_returns_a_move() {
        let mut pos = Position::startpos();
        let control = SearchControl::new();
        control.stop();
        let res = iterative_deepening(&mut pos, None, &control, &SearchParams::default(), None).unwrap();
        assert_eq!(res.depth, 0);
        assert!(pos.legal_moves().contains(&res.best_move.unwrap()));
    }

    #[test]
    fn reporter_sees_every_completed_depth() {
        use std::sync::{Arc, Mutex};
        let depths = Arc::new(Mutex::new(Vec::new()));
        let sink = depths.clone();
        let reporter: Reporter = Arc::new(move |r: &IterationReport| sink.lock().unwrap().push(r.depth));
        let mut pos = Position::startpos();
        let mut tt = TranspositionTable::with_capacity_entries(1 << 14);
        let control = SearchControl::new();
        let res = iterative_deepening(&mut pos, Some(&mut tt), &control, &SearchParams::fixed_depth(3), Some(&reporter)).unwrap();
        assert_eq!(res.depth, 3);
        assert_eq!(*depths.lock().unwrap(), vec![1, 2, 3]);
        assert!(!res.pv.is_empty() && res.pv.len() <= 3);
    }
}
