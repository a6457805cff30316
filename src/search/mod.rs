pub mod alphabeta;
pub mod deepening;
pub mod eval;
pub mod see;
pub mod time;
pub mod tt;
pub mod zobrist;

use cozy_chess::Move;
use std::sync::Arc;
use std::time::Duration;

pub use alphabeta::SearchContext;
pub use deepening::{iterative_deepening, search_parallel, RootMove};
pub use time::{SearchControl, TimeController};
pub use tt::{Bound, TranspositionTable};

/// Hard cap on plies searched from the root.
pub const MAX_PLY: u32 = 64;

/// Fixed depth used by the parallel fan-out when no depth limit is configured.
pub const PARALLEL_DEFAULT_DEPTH: u32 = 4;

#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Deepest iteration to run; `None` keeps deepening until stopped (or `MAX_PLY`).
    pub depth: Option<u32>,
    /// Wall-clock budget enforced by the time controller.
    pub movetime: Option<Duration>,
    /// Bypass the transposition table entirely.
    pub use_tt: bool,
    /// `> 1` selects the fixed-depth root fan-out over a rayon pool.
    pub threads: usize,
    /// Stop once this many nodes have been visited.
    pub max_nodes: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self { Self { depth: None, movetime: None, use_tt: true, threads: 1, max_nodes: None } }
}

impl SearchParams {
    pub fn fixed_depth(depth: u32) -> Self { Self { depth: Some(depth), ..Self::default() } }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub nodes: u64,
    /// Deepest fully completed iteration.
    pub depth: u32,
    pub pv: Vec<Move>,
}

/// Progress after a completed iteration; advisory only.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub depth: u32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
}

pub type Reporter = Arc<dyn Fn(&IterationReport) + Send + Sync>;
